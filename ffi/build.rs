use std::env;
use std::path::PathBuf;

fn main() {
    let crate_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let out = PathBuf::from(&crate_dir).join("include").join("relay.h");

    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");

    // A header that fails to generate should not break the library build.
    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("RELAY_FFI_H")
        .generate()
    {
        Ok(bindings) => {
            if let Some(dir) = out.parent() {
                let _ = std::fs::create_dir_all(dir);
            }
            bindings.write_to_file(out);
        }
        Err(e) => println!("cargo:warning=cbindgen: {e}"),
    }
}
