//! Method names, argument maps, and validated invocations.
//!
//! # Design
//! The host hands the relay a method name plus a loosely typed argument map.
//! `Invocation::parse` turns that into a typed value or a `RelayError`, and
//! runs entirely on the calling thread before any background work exists.
//! Checks run in a fixed order (method, `url`, `token`, `body`) so the first
//! missing field is the one reported.

use std::collections::HashMap;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::RelayError;
use crate::http::HttpMethod;

/// Methods served by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodName {
    /// Compatibility alias for `Fetch`.
    GetAuthMe,
    Fetch,
    Post,
}

impl MethodName {
    pub fn as_str(self) -> &'static str {
        match self {
            MethodName::GetAuthMe => "getAuthMe",
            MethodName::Fetch => "fetch",
            MethodName::Post => "post",
        }
    }

    pub fn http_method(self) -> HttpMethod {
        match self {
            MethodName::GetAuthMe | MethodName::Fetch => HttpMethod::Get,
            MethodName::Post => HttpMethod::Post,
        }
    }

    fn requires_body(self) -> bool {
        self == MethodName::Post
    }
}

impl FromStr for MethodName {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "getAuthMe" => Ok(MethodName::GetAuthMe),
            "fetch" => Ok(MethodName::Fetch),
            "post" => Ok(MethodName::Post),
            other => Err(RelayError::UnsupportedMethod(other.to_string())),
        }
    }
}

/// String arguments supplied with a method call. Every field is optional at
/// this level; `Invocation::parse` decides which ones are required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments(HashMap<String, String>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Parse arguments from a JSON object. Values that are not strings are
    /// dropped, so a non-string `url` reads as a missing `url`.
    pub fn from_json(json: &str) -> Result<Self, RelayError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| RelayError::InvalidArguments(format!("arguments must be a JSON object: {e}")))?;
        let object = value
            .as_object()
            .ok_or_else(|| RelayError::InvalidArguments("arguments must be a JSON object".to_string()))?;
        let map = object
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect();
        Ok(Self(map))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A validated request to perform one HTTP call.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Correlates log lines for a single call.
    pub id: Uuid,
    pub method: MethodName,
    pub url: String,
    pub token: String,
    /// Present only for `post`.
    pub body: Option<String>,
}

impl Invocation {
    pub fn parse(method: &str, args: &Arguments) -> Result<Self, RelayError> {
        let method: MethodName = method.parse()?;
        let url = args.get("url").ok_or_else(|| RelayError::missing("url"))?;
        let token = args.get("token").ok_or_else(|| RelayError::missing("token"))?;
        let body = if method.requires_body() {
            Some(args.get("body").ok_or_else(|| RelayError::missing("body"))?)
        } else {
            None
        };

        Ok(Self {
            id: Uuid::new_v4(),
            method,
            url: url.to_string(),
            token: token.to_string(),
            body: body.map(str::to_string),
        })
    }
}
