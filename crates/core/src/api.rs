use reqwest::blocking::Client;
pub use reqwest::Method;
use serde_json::{json, Value};
use std::fmt;
use tracing::debug;

use crate::error::{Error, Result};

pub const PEOPLE_API: &str = "https://people.googleapis.com/v1";

const USER_AGENT: &str = "contacts-mcp/0.1 (https://github.com/Hydepwns/contacts-mcp)";

/// Bearer token shared by every tool call. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Percent-encoded query string, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn set_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.set(key, v),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// A single People API call, relative to the API base.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PATCH, path).with_body(body)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, query: &Query) -> Self {
        if !query.is_empty() {
            let sep = if self.path.contains('?') { '&' } else { '?' };
            self.path = format!("{}{}{}", self.path, sep, query.encode());
        }
        self
    }
}

pub trait Transport: Send + Sync {
    /// Performs one call. Non-2xx statuses become `Error::RemoteApi`;
    /// an empty success body is returned as `{}`.
    fn call(&self, request: &ApiRequest, credential: &Credential) -> Result<Value>;
}

pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::with_base_url(PEOPLE_API)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn call(&self, request: &ApiRequest, credential: &Credential) -> Result<Value> {
        let url = self.url(&request.path);
        debug!(method = %request.method, path = %request.path, "people api request");

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .bearer_auth(credential.token());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send()?;
        let status = response.status();
        let text = response.text()?;
        debug!(status = status.as_u16(), "people api response");

        if !status.is_success() {
            return Err(Error::RemoteApi {
                status: status.as_u16(),
                body: parse_error_body(&text),
            });
        }

        parse_success_body(&text)
    }
}

fn parse_success_body(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_str(text).map_err(|e| Error::Decode(e.to_string()))
}

fn parse_error_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
