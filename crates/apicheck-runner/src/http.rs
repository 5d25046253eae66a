//! HTTP client adapter
//!
//! Verb-based calls behind a [`Transport`] trait so tests can inject a
//! deterministic double. Non-2xx statuses are ordinary normalized
//! responses, never errors; [`TransportError`] covers only connect,
//! timeout, and malformed-transport failures. A failed call is reported
//! immediately — no retries.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;

use apicheck_core::ApiResponse;

/// HTTP verbs the booking contract uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outgoing request: verb, path, and optional headers/query/body.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub json_body: Option<Value>,
}

impl Call {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            query: Vec::new(),
            json_body: None,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.json_body = Some(body);
        self
    }

    /// `"GET /booking"` — label for diagnostics.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }
}

/// Transport-level failure. Assertion mismatches never appear here.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("request failed: {0}")]
    Send(String),
    #[error("malformed response: {0}")]
    Response(String),
}

/// What a transport hands back before normalization.
#[derive(Debug, Clone)]
pub struct RawReply {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body_text: String,
    pub elapsed_ms: u64,
}

/// Sends one request. Implemented by [`HttpTransport`] for real traffic
/// and by scripted doubles in tests.
pub trait Transport: Send + Sync {
    /// # Errors
    ///
    /// Only transport-level failures; any received status is an `Ok` reply.
    fn send(&self, base_url: &str, call: &Call) -> Result<RawReply, TransportError>;
}

/// Blocking reqwest transport with a fixed per-call timeout.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns error if the underlying client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Send(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, base_url: &str, call: &Call) -> Result<RawReply, TransportError> {
        let url = format!("{base_url}{}", call.path);
        let method = match call.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut req = self.client.request(method, &url);
        for (name, value) in &call.headers {
            req = req.header(name, value);
        }
        if !call.query.is_empty() {
            req = req.query(&call.query);
        }
        if let Some(body) = &call.json_body {
            if !call.has_header("content-type") {
                req = req.header("Content-Type", "application/json");
            }
            req = req.json(body);
        }

        let start = Instant::now();
        let resp = req.send().map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(format!("{} after timeout: {e}", call.label()))
            } else {
                TransportError::Send(format!("{}: {e}", call.label()))
            }
        })?;
        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body_text = resp
            .text()
            .map_err(|e| TransportError::Response(format!("{}: {e}", call.label())))?;
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        Ok(RawReply {
            status,
            headers,
            body_text,
            elapsed_ms,
        })
    }
}

/// Verb-based client producing normalized responses.
pub struct ApiClient {
    base_url: String,
    transport: Box<dyn Transport>,
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>, transport: Box<dyn Transport>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            transport,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform one call and normalize the reply.
    ///
    /// The body is parsed as JSON when possible; an empty or non-JSON body
    /// becomes `None` (negative scenarios still see the status code).
    ///
    /// # Errors
    ///
    /// Transport-level failures only; any received status is `Ok`.
    pub fn call(&self, call: &Call) -> Result<ApiResponse, TransportError> {
        let reply = self.transport.send(&self.base_url, call)?;
        let body = if reply.body_text.trim().is_empty() {
            None
        } else {
            serde_json::from_str(&reply.body_text).ok()
        };
        Ok(ApiResponse {
            status: reply.status,
            body,
            headers: reply.headers,
            elapsed_ms: reply.elapsed_ms,
        })
    }
}
