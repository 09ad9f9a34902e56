//! HTTP transport seam.
//!
//! The client hands fully-built [`HttpRequest`]s to a [`Transport`] and gets
//! raw status and bytes back; it never touches reqwest directly. Tests swap
//! in a scripted transport to count calls and inject failures.

mod http;

pub use http::HttpTransport;

use std::fmt;

use async_trait::async_trait;

use crate::error::TransportError;

/// HTTP method used by XRPC: queries are GET, procedures are POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// A request ready to put on the wire.
#[derive(Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub bearer: Option<String>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// A GET request with no parameters.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            query: Vec::new(),
            bearer: None,
            body: None,
        }
    }

    /// A POST request with a JSON body.
    pub fn post(url: impl Into<String>, body: Option<Vec<u8>>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            query: Vec::new(),
            bearer: None,
            body,
        }
    }

    /// Append a query parameter.
    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// Authenticate with `Authorization: Bearer <token>`.
    pub fn bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }
}

// Bodies may carry passwords; only their size is shown.
impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("query", &self.query)
            .field("bearer", &self.bearer.as_ref().map(|_| "[REDACTED]"))
            .field("body", &self.body.as_ref().map(|b| format!("<{} bytes>", b.len())))
            .finish()
    }
}

/// Raw response: status code and body bytes.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests to the network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one request/response exchange.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_bearer_and_body() {
        let request = HttpRequest::post(
            "https://bsky.social/xrpc/com.atproto.server.createSession",
            Some(br#"{"identifier":"alice","password":"hunter2"}"#.to_vec()),
        )
        .bearer("tok123");

        let debug = format!("{:?}", request);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("tok123"));
        assert!(debug.contains("createSession"));
    }

    #[test]
    fn success_range() {
        assert!(HttpResponse { status: 200, body: vec![] }.is_success());
        assert!(HttpResponse { status: 204, body: vec![] }.is_success());
        assert!(!HttpResponse { status: 301, body: vec![] }.is_success());
        assert!(!HttpResponse { status: 401, body: vec![] }.is_success());
    }
}
