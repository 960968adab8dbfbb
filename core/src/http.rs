//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. The core builds `HttpRequest`
//! values and parses `HttpResponse` values without ever touching the
//! network — the caller (host) executes the actual I/O. This keeps the
//! client and the query cache deterministic and easy to test.

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// An HTTP request described as plain data.
///
/// Built by `TodoClient::build_*` methods or handed out by the query cache.
/// The caller executes it against the network and feeds the resulting
/// `HttpResponse` back in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: String) -> Self {
        Self::bodyless(HttpMethod::Get, url)
    }

    pub fn delete(url: String) -> Self {
        Self::bodyless(HttpMethod::Delete, url)
    }

    /// POST with a JSON body; sets the content-type header.
    pub fn post(url: String, body: String) -> Self {
        Self::with_json_body(HttpMethod::Post, url, body)
    }

    /// PUT with a JSON body; sets the content-type header.
    pub fn put(url: String, body: String) -> Self {
        Self::with_json_body(HttpMethod::Put, url, body)
    }

    fn bodyless(method: HttpMethod, url: String) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    fn with_json_body(method: HttpMethod, url: String, body: String) -> Self {
        Self {
            method,
            url,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        }
    }
}

/// An HTTP response described as plain data.
///
/// Constructed by the caller after executing an `HttpRequest`, then passed
/// back to the core for status interpretation and deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
