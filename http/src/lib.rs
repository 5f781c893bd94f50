//! HTTP Primitives
//!
//! Request and response types shared by the response store and the cache
//! worker. These model the subset of HTTP the worker cares about: method,
//! URL, status, headers, body, and the response kind used to decide
//! whether a response may be cached.

#![no_std]

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

/// HTTP method types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Default for Method {
    fn default() -> Self {
        Self::Get
    }
}

impl Method {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

/// HTTP response status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(pub u16);

impl Status {
    pub const OK: Status = Status(200);
    pub const CREATED: Status = Status(201);
    pub const NO_CONTENT: Status = Status(204);
    pub const MOVED_PERMANENTLY: Status = Status(301);
    pub const FOUND: Status = Status(302);
    pub const NOT_MODIFIED: Status = Status(304);
    pub const BAD_REQUEST: Status = Status(400);
    pub const UNAUTHORIZED: Status = Status(401);
    pub const FORBIDDEN: Status = Status(403);
    pub const NOT_FOUND: Status = Status(404);
    pub const INTERNAL_SERVER_ERROR: Status = Status(500);
    pub const BAD_GATEWAY: Status = Status(502);
    pub const SERVICE_UNAVAILABLE: Status = Status(503);

    /// Check if this is a success status (2xx).
    pub fn is_success(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Check if this is a redirect status (3xx).
    pub fn is_redirect(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    /// Check if this is a client error status (4xx).
    pub fn is_client_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    /// Check if this is a server error status (5xx).
    pub fn is_server_error(&self) -> bool {
        self.0 >= 500 && self.0 < 600
    }

    /// Reason phrase for this status code.
    pub fn reason(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            201 => "Created",
            204 => "No Content",
            301 => "Moved Permanently",
            302 => "Found",
            304 => "Not Modified",
            307 => "Temporary Redirect",
            308 => "Permanent Redirect",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            500 => "Internal Server Error",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Response kind, as seen by a caching layer.
///
/// Only `Basic` (same-origin) responses are eligible for caching; opaque
/// and CORS responses pass through uncached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Same-origin response with full header access.
    Basic,
    /// Cross-origin response allowed by CORS.
    Cors,
    /// Default kind for synthesized responses.
    Default,
    /// Network error response.
    Error,
    /// Cross-origin no-CORS response; status and body are hidden.
    Opaque,
    /// Opaque redirect response.
    OpaqueRedirect,
}

impl Default for ResponseKind {
    fn default() -> Self {
        Self::Default
    }
}

/// HTTP request.
#[derive(Debug, Clone)]
pub struct Request {
    /// Request URL.
    pub url: String,
    /// HTTP method.
    pub method: Method,
    /// Request headers.
    pub headers: BTreeMap<String, String>,
    /// Request body (if any).
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// Create a new request.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Create a new GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// Create a new POST request.
    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        let mut request = Self::new(Method::Post, url);
        request
            .headers
            .insert("Content-Length".to_string(), body.len().to_string());
        request.body = Some(body);
        request
    }

    /// Set a header.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }
}

/// HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    /// Response kind.
    pub kind: ResponseKind,
    /// URL the response was fetched from.
    pub url: String,
    /// Status code.
    pub status: Status,
    /// Response headers.
    pub headers: BTreeMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Create a new same-origin response with the given status.
    pub fn new(status: Status) -> Self {
        Self {
            kind: ResponseKind::Basic,
            url: String::new(),
            status,
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    /// Create a network error response.
    pub fn error() -> Self {
        Self {
            kind: ResponseKind::Error,
            url: String::new(),
            status: Status(0),
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    /// Create an opaque response; status and body are hidden.
    pub fn opaque(url: impl Into<String>) -> Self {
        Self {
            kind: ResponseKind::Opaque,
            url: url.into(),
            status: Status(0),
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    /// Set the response kind.
    pub fn with_kind(mut self, kind: ResponseKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Check if the status is a success (2xx).
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&String> {
        // Case-insensitive header lookup
        let name_lower = name.to_ascii_lowercase();
        for (key, value) in &self.headers {
            if key.to_ascii_lowercase() == name_lower {
                return Some(value);
            }
        }
        None
    }

    /// Get body as string (UTF-8).
    pub fn text(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }
}
