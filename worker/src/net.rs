//! Network Backend
//!
//! Seam between the worker and the host network layer. Install-time
//! asset fetches and cache misses both go through this trait.

use alloc::string::String;
use core::fmt;

use appshell_http::{Request, Response};

/// Network error types.
#[derive(Debug, Clone)]
pub enum NetworkError {
    /// Network unreachable.
    NetworkUnreachable,
    /// Connection refused.
    ConnectionRefused,
    /// Connection reset.
    ConnectionReset,
    /// Connection timed out.
    TimedOut,
    /// DNS resolution failed.
    DnsError(String),
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::NetworkUnreachable => write!(f, "network unreachable"),
            NetworkError::ConnectionRefused => write!(f, "connection refused"),
            NetworkError::ConnectionReset => write!(f, "connection reset"),
            NetworkError::TimedOut => write!(f, "connection timed out"),
            NetworkError::DnsError(host) => write!(f, "dns resolution failed: {}", host),
        }
    }
}

/// Transport the worker fetches over.
pub trait NetworkBackend: Send + Sync {
    /// Perform a request against the network.
    fn fetch(&self, request: &Request) -> Result<Response, NetworkError>;
}
