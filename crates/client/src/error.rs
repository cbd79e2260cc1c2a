//! Client error taxonomy.
//!
//! Four failure classes cover everything this client can hit:
//!
//! | Variant | Meaning | Policy |
//! |---------|---------|--------|
//! | `Transport` | network unreachable, timeout, connection failure | metrics path: absorbed with retained values; query path: surfaced |
//! | `Status` | service answered with a non-2xx status | same as `Transport` |
//! | `Malformed` | response body missing or mistyped expected fields | same as `Transport` |
//! | `Storage` | durable session storage inaccessible | degrade to ephemeral session, logged |
//!
//! Certificate malformation is deliberately *not* an error variant: it
//! is a per-result trust verdict (see the `dacert` module) and never a
//! page-level failure.

use thiserror::Error;

/// Error type for all client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network-level failure: unreachable host, timeout, dropped connection.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered, but with a non-2xx status.
    #[error("service returned status {0}")]
    Status(u16),

    /// The response body could not be decoded into the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Durable session storage is inaccessible.
    #[error("session storage unavailable: {0}")]
    Storage(#[from] std::io::Error),
}

impl ClientError {
    /// `true` for failures of the remote services (as opposed to local
    /// storage), i.e. everything the retain-previous-value policy applies to.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            ClientError::Transport(_) | ClientError::Status(_) | ClientError::Malformed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = ClientError::Status(503);
        assert_eq!(err.to_string(), "service returned status 503");
    }

    #[test]
    fn test_io_error_converts_to_storage() {
        // the session store's degraded path relies on this conversion
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ClientError = io.into();
        assert!(matches!(err, ClientError::Storage(_)));
        assert!(err.to_string().starts_with("session storage unavailable"));
    }

    #[test]
    fn test_is_remote() {
        assert!(ClientError::Status(500).is_remote());
        assert!(ClientError::Malformed("missing field".to_string()).is_remote());
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!ClientError::Storage(io).is_remote());
    }
}
