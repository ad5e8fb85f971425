//! Tile fetch errors.

use thiserror::Error;

/// Why a single tile could not be fetched.
///
/// Every variant carries the index of the failing cell so a build failure
/// can name the tile that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Upstream answered with a non-success status.
    #[error("tile {index}: upstream returned HTTP {status}")]
    Status { index: usize, status: u16 },

    /// Upstream answered with a redirect, which is never followed.
    #[error("tile {index}: upstream redirected (HTTP {status})")]
    Redirect { index: usize, status: u16 },

    /// Upstream answered 2xx but not with an image.
    #[error("tile {index}: expected image content, got '{content_type}'")]
    ContentType { index: usize, content_type: String },

    /// Request did not complete in time.
    #[error("tile {index}: request timed out")]
    Timeout { index: usize },

    /// Connection, protocol or body read failure.
    #[error("tile {index}: request failed: {reason}")]
    Network { index: usize, reason: String },
}

impl FetchError {
    /// Index of the tile that failed.
    pub fn index(&self) -> usize {
        match self {
            FetchError::Status { index, .. }
            | FetchError::Redirect { index, .. }
            | FetchError::ContentType { index, .. }
            | FetchError::Timeout { index }
            | FetchError::Network { index, .. } => *index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_names_index_and_code() {
        let err = FetchError::Status {
            index: 7,
            status: 404,
        };
        assert_eq!(err.to_string(), "tile 7: upstream returned HTTP 404");
        assert_eq!(err.index(), 7);
    }

    #[test]
    fn test_content_type_display() {
        let err = FetchError::ContentType {
            index: 2,
            content_type: "text/html".to_string(),
        };
        assert!(err.to_string().contains("text/html"));
        assert_eq!(err.index(), 2);
    }

    #[test]
    fn test_index_for_every_variant() {
        let errors = [
            FetchError::Redirect {
                index: 1,
                status: 302,
            },
            FetchError::Timeout { index: 1 },
            FetchError::Network {
                index: 1,
                reason: "connection refused".to_string(),
            },
        ];
        for err in errors {
            assert_eq!(err.index(), 1);
        }
    }
}
