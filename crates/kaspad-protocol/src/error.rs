//! Error record embedded in every response message.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error record carried inside a response message.
///
/// An empty `message` means the call succeeded, even when every other field
/// of the surrounding message is zero-valued.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    /// Diagnostic text supplied by the node.
    #[serde(default)]
    pub message: String,
}

impl RpcError {
    /// Create an error record with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// True when the record signals a failure.
    pub fn is_err(&self) -> bool {
        !self.message.is_empty()
    }

    /// The node's diagnostic text, verbatim.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RpcError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_message_is_success() {
        assert!(!RpcError::default().is_err());
        assert!(RpcError::new("boom").is_err());
    }

    #[test]
    fn test_display_is_verbatim() {
        let err = RpcError::new("Transaction 1a2b not found");
        assert_eq!(err.to_string(), "Transaction 1a2b not found");
        assert_eq!(err.message(), "Transaction 1a2b not found");
    }

    #[test]
    fn test_missing_message_parses_as_success() {
        let err: RpcError = serde_json::from_str("{}").unwrap();
        assert!(!err.is_err());
    }
}
