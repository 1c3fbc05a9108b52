//! Client errors

use kaspad_protocol::RpcError;

use crate::transport::TransportError;

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The node answered with a non-empty error record
    #[error("{0}")]
    Remote(RpcError),

    /// The exchange failed, ended early or could not be opened
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The reply's variant does not belong to the request that was sent
    #[error("Unexpected response: expected {expected}, got {actual}")]
    UnexpectedResponse {
        expected: &'static str,
        actual: &'static str,
    },
}

impl ClientError {
    /// The node's error record, if this is a remote error
    pub fn rpc_error(&self) -> Option<&RpcError> {
        match self {
            ClientError::Remote(error) => Some(error),
            _ => None,
        }
    }

    /// The node's diagnostic text, verbatim, if this is a remote error
    pub fn message(&self) -> Option<&str> {
        self.rpc_error().map(RpcError::message)
    }

    /// True when the exchange ended before producing the expected reply
    pub fn is_channel_closed(&self) -> bool {
        matches!(self, ClientError::Transport(TransportError::ChannelClosed))
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
