//! Transport Layer
//!
//! Abstracts the duplex channel to the node. Provides:
//! - Transport trait: opens one independent exchange per call or subscription
//! - StreamTransport: newline-delimited JSON over any duplex byte stream
//! - TcpConnector: construct-by-endpoint (host, port, TLS flag)
//! - NullTransport: answers every request with a default reply, no I/O

use std::fmt;
use std::io;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use kaspad_protocol::{KaspadRequest, KaspadResponse};
use tokio::sync::mpsc;
use tokio_util::codec::LinesCodecError;

mod null;
mod stream;
mod tcp;

pub use null::NullTransport;
pub use stream::{Connector, DuplexIo, StreamTransport, MAX_FRAME_LEN};
pub use tcp::TcpConnector;

/// Capacity of the outbound request buffer of one exchange
pub const OUTBOUND_BUFFER: usize = 16;

/// Transport trait for exchanges with the node
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a fresh duplex exchange.
    ///
    /// Exchanges are never shared: every call and every subscription gets
    /// its own, and dropping it releases the underlying channel.
    async fn open_exchange(&self) -> Result<Exchange, TransportError>;
}

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection timeout")]
    ConnectionTimeout,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Frame error: {0}")]
    Frame(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("Channel closed")]
    ChannelClosed,
}

impl From<LinesCodecError> for TransportError {
    fn from(err: LinesCodecError) -> Self {
        match err {
            LinesCodecError::Io(e) => TransportError::Io(e),
            LinesCodecError::MaxLineLengthExceeded => {
                TransportError::Frame("frame exceeds maximum length".to_string())
            }
        }
    }
}

/// Inbound half of an exchange
pub type InboundStream = BoxStream<'static, Result<KaspadResponse, TransportError>>;

/// A queued request together with its JSON encoding
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundFrame {
    pub request: KaspadRequest,
    /// Single-line JSON text of `request`, without the trailing newline
    pub line: String,
}

/// Outbound half of an exchange
///
/// Dropping the last clone signals that no more requests follow.
#[derive(Debug, Clone)]
pub struct OutboundSink {
    sender: mpsc::Sender<OutboundFrame>,
}

impl OutboundSink {
    /// Create a sink and the receiver a transport drains it from
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<OutboundFrame>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Encode a request and queue it for sending.
    ///
    /// Encoding happens here so a request that cannot be serialized is
    /// reported to the caller before anything reaches the transport.
    pub async fn send(&self, request: KaspadRequest) -> Result<(), TransportError> {
        let line = serde_json::to_string(&request)?;
        self.sender
            .send(OutboundFrame { request, line })
            .await
            .map_err(|_| TransportError::ChannelClosed)
    }

    /// True once the transport side stopped accepting requests
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// One duplex session on the transport
pub struct Exchange {
    outbound: Option<OutboundSink>,
    inbound: InboundStream,
}

impl Exchange {
    pub fn new(outbound: OutboundSink, inbound: InboundStream) -> Self {
        Self {
            outbound: Some(outbound),
            inbound,
        }
    }

    /// Send a request on this exchange
    pub async fn send(&self, request: KaspadRequest) -> Result<(), TransportError> {
        match &self.outbound {
            Some(outbound) => outbound.send(request).await,
            None => Err(TransportError::ChannelClosed),
        }
    }

    /// Signal that no more requests follow; replies can still be read
    pub fn close_outbound(&mut self) {
        self.outbound = None;
    }

    /// Wait for the next inbound envelope
    pub async fn next(&mut self) -> Option<Result<KaspadResponse, TransportError>> {
        self.inbound.next().await
    }

    /// Poll for the next inbound envelope
    pub fn poll_next(
        &mut self,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<KaspadResponse, TransportError>>> {
        self.inbound.poll_next_unpin(cx)
    }
}

impl fmt::Debug for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exchange")
            .field("outbound_open", &self.outbound.is_some())
            .finish_non_exhaustive()
    }
}
