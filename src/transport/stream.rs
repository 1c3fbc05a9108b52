//! Stream transport: newline-delimited JSON envelopes over a duplex byte stream.

use std::future::Future;
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use kaspad_protocol::KaspadResponse;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};

use super::{Exchange, OutboundSink, Transport, TransportError, OUTBOUND_BUFFER};

/// Largest inbound frame accepted, in bytes (blocks with transactions can be large)
pub const MAX_FRAME_LEN: usize = 32 * 1024 * 1024;

/// Any bidirectional byte stream an exchange can run over
pub trait DuplexIo: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> DuplexIo for T {}

/// Opens the byte stream backing one exchange
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn DuplexIo>, TransportError>;
}

/// A preconfigured channel: any closure yielding a fresh duplex stream
#[async_trait]
impl<F, Fut, S> Connector for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = io::Result<S>> + Send + 'static,
    S: DuplexIo + 'static,
{
    async fn connect(&self) -> Result<Box<dyn DuplexIo>, TransportError> {
        let io = (self)().await?;
        Ok(Box::new(io))
    }
}

/// Transport that opens one connection per exchange and frames each
/// envelope as a single JSON line.
pub struct StreamTransport {
    connector: Arc<dyn Connector>,
    max_frame_len: usize,
}

impl StreamTransport {
    /// Create a transport over the given connector
    pub fn new(connector: impl Connector + 'static) -> Self {
        Self {
            connector: Arc::new(connector),
            max_frame_len: MAX_FRAME_LEN,
        }
    }

    /// Override the largest accepted inbound frame
    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }
}

#[async_trait]
impl Transport for StreamTransport {
    async fn open_exchange(&self) -> Result<Exchange, TransportError> {
        let io = self.connector.connect().await?;
        let (reader, writer) = tokio::io::split(io);

        let (outbound, mut requests) = OutboundSink::channel(OUTBOUND_BUFFER);
        let mut frames = FramedWrite::new(writer, LinesCodec::new());

        // The writer half lives until the outbound sink is dropped.
        tokio::spawn(async move {
            while let Some(frame) = requests.recv().await {
                let kind = frame.request.kind();
                if let Err(e) = frames.send(frame.line).await {
                    tracing::warn!(kind, error = %e, "failed to write request frame");
                    break;
                }
            }
            if let Err(e) = SinkExt::<String>::close(&mut frames).await {
                tracing::debug!(error = %e, "write half already closed");
            }
        });

        let inbound = FramedRead::new(reader, LinesCodec::new_with_max_length(self.max_frame_len))
            .map(decode_frame)
            .boxed();

        tracing::debug!("exchange opened");
        Ok(Exchange::new(outbound, inbound))
    }
}

fn decode_frame(frame: Result<String, LinesCodecError>) -> Result<KaspadResponse, TransportError> {
    let line = frame?;
    Ok(serde_json::from_str(&line)?)
}
