//! Null transport: no I/O, default replies only

use async_trait::async_trait;
use futures::StreamExt;

use super::{Exchange, OutboundSink, Transport, TransportError};

/// Transport that never touches a network.
///
/// Each exchange answers its first request with the request's zero-valued
/// reply and then ends. Subscription requests get no reply at all, so their
/// event sequence is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTransport;

#[async_trait]
impl Transport for NullTransport {
    async fn open_exchange(&self) -> Result<Exchange, TransportError> {
        let (outbound, mut requests) = OutboundSink::channel(1);

        let inbound = futures::stream::once(async move {
            requests
                .recv()
                .await
                .and_then(|frame| frame.request.default_response())
        })
        .filter_map(|reply| futures::future::ready(reply.map(Ok::<_, TransportError>)))
        .boxed();

        Ok(Exchange::new(outbound, inbound))
    }
}
