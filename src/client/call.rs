//! Exchange Patterns
//!
//! The two shapes every operation reduces to:
//! - single call: open an exchange, send one request, take the first reply,
//!   release the exchange
//! - streaming call: open an exchange, send one request, keep the exchange
//!   for the replies that follow

use kaspad_protocol::{KaspadRequest, KaspadResponse, ResponseMessage};

use crate::transport::{Exchange, Transport, TransportError};

use super::error::{ClientError, ClientResult};

/// Send one request on a fresh exchange and return the first reply.
///
/// The outbound side is closed right after the request, since it is the
/// only outbound item. The exchange is dropped before returning, whatever
/// the outcome, which closes the inbound side too. An exchange that ends without a
/// reply is reported as [`TransportError::ChannelClosed`].
pub(crate) async fn single_call(
    transport: &dyn Transport,
    request: KaspadRequest,
) -> ClientResult<KaspadResponse> {
    let kind = request.kind();
    let mut exchange = transport.open_exchange().await?;
    exchange.send(request).await?;
    exchange.close_outbound();

    let reply = exchange.next().await;
    drop(exchange);
    tracing::debug!(kind, "exchange closed");

    match reply {
        Some(Ok(response)) => Ok(response),
        Some(Err(e)) => Err(e.into()),
        None => Err(TransportError::ChannelClosed.into()),
    }
}

/// Send one request on a fresh exchange and hand the exchange back with its
/// outbound side still open.
pub(crate) async fn streaming_call(
    transport: &dyn Transport,
    request: KaspadRequest,
) -> ClientResult<Exchange> {
    let kind = request.kind();
    let exchange = transport.open_exchange().await?;
    exchange.send(request).await?;
    tracing::debug!(kind, "streaming exchange opened");
    Ok(exchange)
}

/// Pull the expected message out of a reply and project its payload.
///
/// A reply of another variant is an [`ClientError::UnexpectedResponse`]. A
/// reply whose error record is non-empty becomes [`ClientError::Remote`]
/// carrying the node's message verbatim, and the payload is discarded.
pub fn unwrap_response<M, T>(
    response: KaspadResponse,
    payload: impl FnOnce(M) -> T,
) -> ClientResult<T>
where
    M: ResponseMessage,
{
    let message = M::from_response(response).map_err(|other| ClientError::UnexpectedResponse {
        expected: M::KIND,
        actual: other.kind(),
    })?;

    if message.error().is_err() {
        return Err(ClientError::Remote(message.error().clone()));
    }

    Ok(payload(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockFailure, MockNode};
    use crate::transport::{OutboundSink, OUTBOUND_BUFFER};
    use async_trait::async_trait;
    use futures::StreamExt;
    use kaspad_protocol::{
        GetCurrentNetworkRequest, GetCurrentNetworkResponse, GetInfoResponse,
        GetVirtualSelectedParentBlueScoreResponse, NotifyBlockAddedRequest, RpcError,
    };
    use std::time::Duration;

    fn network_request() -> KaspadRequest {
        KaspadRequest::GetCurrentNetwork(GetCurrentNetworkRequest {})
    }

    /// Replies only after the client has finished sending
    struct ReplyAfterEndOfRequests;

    #[async_trait]
    impl Transport for ReplyAfterEndOfRequests {
        async fn open_exchange(&self) -> Result<Exchange, TransportError> {
            let (outbound, mut requests) = OutboundSink::channel(OUTBOUND_BUFFER);

            let inbound = futures::stream::once(async move {
                let mut received = Vec::new();
                while let Some(frame) = requests.recv().await {
                    received.push(frame.request);
                }
                match received.as_slice() {
                    [request] => request.default_response().ok_or(TransportError::ChannelClosed),
                    _ => Err(TransportError::ChannelClosed),
                }
            })
            .boxed();

            Ok(Exchange::new(outbound, inbound))
        }
    }

    #[test]
    fn test_unwrap_response_projects_payload() {
        let response = KaspadResponse::from(GetVirtualSelectedParentBlueScoreResponse {
            blue_score: 42,
            error: RpcError::default(),
        });

        let score =
            unwrap_response(response, |m: GetVirtualSelectedParentBlueScoreResponse| m.blue_score)
                .unwrap();
        assert_eq!(score, 42);
    }

    #[test]
    fn test_unwrap_response_remote_error_discards_payload() {
        let response = KaspadResponse::from(GetVirtualSelectedParentBlueScoreResponse {
            blue_score: 42,
            error: RpcError::new("node is syncing"),
        });

        let err =
            unwrap_response(response, |m: GetVirtualSelectedParentBlueScoreResponse| m.blue_score)
                .unwrap_err();
        assert_eq!(err.message(), Some("node is syncing"));
    }

    #[test]
    fn test_unwrap_response_variant_mismatch() {
        let response = KaspadResponse::from(GetInfoResponse::default());

        let err = unwrap_response(response, |m: GetCurrentNetworkResponse| m.current_network)
            .unwrap_err();
        match err {
            ClientError::UnexpectedResponse { expected, actual } => {
                assert_eq!(expected, "getCurrentNetworkResponse");
                assert_eq!(actual, "getInfoResponse");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_single_call_closes_exchange() {
        let node = MockNode::new();

        let reply = single_call(&node, network_request()).await.unwrap();
        assert_eq!(reply.kind(), "getCurrentNetworkResponse");

        let exchanges = node.exchanges();
        assert_eq!(exchanges.len(), 1);
        assert!(exchanges[0].is_closed());
        assert_eq!(exchanges[0].requests(), vec![network_request()]);
    }

    #[tokio::test]
    async fn test_single_call_ends_outbound_before_waiting_for_reply() {
        let call = single_call(&ReplyAfterEndOfRequests, network_request());

        let reply = tokio::time::timeout(Duration::from_secs(2), call)
            .await
            .expect("single call kept its outbound side open")
            .unwrap();
        assert_eq!(reply.kind(), "getCurrentNetworkResponse");
    }

    #[tokio::test]
    async fn test_single_call_without_reply_is_channel_closed() {
        let node = MockNode::new();
        node.inject("getCurrentNetworkRequest", MockFailure::DropExchange);

        let err = single_call(&node, network_request()).await.unwrap_err();
        assert!(err.is_channel_closed());
    }

    #[tokio::test]
    async fn test_streaming_call_keeps_exchange_open() {
        let node = MockNode::new();
        node.hold_open("notifyBlockAddedRequest");

        let request = KaspadRequest::NotifyBlockAdded(NotifyBlockAddedRequest {});
        let mut exchange = streaming_call(&node, request).await.unwrap();

        assert!(matches!(exchange.next().await, Some(Ok(KaspadResponse::NotifyBlockAdded(_)))));
        assert!(!node.exchanges()[0].is_closed());

        drop(exchange);
        assert!(node.exchanges()[0].is_closed());
    }
}
