//! Subscriptions
//!
//! A subscription owns one streaming exchange. The node's first reply is the
//! acknowledgment of the notify request and is always discarded, whatever
//! it carries. Every reply after it is a notification, error-checked,
//! extracted into the caller's event type and yielded in arrival order.
//!
//! ```text
//! AwaitingAck ──ack──▶ Emitting ──cancel()──▶ Cancelled
//!      │                  │
//!      └──error / end─────┴──────────────────▶ Closed
//! ```

use std::fmt;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use futures::stream::{FusedStream, Stream};
use kaspad_protocol::KaspadResponse;

use crate::transport::Exchange;

use super::error::ClientResult;

/// Lifecycle of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Notify request sent, acknowledgment not yet seen
    AwaitingAck,
    /// Acknowledged; notifications are being yielded
    Emitting,
    /// Released by the caller
    Cancelled,
    /// Ended by the node, by a transport failure or by an error reply
    Closed,
}

/// Stream of events of one notification kind.
///
/// Dropping the subscription, or calling [`Subscription::cancel`], releases
/// the underlying exchange.
pub struct Subscription<T> {
    kind: &'static str,
    state: SubscriptionState,
    exchange: Option<Exchange>,
    extract: fn(KaspadResponse) -> ClientResult<T>,
}

impl<T> Subscription<T> {
    pub(crate) fn new(
        kind: &'static str,
        exchange: Exchange,
        extract: fn(KaspadResponse) -> ClientResult<T>,
    ) -> Self {
        Self {
            kind,
            state: SubscriptionState::AwaitingAck,
            exchange: Some(exchange),
            extract,
        }
    }

    /// Wire tag of the notify request that opened this subscription
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn state(&self) -> SubscriptionState {
        self.state
    }

    /// True until the subscription is cancelled or closed
    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            SubscriptionState::AwaitingAck | SubscriptionState::Emitting
        )
    }

    /// Stop receiving events and release the exchange.
    ///
    /// Idempotent. Has no effect on a subscription that already closed.
    pub fn cancel(&mut self) {
        if self.exchange.take().is_some() {
            tracing::debug!(kind = self.kind, "subscription cancelled");
        }
        if self.is_active() {
            self.state = SubscriptionState::Cancelled;
        }
    }

    fn close(&mut self) {
        self.exchange = None;
        self.state = SubscriptionState::Closed;
    }
}

impl<T> Stream for Subscription<T> {
    type Item = ClientResult<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            let Some(exchange) = this.exchange.as_mut() else {
                return Poll::Ready(None);
            };

            let response = match ready!(exchange.poll_next(cx)) {
                Some(Ok(response)) => response,
                Some(Err(e)) => {
                    tracing::warn!(kind = this.kind, error = %e, "subscription transport failed");
                    this.close();
                    return Poll::Ready(Some(Err(e.into())));
                }
                None => {
                    tracing::debug!(kind = this.kind, "subscription ended by node");
                    this.close();
                    return Poll::Ready(None);
                }
            };

            if this.state == SubscriptionState::AwaitingAck {
                if response.error().is_err() {
                    tracing::warn!(
                        kind = this.kind,
                        error = %response.error(),
                        "acknowledgment carried an error"
                    );
                }
                tracing::debug!(
                    kind = this.kind,
                    ack = response.kind(),
                    "subscription acknowledged"
                );
                this.state = SubscriptionState::Emitting;
                continue;
            }

            return match (this.extract)(response) {
                Ok(event) => Poll::Ready(Some(Ok(event))),
                Err(e) => {
                    tracing::warn!(kind = this.kind, error = %e, "subscription terminated");
                    this.close();
                    Poll::Ready(Some(Err(e)))
                }
            };
        }
    }
}

impl<T> FusedStream for Subscription<T> {
    fn is_terminated(&self) -> bool {
        self.exchange.is_none()
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::call::{streaming_call, unwrap_response};
    use crate::mock::{MockFailure, MockNode};
    use futures::StreamExt;
    use kaspad_protocol::{
        KaspadRequest, NotifyVirtualDaaScoreChangedRequest, NotifyVirtualDaaScoreChangedResponse,
        RpcError, VirtualDaaScoreChangedNotification,
    };
    use std::marker::PhantomPinned;

    const KIND: &str = "notifyVirtualDaaScoreChangedRequest";

    fn ack() -> KaspadResponse {
        KaspadResponse::from(NotifyVirtualDaaScoreChangedResponse::default())
    }

    fn event(score: u64) -> KaspadResponse {
        KaspadResponse::from(VirtualDaaScoreChangedNotification {
            virtual_daa_score: score,
            error: RpcError::default(),
        })
    }

    fn daa_score(response: KaspadResponse) -> ClientResult<u64> {
        unwrap_response(response, |n: VirtualDaaScoreChangedNotification| n.virtual_daa_score)
    }

    async fn subscribe(node: &MockNode) -> Subscription<u64> {
        let request =
            KaspadRequest::NotifyVirtualDaaScoreChanged(NotifyVirtualDaaScoreChangedRequest {});
        let exchange = streaming_call(node, request).await.unwrap();
        Subscription::new(KIND, exchange, daa_score)
    }

    fn assert_unpin<S: Unpin>() {}

    #[test]
    fn test_subscription_is_unpin_for_any_event_type() {
        assert_unpin::<Subscription<u64>>();
        assert_unpin::<Subscription<PhantomPinned>>();
    }

    #[tokio::test]
    async fn test_ack_is_dropped_and_events_follow_in_order() {
        let node = MockNode::new();
        node.script(KIND, vec![ack(), event(1), event(2), event(3)]);

        let mut subscription = subscribe(&node).await;
        assert_eq!(subscription.state(), SubscriptionState::AwaitingAck);

        let mut scores = Vec::new();
        while let Some(score) = subscription.next().await {
            scores.push(score.unwrap());
        }

        assert_eq!(scores, vec![1, 2, 3]);
        assert_eq!(subscription.state(), SubscriptionState::Closed);
        assert!(subscription.is_terminated());
    }

    #[tokio::test]
    async fn test_ack_of_any_variant_is_dropped() {
        let node = MockNode::new();
        node.script(KIND, vec![event(100), event(1)]);

        let mut subscription = subscribe(&node).await;
        assert_eq!(subscription.next().await.unwrap().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cancel_releases_exchange_and_is_idempotent() {
        let node = MockNode::new();
        node.script(KIND, vec![ack(), event(1), event(2)]);
        node.hold_open(KIND);

        let mut subscription = subscribe(&node).await;
        assert_eq!(subscription.next().await.unwrap().unwrap(), 1);
        assert!(!node.exchanges()[0].is_closed());

        subscription.cancel();
        subscription.cancel();

        assert_eq!(subscription.state(), SubscriptionState::Cancelled);
        assert!(node.exchanges()[0].is_closed());
        assert!(subscription.next().await.is_none());
    }

    #[tokio::test]
    async fn test_ack_with_error_is_still_dropped() {
        let node = MockNode::new();
        node.inject(KIND, MockFailure::remote("notifications disabled"));

        let mut subscription = subscribe(&node).await;

        assert!(subscription.next().await.is_none());
        assert_eq!(subscription.state(), SubscriptionState::Closed);
    }

    #[tokio::test]
    async fn test_error_event_ends_stream() {
        let node = MockNode::new();
        let failing = KaspadResponse::from(VirtualDaaScoreChangedNotification {
            virtual_daa_score: 0,
            error: RpcError::new("node shutting down"),
        });
        node.script(KIND, vec![ack(), event(1), failing, event(2)]);

        let mut subscription = subscribe(&node).await;
        assert_eq!(subscription.next().await.unwrap().unwrap(), 1);

        let err = subscription.next().await.unwrap().unwrap_err();
        assert_eq!(err.message(), Some("node shutting down"));
        assert!(subscription.next().await.is_none());
        assert!(node.exchanges()[0].is_closed());
    }

    #[tokio::test]
    async fn test_cancel_after_close_keeps_closed_state() {
        let node = MockNode::new();
        node.script(KIND, vec![ack()]);

        let mut subscription = subscribe(&node).await;
        assert!(subscription.next().await.is_none());

        subscription.cancel();
        assert_eq!(subscription.state(), SubscriptionState::Closed);
    }
}
