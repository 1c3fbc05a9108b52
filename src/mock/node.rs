//! Mock Node Implementation
//!
//! In-process node that answers exchanges from per-kind scripts.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures::StreamExt;
use kaspad_protocol::{KaspadRequest, KaspadResponse, RpcError};
use tokio::sync::mpsc;

use crate::transport::{
    Exchange, OutboundFrame, OutboundSink, Transport, TransportError, OUTBOUND_BUFFER,
};

use super::failure::{FailureConfig, FailureInjector, MockFailure};

/// Replies for one request kind
#[derive(Debug, Clone, Default)]
struct Script {
    replies: Vec<KaspadResponse>,
    /// Keep the exchange alive once the replies are drained
    hold_open: bool,
}

#[derive(Debug, Default)]
struct NodeState {
    scripts: HashMap<&'static str, Script>,
    failures: FailureInjector,
    refuse_connections: bool,
    exchanges: Vec<ExchangeLog>,
}

/// Configurable mock node for testing
///
/// Clones share state, so a test can keep a handle for inspection while the
/// client owns another.
#[derive(Debug, Clone, Default)]
pub struct MockNode {
    state: Arc<Mutex<NodeState>>,
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, NodeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reply to every exchange of `kind` with these envelopes, in order
    pub fn script(&self, kind: &'static str, replies: Vec<KaspadResponse>) {
        self.lock().scripts.entry(kind).or_default().replies = replies;
    }

    /// Keep exchanges of `kind` open after their replies are drained
    pub fn hold_open(&self, kind: &'static str) {
        self.lock().scripts.entry(kind).or_default().hold_open = true;
    }

    /// Make every exchange of `kind` fail
    pub fn inject(&self, kind: &'static str, failure: MockFailure) {
        self.lock().failures.inject(kind, FailureConfig::always(failure));
    }

    /// Make the next `count` exchanges of `kind` fail
    pub fn inject_times(&self, kind: &'static str, failure: MockFailure, count: u32) {
        self.lock()
            .failures
            .inject(kind, FailureConfig::always(failure).with_fail_count(count));
    }

    /// Clear all failure injections
    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Refuse (or accept again) every new exchange
    pub fn refuse_connections(&self, refuse: bool) {
        self.lock().refuse_connections = refuse;
    }

    /// Every exchange opened so far, oldest first
    pub fn exchanges(&self) -> Vec<ExchangeLog> {
        self.lock().exchanges.clone()
    }

    /// Most recently opened exchange
    pub fn last_exchange(&self) -> Option<ExchangeLog> {
        self.lock().exchanges.last().cloned()
    }

    /// Number of exchanges not yet closed
    pub fn open_exchanges(&self) -> usize {
        self.lock().exchanges.iter().filter(|log| !log.is_closed()).count()
    }

    /// Replies for one request, and whether to hold the exchange open after them
    fn plan(&self, request: &KaspadRequest) -> (VecDeque<KaspadResponse>, bool) {
        let kind = request.kind();
        let mut state = self.lock();

        if let Some(failure) = state.failures.check(kind) {
            let replies = match failure {
                MockFailure::Remote(message) => default_reply(request)
                    .map(|reply| reply.with_error(RpcError::new(message.clone())))
                    .into_iter()
                    .collect(),
                MockFailure::DropExchange => VecDeque::new(),
            };
            return (replies, false);
        }

        match state.scripts.get(kind) {
            Some(script) if !script.replies.is_empty() => {
                (script.replies.iter().cloned().collect(), script.hold_open)
            }
            Some(script) => (default_reply(request).into_iter().collect(), script.hold_open),
            None => (default_reply(request).into_iter().collect(), false),
        }
    }
}

fn default_reply(request: &KaspadRequest) -> Option<KaspadResponse> {
    request.default_response().or_else(|| request.subscription_ack())
}

#[async_trait]
impl Transport for MockNode {
    async fn open_exchange(&self) -> Result<Exchange, TransportError> {
        let log = {
            let mut state = self.lock();
            if state.refuse_connections {
                return Err(TransportError::ConnectionFailed(
                    "mock node refused connection".to_string(),
                ));
            }
            let log = ExchangeLog::default();
            state.exchanges.push(log.clone());
            log
        };

        let (outbound, requests) = OutboundSink::channel(OUTBOUND_BUFFER);
        let session = Session {
            node: self.clone(),
            requests,
            pending: None,
            hold_open: false,
            _guard: CloseGuard(log.clone()),
            log,
        };

        let inbound = futures::stream::unfold(session, |mut session| async move {
            if session.pending.is_none() {
                let Some(OutboundFrame { request, .. }) = session.requests.recv().await else {
                    return None;
                };
                let (replies, hold_open) = session.node.plan(&request);
                session.log.record(request);
                session.pending = Some(replies);
                session.hold_open = hold_open;
            }

            match session.pending.as_mut().and_then(VecDeque::pop_front) {
                Some(reply) => Some((Ok::<_, TransportError>(reply), session)),
                None if session.hold_open => {
                    futures::future::pending::<()>().await;
                    None
                }
                None => None,
            }
        })
        .boxed();

        Ok(Exchange::new(outbound, inbound))
    }
}

/// Server side of one exchange
struct Session {
    node: MockNode,
    requests: mpsc::Receiver<OutboundFrame>,
    pending: Option<VecDeque<KaspadResponse>>,
    hold_open: bool,
    log: ExchangeLog,
    _guard: CloseGuard,
}

/// Marks the exchange closed once the server side is released
struct CloseGuard(ExchangeLog);

impl Drop for CloseGuard {
    fn drop(&mut self) {
        self.0.lock().closed = true;
    }
}

#[derive(Debug, Default)]
struct ExchangeRecord {
    requests: Vec<KaspadRequest>,
    closed: bool,
}

/// What one exchange saw
#[derive(Debug, Clone, Default)]
pub struct ExchangeLog {
    record: Arc<Mutex<ExchangeRecord>>,
}

impl ExchangeLog {
    fn lock(&self) -> MutexGuard<'_, ExchangeRecord> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, request: KaspadRequest) {
        self.lock().requests.push(request);
    }

    /// Requests received on this exchange
    pub fn requests(&self) -> Vec<KaspadRequest> {
        self.lock().requests.clone()
    }

    /// True once the client released the exchange or the node ended it
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}
