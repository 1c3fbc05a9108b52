//! kaspad client - typed async access to a kaspad node's RPC interface
//!
//! This crate wraps the node's message-oriented RPC protocol in typed
//! operations. Every call opens its own exchange on a [`Transport`], so one
//! client handle can be shared freely across tasks. Notification kinds are
//! exposed as [`Subscription`] streams.

pub mod client;
pub mod config;
pub mod mock;
pub mod transport;

pub use kaspad_protocol as protocol;

pub use client::{
    ClientError, ClientResult, KaspadClient, MempoolFilter, Subscription, SubscriptionState,
};
pub use config::{ClientConfig, ConfigError, EndpointConfig, EndpointOverrides};
pub use transport::{
    Exchange, NullTransport, StreamTransport, TcpConnector, Transport, TransportError,
};
