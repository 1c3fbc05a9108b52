//! Mock Node Implementation
//!
//! An in-process stand-in for a kaspad node, used to exercise the client
//! without a network.
//!
//! # Behavior
//!
//! - Each request kind replies with a script of envelopes, or with the
//!   request's default reply when unscripted
//! - Subscription kinds can be held open after their script drains
//! - Failures can be injected per kind (remote error, dropped exchange)
//! - Every exchange is logged with the requests it carried and whether it
//!   has been closed

mod failure;
mod node;

pub use failure::{FailureConfig, FailureInjector, MockFailure};
pub use node::{ExchangeLog, MockNode};
