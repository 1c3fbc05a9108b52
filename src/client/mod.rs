//! Client-Side Components
//!
//! Maps typed operations onto transport exchanges: one exchange per single
//! call, one long-lived exchange per subscription.

pub mod call;
pub mod error;
pub mod rpc;
pub mod subscription;

pub use call::unwrap_response;
pub use error::{ClientError, ClientResult};
pub use rpc::{KaspadClient, MempoolFilter};
pub use subscription::{Subscription, SubscriptionState};
