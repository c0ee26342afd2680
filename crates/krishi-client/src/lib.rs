//! Client side of the krishi assistant.
//!
//! - [`ChatSession`]: the in-memory, single-flight conversation.
//! - [`ProxyApi`] / [`HttpProxyApi`]: transport to `krishi-server`.
//! - [`context`]: read-only weather and location lookups for the farmer's field.

pub mod api;
pub mod context;
pub mod error;
pub mod message;
pub mod session;

pub use api::{HttpProxyApi, ProxyApi};
pub use error::ClientError;
pub use message::{ChatMessage, Sender};
pub use session::{ChatSession, FALLBACK_REPLY, GREETING, IgnoreReason, SendOutcome};
