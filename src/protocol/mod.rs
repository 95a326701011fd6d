//! Protocol layer: envelope validation, capability negotiation, and the
//! request dispatcher.

pub mod handler;
pub mod negotiation;
pub mod validator;

pub use handler::{DispatchReply, Dispatcher};
