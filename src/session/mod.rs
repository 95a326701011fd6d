//! Session lifecycle and the session registry.

pub mod registry;
pub mod session;

pub use registry::SessionRegistry;
pub use session::{NotificationStream, Session, SessionId, SessionState};
