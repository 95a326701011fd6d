//! Transport layer.

pub mod http;

pub use http::{HttpTransport, SESSION_HEADER};
