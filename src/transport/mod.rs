//! HTTP transport shared by every provider call.

mod http;

pub use http::{HttpTransport, TransportError};
