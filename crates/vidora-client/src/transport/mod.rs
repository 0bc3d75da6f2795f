//! Backend transports.
//!
//! The client talks to the backend through the [`Transport`] trait so tests
//! and alternative stacks can stand in for HTTP.

mod http;
mod traits;

pub use http::{HttpTransport, REQUEST_ID_HEADER};
pub use traits::{ApiRequest, ApiResponse, Method, Transport};
