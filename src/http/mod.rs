//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, routes per trust mode)
//!     → request.rs (request ID, InboundRequest, UpstreamTarget, body check)
//!     → forwarder.rs (upstream call with injected credential)
//!     → response.rs (JSON-or-raw body, filtered headers)
//!     → Send to client
//!
//! Failures at any step → error.rs ({error, details} with 400/413/500)
//! ```

pub mod disclosure;
pub mod error;
pub mod forwarder;
pub mod request;
pub mod response;
pub mod server;

pub use error::ForwardError;
pub use forwarder::Forwarder;
pub use request::{InboundRequest, UpstreamTarget, X_REQUEST_ID};
pub use response::{OutboundResponse, ResponseBody};
pub use server::HttpServer;
