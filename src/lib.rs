//! HTTP forwarding proxy that injects a server-held bearer credential.
//!
//! Requests under the route prefix (default `/proxy`) are re-targeted at a
//! fixed upstream base URL; the response status, body and filtered headers
//! are relayed back. The browser never sees the credential unless the
//! instance runs in token disclosure mode.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;

pub use config::schema::ForwarderConfig;
pub use http::{Forwarder, HttpServer};
pub use lifecycle::Shutdown;
