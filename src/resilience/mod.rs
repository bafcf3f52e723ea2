//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (connect + total deadline on the shared client)
//!     → On failure: classify (timeout / connect / body / other)
//!     → Caller maps the failure to a 500 response
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - No retries and no circuit breaking: the browser owns retry policy

pub mod timeouts;

pub use timeouts::{build_upstream_client, FailureKind, UpstreamFailure};
