//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Forwarding path:
//!     → headers.rs (fixed upstream header set, credential injected)
//!     → upstream call
//!     → headers.rs (strip content-encoding and hop-by-hop on the way back)
//!
//! Disclosure path:
//!     → access_control.rs (bearer access key gate)
//!     → token endpoint
//! ```
//!
//! # Design Decisions
//! - The credential is server-controlled; client headers cannot substitute it
//! - Fail closed: the disclosure gate rejects anything but an exact key match

pub mod access_control;
pub mod headers;
