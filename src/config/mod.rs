//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults
//!     → optional TOML file (loader.rs)
//!     → environment overrides: API_TOKEN, BASE_URL, ... (loader.rs, env.rs)
//!     → validation.rs (semantic checks, all errors reported)
//!     → ForwarderConfig (validated, immutable)
//!     → shared via Arc with the forwarder and handlers
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup and never mutated afterward
//! - The credential is wrapped so it cannot leak through `Debug`
//! - A missing credential or base URL is fatal before the listener binds

pub mod credential;
pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use credential::Credential;
pub use env::{ReadEnv, SystemEnv};
pub use loader::{load_config, ConfigError};
pub use schema::{
    DisclosureConfig, ForwarderConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    SecurityConfig, TimeoutConfig, TrustMode, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
