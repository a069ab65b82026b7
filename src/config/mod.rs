//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → read once at startup by composition and the HTTP server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; routes are composed once at startup
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, override_bind_address, ConfigError};
pub use schema::ComposerConfig;
pub use schema::ServiceConfig;
