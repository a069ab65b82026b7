//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Compose factories → Register routes → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Trigger broadcast → Server stops accepting → Drain → Exit
//!
//! Signals (signals.rs):
//!     Ctrl+C or broadcast → graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: a composition error means the listener is never bound
//! - No partial route sets are ever served

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{startup, Started};
