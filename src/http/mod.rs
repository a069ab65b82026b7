//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (request id, tracing, timeout layers)
//!     → composed axum Router (one entry per resolved route)
//!     → bound action → response
//! ```

pub mod server;

pub use server::HttpServer;
