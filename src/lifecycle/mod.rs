//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Build client → Spawn reflector → Wait for sync → Bind → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop reflector and server → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: the listener binds only after the cache is synced
//! - No draining on shutdown; the mirror is rebuilt on the next start

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use startup::{start, wait_for_sync, Exporter, StartupError};
