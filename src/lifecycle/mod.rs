//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (supervisor.rs):
//!     Build router → Start http listener → Discover TLS → Start https listener
//!
//! Shutdown (shutdown.rs):
//!     SIGINT/SIGTERM → broadcast → each listener drains → terminal signal
//!     → supervisor returns once every started listener reported
//! ```
//!
//! # Design Decisions
//! - A listener failure is logged, never retried
//! - Listener outcomes travel over a channel, never as panics across tasks

pub mod shutdown;
pub mod supervisor;

pub use shutdown::Shutdown;
pub use supervisor::{ListenerState, Supervisor, SupervisorReport};
