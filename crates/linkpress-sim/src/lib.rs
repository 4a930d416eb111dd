//! Logical-time collaborators for linkpress devices.
//!
//! Provides the out-of-device pieces a link needs to run without real I/O:
//! a single-threaded event scheduler, an in-memory point-to-point channel
//! with propagation delay, and deterministic error models. Used by the
//! integration tests and the `linkpress simulate` CLI.

pub mod channel;
pub mod error_model;
pub mod scheduler;

pub use channel::PointToPointChannel;
pub use error_model::{ListErrorModel, NoErrorModel};
pub use scheduler::EventScheduler;
