//! Service side of the signoff console.
//!
//! This crate wires the workflow core to the outside world:
//! - Snapshot store (the session and collection state being served)
//! - Action queue (background worker performing committed actions)
//! - HTTP handlers (health checks, collection pages, signoff forms)

pub mod action_queue;
pub mod config;
pub mod http;
pub mod snapshots;
pub mod state;

// Re-export key types for convenience
pub use action_queue::{action_queue, run_worker, ActionQueueConfig, ActionReceiver};
pub use config::Config as ServiceConfig;
pub use snapshots::{SnapshotError, SnapshotStore};
pub use state::{State as ServiceState, StateSetupError};
