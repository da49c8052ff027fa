//! Reconciliation services.

mod ensurer;
mod queue;
mod reconciler;

pub use ensurer::ConnectionEnsurer;
pub use queue::PassQueue;
pub use reconciler::{Reconciler, SyncReport};
