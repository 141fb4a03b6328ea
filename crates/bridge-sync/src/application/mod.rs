//! # Application Layer
//!
//! Services composed from the algorithms and the ports.

pub mod approval;
pub mod reconciler;
pub mod relay;

pub use approval::{
    approve_lock, approve_root, approve_snapshot, RootApproval, LOCK_BRIDGE_OPERATION,
    UPDATE_ROOT_OPERATION,
};
pub use reconciler::{build_snapshot, build_swap_snapshot, SnapshotReconciler};
pub use relay::{backoff_delay, RelayLoop, TickReport};
