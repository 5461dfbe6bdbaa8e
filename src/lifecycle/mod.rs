//! Top-level checkpoint and restore operations.
//! Each call is self-contained: facts and engine configuration are derived afresh.

pub mod checkpoint;
pub mod restore;

pub use checkpoint::{checkpoint, checkpoint_with_facts, CheckpointOutcome, CheckpointRequest};
pub use restore::{
    Recreation, RestoreManager, RestoreReport, RestoreRequest, RestoreStage, Verification,
};
