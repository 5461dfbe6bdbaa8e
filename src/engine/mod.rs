pub mod config;
pub mod criu;
pub mod mounts;

use config::EngineConfig;
use std::future::Future;
use std::pin::Pin;

/// A failed engine call, optionally carrying the engine's own log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
    pub log: Option<String>,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            log: None,
        }
    }
}

pub type EngineFuture<'a> = Pin<Box<dyn Future<Output = Result<(), EngineError>> + Send + 'a>>;

/// Checkpoint/restore engine.
/// `CriuEngine` runs the `criu` binary; tests substitute a recording fake.
pub trait CheckpointEngine: Send + Sync {
    fn pre_dump(&self, config: &EngineConfig) -> EngineFuture<'_>;

    fn dump(&self, config: &EngineConfig) -> EngineFuture<'_>;

    fn restore(&self, config: &EngineConfig) -> EngineFuture<'_>;

    fn is_available(&self) -> bool;

    fn engine_name(&self) -> &'static str;
}
