//! Sequencing of engine calls against a checkpoint's images directory.
//!
//! Checkpoint: [pre-dump] → dump, against the live pid.
//! Restore: restore from the images already in the directory.
//!
//! The directory stays open for the whole engine call. On failure the engine's
//! own log file is read back from it and attached to the error.

use crate::engine::config::{build, EngineMode};
use crate::engine::{CheckpointEngine, EngineError};
use crate::error::CrError;
use crate::types::{CheckpointOptions, RuntimeFacts};
use std::fs::File;
use std::path::{Path, PathBuf};

/// An open handle on an existing images directory. Released on drop.
#[derive(Debug)]
pub struct ImageDir {
    path: PathBuf,
    _handle: File,
}

impl ImageDir {
    pub fn open(path: &Path) -> Result<Self, CrError> {
        if !path.is_dir() {
            return Err(CrError::NotFound(format!(
                "checkpoint directory {}",
                path.display()
            )));
        }
        let handle = File::open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            _handle: handle,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Contents of the log CRIU wrote for `mode`, if there is one.
pub fn read_engine_log(dir: &Path, mode: EngineMode) -> Option<String> {
    std::fs::read_to_string(dir.join(mode.log_file())).ok()
}

fn engine_failure(dir: &Path, mode: EngineMode, err: EngineError) -> CrError {
    let log = err.log.or_else(|| read_engine_log(dir, mode));
    CrError::EngineFailure {
        op: mode.op(),
        message: err.message,
        log,
    }
}

pub struct SnapshotOrchestrator<E> {
    engine: E,
}

impl<E: CheckpointEngine> SnapshotOrchestrator<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub async fn checkpoint(
        &self,
        facts: &RuntimeFacts,
        dir: &Path,
        options: CheckpointOptions,
    ) -> Result<(), CrError> {
        if !facts.is_running() {
            return Err(CrError::NotRunning(format!(
                "{} (state {:?}, pid {})",
                facts.name, facts.state, facts.pid
            )));
        }
        let images = ImageDir::open(dir)?;

        if options.pre_dump {
            tracing::info!(container = %facts.name, pid = facts.pid, "Performing pre-dump");
            let config = build(facts, EngineMode::PreDump, options, images.path());
            self.engine
                .pre_dump(&config)
                .await
                .map_err(|e| engine_failure(images.path(), EngineMode::PreDump, e))?;
        }

        tracing::info!(container = %facts.name, pid = facts.pid, "Performing checkpoint");
        let config = build(facts, EngineMode::Dump, options, images.path());
        self.engine
            .dump(&config)
            .await
            .map_err(|e| engine_failure(images.path(), EngineMode::Dump, e))?;

        tracing::info!(
            container = %facts.name,
            dir = %images.path().display(),
            "Checkpoint written"
        );
        Ok(())
    }

    /// The restored tree is detached from this process; nothing waits on it
    /// once the engine call returns.
    pub async fn restore(&self, facts: &RuntimeFacts, dir: &Path) -> Result<(), CrError> {
        let images = ImageDir::open(dir)?;

        tracing::info!(container = %facts.name, "Performing restore");
        let config = build(
            facts,
            EngineMode::Restore,
            CheckpointOptions::default(),
            images.path(),
        );
        self.engine
            .restore(&config)
            .await
            .map_err(|e| engine_failure(images.path(), EngineMode::Restore, e))?;

        Ok(())
    }
}
