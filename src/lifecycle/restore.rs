//! Restore lifecycle.
//!
//! CheckpointLocated → ContainerRecreated → FactsResolved → EngineRestoreInvoked
//! → Verified | VerificationFailed
//!
//! The recreated container is never started: CRIU replaces its process image.
//! Its facts therefore carry pid 0 and no namespaces, which is expected here.

use crate::engine::CheckpointEngine;
use crate::error::CrError;
use crate::facts::extract_unstarted;
use crate::runtime::{ContainerRuntime, CreateSpec};
use crate::snapshot::SnapshotOrchestrator;
use crate::storage::load_metadata;
use crate::types::{
    short_id, CgroupSource, CheckpointDirectory, CheckpointMetadata, RestoreOptions, RuntimeFacts,
};
use bollard::models::{ContainerConfig, HostConfig};
use std::fmt;
use std::path::PathBuf;

/// Log lines fetched from the restored container during verification.
pub const VERIFY_LOG_TAIL: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreStage {
    CheckpointLocated,
    ContainerRecreated,
    FactsResolved,
    EngineRestoreInvoked,
    Verified,
    VerificationFailed,
}

/// How the container receiving the restored process was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recreation {
    /// Cloned from the original container's config and host config.
    Cloned { from: String },
    /// The original is gone; an idle privileged placeholder was created instead.
    Placeholder,
}

#[derive(Debug, Clone)]
pub struct RestoreRequest {
    /// Container the checkpoint was taken from.
    pub container: String,
    pub checkpoint_name: String,
    pub base_dir: PathBuf,
    pub new_name: String,
    pub options: RestoreOptions,
}

impl RestoreRequest {
    pub fn directory(&self) -> CheckpointDirectory {
        CheckpointDirectory::new(self.base_dir.clone(), &self.container, &self.checkpoint_name)
    }
}

/// Live state of the restored container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub name: String,
    pub id: String,
    pub status: String,
    pub pid: i64,
    pub started_at: Option<String>,
    pub recent_logs: Option<String>,
    pub stats_ok: bool,
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Restored Container Status:")?;
        writeln!(f, "  Name:       {}", self.name)?;
        writeln!(f, "  ID:         {}", self.id)?;
        writeln!(f, "  State:      {}", self.status)?;
        writeln!(f, "  PID:        {}", self.pid)?;
        write!(
            f,
            "  Started At: {}",
            self.started_at.as_deref().unwrap_or("unknown")
        )?;
        if let Some(logs) = self.recent_logs.as_deref().filter(|l| !l.trim().is_empty()) {
            write!(f, "\n\nRecent container logs:\n{}", logs.trim_end())?;
        }
        if self.stats_ok {
            write!(f, "\n\nContainer is responding to API calls")?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct RestoreReport {
    pub directory: PathBuf,
    pub metadata: Option<CheckpointMetadata>,
    pub container_id: String,
    pub recreation: Recreation,
    /// Facts the engine configuration was built from.
    pub facts: RuntimeFacts,
    /// `(recorded, recreated)` cgroup paths when they differ.
    pub cgroup_divergence: Option<(String, String)>,
    pub verification: Result<Verification, CrError>,
    pub stage: RestoreStage,
}

/// Idle container for the engine to restore into when the original is gone.
pub fn placeholder_spec(name: &str, image: &str) -> CreateSpec {
    CreateSpec {
        name: name.to_string(),
        config: ContainerConfig {
            image: Some(image.to_string()),
            cmd: Some(vec!["sleep".into(), "infinity".into()]),
            ..Default::default()
        },
        host_config: HostConfig {
            privileged: Some(true),
            pid_mode: Some("host".into()),
            ..Default::default()
        },
    }
}

pub struct RestoreManager<'a, R: ?Sized, E> {
    runtime: &'a R,
    orchestrator: &'a SnapshotOrchestrator<E>,
    placeholder_image: String,
}

impl<'a, R, E> RestoreManager<'a, R, E>
where
    R: ContainerRuntime + ?Sized,
    E: CheckpointEngine,
{
    pub fn new(
        runtime: &'a R,
        orchestrator: &'a SnapshotOrchestrator<E>,
        placeholder_image: impl Into<String>,
    ) -> Self {
        Self {
            runtime,
            orchestrator,
            placeholder_image: placeholder_image.into(),
        }
    }

    pub async fn restore(&self, request: &RestoreRequest) -> Result<RestoreReport, CrError> {
        let directory = request.directory();
        if !directory.exists() {
            return Err(CrError::NotFound(format!(
                "checkpoint does not exist at {}",
                directory.path().display()
            )));
        }
        let dir = directory.path();
        let metadata = match load_metadata(&dir) {
            Ok(meta) => Some(meta),
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Checkpoint metadata unavailable");
                None
            }
        };
        tracing::info!(
            stage = ?RestoreStage::CheckpointLocated,
            dir = %dir.display(),
            original_id = metadata.as_ref().map(|m| m.id.as_str()).unwrap_or("unknown"),
            new_name = %request.new_name,
            "Restoring from checkpoint"
        );

        let (container_id, recreation) =
            self.recreate(&request.container, &request.new_name).await?;
        tracing::info!(
            stage = ?RestoreStage::ContainerRecreated,
            container_id = %short_id(&container_id),
            recreation = ?recreation,
            "Container created for restore"
        );

        let facts = extract_unstarted(self.runtime, &container_id).await?;
        let (facts, cgroup_divergence) =
            resolve_cgroup(facts, metadata.as_ref(), request.options.cgroup_source);
        tracing::debug!(stage = ?RestoreStage::FactsResolved, container = %facts.name, "Facts resolved");

        self.orchestrator.restore(&facts, &dir).await?;
        tracing::info!(stage = ?RestoreStage::EngineRestoreInvoked, "Engine restore completed");

        let verification = self.verify(&request.new_name).await;
        let stage = match &verification {
            Ok(_) => RestoreStage::Verified,
            Err(e) => {
                tracing::warn!(container = %request.new_name, error = %e, "Restore not corroborated");
                RestoreStage::VerificationFailed
            }
        };

        Ok(RestoreReport {
            directory: dir,
            metadata,
            container_id,
            recreation,
            facts,
            cgroup_divergence,
            verification,
            stage,
        })
    }

    async fn recreate(
        &self,
        original: &str,
        new_name: &str,
    ) -> Result<(String, Recreation), CrError> {
        let (spec, recreation) = match self.runtime.inspect(original).await {
            Ok(inspect) => {
                let config = ContainerConfig {
                    hostname: Some(new_name.to_string()),
                    ..inspect.config
                };
                let spec = CreateSpec {
                    name: new_name.to_string(),
                    config,
                    host_config: inspect.host_config,
                };
                let from = short_id(&inspect.id).to_string();
                (spec, Recreation::Cloned { from })
            }
            Err(CrError::NotFound(_)) => {
                tracing::warn!(
                    container = %original,
                    image = %self.placeholder_image,
                    "Original container not found, using placeholder configuration"
                );
                (
                    placeholder_spec(new_name, &self.placeholder_image),
                    Recreation::Placeholder,
                )
            }
            Err(e) => return Err(CrError::RecreateFailed(e.to_string())),
        };

        let id = self
            .runtime
            .create(&spec)
            .await
            .map_err(|e| CrError::RecreateFailed(e.to_string()))?;
        Ok((id, recreation))
    }

    /// Inspect the restored container; logs and stats are collected as corroboration only.
    pub async fn verify(&self, name: &str) -> Result<Verification, CrError> {
        let inspect = self
            .runtime
            .inspect(name)
            .await
            .map_err(|e| CrError::VerificationFailed(e.to_string()))?;
        if !inspect.running {
            return Err(CrError::VerificationFailed(format!(
                "container {} is not running after restore (status {})",
                name, inspect.status
            )));
        }

        let recent_logs = self.runtime.logs(name, VERIFY_LOG_TAIL).await.ok();
        let stats_ok = self.runtime.stats(name).await.is_ok();

        Ok(Verification {
            name: inspect.name,
            id: short_id(&inspect.id).to_string(),
            status: inspect.status,
            pid: inspect.pid,
            started_at: inspect.started_at,
            recent_logs,
            stats_ok,
        })
    }
}

/// Pick the cgroup root for the restore and report whether the recorded and
/// recreated paths disagree.
fn resolve_cgroup(
    facts: RuntimeFacts,
    metadata: Option<&CheckpointMetadata>,
    source: CgroupSource,
) -> (RuntimeFacts, Option<(String, String)>) {
    let Some(meta) = metadata else {
        if source == CgroupSource::Checkpoint {
            tracing::warn!("No recorded cgroup path, using the recreated container's");
        }
        return (facts, None);
    };

    let recorded = meta.effective_cgroup_path();
    let recreated = facts.effective_cgroup_path();
    let divergence = if recorded != recreated {
        tracing::warn!(
            recorded = %recorded,
            recreated = %recreated,
            source = ?source,
            "Cgroup path differs from the one recorded at checkpoint time"
        );
        Some((recorded.clone(), recreated))
    } else {
        None
    };

    let facts = match source {
        CgroupSource::Checkpoint => facts.with_cgroup_path(recorded),
        CgroupSource::Recreated => facts,
    };
    (facts, divergence)
}
