use crate::engine::CheckpointEngine;
use crate::error::CrError;
use crate::facts::extract_running;
use crate::runtime::ContainerRuntime;
use crate::snapshot::SnapshotOrchestrator;
use crate::storage::{list_images, save_metadata};
use crate::types::{
    CheckpointDirectory, CheckpointMetadata, CheckpointOptions, ImageFile, RuntimeFacts,
};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CheckpointRequest {
    pub container: String,
    pub checkpoint_name: String,
    pub base_dir: PathBuf,
    pub options: CheckpointOptions,
}

#[derive(Debug, Clone)]
pub struct CheckpointOutcome {
    pub facts: RuntimeFacts,
    pub directory: CheckpointDirectory,
    pub metadata: CheckpointMetadata,
    pub images: Vec<ImageFile>,
}

/// Extract facts for a running container and checkpoint it.
pub async fn checkpoint<R, E>(
    runtime: &R,
    orchestrator: &SnapshotOrchestrator<E>,
    request: &CheckpointRequest,
) -> Result<CheckpointOutcome, CrError>
where
    R: ContainerRuntime + ?Sized,
    E: CheckpointEngine,
{
    let facts = extract_running(runtime, &request.container).await?;
    checkpoint_with_facts(orchestrator, facts, request).await
}

/// Checkpoint from already extracted facts.
///
/// The checkpoint directory is keyed by the container's resolved name, not
/// the identifier it was requested by.
pub async fn checkpoint_with_facts<E>(
    orchestrator: &SnapshotOrchestrator<E>,
    facts: RuntimeFacts,
    request: &CheckpointRequest,
) -> Result<CheckpointOutcome, CrError>
where
    E: CheckpointEngine,
{
    let directory = CheckpointDirectory::new(
        request.base_dir.clone(),
        &facts.name,
        &request.checkpoint_name,
    );
    let dir = directory.create()?;
    tracing::info!(container = %facts.name, dir = %dir.display(), "Checkpointing");

    orchestrator
        .checkpoint(&facts, &dir, request.options)
        .await?;

    let metadata = save_metadata(&facts, &dir)?;
    let images = list_images(&dir)?;

    tracing::info!(
        container = %facts.name,
        checkpoint = %request.checkpoint_name,
        files = images.len(),
        "Checkpoint successful"
    );

    Ok(CheckpointOutcome {
        facts,
        directory,
        metadata,
        images,
    })
}
