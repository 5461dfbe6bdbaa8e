use crate::error::CrError;
use crate::types::{CheckpointMetadata, ImageFile, RuntimeFacts};
use std::fs;
use std::path::Path;

pub const METADATA_FILE: &str = "container.json";

// ── Metadata persistence ───────────────────────────────────────

pub fn save_metadata(facts: &RuntimeFacts, dir: &Path) -> Result<CheckpointMetadata, CrError> {
    let metadata = CheckpointMetadata::from_facts(facts, chrono::Utc::now());
    let path = dir.join(METADATA_FILE);
    let json = serde_json::to_string_pretty(&metadata)
        .map_err(|e| CrError::WriteFailed(format!("{}: {}", path.display(), e)))?;
    fs::write(&path, json)
        .map_err(|e| CrError::WriteFailed(format!("{}: {}", path.display(), e)))?;
    Ok(metadata)
}

pub fn load_metadata(dir: &Path) -> Result<CheckpointMetadata, CrError> {
    let path = dir.join(METADATA_FILE);
    if !path.exists() {
        return Err(CrError::NotFound(format!("metadata {}", path.display())));
    }
    let data = fs::read_to_string(&path)
        .map_err(|e| CrError::ParseFailed(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&data)
        .map_err(|e| CrError::ParseFailed(format!("{}: {}", path.display(), e)))
}

// ── Checkpoint contents ────────────────────────────────────────

/// Files in a checkpoint directory, sorted by name.
pub fn list_images(dir: &Path) -> Result<Vec<ImageFile>, CrError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let meta = entry.metadata()?;
        if meta.is_file() {
            files.push(ImageFile {
                name: entry.file_name().to_string_lossy().to_string(),
                size: meta.len(),
            });
        }
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}
