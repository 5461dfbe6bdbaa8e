//! Runtime fact extraction: turn a container-service view of a container
//! into the [`RuntimeFacts`] CRIU is configured from.

use crate::error::CrError;
use crate::runtime::{ContainerInspect, ContainerRuntime};
use crate::types::{bundle_path, namespace_handles, short_id, RuntimeFacts, DEFAULT_RUNTIME};
use std::collections::BTreeMap;

/// Facts for a container that must have a live process (checkpoint path).
pub async fn extract_running<R>(runtime: &R, id: &str) -> Result<RuntimeFacts, CrError>
where
    R: ContainerRuntime + ?Sized,
{
    let inspect = runtime.inspect(id).await?;
    if !inspect.running {
        return Err(CrError::NotRunning(format!(
            "container {} is {}",
            id,
            if inspect.status.is_empty() {
                "not running"
            } else {
                inspect.status.as_str()
            }
        )));
    }
    let pid = i32::try_from(inspect.pid)
        .map_err(|_| CrError::QueryFailed(format!("container {} reports pid {}", id, inspect.pid)))?;
    if pid <= 0 {
        return Err(CrError::NotRunning(format!(
            "container {} has no live process",
            id
        )));
    }

    let facts = build_facts(&inspect, pid);
    tracing::debug!(container = %facts.name, pid = facts.pid, "Extracted runtime facts");
    Ok(facts)
}

/// Facts for a container that may not be started yet (restore path).
/// The pid is always 0 and no namespace handles are resolved.
pub async fn extract_unstarted<R>(runtime: &R, id: &str) -> Result<RuntimeFacts, CrError>
where
    R: ContainerRuntime + ?Sized,
{
    let inspect = runtime.inspect(id).await?;
    Ok(build_facts(&inspect, 0))
}

pub fn build_facts(inspect: &ContainerInspect, pid: i32) -> RuntimeFacts {
    let runtime = inspect
        .runtime
        .clone()
        .unwrap_or_else(|| DEFAULT_RUNTIME.to_string());
    let namespaces = if pid > 0 {
        namespace_handles(pid)
    } else {
        BTreeMap::new()
    };

    RuntimeFacts {
        id: short_id(&inspect.id).to_string(),
        name: inspect.name.clone(),
        pid,
        state: inspect.status.clone(),
        rootfs: inspect.merged_dir.clone().unwrap_or_default(),
        bundle_path: bundle_path(&runtime, &inspect.id),
        runtime,
        cgroup_path: inspect.cgroup_parent.clone().unwrap_or_default(),
        namespaces,
    }
}
