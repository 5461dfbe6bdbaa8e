pub mod docker;

use crate::error::CrError;
use bollard::models::{ContainerConfig, HostConfig};
use std::future::Future;
use std::pin::Pin;

pub type RuntimeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CrError>> + Send + 'a>>;

/// Normalised view of a container as reported by the container service.
#[derive(Debug, Clone, Default)]
pub struct ContainerInspect {
    /// Full container id.
    pub id: String,
    /// Name without Docker's leading `/`.
    pub name: String,
    pub running: bool,
    pub status: String,
    pub pid: i64,
    /// Overlay `MergedDir` of the container's graph driver.
    pub merged_dir: Option<String>,
    pub runtime: Option<String>,
    pub cgroup_parent: Option<String>,
    pub started_at: Option<String>,
    pub config: ContainerConfig,
    pub host_config: HostConfig,
}

/// Request to create (but not start) a container.
#[derive(Debug, Clone, Default)]
pub struct CreateSpec {
    pub name: String,
    pub config: ContainerConfig,
    pub host_config: HostConfig,
}

/// The container-management service.
/// `DockerRuntime` talks to a Docker daemon; tests substitute an in-memory fake.
pub trait ContainerRuntime: Send + Sync {
    /// Fails with `NotFound` when the container does not exist.
    fn inspect(&self, id: &str) -> RuntimeFuture<'_, ContainerInspect>;

    /// Returns the id of the new container.
    fn create(&self, spec: &CreateSpec) -> RuntimeFuture<'_, String>;

    /// Last `tail` lines of combined stdout/stderr.
    fn logs(&self, id: &str, tail: usize) -> RuntimeFuture<'_, String>;

    /// Succeeds when the service can sample resource statistics for the container.
    fn stats(&self, id: &str) -> RuntimeFuture<'_, ()>;
}
