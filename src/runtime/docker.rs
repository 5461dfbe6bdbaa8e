//! Docker Engine API backend for [`ContainerRuntime`].
//!
//! Connects the same way the `docker` CLI does (local socket, or `DOCKER_HOST`).

use super::{ContainerInspect, ContainerRuntime, CreateSpec, RuntimeFuture};
use crate::error::CrError;
use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, LogsOptions, StatsOptions,
};
use bollard::errors::Error as BollardError;
use bollard::models::ContainerInspectResponse;
use bollard::Docker;
use futures::StreamExt;

pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    pub fn connect() -> Result<Self, CrError> {
        let docker = Docker::connect_with_local_defaults().map_err(|e| {
            CrError::QueryFailed(format!("Failed to connect to Docker daemon: {}", e))
        })?;
        Ok(Self { docker })
    }
}

fn map_error(id: &str, err: BollardError) -> CrError {
    match err {
        BollardError::DockerResponseServerError {
            status_code: 404,
            message,
        } => CrError::NotFound(format!("container {}: {}", id, message)),
        other => CrError::QueryFailed(format!("{}: {}", id, other)),
    }
}

/// Reduce an inspect response to the fields checkpoint/restore relies on.
pub fn normalize_inspect(resp: ContainerInspectResponse) -> Result<ContainerInspect, CrError> {
    let id = resp
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| CrError::QueryFailed("inspect response carries no container id".into()))?;
    let name = resp
        .name
        .unwrap_or_default()
        .trim_start_matches('/')
        .to_string();
    let state = resp.state.unwrap_or_default();
    let host_config = resp.host_config.unwrap_or_default();
    let merged_dir = resp
        .graph_driver
        .and_then(|driver| driver.data.get("MergedDir").cloned());

    Ok(ContainerInspect {
        id,
        name,
        running: state.running.unwrap_or(false),
        status: state.status.map(|s| s.to_string()).unwrap_or_default(),
        pid: state.pid.unwrap_or(0),
        merged_dir,
        runtime: host_config.runtime.clone().filter(|r| !r.is_empty()),
        cgroup_parent: host_config.cgroup_parent.clone(),
        started_at: state.started_at,
        config: resp.config.unwrap_or_default(),
        host_config,
    })
}

/// Translate an inspected config back into a create body.
fn create_body(spec: &CreateSpec) -> Config<String> {
    Config {
        host_config: Some(spec.host_config.clone()),
        ..Config::from(spec.config.clone())
    }
}

impl ContainerRuntime for DockerRuntime {
    fn inspect(&self, id: &str) -> RuntimeFuture<'_, ContainerInspect> {
        let id = id.to_string();
        Box::pin(async move {
            let resp = self
                .docker
                .inspect_container(&id, None::<InspectContainerOptions>)
                .await
                .map_err(|e| map_error(&id, e))?;
            normalize_inspect(resp)
        })
    }

    fn create(&self, spec: &CreateSpec) -> RuntimeFuture<'_, String> {
        let name = spec.name.clone();
        let body = create_body(spec);
        Box::pin(async move {
            let options = CreateContainerOptions {
                name: name.clone(),
                platform: None,
            };
            let resp = self
                .docker
                .create_container(Some(options), body)
                .await
                .map_err(|e| map_error(&name, e))?;
            for warning in &resp.warnings {
                tracing::warn!(container = %name, warning = %warning, "Docker create warning");
            }
            Ok(resp.id)
        })
    }

    fn logs(&self, id: &str, tail: usize) -> RuntimeFuture<'_, String> {
        let id = id.to_string();
        Box::pin(async move {
            let options = LogsOptions::<String> {
                stdout: true,
                stderr: true,
                tail: tail.to_string(),
                ..Default::default()
            };
            let mut stream = Box::pin(self.docker.logs(&id, Some(options)));
            let mut out = String::new();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|e| map_error(&id, e))?;
                out.push_str(&String::from_utf8_lossy(&chunk.into_bytes()));
            }
            Ok(out)
        })
    }

    fn stats(&self, id: &str) -> RuntimeFuture<'_, ()> {
        let id = id.to_string();
        Box::pin(async move {
            let options = StatsOptions {
                stream: false,
                one_shot: true,
            };
            let mut stream = Box::pin(self.docker.stats(&id, Some(options)));
            match stream.next().await {
                Some(Ok(_)) => Ok(()),
                Some(Err(e)) => Err(map_error(&id, e)),
                None => Err(CrError::QueryFailed(format!(
                    "{}: empty stats response",
                    id
                ))),
            }
        })
    }
}
