//! In-memory stand-ins for the Docker daemon and CRIU.
#![allow(dead_code)]

use docker_cr::engine::config::{EngineConfig, EngineMode};
use docker_cr::engine::{CheckpointEngine, EngineError, EngineFuture};
use docker_cr::error::CrError;
use docker_cr::runtime::{ContainerInspect, ContainerRuntime, CreateSpec, RuntimeFuture};
use std::sync::Mutex;

/// 64-character id whose short form is `prefix` repeated to 12 characters.
pub fn full_id(prefix: char) -> String {
    std::iter::repeat(prefix).take(64).collect()
}

pub fn running_container(name: &str, id_char: char, pid: i64) -> ContainerInspect {
    ContainerInspect {
        id: full_id(id_char),
        name: name.to_string(),
        running: true,
        status: "running".into(),
        pid,
        merged_dir: Some(format!("/var/lib/docker/overlay2/{}/merged", name)),
        runtime: Some("runc".into()),
        cgroup_parent: Some(String::new()),
        started_at: Some("2026-10-15T08:00:00Z".into()),
        ..Default::default()
    }
}

pub fn stopped_container(name: &str, id_char: char) -> ContainerInspect {
    ContainerInspect {
        running: false,
        status: "exited".into(),
        pid: 0,
        ..running_container(name, id_char, 0)
    }
}

#[derive(Default)]
pub struct FakeRuntime {
    pub containers: Mutex<Vec<ContainerInspect>>,
    pub created: Mutex<Vec<CreateSpec>>,
    /// Containers created through `create` report themselves running, as after a successful CRIU restore.
    pub created_running: bool,
    pub fail_create: bool,
    /// `inspect` fails with `QueryFailed` for every lookup.
    pub unreachable: bool,
}

impl FakeRuntime {
    pub fn with(containers: Vec<ContainerInspect>) -> Self {
        Self {
            containers: Mutex::new(containers),
            ..Self::default()
        }
    }

    pub fn created_names(&self) -> Vec<String> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.name.clone())
            .collect()
    }

    fn find(&self, id: &str) -> Option<ContainerInspect> {
        self.containers
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.name == id || c.id == id || c.id.starts_with(id))
            .cloned()
    }
}

impl ContainerRuntime for FakeRuntime {
    fn inspect(&self, id: &str) -> RuntimeFuture<'_, ContainerInspect> {
        let result = if self.unreachable {
            Err(CrError::QueryFailed("daemon unreachable".into()))
        } else {
            self.find(id)
                .ok_or_else(|| CrError::NotFound(format!("container {}", id)))
        };
        Box::pin(async move { result })
    }

    fn create(&self, spec: &CreateSpec) -> RuntimeFuture<'_, String> {
        let result = if self.fail_create {
            Err(CrError::QueryFailed("conflict: name already in use".into()))
        } else {
            let mut created = self.created.lock().unwrap();
            created.push(spec.clone());
            let id_char = char::from(b'0' + created.len() as u8);
            let inspect = ContainerInspect {
                id: full_id(id_char),
                name: spec.name.clone(),
                running: self.created_running,
                status: if self.created_running { "running" } else { "created" }.into(),
                pid: if self.created_running { 9001 } else { 0 },
                merged_dir: Some(format!("/var/lib/docker/overlay2/{}/merged", spec.name)),
                runtime: Some("runc".into()),
                cgroup_parent: spec.host_config.cgroup_parent.clone(),
                started_at: None,
                config: spec.config.clone(),
                host_config: spec.host_config.clone(),
            };
            let id = inspect.id.clone();
            self.containers.lock().unwrap().push(inspect);
            Ok(id)
        };
        Box::pin(async move { result })
    }

    fn logs(&self, _id: &str, tail: usize) -> RuntimeFuture<'_, String> {
        let lines: Vec<String> = (1..=tail).map(|n| format!("line {}", n)).collect();
        let out = lines.join("\n");
        Box::pin(async move { Ok(out) })
    }

    fn stats(&self, id: &str) -> RuntimeFuture<'_, ()> {
        let result = self
            .find(id)
            .map(|_| ())
            .ok_or_else(|| CrError::NotFound(id.to_string()));
        Box::pin(async move { result })
    }
}

/// Records every engine call. Successful dumps leave an image file behind;
/// failures optionally leave a log file, the way CRIU does.
#[derive(Default)]
pub struct FakeEngine {
    pub calls: Mutex<Vec<EngineConfig>>,
    pub fail: Vec<EngineMode>,
    pub log_on_failure: Option<String>,
}

impl FakeEngine {
    pub fn failing(mode: EngineMode) -> Self {
        Self {
            fail: vec![mode],
            ..Self::default()
        }
    }

    pub fn modes(&self) -> Vec<EngineMode> {
        self.calls.lock().unwrap().iter().map(|c| c.mode).collect()
    }

    pub fn last(&self) -> Option<EngineConfig> {
        self.calls.lock().unwrap().last().cloned()
    }

    fn call(&self, config: &EngineConfig) -> EngineFuture<'_> {
        self.calls.lock().unwrap().push(config.clone());
        let result = if self.fail.contains(&config.mode) {
            if let Some(log) = &self.log_on_failure {
                let _ = std::fs::write(config.images_dir.join(&config.log_file), log);
            }
            Err(EngineError::new("exit status 1"))
        } else {
            if config.mode == EngineMode::Dump {
                let _ = std::fs::write(config.images_dir.join("pages-1.img"), vec![0u8; 4096]);
            }
            let _ = std::fs::write(config.images_dir.join(&config.log_file), "ok\n");
            Ok(())
        };
        Box::pin(async move { result })
    }
}

impl CheckpointEngine for FakeEngine {
    fn pre_dump(&self, config: &EngineConfig) -> EngineFuture<'_> {
        self.call(config)
    }

    fn dump(&self, config: &EngineConfig) -> EngineFuture<'_> {
        self.call(config)
    }

    fn restore(&self, config: &EngineConfig) -> EngineFuture<'_> {
        self.call(config)
    }

    fn is_available(&self) -> bool {
        true
    }

    fn engine_name(&self) -> &'static str {
        "fake"
    }
}
