//! CRIU as an external process.
//!
//! Pre-dump: `criu pre-dump --track-mem` into the images directory
//! Dump:     `criu dump --tree <pid>` into the same directory
//! Restore:  `criu restore --restore-sibling --restore-detached`
//!
//! Requires Linux with CRIU installed and CAP_SYS_ADMIN.

use super::config::{EngineConfig, EngineMode};
use super::{CheckpointEngine, EngineError, EngineFuture};

pub struct CriuEngine {
    criu_binary: String,
}

impl CriuEngine {
    pub fn new(criu_binary: impl Into<String>) -> Self {
        Self {
            criu_binary: criu_binary.into(),
        }
    }

    fn command(mode: EngineMode) -> &'static str {
        match mode {
            EngineMode::PreDump => "pre-dump",
            EngineMode::Dump => "dump",
            EngineMode::Restore => "restore",
        }
    }

    /// Command line for one invocation, without the binary.
    pub fn args(config: &EngineConfig) -> Vec<String> {
        let mut args = vec![Self::command(config.mode).to_string()];

        if config.mode != EngineMode::Restore {
            args.push("--tree".into());
            args.push(config.pid.to_string());
        }
        args.push("--images-dir".into());
        args.push(config.images_dir.to_string_lossy().into_owned());
        args.push("--log-file".into());
        args.push(config.log_file.clone());
        args.push(format!("-v{}", config.log_level));
        if !config.root.is_empty() {
            args.push("--root".into());
            args.push(config.root.clone());
        }

        let flags = [
            (config.manage_cgroups, "--manage-cgroups"),
            (config.tcp_established, "--tcp-established"),
            (config.file_locks, "--file-locks"),
            (config.shell_job, "--shell-job"),
            (config.track_mem, "--track-mem"),
            (config.restore_sibling, "--restore-sibling"),
            (config.restore_detached, "--restore-detached"),
        ];
        for (enabled, flag) in flags {
            if enabled {
                args.push(flag.into());
            }
        }
        // leave-running only means something when dumping a live tree
        if config.leave_running && config.mode != EngineMode::Restore {
            args.push("--leave-running".into());
        }

        for ext in &config.external {
            args.push("--external".into());
            args.push(ext.clone());
        }
        for root in &config.cgroup_roots {
            args.push("--cgroup-root".into());
            args.push(format!("{}:{}", root.controller, root.path));
        }
        args
    }

    async fn run(&self, mode: EngineMode, args: Vec<String>) -> Result<(), EngineError> {
        tracing::debug!(binary = %self.criu_binary, args = ?args, "Invoking CRIU");

        let output = tokio::process::Command::new(&self.criu_binary)
            .args(&args)
            .output()
            .await
            .map_err(|e| {
                EngineError::new(format!(
                    "failed to run {} {}: {}",
                    self.criu_binary,
                    Self::command(mode),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = if stderr.trim().is_empty() {
                format!("criu exited with {}", output.status)
            } else {
                stderr.trim().to_string()
            };
            return Err(EngineError::new(message));
        }

        Ok(())
    }

    fn invoke(&self, config: &EngineConfig) -> EngineFuture<'_> {
        let mode = config.mode;
        let args = Self::args(config);
        Box::pin(async move { self.run(mode, args).await })
    }
}

impl Default for CriuEngine {
    fn default() -> Self {
        Self::new("criu")
    }
}

impl CheckpointEngine for CriuEngine {
    fn pre_dump(&self, config: &EngineConfig) -> EngineFuture<'_> {
        self.invoke(config)
    }

    fn dump(&self, config: &EngineConfig) -> EngineFuture<'_> {
        self.invoke(config)
    }

    fn restore(&self, config: &EngineConfig) -> EngineFuture<'_> {
        self.invoke(config)
    }

    /// Check if CRIU is usable on this system.
    fn is_available(&self) -> bool {
        std::process::Command::new(&self.criu_binary)
            .arg("check")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn engine_name(&self) -> &'static str {
        "criu"
    }
}
