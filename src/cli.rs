use crate::config::Config;
use crate::lifecycle::{CheckpointRequest, RestoreRequest};
use crate::types::{CgroupSource, CheckpointOptions, RestoreOptions};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Checkpoint a running Docker container with CRIU, or restore one from a checkpoint.
#[derive(Parser, Debug, Clone)]
#[command(name = "docker-cr", version, about)]
pub struct Cli {
    /// Container id or name.
    #[arg(long)]
    pub container: String,

    /// Checkpoint name.
    #[arg(long, default_value = "checkpoint1")]
    pub name: String,

    /// Base checkpoint directory (overrides CHECKPOINT_DIR).
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Keep the container running after the dump.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub leave_running: bool,

    /// Checkpoint established TCP connections.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub tcp: bool,

    /// Checkpoint held file locks.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub file_locks: bool,

    /// Run a memory pre-dump before the final dump.
    #[arg(long)]
    pub pre_dump: bool,

    /// Restore instead of checkpointing.
    #[arg(long)]
    pub restore: bool,

    /// Name for the restored container (default `<container>-restored`).
    #[arg(long)]
    pub new_name: Option<String>,

    /// On restore, bind cgroups to the path recorded at checkpoint time.
    #[arg(long)]
    pub cgroup_from_checkpoint: bool,

    /// Debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn checkpoint_options(&self) -> CheckpointOptions {
        CheckpointOptions {
            leave_running: self.leave_running,
            tcp_established: self.tcp,
            file_locks: self.file_locks,
            pre_dump: self.pre_dump,
        }
    }

    pub fn restore_options(&self) -> RestoreOptions {
        RestoreOptions {
            cgroup_source: if self.cgroup_from_checkpoint {
                CgroupSource::Checkpoint
            } else {
                CgroupSource::Recreated
            },
        }
    }

    pub fn new_name(&self) -> String {
        self.new_name
            .clone()
            .unwrap_or_else(|| format!("{}-restored", self.container))
    }

    pub fn base_dir(&self, config: &Config) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| config.base_dir.clone())
    }

    pub fn checkpoint_request(&self, config: &Config) -> CheckpointRequest {
        CheckpointRequest {
            container: self.container.clone(),
            checkpoint_name: self.name.clone(),
            base_dir: self.base_dir(config),
            options: self.checkpoint_options(),
        }
    }

    pub fn restore_request(&self, config: &Config) -> RestoreRequest {
        RestoreRequest {
            container: self.container.clone(),
            checkpoint_name: self.name.clone(),
            base_dir: self.base_dir(config),
            new_name: self.new_name(),
            options: self.restore_options(),
        }
    }

    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "docker_cr=debug"
        } else {
            "docker_cr=info"
        }
    }
}
