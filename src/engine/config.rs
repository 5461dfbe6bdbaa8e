use super::mounts::external_mount_specs;
use crate::error::EngineOp;
use crate::types::{CheckpointOptions, RuntimeFacts};
use std::path::{Path, PathBuf};

pub const ENGINE_LOG_LEVEL: u32 = 4;

/// Controllers whose cgroup root is remapped to the container's cgroup.
pub const CGROUP_CONTROLLERS: [&str; 2] = ["cpu", "memory"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    PreDump,
    Dump,
    Restore,
}

impl EngineMode {
    /// Log file CRIU writes into the images directory.
    pub fn log_file(&self) -> &'static str {
        match self {
            Self::PreDump | Self::Dump => "dump.log",
            Self::Restore => "restore.log",
        }
    }

    pub fn op(&self) -> EngineOp {
        match self {
            Self::PreDump => EngineOp::PreDump,
            Self::Dump => EngineOp::Dump,
            Self::Restore => EngineOp::Restore,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgroupRoot {
    pub controller: String,
    pub path: String,
}

/// Everything one CRIU invocation is configured with.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub mode: EngineMode,
    /// Root of the process tree to dump; 0 on restore, where the images name it.
    pub pid: i32,
    pub log_file: String,
    pub log_level: u32,
    pub root: String,
    pub manage_cgroups: bool,
    pub tcp_established: bool,
    pub file_locks: bool,
    pub leave_running: bool,
    pub track_mem: bool,
    pub shell_job: bool,
    pub restore_sibling: bool,
    pub restore_detached: bool,
    pub external: Vec<String>,
    pub cgroup_roots: Vec<CgroupRoot>,
    pub images_dir: PathBuf,
}

/// Derive the engine configuration for one invocation. Pure.
///
/// Pre-dump tracks memory and never captures established TCP connections.
/// Restore always reinstates TCP connections and file locks, and detaches the
/// restored tree so it outlives this process.
pub fn build(
    facts: &RuntimeFacts,
    mode: EngineMode,
    options: CheckpointOptions,
    images_dir: &Path,
) -> EngineConfig {
    let cgroup_path = facts.effective_cgroup_path();
    let cgroup_roots = CGROUP_CONTROLLERS
        .iter()
        .map(|ctrl| CgroupRoot {
            controller: ctrl.to_string(),
            path: cgroup_path.clone(),
        })
        .collect();

    let dump = EngineConfig {
        mode,
        pid: facts.pid,
        log_file: mode.log_file().to_string(),
        log_level: ENGINE_LOG_LEVEL,
        root: facts.rootfs.clone(),
        manage_cgroups: true,
        tcp_established: options.tcp_established,
        file_locks: options.file_locks,
        leave_running: options.leave_running,
        track_mem: false,
        // the container's init, not CRIU, is the parent of the tree
        shell_job: true,
        restore_sibling: false,
        restore_detached: false,
        external: external_mount_specs(),
        cgroup_roots,
        images_dir: images_dir.to_path_buf(),
    };

    match mode {
        EngineMode::Dump => dump,
        EngineMode::PreDump => EngineConfig {
            track_mem: true,
            tcp_established: false,
            ..dump
        },
        EngineMode::Restore => EngineConfig {
            tcp_established: true,
            file_locks: true,
            leave_running: false,
            restore_sibling: true,
            restore_detached: true,
            ..dump
        },
    }
}
