use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

// ── Container Identity ─────────────────────────────────────────

pub const SHORT_ID_LEN: usize = 12;
pub const DEFAULT_RUNTIME: &str = "runc";

/// Docker's 12-character short form of a container id.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// OCI bundle location the Docker daemon uses for a container under `runtime`.
pub fn bundle_path(runtime: &str, full_id: &str) -> String {
    format!("/run/docker/runtime-{}/moby/{}", runtime, full_id)
}

// ── Namespaces ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamespaceKind {
    Ipc,
    Mnt,
    Net,
    Pid,
    User,
    Uts,
    Cgroup,
}

impl NamespaceKind {
    pub const ALL: [NamespaceKind; 7] = [
        Self::Ipc,
        Self::Mnt,
        Self::Net,
        Self::Pid,
        Self::User,
        Self::Uts,
        Self::Cgroup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ipc => "ipc",
            Self::Mnt => "mnt",
            Self::Net => "net",
            Self::Pid => "pid",
            Self::User => "user",
            Self::Uts => "uts",
            Self::Cgroup => "cgroup",
        }
    }

    /// Kernel handle for this namespace of a live process.
    pub fn handle_path(&self, pid: i32) -> String {
        format!("/proc/{}/ns/{}", pid, self.as_str())
    }
}

impl fmt::Display for NamespaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type NamespaceMap = BTreeMap<NamespaceKind, String>;

/// One handle per recognised namespace kind of `pid`.
pub fn namespace_handles(pid: i32) -> NamespaceMap {
    NamespaceKind::ALL
        .iter()
        .map(|kind| (*kind, kind.handle_path(pid)))
        .collect()
}

// ── Runtime Facts ──────────────────────────────────────────────

/// Everything CRIU needs to know about a container's process, as observed at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeFacts {
    /// Short (12 character) container id.
    pub id: String,
    pub name: String,
    /// 0 while the container has no live process.
    pub pid: i32,
    pub state: String,
    pub rootfs: String,
    pub runtime: String,
    pub bundle_path: String,
    /// Cgroup parent as reported by the container service; may be empty.
    pub cgroup_path: String,
    pub namespaces: NamespaceMap,
}

impl RuntimeFacts {
    /// Cgroup path to bind controllers to, falling back to Docker's default layout.
    pub fn effective_cgroup_path(&self) -> String {
        if self.cgroup_path.is_empty() {
            format!("/docker/{}", self.id)
        } else {
            self.cgroup_path.clone()
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == "running" && self.pid > 0
    }

    pub fn with_cgroup_path(&self, cgroup_path: impl Into<String>) -> Self {
        Self {
            cgroup_path: cgroup_path.into(),
            ..self.clone()
        }
    }
}

impl fmt::Display for RuntimeFacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Container Information:")?;
        writeln!(f, "  ID:         {}", self.id)?;
        writeln!(f, "  Name:       {}", self.name)?;
        writeln!(f, "  PID:        {}", self.pid)?;
        writeln!(f, "  State:      {}", self.state)?;
        writeln!(f, "  Runtime:    {}", self.runtime)?;
        writeln!(f, "  RootFS:     {}", self.rootfs)?;
        writeln!(f, "  Bundle:     {}", self.bundle_path)?;
        writeln!(f, "  Cgroup:     {}", self.cgroup_path)?;
        write!(f, "  Namespaces:")?;
        for (kind, path) in &self.namespaces {
            write!(f, "\n    {}: {}", kind, path)?;
        }
        Ok(())
    }
}

// ── Options ────────────────────────────────────────────────────

/// User-level checkpoint flags, fixed once parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointOptions {
    pub leave_running: bool,
    pub tcp_established: bool,
    pub file_locks: bool,
    pub pre_dump: bool,
}

impl Default for CheckpointOptions {
    fn default() -> Self {
        Self {
            leave_running: true,
            tcp_established: true,
            file_locks: true,
            pre_dump: false,
        }
    }
}

/// Where the cgroup root bound at restore time comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CgroupSource {
    /// Re-derive from the freshly created container.
    #[default]
    Recreated,
    /// Reuse the effective path recorded when the checkpoint was taken.
    Checkpoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RestoreOptions {
    pub cgroup_source: CgroupSource,
}

// ── Checkpoint Storage ─────────────────────────────────────────

/// `<base>/<container>/<checkpoint>/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointDirectory {
    pub base: PathBuf,
    pub container: String,
    pub name: String,
}

impl CheckpointDirectory {
    pub fn new(base: impl Into<PathBuf>, container: &str, name: &str) -> Self {
        Self {
            base: base.into(),
            container: container.to_string(),
            name: name.to_string(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.base.join(&self.container).join(&self.name)
    }

    pub fn exists(&self) -> bool {
        self.path().is_dir()
    }

    pub fn create(&self) -> std::io::Result<PathBuf> {
        let path = self.path();
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }
}

/// Persisted alongside the CRIU images as `container.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub id: String,
    pub name: String,
    pub runtime: String,
    pub rootfs: String,
    pub bundle_path: String,
    pub namespaces: NamespaceMap,
    pub cgroup_path: String,
    pub timestamp: DateTime<Utc>,
}

impl CheckpointMetadata {
    pub fn from_facts(facts: &RuntimeFacts, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: facts.id.clone(),
            name: facts.name.clone(),
            runtime: facts.runtime.clone(),
            rootfs: facts.rootfs.clone(),
            bundle_path: facts.bundle_path.clone(),
            namespaces: facts.namespaces.clone(),
            cgroup_path: facts.cgroup_path.clone(),
            timestamp,
        }
    }

    pub fn effective_cgroup_path(&self) -> String {
        if self.cgroup_path.is_empty() {
            format!("/docker/{}", self.id)
        } else {
            self.cgroup_path.clone()
        }
    }
}

impl fmt::Display for CheckpointMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Checkpoint Information:")?;
        writeln!(f, "  Original ID:   {}", self.id)?;
        writeln!(f, "  Original Name: {}", self.name)?;
        write!(f, "  Taken At:      {}", self.timestamp.to_rfc3339())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub size: u64,
}
