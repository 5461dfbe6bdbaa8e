//! Mounts Docker injects into every container that CRIU must treat as external.
//!
//! These are kernel-virtual filesystems or bind mounts owned by the daemon.
//! CRIU cannot dump them, and it has to re-attach them on restore.

/// `(mount point, external key)` pairs, in the order passed to CRIU.
pub const EXTERNAL_MOUNTS: [(&str, &str); 10] = [
    ("/proc", "proc"),
    ("/dev", "dev"),
    ("/sys", "sys"),
    ("/dev/shm", "shm"),
    ("/dev/pts", "pts"),
    ("/dev/mqueue", "mqueue"),
    ("/etc/hostname", "hostname"),
    ("/etc/hosts", "hosts"),
    ("/etc/resolv.conf", "resolv.conf"),
    ("/sys/fs/cgroup", "cgroup"),
];

/// CRIU `--external` form: `mnt[<mount point>]:<key>`.
pub fn external_mount_specs() -> Vec<String> {
    EXTERNAL_MOUNTS
        .iter()
        .map(|(path, key)| format!("mnt[{}]:{}", path, key))
        .collect()
}
