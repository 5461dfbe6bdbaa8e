use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Root under which checkpoints are stored as `<container>/<checkpoint>/`.
    pub base_dir: PathBuf,
    pub criu_binary: String,
    /// Image for the idle container created when the original is gone at restore time.
    pub placeholder_image: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            base_dir: std::env::var("CHECKPOINT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/tmp/docker-checkpoints")),
            criu_binary: std::env::var("CRIU_BINARY").unwrap_or_else(|_| "criu".into()),
            placeholder_image: std::env::var("RESTORE_PLACEHOLDER_IMAGE")
                .unwrap_or_else(|_| "alpine:latest".into()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("/tmp/docker-checkpoints"),
            criu_binary: "criu".into(),
            placeholder_image: "alpine:latest".into(),
        }
    }
}
