use std::fmt;

/// Which engine operation a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineOp {
    PreDump,
    Dump,
    Restore,
}

impl fmt::Display for EngineOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PreDump => "pre-dump",
            Self::Dump => "dump",
            Self::Restore => "restore",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Container not running: {0}")]
    NotRunning(String),

    #[error("Container service query failed: {0}")]
    QueryFailed(String),

    /// Reserved for validation of engine configuration; nothing raises it yet.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("CRIU {op} failed: {message}")]
    EngineFailure {
        op: EngineOp,
        message: String,
        log: Option<String>,
    },

    #[error("Failed to write metadata: {0}")]
    WriteFailed(String),

    #[error("Failed to parse metadata: {0}")]
    ParseFailed(String),

    #[error("Failed to create container for restore: {0}")]
    RecreateFailed(String),

    #[error("Restore verification failed: {0}")]
    VerificationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CrError {
    /// Engine log attached to an engine failure, if it could be read.
    pub fn engine_log(&self) -> Option<&str> {
        match self {
            Self::EngineFailure { log, .. } => log.as_deref(),
            _ => None,
        }
    }

    /// Everything except a failed post-restore verification aborts the operation.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::VerificationFailed(_))
    }
}
