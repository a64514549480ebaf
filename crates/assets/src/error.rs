/// Errors from asset import.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a GLB container (magic {0:#010x})")]
    BadMagic(u32),
    #[error("unsupported glTF container version {0}")]
    UnsupportedVersion(u32),
    #[error("GLB container truncated: {0}")]
    Truncated(String),
    #[error("glTF JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid accessor {index}: {reason}")]
    InvalidAccessor { index: usize, reason: String },
    #[error("missing {kind} {index}")]
    Missing { kind: &'static str, index: usize },
    #[error("node hierarchy revisits node {0}")]
    NodeCycle(usize),
    #[error("unsupported buffer {0}: only the embedded GLB binary chunk is read")]
    UnsupportedBuffer(usize),
    #[error("model contains no triangle geometry")]
    EmptyModel,
}
