use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration record operations.
///
/// Filesystem and codec failures pass through transparently, so callers
/// can tell a misused contract (the first two variants) from an
/// operation the filesystem rejected.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The model directory a config was to be read from does not exist
    #[error("model path does not exist: {0}")]
    MissingModelPath(PathBuf),

    /// The model path exists but is a plain file, not a directory
    #[error("model path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error(transparent)]
    Format(#[from] modelrepo_pbtxt::FormatError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
