//! VFS error types

use thiserror::Error;

pub type VfsResult<T> = Result<T, VfsError>;

/// Failures surfaced by a [`crate::VirtualFileSystem`] backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VfsError {
    #[error("no such file or directory: {path}")]
    NotFound { path: String },

    /// Only produced by the native backend
    #[error("permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("not a directory: {path}")]
    NotADirectory { path: String },

    /// Go sources are read as text
    #[error("'{path}' is not valid UTF-8")]
    InvalidUtf8 { path: String },

    /// A writer panicked while holding the in-memory file table
    #[error("in-memory file table is poisoned")]
    Poisoned,

    #[error("IO error: {message}")]
    Io { message: String },
}

impl From<std::io::Error> for VfsError {
    fn from(err: std::io::Error) -> Self {
        VfsError::Io {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_kinds_collapse_to_message() {
        let err: VfsError = std::io::Error::other("disk on fire").into();
        assert_eq!(
            err,
            VfsError::Io {
                message: "disk on fire".to_string()
            }
        );
        assert_eq!(err.to_string(), "IO error: disk on fire");
    }
}
