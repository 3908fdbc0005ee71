//! Error types for the memfs core

/// Core filesystem error type
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FsError {
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("is a directory")]
    IsADirectory,
    #[error("not a directory")]
    NotADirectory,
    #[error("directory not empty")]
    NotEmpty,
    #[error("operation not permitted")]
    NotPermitted,
    #[error("name not allowed")]
    InvalidName,
    #[error("out of memory")]
    OutOfMemory,
    #[error("unsupported")]
    Unsupported,
}

pub type FsResult<T> = Result<T, FsError>;
