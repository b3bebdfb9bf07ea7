use std::fmt;

/// Errors that can occur during attachment storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// An I/O error occurred.
    Io(std::io::Error),
    /// The asset prefix or a file name is unusable (empty, not flat, ...).
    InvalidName(String),
    /// The upload exceeds the configured size limit.
    SizeLimitExceeded { actual: u64, limit: u64 },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::InvalidName(msg) => write!(f, "invalid attachment name: {msg}"),
            Self::SizeLimitExceeded { actual, limit } => {
                write!(f, "file exceeds size limit ({actual} > {limit} bytes)")
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
