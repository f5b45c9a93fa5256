//! Error types for s3deploy-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for s3deploy-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for s3deploy-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Credentials file lacks `access_key_id`
    #[error("Invalid account: No id (no access_key_id in {})", .0.display())]
    MissingAccessKeyId(PathBuf),

    /// Credentials file lacks `secret_access_key`
    #[error("Invalid account: No secret (no secret_access_key in {})", .0.display())]
    MissingSecretKey(PathBuf),

    /// Invalid configuration input (metadata file, endpoint, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// IO error on a specific local file
    #[error("Cannot read {}: {source}", path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal error
    #[error("Cannot walk source tree: {0}")]
    Walk(#[from] walkdir::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// INI parsing error
    #[error("Credentials parse error: {0}")]
    Ini(#[from] ini::ParseError),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport error while talking to the object store
    #[error("Network error: {0}")]
    Network(String),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::MissingAccessKeyId(_) => 1,
            Error::MissingSecretKey(_) => 2,
            Error::Network(_) => 3,
            Error::Auth(_) => 4,
            Error::NotFound(_) => 5,
            Error::Config(_) | Error::InvalidUrl(_) | Error::TomlParse(_) | Error::Ini(_) => 64,
            Error::Io(_) | Error::LocalIo { .. } | Error::Walk(_) => 74,
        }
    }

    /// Wrap an IO error with the path it occurred on
    pub fn local_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::LocalIo {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::MissingAccessKeyId("a.ini".into()).exit_code(), 1);
        assert_eq!(Error::MissingSecretKey("a.ini".into()).exit_code(), 2);
        assert_eq!(Error::Network("test".into()).exit_code(), 3);
        assert_eq!(Error::Auth("test".into()).exit_code(), 4);
        assert_eq!(Error::NotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::Config("test".into()).exit_code(), 64);
        assert_eq!(
            Error::local_io("www/a.png", std::io::Error::other("boom")).exit_code(),
            74
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::MissingAccessKeyId("/etc/key.ini".into());
        assert_eq!(
            err.to_string(),
            "Invalid account: No id (no access_key_id in /etc/key.ini)"
        );

        let err = Error::MissingSecretKey("/etc/key.ini".into());
        assert!(err.to_string().starts_with("Invalid account: No secret"));

        let err = Error::local_io(
            "www/a.png",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.to_string(), "Cannot read www/a.png: gone");
    }
}
