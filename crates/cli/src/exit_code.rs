//! Exit code definitions for s3deploy
//!
//! Codes 1 and 2 are relied upon by deploy scripts to detect a broken
//! credentials file; do not renumber them.

use s3deploy_core::Error;

/// Exit codes for the s3deploy binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Deploy pass completed
    Success = 0,

    /// Credentials file has no access key id
    MissingAccessKeyId = 1,

    /// Credentials file has no secret access key
    MissingSecretKey = 2,

    /// Listing, bucket probe or upload failed in transport
    NetworkError = 3,

    /// The store rejected the credentials
    AuthError = 4,

    /// Bucket does not exist
    NotFound = 5,

    /// Invalid option value or metadata file
    UsageError = 64,

    /// Local file or directory could not be read
    IoError = 74,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::MissingAccessKeyId),
            2 => Some(Self::MissingSecretKey),
            3 => Some(Self::NetworkError),
            4 => Some(Self::AuthError),
            5 => Some(Self::NotFound),
            64 => Some(Self::UsageError),
            74 => Some(Self::IoError),
            _ => None,
        }
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Deploy completed",
            Self::MissingAccessKeyId => "Credentials missing access_key_id",
            Self::MissingSecretKey => "Credentials missing secret_access_key",
            Self::NetworkError => "Transport error",
            Self::AuthError => "Authentication or permission failure",
            Self::NotFound => "Bucket not found",
            Self::UsageError => "Invalid arguments or configuration",
            Self::IoError => "Local I/O error",
        }
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        Self::from_i32(err.exit_code()).unwrap_or(Self::UsageError)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::MissingAccessKeyId.as_i32(), 1);
        assert_eq!(ExitCode::MissingSecretKey.as_i32(), 2);
        assert_eq!(ExitCode::NetworkError.as_i32(), 3);
        assert_eq!(ExitCode::UsageError.as_i32(), 64);
        assert_eq!(ExitCode::IoError.as_i32(), 74);
    }

    #[test]
    fn test_exit_code_round_trips_known_values() {
        for code in [0, 1, 2, 3, 4, 5, 64, 74] {
            assert_eq!(ExitCode::from_i32(code).map(ExitCode::as_i32), Some(code));
        }
        assert_eq!(ExitCode::from_i32(99), None);
    }

    #[test]
    fn test_exit_code_from_error() {
        let missing_id = Error::MissingAccessKeyId("/etc/key.ini".into());
        assert_eq!(ExitCode::from(&missing_id), ExitCode::MissingAccessKeyId);

        let missing_secret = Error::MissingSecretKey("/etc/key.ini".into());
        assert_eq!(ExitCode::from(&missing_secret), ExitCode::MissingSecretKey);

        let network = Error::Network("timeout".into());
        assert_eq!(ExitCode::from(&network), ExitCode::NetworkError);

        let bad_file = Error::Config("bad header".into());
        assert_eq!(ExitCode::from(&bad_file), ExitCode::UsageError);
    }

    #[test]
    fn test_exit_code_display() {
        let display = format!("{}", ExitCode::MissingSecretKey);
        assert!(display.contains("2"));
        assert!(display.contains("secret_access_key"));
    }
}
