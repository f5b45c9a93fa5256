//! Run configuration and credentials
//!
//! Merges command-line options with the credentials file into an immutable
//! [`RunConfig`] plus a [`Credentials`] pair. Path normalization happens here
//! and nowhere else.

use std::fmt;
use std::path::Path;

use ini::Ini;
use url::Url;

use crate::error::{Error, Result};

/// Default bucket name
pub const DEFAULT_BUCKET: &str = "key.fileformat.info";

/// Default local source directory
pub const DEFAULT_SOURCE: &str = "./www";

/// Default remote destination prefix
pub const DEFAULT_DESTINATION: &str = "/";

/// Default credentials file location
pub const DEFAULT_CREDENTIALS_PATH: &str = "/etc/fileformatnet/rosetta-key.ini";

/// Default signing region
pub const DEFAULT_REGION: &str = "us-east-1";

/// INI section holding the credentials
const CREDENTIALS_SECTION: &str = "credentials";
const ACCESS_KEY_ID: &str = "access_key_id";
const SECRET_ACCESS_KEY: &str = "secret_access_key";

/// Raw, unnormalized options as given on the command line
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub bucket: String,
    pub source: String,
    pub destination: String,
    pub check_existing: bool,
    pub set_cache_headers: bool,
    pub apply_changes: bool,
    pub verbose: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            source: DEFAULT_SOURCE.to_string(),
            destination: DEFAULT_DESTINATION.to_string(),
            check_existing: false,
            set_cache_headers: true,
            apply_changes: false,
            verbose: false,
        }
    }
}

/// How local files are compared against the bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// No inventory: every local file is uploaded
    Force,
    /// Inventory loaded: unchanged files are skipped, orphans reported
    Diff,
}

/// Effective configuration for one run. Never mutated after [`RunConfig::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    bucket: String,
    source: String,
    destination: String,
    check_existing: bool,
    set_cache_headers: bool,
    apply_changes: bool,
    verbose: bool,
}

impl RunConfig {
    /// Build the effective configuration, normalizing both paths
    pub fn resolve(options: RunOptions) -> Self {
        Self {
            bucket: options.bucket,
            source: normalize_source(&options.source),
            destination: normalize_destination(&options.destination),
            check_existing: options.check_existing,
            set_cache_headers: options.set_cache_headers,
            apply_changes: options.apply_changes,
            verbose: options.verbose,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Source directory, always ending with a path separator
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn source_dir(&self) -> &Path {
        Path::new(&self.source)
    }

    /// Destination prefix, never starting with `/`
    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn check_existing(&self) -> bool {
        self.check_existing
    }

    pub fn set_cache_headers(&self) -> bool {
        self.set_cache_headers
    }

    /// False in dry-run mode
    pub fn apply_changes(&self) -> bool {
        self.apply_changes
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn mode(&self) -> SyncMode {
        if self.check_existing {
            SyncMode::Diff
        } else {
            SyncMode::Force
        }
    }
}

/// Append a path separator unless the path already ends with one
pub fn normalize_source(source: &str) -> String {
    if source.chars().last().is_some_and(std::path::is_separator) {
        source.to_string()
    } else {
        format!("{source}{}", std::path::MAIN_SEPARATOR)
    }
}

/// Strip every leading `/` so keys never start with one
pub fn normalize_destination(destination: &str) -> String {
    destination.trim_start_matches('/').to_string()
}

/// Access key pair read from the credentials file
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Load credentials from an INI file with a `[credentials]` section
    ///
    /// A missing file is treated like a file without keys, so the caller
    /// sees [`Error::MissingAccessKeyId`].
    pub fn load(path: &Path) -> Result<Self> {
        let ini = match Ini::load_from_file(path) {
            Ok(ini) => ini,
            Err(ini::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("credentials file {} does not exist", path.display());
                Ini::new()
            }
            Err(ini::Error::Io(e)) => return Err(Error::local_io(path, e)),
            Err(ini::Error::Parse(e)) => return Err(Error::Ini(e)),
        };

        let section = ini.section(Some(CREDENTIALS_SECTION));
        let lookup = |key: &str| {
            section
                .and_then(|props| props.get(key))
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let access_key_id =
            lookup(ACCESS_KEY_ID).ok_or_else(|| Error::MissingAccessKeyId(path.to_path_buf()))?;
        let secret_access_key =
            lookup(SECRET_ACCESS_KEY).ok_or_else(|| Error::MissingSecretKey(path.to_path_buf()))?;

        Ok(Self {
            access_key_id,
            secret_access_key,
        })
    }
}

/// Merge options and the credentials file into the run configuration
///
/// Fails before any network activity when a credential field is missing.
pub fn resolve(options: RunOptions, credentials_path: &Path) -> Result<(RunConfig, Credentials)> {
    let credentials = Credentials::load(credentials_path)?;
    Ok((RunConfig::resolve(options), credentials))
}

/// Where and how to reach the object store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionOptions {
    pub region: String,
    pub endpoint: Option<Url>,
    pub force_path_style: bool,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
            force_path_style: false,
        }
    }
}

impl ConnectionOptions {
    /// Create connection options, validating the optional endpoint URL
    pub fn new(region: impl Into<String>, endpoint: Option<&str>, force_path_style: bool) -> Result<Self> {
        let endpoint = endpoint.map(Url::parse).transpose()?;
        if let Some(url) = &endpoint {
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::Config(format!(
                    "endpoint must use http or https, got '{}'",
                    url.scheme()
                )));
            }
        }

        Ok(Self {
            region: region.into(),
            endpoint,
            force_path_style,
        })
    }
}
