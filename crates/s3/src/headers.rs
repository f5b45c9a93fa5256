//! Header name mapping
//!
//! Translates the generic header pairs of an upload request into the typed
//! fields of a PutObject call. Unknown names become user metadata.

use aws_smithy_types::DateTime;
use aws_smithy_types::date_time::Format;

use s3deploy_core::{Error, Result};

const USER_METADATA_PREFIX: &str = "x-amz-meta-";

/// A header classified by the PutObject field it maps to
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectHeader {
    ContentType(String),
    ContentMd5(String),
    CacheControl(String),
    Expires(DateTime),
    ContentEncoding(String),
    ContentDisposition(String),
    ContentLanguage(String),
    Metadata(String, String),
}

impl ObjectHeader {
    /// Classify a header by name, case-insensitively
    ///
    /// `Expires` must be an HTTP date.
    pub fn parse(name: &str, value: &str) -> Result<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let value = value.to_string();
        let header = match lower.as_str() {
            "content-type" => Self::ContentType(value),
            "content-md5" => Self::ContentMd5(value),
            "cache-control" => Self::CacheControl(value),
            "content-encoding" => Self::ContentEncoding(value),
            "content-disposition" => Self::ContentDisposition(value),
            "content-language" => Self::ContentLanguage(value),
            "expires" => {
                let date = DateTime::from_str(&value, Format::HttpDate).map_err(|e| {
                    Error::Config(format!("invalid Expires value '{value}': {e}"))
                })?;
                Self::Expires(date)
            }
            other => {
                let key = other.strip_prefix(USER_METADATA_PREFIX).unwrap_or(other);
                Self::Metadata(key.to_string(), value)
            }
        };
        Ok(header)
    }
}
