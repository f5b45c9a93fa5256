//! Per-extension object metadata
//!
//! Maps a file extension to the ordered header pairs applied on upload.
//! Built once at startup (built-ins plus an optional TOML override file) and
//! read-only afterwards.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// A single header applied to an uploaded object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// RFC 7231 IMF-fixdate, the only form accepted for `Expires`
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

const BUILTIN_CONTENT_TYPES: &[(&str, &str)] = &[
    (".gif", "image/gif"),
    (".html", "text/html; charset=UTF-8"),
    (".ico", "image/x-icon"),
    (".jpeg", "image/jpeg"),
    (".jpg", "image/jpeg"),
    (".json", "application/x-javascript; charset=UTF-8"),
    (".m4a", "audio/mp4"),
    (".pdf", "application/pdf"),
    (".png", "image/png"),
    (".properties", "text/plain; charset=UTF-8"),
    (".rdf", "application/rdf+xml"),
    (".svg", "image/svg+xml"),
    (".swf", "application/x-shockwave-flash"),
    (".tiff", "image/tiff"),
    (".txt", "text/plain; charset=UTF-8"),
    (".xml", "text/xml; charset=UTF-8"),
    (".xpi", "application/x-xpinstall"),
];

/// Shape of the metadata override file
#[derive(Debug, Deserialize)]
struct MetadataFile {
    #[serde(default)]
    extensions: BTreeMap<String, Vec<(String, String)>>,
}

/// Extension to header list mapping
#[derive(Debug, Clone)]
pub struct MetadataTable {
    entries: HashMap<String, Vec<Header>>,
}

impl Default for MetadataTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MetadataTable {
    /// A table with no entries; every extension is unknown
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// The built-in content types for common web assets
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for (ext, content_type) in BUILTIN_CONTENT_TYPES {
            table.insert(ext, vec![Header::new("Content-Type", *content_type)]);
        }
        table
    }

    /// Built-ins extended by a TOML override file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::local_io(path, e))?;
        let mut table = Self::builtin();
        table.merge_toml(&content)?;
        Ok(table)
    }

    /// Apply overrides from TOML text. An override replaces the whole entry.
    ///
    /// Every header is validated here so a bad file fails before any upload.
    pub fn merge_toml(&mut self, content: &str) -> Result<()> {
        let file: MetadataFile = toml::from_str(content)?;
        let mut overrides = Vec::with_capacity(file.extensions.len());
        for (ext, headers) in file.extensions {
            let headers = headers
                .into_iter()
                .map(|(name, value)| Header::new(name.trim(), value))
                .collect::<Vec<_>>();
            for header in &headers {
                validate_header(&ext, header)?;
            }
            overrides.push((ext, headers));
        }

        for (ext, headers) in overrides {
            self.insert(&ext, headers);
        }
        Ok(())
    }

    /// Insert or replace the headers for an extension (with or without the dot)
    pub fn insert(&mut self, extension: &str, headers: Vec<Header>) {
        self.entries.insert(normalize_extension(extension), headers);
    }

    /// Headers declared for an extension, matched case-insensitively
    pub fn lookup(&self, extension: &str) -> Option<&[Header]> {
        if extension.is_empty() {
            return None;
        }
        self.entries
            .get(&normalize_extension(extension))
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reject headers the uploader cannot send as declared
fn validate_header(ext: &str, header: &Header) -> Result<()> {
    if header.name.is_empty() {
        return Err(Error::Config(format!(
            "empty header name for extension '{ext}'"
        )));
    }
    if header.name.eq_ignore_ascii_case("Content-MD5") {
        return Err(Error::Config(format!(
            "Content-MD5 is computed per file and cannot be set for extension '{ext}'"
        )));
    }
    if header.name.eq_ignore_ascii_case("Expires") {
        jiff::civil::DateTime::strptime(HTTP_DATE_FORMAT, &header.value).map_err(|e| {
            Error::Config(format!(
                "invalid Expires value '{}' for extension '{ext}': {e}",
                header.value
            ))
        })?;
    }
    Ok(())
}

fn normalize_extension(extension: &str) -> String {
    let ext = extension.trim().to_ascii_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_type(table: &MetadataTable, ext: &str) -> Option<String> {
        table
            .lookup(ext)?
            .iter()
            .find(|h| h.name == "Content-Type")
            .map(|h| h.value.clone())
    }

    #[test]
    fn test_builtin_covers_web_assets() {
        let table = MetadataTable::builtin();
        for ext in [
            ".gif", ".html", ".ico", ".jpeg", ".jpg", ".json", ".m4a", ".pdf", ".png",
            ".properties", ".rdf", ".svg", ".swf", ".tiff", ".txt", ".xml", ".xpi",
        ] {
            assert!(table.lookup(ext).is_some(), "missing {ext}");
        }
        assert_eq!(content_type(&table, ".png").as_deref(), Some("image/png"));
        assert_eq!(
            content_type(&table, ".html").as_deref(),
            Some("text/html; charset=UTF-8")
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = MetadataTable::builtin();
        assert_eq!(content_type(&table, ".JPG").as_deref(), Some("image/jpeg"));
    }

    #[test]
    fn test_unknown_and_empty_extensions() {
        let table = MetadataTable::builtin();
        assert!(table.lookup(".woff").is_none());
        assert!(table.lookup("").is_none());
    }

    #[test]
    fn test_merge_toml_overrides_and_extends() {
        let mut table = MetadataTable::builtin();
        table
            .merge_toml(
                r#"
                [extensions]
                ".woff" = [["Content-Type", "font/woff"]]
                "png" = [["Content-Type", "image/png"], ["Content-Disposition", "inline"]]
                "#,
            )
            .unwrap();

        assert_eq!(content_type(&table, ".woff").as_deref(), Some("font/woff"));
        let png = table.lookup(".png").unwrap();
        assert_eq!(
            png,
            &[
                Header::new("Content-Type", "image/png"),
                Header::new("Content-Disposition", "inline"),
            ]
        );
    }

    #[test]
    fn test_merge_toml_rejects_bad_input() {
        let mut table = MetadataTable::builtin();
        assert!(matches!(
            table.merge_toml("extensions = 3"),
            Err(Error::TomlParse(_))
        ));
        assert!(matches!(
            table.merge_toml("[extensions]\n\".x\" = [[\" \", \"v\"]]"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_merge_toml_rejects_unparseable_expires() {
        let mut table = MetadataTable::builtin();
        let err = table
            .merge_toml("[extensions]\n\".woff\" = [[\"Expires\", \"soon\"]]\n")
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(table.lookup(".woff").is_none());
    }

    #[test]
    fn test_merge_toml_accepts_http_date_expires() {
        let mut table = MetadataTable::builtin();
        table
            .merge_toml(&format!(
                "[extensions]\n\".woff\" = [[\"expires\", \"{}\"]]\n",
                crate::sync::FAR_FUTURE_EXPIRES
            ))
            .unwrap();
        assert!(table.lookup(".woff").is_some());
    }

    #[test]
    fn test_merge_toml_rejects_content_md5() {
        let mut table = MetadataTable::builtin();
        let err = table
            .merge_toml("[extensions]\n\".txt\" = [[\"Content-MD5\", \"XUFAKrxLKna5cZ2REBfFkg==\"]]\n")
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(
            content_type(&table, ".txt").as_deref(),
            Some("text/plain; charset=UTF-8")
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.toml");
        std::fs::write(&path, "[extensions]\n\"woff2\" = [[\"Content-Type\", \"font/woff2\"]]\n")
            .unwrap();

        let table = MetadataTable::load(&path).unwrap();
        assert_eq!(content_type(&table, ".woff2").as_deref(), Some("font/woff2"));
        assert_eq!(table.len(), BUILTIN_CONTENT_TYPES.len() + 1);
    }
}
