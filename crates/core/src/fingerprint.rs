//! Content fingerprints
//!
//! An MD5 digest of a file's bytes, computed in fixed-size chunks so files
//! are never held in memory whole. The quoted hex form is what S3 reports as
//! the ETag of a single-part upload; the base64 form goes into `Content-MD5`.

use std::fmt;
use std::io::Read;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use md5::{Digest, Md5};

use crate::error::{Error, Result};

/// Read size used when hashing files: 64 KiB
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Digest of a byte stream with its two textual encodings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    digest: [u8; 16],
    hex: String,
    base64: String,
}

impl Fingerprint {
    /// Build a fingerprint from raw digest bytes
    pub fn from_digest(digest: [u8; 16]) -> Self {
        Self {
            hex: hex::encode(digest),
            base64: BASE64_STANDARD.encode(digest),
            digest,
        }
    }

    /// Fingerprint an in-memory buffer
    pub fn of_bytes(data: &[u8]) -> Self {
        Self::from_digest(Md5::digest(data).into())
    }

    /// Hash a reader in chunks of [`DEFAULT_CHUNK_SIZE`]
    pub fn from_reader<R: Read>(reader: R) -> std::io::Result<Self> {
        Self::from_reader_chunked(reader, DEFAULT_CHUNK_SIZE)
    }

    /// Hash a reader in chunks of `chunk_size` bytes
    pub fn from_reader_chunked<R: Read>(mut reader: R, chunk_size: usize) -> std::io::Result<Self> {
        let mut hasher = Md5::new();
        let mut buf = vec![0u8; chunk_size.max(1)];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buf[..n]);
        }
        Ok(Self::from_digest(hasher.finalize().into()))
    }

    /// Open, hash and close a local file
    pub fn of_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| Error::local_io(path, e))?;
        Self::from_reader(file).map_err(|e| Error::local_io(path, e))
    }

    pub fn digest(&self) -> &[u8; 16] {
        &self.digest
    }

    /// Lowercase hex encoding
    pub fn hex(&self) -> &str {
        &self.hex
    }

    /// Standard base64 encoding, as used by `Content-MD5`
    pub fn base64(&self) -> &str {
        &self.base64
    }

    /// Hex digest wrapped in double quotes, the shape of an S3 ETag
    pub fn etag(&self) -> String {
        format!("\"{}\"", self.hex)
    }

    /// True when the remote ETag is exactly this fingerprint's quoted hex
    pub fn matches_etag(&self, etag: &str) -> bool {
        etag.len() == self.hex.len() + 2
            && etag.starts_with('"')
            && etag.ends_with('"')
            && &etag[1..etag.len() - 1] == self.hex
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}
