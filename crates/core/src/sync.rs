//! Diff-and-sync engine
//!
//! One pass over the local tree. Each file gets exactly one decision: skip
//! when its fingerprint equals the stored ETag, upload otherwise. Progress is
//! reported through [`SyncEvent`]s so callers decide how to render it.

use std::path::Path;

use crate::config::{RunConfig, SyncMode};
use crate::error::Result;
use crate::fingerprint::Fingerprint;
use crate::inventory::RemoteInventory;
use crate::metadata::{Header, MetadataTable};
use crate::traits::{ObjectStore, RemoteObjectInfo, UploadRequest};
use crate::walk::{self, LocalFile};

/// One year, in seconds
pub const CACHE_CONTROL: &str = "max-age=31536000";

/// Far-future expiry sent alongside [`CACHE_CONTROL`]
pub const FAR_FUTURE_EXPIRES: &str = "Thu, 31 Dec 2037 23:59:59 GMT";

/// Why a file is being uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadReason {
    /// No remote object with this key
    New,
    /// Remote object exists with a different fingerprint
    Changed,
    /// No inventory was loaded, nothing to compare against
    Forced,
}

impl UploadReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Changed => "changed",
            Self::Forced => "forced",
        }
    }
}

/// Outcome for a single local file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Skip,
    Upload(UploadReason),
}

/// Compare a local fingerprint with the matching inventory entry, if any
pub fn decide(mode: SyncMode, local: &Fingerprint, remote: Option<&RemoteObjectInfo>) -> Decision {
    match (mode, remote) {
        (SyncMode::Force, _) => Decision::Upload(UploadReason::Forced),
        (SyncMode::Diff, None) => Decision::Upload(UploadReason::New),
        (SyncMode::Diff, Some(remote)) => match remote.etag.as_deref() {
            Some(etag) if local.matches_etag(etag) => Decision::Skip,
            _ => Decision::Upload(UploadReason::Changed),
        },
    }
}

/// Counters accumulated over one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Files uploaded, or that would be uploaded in dry-run mode
    pub uploaded: u64,
    /// Files whose remote copy is already current
    pub skipped: u64,
    /// Bytes in the uploaded files
    pub uploaded_bytes: u64,
}

/// Result of a completed run
#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    pub stats: SyncStats,
    /// Remote objects no local file matched, sorted by key. Always empty in
    /// force mode.
    pub orphans: Vec<RemoteObjectInfo>,
}

/// Progress notifications emitted during a run
#[derive(Debug, Clone, Copy)]
pub enum SyncEvent<'a> {
    InventoryLoading {
        prefix: &'a str,
    },
    InventoryLoaded {
        count: usize,
    },
    Processing {
        path: &'a Path,
        key: &'a str,
    },
    Fingerprinted {
        key: &'a str,
        fingerprint: &'a Fingerprint,
    },
    Skipped {
        key: &'a str,
        fingerprint: &'a Fingerprint,
        remote_etag: &'a str,
    },
    Uploading {
        key: &'a str,
        size_bytes: u64,
        reason: UploadReason,
    },
    MissingMetadata {
        key: &'a str,
        extension: &'a str,
    },
}

/// Callback receiving [`SyncEvent`]s
pub type EventSink<'s> = dyn FnMut(SyncEvent<'_>) + Send + 's;

/// Runs one deploy pass against a store
#[derive(Debug)]
pub struct Deployer<'a, S: ?Sized> {
    store: &'a S,
    config: &'a RunConfig,
    metadata: &'a MetadataTable,
}

impl<'a, S: ObjectStore + ?Sized> Deployer<'a, S> {
    pub fn new(store: &'a S, config: &'a RunConfig, metadata: &'a MetadataTable) -> Self {
        Self {
            store,
            config,
            metadata,
        }
    }

    /// Load the inventory when diffing, then sync the whole tree
    pub async fn run(&self, on_event: &mut EventSink<'_>) -> Result<SyncOutcome> {
        let inventory = match self.config.mode() {
            SyncMode::Diff => {
                let prefix = self.config.destination();
                on_event(SyncEvent::InventoryLoading { prefix });
                let inventory = RemoteInventory::load(self.store, prefix).await?;
                on_event(SyncEvent::InventoryLoaded {
                    count: inventory.len(),
                });
                inventory
            }
            SyncMode::Force => RemoteInventory::default(),
        };

        self.sync(inventory, on_event).await
    }

    /// Walk the source tree, deciding and uploading file by file
    ///
    /// The inventory is owned by this call; entries matched by local files
    /// are removed and the remainder is returned as orphans.
    pub async fn sync(
        &self,
        mut inventory: RemoteInventory,
        on_event: &mut EventSink<'_>,
    ) -> Result<SyncOutcome> {
        let mut stats = SyncStats::default();

        for file in walk::scan(self.config.source_dir()) {
            let file = file?;
            self.sync_file(&file, &mut inventory, &mut stats, on_event)
                .await?;
        }

        let orphans = match self.config.mode() {
            SyncMode::Diff => inventory.into_orphans(),
            SyncMode::Force => Vec::new(),
        };

        Ok(SyncOutcome { stats, orphans })
    }

    async fn sync_file(
        &self,
        file: &LocalFile,
        inventory: &mut RemoteInventory,
        stats: &mut SyncStats,
        on_event: &mut EventSink<'_>,
    ) -> Result<()> {
        let key = file.remote_key(self.config.destination());
        if self.config.verbose() {
            on_event(SyncEvent::Processing {
                path: &file.path,
                key: &key,
            });
        }

        let fingerprint = Fingerprint::of_file(&file.path)?;
        on_event(SyncEvent::Fingerprinted {
            key: &key,
            fingerprint: &fingerprint,
        });

        let remote = inventory.take(&key);
        let reason = match decide(self.config.mode(), &fingerprint, remote.as_ref()) {
            Decision::Skip => {
                on_event(SyncEvent::Skipped {
                    key: &key,
                    fingerprint: &fingerprint,
                    remote_etag: remote.as_ref().and_then(|r| r.etag.as_deref()).unwrap_or_default(),
                });
                stats.skipped += 1;
                return Ok(());
            }
            Decision::Upload(reason) => reason,
        };

        on_event(SyncEvent::Uploading {
            key: &key,
            size_bytes: file.size_bytes,
            reason,
        });
        stats.uploaded += 1;
        stats.uploaded_bytes += file.size_bytes;

        if !self.config.apply_changes() {
            return Ok(());
        }

        let headers = match upload_headers(self.config, self.metadata, &fingerprint, &file.extension) {
            Some(headers) => headers,
            None => {
                on_event(SyncEvent::MissingMetadata {
                    key: &key,
                    extension: &file.extension,
                });
                base_headers(self.config, &fingerprint)
            }
        };

        let request = UploadRequest {
            key,
            source: file.path.clone(),
            size_bytes: file.size_bytes,
            headers,
        };
        tracing::debug!("put {} with {} headers", request.key, request.headers.len());
        self.store.put_object(&request).await
    }
}

/// Integrity and cache headers every upload carries
pub fn base_headers(config: &RunConfig, fingerprint: &Fingerprint) -> Vec<Header> {
    let mut headers = vec![Header::new("Content-MD5", fingerprint.base64())];
    if config.set_cache_headers() {
        headers.push(Header::new("Cache-Control", CACHE_CONTROL));
        headers.push(Header::new("Expires", FAR_FUTURE_EXPIRES));
    }
    headers
}

/// Full header list for an upload, or `None` when the extension has no
/// metadata entry
pub fn upload_headers(
    config: &RunConfig,
    metadata: &MetadataTable,
    fingerprint: &Fingerprint,
    extension: &str,
) -> Option<Vec<Header>> {
    let extra = metadata.lookup(extension)?;
    let mut headers = base_headers(config, fingerprint);
    headers.extend_from_slice(extra);
    Some(headers)
}
