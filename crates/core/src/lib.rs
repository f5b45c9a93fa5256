//! s3deploy-core: Core library for the s3deploy mirroring tool
//!
//! This crate provides everything a deploy pass needs that is independent of
//! a particular S3 SDK:
//! - Run configuration and credentials resolution
//! - Content fingerprints (MD5 in hex and base64 form)
//! - The per-extension metadata table
//! - The ObjectStore trait and the remote inventory built on it
//! - Local tree traversal and the diff-and-sync engine

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod inventory;
pub mod metadata;
pub mod sync;
pub mod traits;
pub mod walk;

#[cfg(test)]
mod testing;

pub use config::{ConnectionOptions, Credentials, RunConfig, RunOptions, SyncMode};
pub use error::{Error, Result};
pub use fingerprint::Fingerprint;
pub use inventory::RemoteInventory;
pub use metadata::{Header, MetadataTable};
pub use sync::{Decision, Deployer, SyncEvent, SyncOutcome, SyncStats, UploadReason};
pub use traits::{ListOptions, ListResult, ObjectStore, RemoteObjectInfo, UploadRequest};
pub use walk::LocalFile;
