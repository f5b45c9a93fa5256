//! s3deploy-s3: S3 SDK adapter for s3deploy
//!
//! This crate provides the implementation of the ObjectStore trait
//! using the aws-sdk-s3 crate. It is the only crate that directly
//! depends on the AWS SDK.

pub mod client;
pub mod headers;

pub use client::S3Client;
