//! s3deploy CLI library
//!
//! Exposes the CLI components so they can be exercised from tests.

pub mod commands;
pub mod exit_code;
pub mod output;
