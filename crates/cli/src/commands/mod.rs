//! CLI definition and dispatch
//!
//! s3deploy has no subcommands: the flags describe a single deploy pass.
//! `--completions` short-circuits to completion script generation.

use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;
use s3deploy_core::RunOptions;
use s3deploy_core::config::{
    DEFAULT_BUCKET, DEFAULT_CREDENTIALS_PATH, DEFAULT_DESTINATION, DEFAULT_REGION, DEFAULT_SOURCE,
};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod completions;
pub mod deploy;

/// s3deploy - mirror a local directory to an S3 bucket
///
/// Uploads files whose MD5 differs from the object already stored, with
/// per-extension Content-Type and long-lived cache headers. Without
/// --update nothing is written.
#[derive(Parser, Debug)]
#[command(name = "s3deploy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Target bucket
    #[arg(long, default_value = DEFAULT_BUCKET)]
    pub bucket: String,

    /// Load existing objects, skip unchanged files and report orphans
    #[arg(long)]
    pub check_existing: bool,

    /// Do not set Cache-Control and Expires headers
    #[arg(long)]
    pub nocache: bool,

    /// Destination prefix in the bucket
    #[arg(long, default_value = DEFAULT_DESTINATION)]
    pub output: String,

    /// Source directory on the local filesystem
    #[arg(long, default_value = DEFAULT_SOURCE)]
    pub input: String,

    /// Perform the uploads (otherwise just a dry run)
    #[arg(long)]
    pub update: bool,

    /// Print a line for every processed file
    #[arg(long)]
    pub verbose: bool,

    /// INI file with a [credentials] section
    #[arg(long, env = "S3DEPLOY_CREDENTIALS", default_value = DEFAULT_CREDENTIALS_PATH)]
    pub credentials: PathBuf,

    /// Signing region
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    /// Endpoint URL of an S3-compatible service
    #[arg(long, env = "S3DEPLOY_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Use path-style bucket addressing
    #[arg(long)]
    pub path_style: bool,

    /// TOML file adding or overriding per-extension headers
    #[arg(long, value_name = "FILE")]
    pub metadata: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

impl Cli {
    /// Options for the run configuration, before normalization
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            bucket: self.bucket.clone(),
            source: self.input.clone(),
            destination: self.output.clone(),
            check_existing: self.check_existing,
            set_cache_headers: !self.nocache,
            apply_changes: self.update,
            verbose: self.verbose,
        }
    }
}

/// Execute the CLI and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    if let Some(shell) = cli.completions {
        return completions::execute(shell);
    }

    let formatter = Formatter::new(OutputConfig {
        no_color: cli.no_color,
        no_progress: cli.no_progress,
    });

    deploy::execute(&cli, &formatter).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["s3deploy"]).unwrap();
        let options = cli.run_options();
        assert_eq!(options.bucket, "key.fileformat.info");
        assert_eq!(options.source, "./www");
        assert_eq!(options.destination, "/");
        assert!(options.set_cache_headers);
        assert!(!options.apply_changes);
        assert!(!options.check_existing);
        assert!(!options.verbose);
    }

    #[test]
    fn test_flags_map_to_options() {
        let cli = Cli::try_parse_from([
            "s3deploy",
            "--bucket",
            "cdn.example.com",
            "--check-existing",
            "--nocache",
            "--output",
            "/static",
            "--input",
            "site",
            "--update",
            "--verbose",
        ])
        .unwrap();
        let options = cli.run_options();
        assert_eq!(options.bucket, "cdn.example.com");
        assert_eq!(options.destination, "/static");
        assert_eq!(options.source, "site");
        assert!(options.check_existing);
        assert!(!options.set_cache_headers);
        assert!(options.apply_changes);
        assert!(options.verbose);
    }

    #[test]
    fn test_completions_flag() {
        let cli = Cli::try_parse_from(["s3deploy", "--completions", "zsh"]).unwrap();
        assert_eq!(cli.completions, Some(Shell::Zsh));
    }
}
