//! deploy - the single pass performed by s3deploy
//!
//! Resolves configuration, connects, runs the sync engine and prints the
//! report. Any error stops the run with an `ERROR:` line.

use s3deploy_core::config;
use s3deploy_core::{
    ConnectionOptions, Deployer, Error, MetadataTable, ObjectStore, Result, RunConfig, SyncEvent,
    SyncOutcome,
};
use s3deploy_s3::S3Client;

use super::Cli;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, ProgressBar, report};

/// Execute the deploy pass
pub async fn execute(cli: &Cli, formatter: &Formatter) -> ExitCode {
    match run(cli, formatter).await {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from(&e)
        }
    }
}

async fn run(cli: &Cli, formatter: &Formatter) -> Result<()> {
    let metadata = match &cli.metadata {
        Some(path) => MetadataTable::load(path)?,
        None => MetadataTable::builtin(),
    };

    // Credentials are checked before anything touches the network
    let (config, credentials) = config::resolve(cli.run_options(), &cli.credentials)?;
    for line in report::start_lines(&config) {
        formatter.line(&line);
    }

    let connection =
        ConnectionOptions::new(cli.region.as_str(), cli.endpoint.as_deref(), cli.path_style)?;
    let client = S3Client::new(config.bucket(), &credentials, &connection).await?;

    let outcome = deploy(&client, &config, &metadata, formatter).await?;
    for line in report::summary_lines(&outcome, &config) {
        formatter.line(&line);
    }

    Ok(())
}

/// Probe the bucket, then sync the tree while printing progress
pub async fn deploy<S: ObjectStore + ?Sized>(
    store: &S,
    config: &RunConfig,
    metadata: &MetadataTable,
    formatter: &Formatter,
) -> Result<SyncOutcome> {
    if !store.bucket_exists().await? {
        return Err(Error::NotFound(format!("bucket '{}'", config.bucket())));
    }

    let mut spinner: Option<ProgressBar> = None;
    let mut on_event = |event: SyncEvent<'_>| {
        if let SyncEvent::InventoryLoaded { .. } = event {
            if let Some(bar) = spinner.take() {
                bar.finish_and_clear();
            }
        }
        formatter.line(&report::event_line(&event));
        if let SyncEvent::InventoryLoading { .. } = event {
            spinner = Some(ProgressBar::spinner(
                formatter.config(),
                "listing remote objects",
            ));
        }
    };

    let outcome = Deployer::new(store, config, metadata)
        .run(&mut on_event)
        .await;

    if let Some(bar) = spinner.take() {
        bar.finish_and_clear();
    }
    if let Ok(outcome) = &outcome {
        tracing::debug!(
            "{} uploads totalling {}",
            outcome.stats.uploaded,
            humansize::format_size(outcome.stats.uploaded_bytes, humansize::BINARY)
        );
    }
    outcome
}
