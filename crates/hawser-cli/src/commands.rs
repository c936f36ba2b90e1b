use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::watch;
use tracing::info;

use hawser_chain::{JsonlLedger, LedgerClient};
use hawser_index::{CheckpointStore, SledIndex};
use hawser_mirror::{MirrorContext, Reconciler, Supervisor};
use hawser_store::{FsNetwork, FsStaging, MemoryArchive};

use crate::cli::{CheckpointAction, Cli, Command};
use crate::config::HawserConfig;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = HawserConfig::load(&cli.config)?;
    match cli.command {
        Command::Run => run_daemon(&config).await,
        Command::Sweep => run_sweep(&config).await,
        Command::Checkpoint { action } => run_checkpoint(&config, action).await,
    }
}

/// Assemble the pipeline context from the configured local backends.
fn build_context(config: &HawserConfig) -> anyhow::Result<Arc<MirrorContext>> {
    let index = Arc::new(
        SledIndex::open(&config.storage.index_path).context("opening bookkeeping index")?,
    );
    let staging =
        Arc::new(FsStaging::open(&config.storage.staging_dir).context("opening staging area")?);
    let network =
        Arc::new(FsNetwork::open(&config.storage.objects_dir).context("opening object store")?);
    let chain = Arc::new(JsonlLedger::new(
        &config.chain.feed_path,
        Duration::from_secs(config.chain.poll_interval_secs),
    ));

    Ok(Arc::new(MirrorContext::new(
        config.mirror_config(),
        chain,
        index.clone(),
        index,
        network,
        staging,
        Arc::new(MemoryArchive::new()),
    )))
}

async fn run_daemon(config: &HawserConfig) -> anyhow::Result<()> {
    let ctx = build_context(config)?;
    info!(
        environment = ?config.environment,
        feed = %config.chain.feed_path.display(),
        "starting hawser daemon"
    );

    let supervisor = Arc::new(Supervisor::new(ctx.clone()));
    let reconciler = Arc::new(Reconciler::new(ctx));
    let (stop_tx, stop_rx) = watch::channel(false);

    let lifecycle = {
        let supervisor = supervisor.clone();
        tokio::spawn(async move { supervisor.run().await })
    };
    let probe = {
        let supervisor = supervisor.clone();
        let stop = stop_rx.clone();
        tokio::spawn(async move { supervisor.run_probe(stop).await })
    };
    let sweeper = {
        let reconciler = reconciler.clone();
        tokio::spawn(async move { reconciler.run(stop_rx).await })
    };

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    info!("shutdown signal received");

    stop_tx.send_replace(true);
    lifecycle.abort();
    let _ = probe.await;
    let _ = sweeper.await;
    Ok(())
}

async fn run_sweep(config: &HawserConfig) -> anyhow::Result<()> {
    let ctx = build_context(config)?;
    ctx.chain.connect().await.context("connecting to the ledger feed")?;

    let report = Reconciler::new(ctx)
        .sweep()
        .await
        .context("running reconciliation sweep")?;
    println!(
        "expired: {}  mirrored: {}  purged: {}  retained: {}",
        report.expired, report.mirrored, report.purged, report.retained
    );
    Ok(())
}

async fn run_checkpoint(config: &HawserConfig, action: CheckpointAction) -> anyhow::Result<()> {
    let index =
        SledIndex::open(&config.storage.index_path).context("opening bookkeeping index")?;
    match action {
        CheckpointAction::Show => match index.load().await? {
            Some(block) => println!("last event block: {block}"),
            None => println!("no checkpoint set"),
        },
        CheckpointAction::Clear => {
            index.clear().await?;
            println!("checkpoint cleared");
        }
    }
    Ok(())
}
