use colored::Colorize;
use rootline_crypto::LeafScheme;
use rootline_ledger::{FileLedger, InMemoryLedger, RootLedger};
use rootline_sync::{FinishReason, HttpBundleSource, HttpContentStore, PoolIterator, RunSummary};

use crate::cli::*;
use crate::config::RootlineConfig;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = RootlineConfig::from_cli(&cli)?;
    match cli.command {
        Command::Start(args) => cmd_start(&config, args).await,
        Command::Inspect(args) => cmd_inspect(&config, args).await,
        Command::Show(args) => cmd_show(&config, args),
    }
}

fn transports(config: &RootlineConfig) -> anyhow::Result<(HttpBundleSource, HttpContentStore)> {
    let http = config.http();
    let client = http.client()?;
    let source = HttpBundleSource::new(client.clone(), &config.chain_rest, http.clone());
    let store = HttpContentStore::new(client, &config.storage_rest, http);
    Ok((source, store))
}

async fn cmd_start(config: &RootlineConfig, args: StartArgs) -> anyhow::Result<()> {
    let ledger = FileLedger::open_for_pool(&config.ledger_dir, args.pool_id)?;
    let (source, store) = transports(config)?;
    let mut iter_config = config.iterator();
    iter_config.stop_before = args.stop_before;

    let mut iterator = PoolIterator::new(args.pool_id, source, store, ledger, iter_config);
    let summary = iterator.run().await?;
    println!("{}", render_summary(&summary));
    println!("  Ledger: {}", iterator.ledger().path().display());
    Ok(())
}

async fn cmd_inspect(config: &RootlineConfig, args: InspectArgs) -> anyhow::Result<()> {
    let scheme = match &args.runtime {
        Some(runtime) => LeafScheme::from_runtime(runtime)?,
        None => LeafScheme::for_pool(args.pool_id),
    };
    let (source, store) = transports(config)?;
    let iterator = PoolIterator::new(
        args.pool_id,
        source,
        store,
        InMemoryLedger::new(),
        config.iterator(),
    )
    .with_scheme(scheme);

    let (bundle, root) = iterator.inspect(args.bundle_id).await?;
    println!("{} Bundle {} of pool {} verified", "✓".green().bold(), bundle.id.to_string().yellow(), args.pool_id);
    println!("  Storage: {}", bundle.storage_id.blue());
    println!("  Scheme: {}", scheme.to_string().cyan());
    println!("  Root: {}", root.to_hex().bold());
    Ok(())
}

fn cmd_show(config: &RootlineConfig, args: ShowArgs) -> anyhow::Result<()> {
    let ledger = FileLedger::open_existing_for_pool(&config.ledger_dir, args.pool_id)?;
    println!("Pool {} ledger: {}", args.pool_id.to_string().yellow().bold(), ledger.path().display());
    for line in show_lines(&ledger, args.from, args.limit)? {
        println!("{line}");
    }
    Ok(())
}

fn show_lines(ledger: &impl RootLedger, from: u64, limit: u64) -> anyhow::Result<Vec<String>> {
    let len = ledger.len()?;
    let start = from.min(len);
    let end = start.saturating_add(limit).min(len);

    let mut lines = vec![format!("{len} roots, resume offset {}", ledger.resume_offset()?)];
    for (bundle_id, digest) in (start..).zip(ledger.read_range(start, end)?) {
        lines.push(format!("{bundle_id:>8}  {digest}"));
    }
    Ok(lines)
}

fn render_summary(summary: &RunSummary) -> String {
    let finish = match summary.finish {
        FinishReason::FinalizedRoot { bundle_id } => {
            format!("caught up with upstream roots at bundle {bundle_id}")
        }
        FinishReason::TargetReached { stop_before } => format!("reached target bundle {stop_before}"),
        FinishReason::Exhausted { offset } => format!("no bundles available past {offset}"),
    };
    format!(
        "{} Pool {}: wrote {} roots ({} → {}), {}",
        "✓".green().bold(),
        summary.pool,
        summary.bundles_written.to_string().bold(),
        summary.start_offset,
        summary.end_offset,
        finish
    )
}
