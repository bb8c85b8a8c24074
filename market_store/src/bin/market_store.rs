use std::{collections::HashMap, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use investment_scoring::{RawBar, ScoringPipeline, ScoringReport};
use market_data_ingestor::{
    ingest::{IngestReport, IngestStage, ingest_universe},
    providers::alpha_vantage::AlphaVantageProvider,
};
use market_store::{
    config::{AppConfig, load_config_path},
    db::{connection::connect_sqlite, migrate},
    repo,
};
use shared_utils::logging::init_tracing;
use tracing::{info, warn};

#[derive(Parser)]
#[command(version, about = "Daily market data ingestion, scoring and storage")]
struct Cli {
    /// Configuration file.
    #[arg(long, value_name = "FILE", default_value = "market.toml", global = true)]
    config: PathBuf,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Apply pending schema migrations.
    Migrate,
    /// Fetch bars, indicators and fundamentals for every configured symbol.
    Ingest,
    /// Score stored (or file-provided) rows and print the latest signals.
    Score(ScoreArgs),
    /// Print the most recent stored signal of every symbol.
    Latest,
}

#[derive(Args)]
struct ScoreArgs {
    /// Read a JSON array of rows instead of the database join.
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,
    /// Write the full scoring report as JSON.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Replace the `investment_scores` table with the result.
    #[arg(long)]
    persist: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("info");
    let cli = Cli::parse();
    let cfg = load_config_path(&cli.config)?.with_env_overrides();

    match cli.cmd {
        Cmd::Migrate => {
            let applied = migrate::run_all(&cfg.database_url)?;
            info!(applied, "database is up to date");
        }
        Cmd::Ingest => ingest(&cfg).await?,
        Cmd::Score(args) => score(&cfg, args)?,
        Cmd::Latest => latest(&cfg)?,
    }

    Ok(())
}

async fn ingest(cfg: &AppConfig) -> Result<()> {
    let provider = AlphaVantageProvider::new(cfg.alpha_vantage.clone())
        .context("create Alpha Vantage provider")?;
    let report = ingest_universe(&provider, &cfg.symbols, cfg.indicators).await;

    migrate::run_all(&cfg.database_url)?;
    let mut conn = connect_sqlite(&cfg.database_url)?;

    // An empty fetch would otherwise wipe the stored history.
    if report.daily.is_empty() {
        warn!("no daily bars fetched; daily_data left unchanged");
    } else {
        warn_dropped(&report, IngestStage::Daily, "daily_data");
        let rows = repo::replace_daily_data(&mut conn, &report.daily)?;
        info!(rows, "daily_data replaced");
    }
    if report.indicators.is_empty() {
        warn!("no indicators fetched; technical_indicators left unchanged");
    } else {
        warn_dropped(&report, IngestStage::Indicators, "technical_indicators");
        let rows = repo::replace_technical_indicators(&mut conn, &report.indicators)?;
        info!(rows, "technical_indicators replaced");
    }
    let companies = repo::upsert_companies(&mut conn, &report.companies)?;
    info!(companies, "company_data upserted");

    for failure in &report.failures {
        println!("failed {} ({}): {}", failure.symbol, failure.stage, failure.message);
    }
    Ok(())
}

/// Reloads truncate the whole table, so a symbol whose fetch failed loses its stored rows.
fn warn_dropped(report: &IngestReport, stage: IngestStage, table: &str) {
    let lost = report.failed_symbols(stage);
    if !lost.is_empty() {
        warn!(table, symbols = ?lost, "reload drops the stored rows of symbols that failed to fetch");
        println!("{table}: no rows kept for {}", lost.join(", "));
    }
}

fn score(cfg: &AppConfig, args: ScoreArgs) -> Result<()> {
    let rows: Vec<RawBar> = match &args.input {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read input file {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parse rows from {}", path.display()))?
        }
        None => {
            let mut conn = connect_sqlite(&cfg.database_url)?;
            repo::load_merged_rows(&mut conn, Some(&cfg.symbols))?
        }
    };
    info!(rows = rows.len(), "scoring input loaded");

    let report = ScoringPipeline::new(cfg.scoring)
        .with_progress(|outcome| {
            info!(symbol = %outcome.symbol, status = ?outcome.status, "partition finished");
        })
        .score_table(rows);
    print_summary(&report);

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json).with_context(|| format!("write report {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }
    if args.persist {
        migrate::run_all(&cfg.database_url)?;
        let mut conn = connect_sqlite(&cfg.database_url)?;
        let rows = repo::replace_scores(&mut conn, &report.scored)?;
        info!(rows, "investment_scores replaced");
    }
    Ok(())
}

fn print_summary(report: &ScoringReport) {
    for row in report.latest_by_symbol() {
        let score = row
            .investment_score
            .map_or_else(|| "-".to_string(), |s| format!("{s:.4}"));
        println!("{:<8} {} {:>10} {}", row.symbol(), row.date(), score, row.signal);
    }
    for err in &report.rejected {
        println!("rejected: {err}");
    }
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
}

fn latest(cfg: &AppConfig) -> Result<()> {
    let mut conn = connect_sqlite(&cfg.database_url)?;
    let names: HashMap<String, String> = repo::load_companies(&mut conn)?
        .into_iter()
        .filter_map(|c| c.name.map(|name| (c.symbol, name)))
        .collect();

    for row in repo::latest_scores(&mut conn)? {
        let score = row
            .investment_score
            .map_or_else(|| "-".to_string(), |s| format!("{s:.4}"));
        let name = names.get(&row.symbol).map_or("", String::as_str);
        println!("{:<8} {} {:>10} {:<9} {}", row.symbol, row.date, score, row.signal, name);
    }
    Ok(())
}
