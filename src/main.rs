use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use coin_search_lib::application::{OrchestratorConfig, SearchOrchestrator};
use coin_search_lib::domain::Site;
use coin_search_lib::infrastructure::{
    AppConfig, ConfigManager, HttpClient, HttpClientConfig, HttpSiteAdapter, PacingStrategy, build_pacing,
    init_logging_with_config, logging::log_system_info, read_varieties, spreadsheet, write_results,
};

/// Search auction sites for the coin varieties listed in a CSV file
#[derive(Parser, Debug)]
#[command(name = "coin-search", version)]
#[command(about = "Fetches the first listing titles per coin variety from auction sites and exports them as CSV")]
struct Cli {
    /// CSV file with a 'Variety' column
    #[arg(short = 'i', long = "input", required_unless_present = "write_default_config")]
    input: Option<PathBuf>,

    /// Where the results are written (default: coin_search_results.csv)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Comma separated sites, e.g. "eBay,Heritage Auctions,vcoins"
    #[arg(short = 's', long = "sites", value_delimiter = ',')]
    sites: Vec<Site>,

    /// JSON configuration file
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Maximum varieties searched at the same time
    #[arg(long = "concurrency")]
    concurrency: Option<usize>,

    /// Pause (fixed) or minimum interval (per_site) between requests, in milliseconds
    #[arg(long = "delay-ms")]
    delay_ms: Option<u64>,

    /// Pacing strategy: fixed or per_site
    #[arg(long = "pacing", value_parser = parse_pacing)]
    pacing: Option<PacingStrategy>,

    /// Write a configuration file with default values and exit
    #[arg(long = "write-default-config")]
    write_default_config: Option<PathBuf>,
}

fn parse_pacing(value: &str) -> Result<PacingStrategy, String> {
    match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "fixed" => Ok(PacingStrategy::Fixed),
        "per_site" => Ok(PacingStrategy::PerSite),
        other => Err(format!("unknown pacing strategy '{other}' (expected fixed or per_site)")),
    }
}

fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(concurrency) = cli.concurrency {
        config.search.max_concurrent_tasks = concurrency;
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.pacing.delay_ms = delay_ms;
    }
    if let Some(strategy) = cli.pacing {
        config.pacing.strategy = strategy;
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Some(path) = &cli.write_default_config {
        ConfigManager::with_path(path)
            .save_config(&AppConfig::default())
            .await?;
        println!("Default configuration written to {}", path.display());
        return Ok(());
    }

    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let mut config = manager.load_config()?;
    apply_overrides(&mut config, &cli);
    config.validate()?;

    init_logging_with_config(&config.logging)?;
    log_system_info();
    if manager.path().exists() {
        info!("Loaded configuration from: {:?}", manager.path());
    } else {
        info!("No configuration file at {:?}, using defaults", manager.path());
    }

    // Input problems are fatal and reported before any request goes out
    let input = cli.input.as_deref().context("--input is required")?;
    let varieties = read_varieties(input)?;

    let sites = if cli.sites.is_empty() {
        config.search.default_sites.clone()
    } else {
        cli.sites.clone()
    };

    let http_client = HttpClient::new(HttpClientConfig::from_http_config(&config.http))?;
    let adapter = HttpSiteAdapter::with_title_limit(http_client, config.search.titles_per_site)?;
    let orchestrator = SearchOrchestrator::new(
        Arc::new(adapter),
        build_pacing(&config.pacing),
        OrchestratorConfig::from_search_config(&config.search, config.http.request_timeout_seconds),
    );

    info!("Searching, please wait...");
    let table = orchestrator
        .run(varieties, &sites, |progress| {
            info!(
                "Progress {}/{} ({:.0}%) - finished '{}'",
                progress.completed,
                progress.total,
                progress.fraction() * 100.0,
                progress.variety
            );
        })
        .await;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.default_file_name));
    if let Err(e) = write_results(&output, &table) {
        error!("Export failed: {}", e);
        // Results stay available even when the file cannot be written
        spreadsheet::write_results_to(std::io::stdout(), &table)?;
        return Err(e.into());
    }

    println!(
        "Search completed: {} rows ({} errors) written to {}",
        table.len(),
        table.error_count(),
        output.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_sites_and_overrides() {
        let cli = Cli::try_parse_from([
            "coin-search",
            "--input",
            "coins.csv",
            "--sites",
            "eBay,Heritage Auctions,vcoins",
            "--concurrency",
            "4",
            "--pacing",
            "per-site",
        ])
        .unwrap();
        assert_eq!(cli.sites, vec![Site::Ebay, Site::HeritageAuctions, Site::VCoins]);

        let mut config = AppConfig::default();
        apply_overrides(&mut config, &cli);
        assert_eq!(config.search.max_concurrent_tasks, 4);
        assert_eq!(config.pacing.strategy, PacingStrategy::PerSite);
        assert_eq!(config.pacing.delay_ms, 1500);
    }

    #[test]
    fn test_flag_overrides_apply_before_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "pacing": { "strategy": "per_site", "delay_ms": 0 } }"#).unwrap();
        let cli = Cli::try_parse_from([
            "coin-search",
            "-i",
            "coins.csv",
            "-c",
            path.to_str().unwrap(),
            "--pacing",
            "fixed",
        ])
        .unwrap();

        let mut config = ConfigManager::with_path(&path).load_config().unwrap();
        assert!(config.validate().is_err());
        apply_overrides(&mut config, &cli);
        assert!(config.validate().is_ok());
        assert_eq!(config.pacing.strategy, PacingStrategy::Fixed);
    }

    #[test]
    fn test_cli_rejects_unknown_site() {
        assert!(Cli::try_parse_from(["coin-search", "-i", "coins.csv", "-s", "Coinbase"]).is_err());
    }

    #[test]
    fn test_cli_requires_input() {
        assert!(Cli::try_parse_from(["coin-search"]).is_err());
        assert!(Cli::try_parse_from(["coin-search", "--write-default-config", "cfg.json"]).is_ok());
    }
}
