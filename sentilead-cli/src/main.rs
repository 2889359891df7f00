//! SentiLead CLI: sentiment/return lead correlations and short-horizon forecasts.
//!
//! Commands:
//! - `analyze`: full analysis for one ticker, a list, or every common ticker
//! - `correlation`: per-lead correlations for one ticker
//! - `forecast`: per-horizon forecasts for one ticker
//! - `common-tickers`: tickers present in both sources over a window

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;

use sentilead_core::domain::Aggregation;
use sentilead_core::AnalysisReport;
use sentilead_runner::{
    export_json, open_sources, run_batch, save_artifacts, AnalysisConfig, Availability,
    BatchResult, ReportSummary, TickerOutcome,
};

#[derive(Parser)]
#[command(
    name = "sentilead",
    about = "SentiLead CLI: does news sentiment lead stock returns?"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one ticker (`--ticker`), a list (`--tickers`), or all common tickers.
    Analyze {
        #[command(flatten)]
        select: SelectArgs,

        #[command(flatten)]
        run: RunArgs,

        /// Run tickers one after the other instead of on the thread pool.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Write the JSON output to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Also write results.json, leads.csv and forecast.csv to this directory.
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Single-ticker mode: print the full report instead of the summary.
        #[arg(long, default_value_t = false)]
        full: bool,
    },
    /// Per-lead correlations between sentiment change and later returns.
    Correlation {
        /// Ticker to analyze (e.g., BNP.PA).
        #[arg(long)]
        ticker: String,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Per-horizon return and price forecasts from the last sentiment change.
    Forecast {
        /// Ticker to analyze (e.g., BNP.PA).
        #[arg(long)]
        ticker: String,

        #[command(flatten)]
        run: RunArgs,
    },
    /// List tickers present in both sources over the window.
    CommonTickers {
        #[command(flatten)]
        run: RunArgs,

        /// Exit with status 1 when no common ticker exists.
        #[arg(long, default_value_t = false)]
        require: bool,
    },
}

#[derive(Args)]
struct SelectArgs {
    /// A single ticker.
    #[arg(long, conflicts_with_all = ["tickers", "all_common"])]
    ticker: Option<String>,

    /// Comma-separated tickers (e.g., BNP.PA,ACA.PA).
    #[arg(long, value_delimiter = ',', conflicts_with = "all_common")]
    tickers: Vec<String>,

    /// Every ticker present in both sources over the window.
    #[arg(long, default_value_t = false)]
    all_common: bool,
}

#[derive(Args)]
struct RunArgs {
    /// TOML config file. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Window start (YYYY-MM-DD). Required without --config.
    #[arg(long)]
    start: Option<String>,

    /// Window end (YYYY-MM-DD). Required without --config.
    #[arg(long)]
    end: Option<String>,

    /// Largest lead in days (0..=60). Defaults to 5.
    #[arg(long)]
    max_lead: Option<usize>,

    /// Forecast horizon in days (1..=60). Defaults to 5.
    #[arg(long)]
    horizon: Option<usize>,

    /// Prices CSV (date, symbol, open_price).
    #[arg(long)]
    prices: Option<PathBuf>,

    /// Sentiment JSON export.
    #[arg(long)]
    sentiment: Option<PathBuf>,

    /// Same-day sentiment aggregation.
    #[arg(long, value_enum)]
    aggregation: Option<AggregationArg>,

    /// Generate deterministic synthetic series instead of reading files.
    #[arg(long, default_value_t = false)]
    synthetic: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum AggregationArg {
    Mean,
    MentionWeighted,
}

impl From<AggregationArg> for Aggregation {
    fn from(arg: AggregationArg) -> Self {
        match arg {
            AggregationArg::Mean => Aggregation::Mean,
            AggregationArg::MentionWeighted => Aggregation::MentionWeighted,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            select,
            run,
            sequential,
            out,
            csv_dir,
            full,
        } => run_analyze(select, run, sequential, out, csv_dir, full),
        Commands::Correlation { ticker, run } => run_correlation(&ticker, &run),
        Commands::Forecast { ticker, run } => run_forecast(&ticker, &run),
        Commands::CommonTickers { run, require } => run_common_tickers(&run, require),
    }
}

// ─── Config assembly ─────────────────────────────────────────────────

fn parse_date(raw: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("{flag} must be YYYY-MM-DD, got '{raw}'"))
}

/// Build the run config from `--config` and/or flags, without validating.
fn base_config(args: &RunArgs) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::read_file(path)?,
        None => {
            let (Some(start), Some(end)) = (&args.start, &args.end) else {
                bail!("--start and --end are required without --config");
            };
            AnalysisConfig::new(parse_date(start, "--start")?, parse_date(end, "--end")?)
        }
    };

    if let Some(start) = &args.start {
        config.window.start = parse_date(start, "--start")?;
    }
    if let Some(end) = &args.end {
        config.window.end = parse_date(end, "--end")?;
    }
    if let Some(max_lead) = args.max_lead {
        config.analysis.max_lead = max_lead;
    }
    if let Some(horizon) = args.horizon {
        config.analysis.horizon = horizon;
    }
    if let Some(aggregation) = args.aggregation {
        config.analysis.aggregation = aggregation.into();
    }
    if let Some(prices) = &args.prices {
        config.sources.prices = Some(prices.clone());
    }
    if let Some(sentiment) = &args.sentiment {
        config.sources.sentiment = Some(sentiment.clone());
    }
    if args.synthetic {
        config.sources.synthetic = true;
    }
    Ok(config)
}

fn single_ticker_config(ticker: &str, args: &RunArgs) -> Result<AnalysisConfig> {
    let mut config = base_config(args)?;
    config.run.tickers = vec![ticker.trim().to_string()];
    config.run.all_common = false;
    config.validate()?;
    Ok(config)
}

fn run_single(config: &AnalysisConfig) -> Result<BatchResult> {
    let sources = open_sources(
        &config.sources,
        config.analysis.aggregation,
        &config.run.tickers,
    )?;
    Ok(run_batch(config, &sources)?)
}

// ─── analyze ─────────────────────────────────────────────────────────

fn run_analyze(
    select: SelectArgs,
    run: RunArgs,
    sequential: bool,
    out: Option<PathBuf>,
    csv_dir: Option<PathBuf>,
    full: bool,
) -> Result<()> {
    let mut config = base_config(&run)?;
    if let Some(ticker) = &select.ticker {
        config.run.tickers = vec![ticker.trim().to_string()];
        config.run.all_common = false;
    } else if !select.tickers.is_empty() {
        config.run.tickers = select.tickers.clone();
        config.run.all_common = false;
    } else if select.all_common {
        config.run.tickers.clear();
        config.run.all_common = true;
    }
    if sequential {
        config.run.parallel = false;
    }
    config.validate()?;

    let sources = open_sources(
        &config.sources,
        config.analysis.aggregation,
        &config.run.tickers,
    )?;
    let result = run_batch(&config, &sources)?;

    if config.run.all_common && result.outcomes.is_empty() {
        print_no_common_error(&config);
        std::process::exit(1);
    }

    if let Some(dir) = &csv_dir {
        let written = save_artifacts(&result, dir)?;
        info!(files = written.len(), dir = %dir.display(), "artifacts written");
    }

    let single = select.ticker.is_some() && result.outcomes.len() == 1;
    let payload = if single {
        single_payload(&result, full)?
    } else if full {
        export_json(&result)?
    } else {
        let map: serde_json::Map<String, serde_json::Value> = result
            .outcomes
            .iter()
            .map(|(ticker, outcome)| Ok((ticker.clone(), outcome_summary(outcome)?)))
            .collect::<Result<_>>()?;
        serde_json::to_string_pretty(&map)?
    };

    match &out {
        Some(path) => {
            write_output(path, &payload)?;
            println!("Written: {} ({} tickers)", path.display(), result.outcomes.len());
        }
        None => println!("{payload}"),
    }

    if result.synthetic {
        eprintln!("WARNING: Results based on SYNTHETIC data");
    }
    Ok(())
}

/// Compact view of a completed ticker; other outcomes are printed whole.
fn outcome_summary(outcome: &TickerOutcome) -> Result<serde_json::Value> {
    let value = match outcome.report() {
        Some(report) => serde_json::to_value(ReportSummary::from_report(report))?,
        None => serde_json::to_value(outcome)?,
    };
    Ok(value)
}

fn single_payload(result: &BatchResult, full: bool) -> Result<String> {
    let Some(outcome) = result.outcomes.values().next() else {
        bail!("no outcome produced");
    };
    let value = match (outcome.report(), full) {
        (Some(report), true) => serde_json::to_value(report)?,
        (Some(report), false) => {
            let summary = ReportSummary::from_report(report);
            serde_json::json!({
                "ticker": summary.ticker,
                "period": summary.period,
                "mean_corr_return": summary.mean_corr_return,
                "last_date": summary.last_date,
                "last_sentiment_delta": summary.last_sentiment_delta,
            })
        }
        (None, _) => serde_json::to_value(outcome)?,
    };
    Ok(serde_json::to_string_pretty(&value)?)
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

fn print_no_common_error(config: &AnalysisConfig) {
    let error = serde_json::json!({
        "error": "no common ticker found for the requested window",
        "period": config.date_window(),
    });
    println!("{error}");
}

// ─── correlation / forecast ──────────────────────────────────────────

/// Run one ticker; prints the outcome and exits 1 when it did not complete.
fn completed_report(ticker: &str, run: &RunArgs) -> Result<(AnalysisReport, bool)> {
    let config = single_ticker_config(ticker, run)?;
    let result = run_single(&config)?;
    let Some(outcome) = result.outcomes.into_values().next() else {
        bail!("no outcome produced for {ticker}");
    };
    match outcome {
        TickerOutcome::Complete(report) => Ok((*report, result.synthetic)),
        other => {
            println!("{}", serde_json::to_string_pretty(&other)?);
            std::process::exit(1);
        }
    }
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{v:.precision$}"))
        .unwrap_or_else(|| "n/a".to_string())
}

fn run_correlation(ticker: &str, run: &RunArgs) -> Result<()> {
    let (report, synthetic) = completed_report(ticker, run)?;

    println!();
    println!("=== Lead Correlations ===");
    println!("Ticker:         {}", report.ticker);
    println!("Period:         {} to {}", report.window.start, report.window.end);
    println!("Feature rows:   {}", report.feature_rows);
    println!(
        "Mean corr:      {} ({})",
        fmt_opt(report.mean_correlation, 4),
        report.strength.map(|s| s.label()).unwrap_or("undefined")
    );
    println!();
    println!("{:<6} {:>12} {:>8} {:>10}", "Lead", "Correlation", "Pairs", "p-value");
    println!("{}", "-".repeat(39));
    for lead in &report.lead_correlations {
        println!(
            "{:<6} {:>12} {:>8} {:>10}",
            lead.lead_days,
            fmt_opt(lead.correlation, 4),
            lead.pairs,
            fmt_opt(lead.p_value, 4)
        );
    }
    print_synthetic_warning(synthetic);
    Ok(())
}

fn run_forecast(ticker: &str, run: &RunArgs) -> Result<()> {
    let (report, synthetic) = completed_report(ticker, run)?;
    let forecast = &report.forecast;

    println!();
    println!("=== Forecast ===");
    println!("Ticker:         {}", report.ticker);
    println!("Last date:      {}", forecast.last_date);
    println!("Last price:     {:.4}", forecast.last_price);
    println!("Last delta:     {:.4}", forecast.last_sentiment_delta);
    println!(
        "Defined:        {}/{} horizons",
        forecast.defined_horizons(),
        forecast.per_horizon.len()
    );
    println!();
    println!(
        "{:<8} {:>12} {:>12} {:>10} {:>8}",
        "Horizon", "Return", "Price", "Beta", "R²"
    );
    println!("{}", "-".repeat(54));
    for h in &forecast.per_horizon {
        let model = h.model.as_ref();
        println!(
            "{:<8} {:>12} {:>12} {:>10} {:>8}",
            h.horizon,
            fmt_opt(h.predicted_return, 6),
            fmt_opt(h.predicted_price, 4),
            fmt_opt(model.map(|m| m.beta), 4),
            fmt_opt(model.and_then(|m| m.r_squared), 3)
        );
    }
    print_synthetic_warning(synthetic);
    Ok(())
}

fn print_synthetic_warning(synthetic: bool) {
    if synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}

// ─── common-tickers ──────────────────────────────────────────────────

fn run_common_tickers(run: &RunArgs, require: bool) -> Result<()> {
    let mut config = base_config(run)?;
    config.run.tickers.clear();
    config.run.all_common = true;
    config.validate()?;

    let sources = open_sources(&config.sources, config.analysis.aggregation, &[])?;
    let availability = Availability::discover(
        sources.prices.as_ref(),
        sources.sentiment.as_ref(),
        config.date_window(),
    )?;
    let common = availability.common();

    if common.is_empty() && require {
        print_no_common_error(&config);
        std::process::exit(1);
    }

    let payload = serde_json::json!({
        "period": config.date_window(),
        "count": common.len(),
        "tickers": common,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
