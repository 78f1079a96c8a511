//! famafit CLI binary.
//!
//! Runs the CAPM / FF3 / FF5 regressions for one ticker from local files.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use famafit::{Analysis, AnalysisConfig};
use famafit_data::{FactorDataSource, FrenchCsvSource};
use famafit_regression::CovarianceType;
use serde_json::json;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "famafit")]
#[command(about = "CAPM and Fama-French factor regressions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Regress a stock's excess returns on CAPM, FF3 and FF5
    Analyze(AnalyzeArgs),

    /// Show the factor source table and its coverage
    Factors {
        /// French-library daily five-factor CSV
        #[arg(long)]
        factors: Option<PathBuf>,
    },
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Stock ticker
    ticker: String,

    /// Price CSV with Date and Adj Close columns (default: <TICKER>.csv)
    #[arg(long)]
    prices: Option<PathBuf>,

    /// French-library daily five-factor CSV
    #[arg(long)]
    factors: Option<PathBuf>,

    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Coefficient covariance estimator
    #[arg(long, value_enum)]
    cov_type: Option<CovArg>,

    /// Newey-West lag length for --cov-type hac
    #[arg(long)]
    hac_lags: Option<usize>,

    /// First price date to use (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last price date to use (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Write the result table to a .csv or .json file
    #[arg(long)]
    export: Option<PathBuf>,
}

impl AnalyzeArgs {
    /// Apply the flags on top of `base`. The ticker is kept as typed.
    fn apply(&self, mut base: AnalysisConfig) -> AnalysisConfig {
        base.ticker.clone_from(&self.ticker);
        if self.prices.is_some() {
            base.prices_path.clone_from(&self.prices);
        }
        if let Some(factors) = &self.factors {
            base.factors_path.clone_from(factors);
        }
        base.covariance = covariance(self.cov_type, self.hac_lags, base.covariance);
        base.start = self.start.or(base.start);
        base.end = self.end.or(base.end);
        base
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CovArg {
    Nonrobust,
    Hc1,
    Hac,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
}

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("famafit=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => {
            let base = match &args.config {
                Some(path) => AnalysisConfig::load(path)?,
                None => AnalysisConfig::default(),
            };
            analyze(args.apply(base), args.format, args.export)?;
        }
        Commands::Factors { factors } => {
            let path = factors.unwrap_or_else(|| AnalysisConfig::default().factors_path);
            show_factors(&FrenchCsvSource::new(path))?;
        }
    }

    Ok(())
}

/// Resolve the estimator from flags, falling back to the configured one.
fn covariance(
    cov_type: Option<CovArg>,
    hac_lags: Option<usize>,
    configured: CovarianceType,
) -> CovarianceType {
    let resolved = match (cov_type, configured) {
        (Some(CovArg::Nonrobust), _) => CovarianceType::NonRobust,
        (Some(CovArg::Hc1), _) => CovarianceType::Hc1,
        (Some(CovArg::Hac) | None, CovarianceType::Hac { lags }) => CovarianceType::Hac {
            lags: hac_lags.or(lags),
        },
        (Some(CovArg::Hac), _) => CovarianceType::Hac { lags: hac_lags },
        (None, other) => other,
    };

    if let Some(lags) = hac_lags
        && !matches!(resolved, CovarianceType::Hac { .. })
    {
        warn!(lags, covariance = %resolved, "--hac-lags ignored without HAC covariance");
    }
    resolved
}

fn analyze(
    config: AnalysisConfig,
    format: OutputFormat,
    export: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = FrenchCsvSource::new(&config.factors_path);
    let outcome = Analysis::new(config).run(&source)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Text => {
            outcome.diagnostics()?.write_to(&mut out)?;
            writeln!(out)?;
            write!(out, "{}", outcome.table())?;
        }
        OutputFormat::Markdown => {
            outcome.diagnostics()?.write_to(&mut out)?;
            writeln!(out)?;
            write!(out, "{}", outcome.table().to_markdown())?;
        }
        OutputFormat::Json => {
            writeln!(out, "{}", outcome.report().to_json()?)?;
        }
    }

    if let Some(path) = export {
        outcome.export_table(&path)?;
        info!(path = %path.display(), "exported result table");
    }

    Ok(())
}

fn show_factors(source: &dyn FactorDataSource) -> Result<(), Box<dyn std::error::Error>> {
    let table = source.fetch()?;
    println!("{}", table.to_dataframe()?);

    let coverage = table.coverage().map_or_else(
        || json!(null),
        |(first, last)| json!({ "first": first, "last": last }),
    );
    println!(
        "{}",
        json!({
            "source": source.name(),
            "rows": table.len(),
            "coverage": coverage,
        })
    );
    Ok(())
}
