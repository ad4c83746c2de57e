#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod api;
mod core_logic;
mod errors;
mod storage;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;

use chrono::NaiveDate;
use clap::Parser;
use rayon::ThreadPoolBuilder;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use api::models::{ForecastChartData, OrderDeviationData};
use core_logic::pipeline::{
    run_pipeline, FitErrorPolicy, PipelineOutcome, PipelineParams, DEFAULT_ANCHOR_DATE,
    DEFAULT_HORIZON_DAYS,
};
use core_logic::report::ReportStatus;
use errors::EngineError;
use storage::product_csv::{load_product_records_file, write_purchase_report_file};

#[derive(Parser, Debug)]
#[command(
    name = "replenishment-engine",
    about = "Forecasts per-product demand and ranks procurement purchases",
    version
)]
struct Cli {
    /// CSV file with one demand row per product.
    data_csv: PathBuf,

    /// Where to write the purchase report when purchases are required.
    #[arg(long, default_value = "purchase_requirements.csv")]
    output: PathBuf,

    /// What to do when a product's model fails to fit.
    #[arg(long, value_enum)]
    on_fit_error: FitErrorPolicy,

    /// Days of history to synthesize, and days of forecast beyond it.
    #[arg(long, default_value_t = DEFAULT_HORIZON_DAYS, value_parser = clap::value_parser!(u32).range(1..))]
    horizon_days: u32,

    /// First date of every product's synthetic series.
    #[arg(long, default_value = DEFAULT_ANCHOR_DATE)]
    anchor_date: NaiveDate,

    /// Directory for chart data payloads; none are written without it.
    #[arg(long)]
    charts_dir: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(cli: Cli) -> Result<(), EngineError> {
    let records = load_product_records_file(&cli.data_csv)?;
    info!(products = records.len(), "loaded product records");

    let params = PipelineParams {
        horizon_days: cli.horizon_days,
        anchor_date: cli.anchor_date,
        on_fit_error: cli.on_fit_error,
    };

    let pool = ThreadPoolBuilder::new()
        .stack_size(32 * 1024 * 1024) // 32 MB
        .build()?;

    let outcome = pool.install(|| run_pipeline(&records, &params))?;
    if !outcome.skipped.is_empty() {
        info!(
            skipped = outcome.skipped.len(),
            "products omitted after model fit failures"
        );
    }

    match outcome.report.status() {
        ReportStatus::NoPurchasesRequired => {
            info!("no purchases required, skipping report file");
        }
        ReportStatus::PurchasesRequired { products } => {
            write_purchase_report_file(&cli.output, outcome.report.decisions())?;
            info!(products, output = %cli.output.display(), "wrote purchase report");
        }
    }

    if let Some(charts_dir) = &cli.charts_dir {
        write_chart_payloads(charts_dir, &outcome)?;
    }

    Ok(())
}

/// Writes the payloads the chart renderers consume: one product's
/// forecast with its bands, and the over/under-ordered differences.
fn write_chart_payloads(dir: &Path, outcome: &PipelineOutcome) -> Result<(), EngineError> {
    std::fs::create_dir_all(dir)?;

    if let Some(product) = outcome.forecasts.first() {
        let chart = ForecastChartData::from_product_forecast(product)?;
        let path = dir.join("forecast_sample.json");
        serde_json::to_writer_pretty(create_payload_file(&path)?, &chart)?;
        info!(product_id = %product.product_id, path = %path.display(), "wrote forecast chart data");
    }

    if !outcome.report.is_empty() {
        let deviation = OrderDeviationData::from_report(&outcome.report);
        let path = dir.join("order_deviation.json");
        serde_json::to_writer_pretty(create_payload_file(&path)?, &deviation)?;
        info!(path = %path.display(), "wrote order deviation chart data");
    }

    Ok(())
}

fn create_payload_file(path: &Path) -> Result<File, EngineError> {
    File::create(path).map_err(|source| EngineError::File {
        path: path.to_path_buf(),
        source,
    })
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(error) = run(cli) {
        error!(%error, "run failed");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const COVERED_PRODUCT_CSV: &str = "\
ProductID,ProductName,PastMonthDemand,BaselineOrder
P001,Espresso Beans,300,250
";

    fn cli_over(data_csv: PathBuf, output: PathBuf, horizon_days: u32) -> Cli {
        Cli {
            data_csv,
            output,
            on_fit_error: FitErrorPolicy::Abort,
            horizon_days,
            anchor_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            charts_dir: None,
        }
    }

    #[test]
    fn cli_requires_explicit_fit_error_policy() {
        // Arrange
        let args = ["replenishment-engine", "products.csv"];

        // Act
        let result = Cli::try_parse_from(args);

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn cli_parses_full_invocation() {
        // Arrange
        let args = [
            "replenishment-engine",
            "products.csv",
            "--on-fit-error",
            "skip",
            "--horizon-days",
            "14",
            "--anchor-date",
            "2024-06-01",
        ];

        // Act
        let cli = Cli::try_parse_from(args).unwrap();

        // Assert
        assert_eq!(cli.data_csv, PathBuf::from("products.csv"));
        assert_eq!(cli.on_fit_error, FitErrorPolicy::Skip);
        assert_eq!(cli.horizon_days, 14);
        assert_eq!(
            cli.anchor_date,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
        assert_eq!(cli.output, PathBuf::from("purchase_requirements.csv"));
        assert!(cli.charts_dir.is_none());
    }

    #[test]
    fn cli_rejects_zero_horizon() {
        // Arrange
        let args = [
            "replenishment-engine",
            "products.csv",
            "--on-fit-error",
            "abort",
            "--horizon-days",
            "0",
        ];

        // Act
        let result = Cli::try_parse_from(args);

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn covered_demand_leaves_no_report_file() {
        // Arrange
        let dir = tempdir().unwrap();
        let data_csv = dir.path().join("products.csv");
        std::fs::write(&data_csv, COVERED_PRODUCT_CSV).unwrap();
        let output = dir.path().join("purchase_requirements.csv");
        let cli = cli_over(data_csv, output.clone(), 30);

        // Act
        run(cli).unwrap();

        // Assert
        assert!(!output.exists());
    }

    #[test]
    fn raised_purchase_writes_the_report_file() {
        // Arrange
        // Half the horizon doubles the projected monthly rate.
        let dir = tempdir().unwrap();
        let data_csv = dir.path().join("products.csv");
        std::fs::write(&data_csv, COVERED_PRODUCT_CSV).unwrap();
        let output = dir.path().join("purchase_requirements.csv");
        let cli = cli_over(data_csv, output.clone(), 15);

        // Act
        run(cli).unwrap();

        // Assert
        let report = std::fs::read_to_string(&output).unwrap();
        let mut lines = report.lines();
        assert_eq!(
            lines.next().unwrap(),
            "ProductID,ProductName,PredictedDemand,LastDemand,BaselineOrder,PurchaseAmount"
        );
        assert_eq!(
            lines.next().unwrap(),
            "P001,Espresso Beans,600.0,300.0,250.0,300.0"
        );
    }
}
