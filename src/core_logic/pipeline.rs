use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::warn;

use crate::core_logic::forecasting::{fit_forecast, Forecast};
use crate::core_logic::procurement::{decide_purchase, PurchaseDecision};
use crate::core_logic::report::{assemble_report, Report};
use crate::core_logic::series::demand_to_series;
use crate::errors::EngineError;
use crate::storage::models::ProductRecord;

pub const DEFAULT_HORIZON_DAYS: u32 = 30;
pub const DEFAULT_ANCHOR_DATE: &str = "2023-01-01";

/// What to do when one product's model fails to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FitErrorPolicy {
    /// Abort the whole run on the first failing product.
    Abort,
    /// Log the failure, drop the product and keep going.
    Skip,
}

/// Run parameters. `horizon_days` must be at least one; the policy has
/// no default on purpose, callers pick one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineParams {
    pub horizon_days: u32,
    pub anchor_date: NaiveDate,
    pub on_fit_error: FitErrorPolicy,
}

#[derive(Debug, Clone)]
pub struct ProductForecast {
    pub product_id: String,
    pub product_name: String,
    pub forecast: Forecast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedProduct {
    pub product_id: String,
    pub reason: String,
}

#[derive(Debug)]
pub struct PipelineOutcome {
    pub report: Report,
    pub forecasts: Vec<ProductForecast>,
    pub skipped: Vec<SkippedProduct>,
}

fn process_product(
    record: &ProductRecord,
    params: &PipelineParams,
) -> Result<(ProductForecast, Option<PurchaseDecision>), EngineError> {
    let series = demand_to_series(record, params.horizon_days, params.anchor_date)?;
    let forecast =
        fit_forecast(&series, params.horizon_days).map_err(|source| EngineError::ModelFit {
            product_id: record.product_id.clone(),
            source,
        })?;
    let decision = decide_purchase(record, &forecast)?;

    Ok((
        ProductForecast {
            product_id: record.product_id.clone(),
            product_name: record.product_name.clone(),
            forecast,
        },
        decision,
    ))
}

/// Runs every product through synthesis, forecasting and the purchase
/// decision, then assembles the ranked report.
///
/// Products are independent, so the map runs in parallel. Results come
/// back in input order, which keeps the abort policy deterministic: the
/// first failing product in the input is the one reported.
pub fn run_pipeline(
    records: &[ProductRecord],
    params: &PipelineParams,
) -> Result<PipelineOutcome, EngineError> {
    let results: Vec<Result<(ProductForecast, Option<PurchaseDecision>), EngineError>> = records
        .par_iter()
        .map(|record| process_product(record, params))
        .collect();

    let mut forecasts = Vec::with_capacity(records.len());
    let mut decisions = Vec::new();
    let mut skipped = Vec::new();

    for result in results {
        match result {
            Ok((forecast, decision)) => {
                forecasts.push(forecast);
                if let Some(decision) = decision {
                    decisions.push(decision);
                }
            }
            Err(EngineError::ModelFit { product_id, source })
                if params.on_fit_error == FitErrorPolicy::Skip =>
            {
                let omitted = SkippedProduct {
                    product_id,
                    reason: source.to_string(),
                };
                warn!(
                    product_id = %omitted.product_id,
                    reason = %omitted.reason,
                    "model fit failed, skipping product"
                );
                skipped.push(omitted);
            }
            Err(error) => return Err(error),
        }
    }

    Ok(PipelineOutcome {
        report: assemble_report(decisions),
        forecasts,
        skipped,
    })
}
