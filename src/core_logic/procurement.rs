use polars::prelude::PolarsResult;
use serde::Serialize;

use crate::core_logic::forecasting::Forecast;
use crate::storage::models::ProductRecord;

/// Days a procurement cycle covers when projecting a daily rate.
pub const DAYS_PER_MONTH: f64 = 30.0;

pub fn project_monthly_demand(daily_rate: f64) -> f64 {
    daily_rate * DAYS_PER_MONTH
}

/// One row of the purchase report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseDecision {
    #[serde(rename = "ProductID")]
    pub product_id: String,
    #[serde(rename = "ProductName")]
    pub product_name: String,
    #[serde(rename = "PredictedDemand")]
    pub predicted_demand: f64,
    #[serde(rename = "LastDemand")]
    pub last_demand: f64,
    #[serde(rename = "BaselineOrder")]
    pub baseline_order: f64,
    #[serde(rename = "PurchaseAmount")]
    pub purchase_amount: f64,
}

impl PurchaseDecision {
    /// Predicted monthly demand versus the baseline order volume.
    pub fn difference(&self) -> f64 {
        self.predicted_demand - self.baseline_order
    }
}

/// Raises a purchase only when the projected monthly demand strictly
/// exceeds the past month's demand. The amount is the gap between the
/// two.
pub fn decide_purchase(
    record: &ProductRecord,
    forecast: &Forecast,
) -> PolarsResult<Option<PurchaseDecision>> {
    let final_daily = forecast.last_yhat()?;
    let predicted_demand = project_monthly_demand(final_daily);

    if predicted_demand > record.past_month_demand {
        Ok(Some(PurchaseDecision {
            product_id: record.product_id.clone(),
            product_name: record.product_name.clone(),
            predicted_demand,
            last_demand: record.past_month_demand,
            baseline_order: record.baseline_order,
            purchase_amount: predicted_demand - record.past_month_demand,
        }))
    } else {
        Ok(None)
    }
}
