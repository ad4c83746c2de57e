use polars::prelude::PolarsResult;
use serde::{Deserialize, Serialize};

use crate::core_logic::pipeline::ProductForecast;
use crate::core_logic::procurement::PurchaseDecision;
use crate::core_logic::report::Report;

/// Line-plus-band payload for one product's forecast chart.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ForecastChartData {
    pub product_id: String,
    pub product_name: String,
    pub dates: Vec<String>,
    pub yhat: Vec<f64>,
    pub yhat_lower: Vec<f64>,
    pub yhat_upper: Vec<f64>,
}

impl ForecastChartData {
    pub fn from_product_forecast(product: &ProductForecast) -> PolarsResult<Self> {
        let dates = product
            .forecast
            .dates()?
            .iter()
            .map(|date| date.format("%Y-%m-%d").to_string())
            .collect();

        Ok(ForecastChartData {
            product_id: product.product_id.clone(),
            product_name: product.product_name.clone(),
            dates,
            yhat: product.forecast.values("yhat")?,
            yhat_lower: product.forecast.values("yhat_lower")?,
            yhat_upper: product.forecast.values("yhat_upper")?,
        })
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DeviationBar {
    pub product_name: String,
    pub difference: f64,
}

/// Two-sided bar payload splitting products on the sign of
/// predicted demand minus baseline order.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OrderDeviationData {
    pub over_ordered: Vec<DeviationBar>,
    pub under_ordered: Vec<DeviationBar>,
}

impl OrderDeviationData {
    pub fn from_report(report: &Report) -> Self {
        OrderDeviationData {
            over_ordered: bars(report.over_ordered()),
            under_ordered: bars(report.under_ordered()),
        }
    }
}

fn bars(decisions: Vec<&PurchaseDecision>) -> Vec<DeviationBar> {
    decisions
        .into_iter()
        .map(|decision| DeviationBar {
            product_name: decision.product_name.clone(),
            difference: decision.difference(),
        })
        .collect()
}
