use chrono::{Duration, NaiveDate};
use polars::prelude::*;

use crate::errors::EngineError;
use crate::storage::models::ProductRecord;

/// Expands a product's past month demand into a uniform daily series.
///
/// The series starts at `anchor_date` and runs for `horizon_days`
/// consecutive days, each carrying an equal share of the demand.
pub fn demand_to_series(
    record: &ProductRecord,
    horizon_days: u32,
    anchor_date: NaiveDate,
) -> Result<DataFrame, EngineError> {
    let daily_demand = record.past_month_demand / f64::from(horizon_days);
    let dates: Vec<NaiveDate> = (0..horizon_days)
        .map(|offset| anchor_date + Duration::days(i64::from(offset)))
        .collect();
    let values = vec![daily_demand; horizon_days as usize];

    let date_series = Series::new("ds", dates);
    let value_series = Series::new("y", values);
    let frame = DataFrame::new(vec![date_series, value_series])?;
    Ok(frame)
}
