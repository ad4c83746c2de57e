use chrono::{Duration, NaiveDate};
use ndarray::Array2;
use ndarray_stats::CorrelationExt;
use polars::prelude::*;

use crate::errors::FitError;

/// Multiplier on the residual spread for the ~80% uncertainty interval.
const INTERVAL_Z: f64 = 1.2816;

#[derive(Debug, Clone, Copy, PartialEq)]
struct TrendModel {
    slope: f64,
    intercept: f64,
    sigma: f64,
}

/// Fitted demand model over the history plus the forecast horizon.
///
/// The frame holds one row per day: `ds`, `yhat`, `yhat_lower` and
/// `yhat_upper`.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    frame: DataFrame,
}

impl Forecast {
    pub fn len(&self) -> usize {
        self.frame.height()
    }

    /// Predicted value on the last day of the horizon.
    pub fn last_yhat(&self) -> PolarsResult<f64> {
        if self.len() == 0 {
            return Err(PolarsError::NoData("forecast frame is empty".into()));
        }
        let column = self.frame.column("yhat")?.f64()?;
        column
            .get(self.len() - 1)
            .ok_or_else(|| PolarsError::NoData("forecast frame is empty".into()))
    }

    pub fn dates(&self) -> PolarsResult<Vec<NaiveDate>> {
        Ok(self
            .frame
            .column("ds")?
            .date()?
            .as_date_iter()
            .flatten()
            .collect())
    }

    pub fn values(&self, name: &str) -> PolarsResult<Vec<f64>> {
        Ok(self
            .frame
            .column(name)?
            .f64()?
            .into_no_null_iter()
            .collect())
    }
}

/// Fits a linear trend to the daily series and extends it
/// `horizon_days` past the end of the history.
pub fn fit_forecast(series: &DataFrame, horizon_days: u32) -> Result<Forecast, FitError> {
    let height = series.height();
    if height == 0 {
        return Err(FitError::EmptySeries);
    }

    let mut values: Vec<f64> = Vec::with_capacity(height);
    for (row, value) in series.column("y")?.f64()?.iter().enumerate() {
        match value {
            Some(value) if value.is_finite() => values.push(value),
            _ => return Err(FitError::NonFinite(row)),
        }
    }

    let start_date = series
        .column("ds")?
        .date()?
        .as_date_iter()
        .next()
        .flatten()
        .ok_or_else(|| FitError::Frame(PolarsError::NoData("ds column has no values".into())))?;

    let model = fit_trend(&values)?;

    let total_days = height + horizon_days as usize;
    let mut dates: Vec<NaiveDate> = Vec::with_capacity(total_days);
    let mut yhat: Vec<f64> = Vec::with_capacity(total_days);
    let mut yhat_lower: Vec<f64> = Vec::with_capacity(total_days);
    let mut yhat_upper: Vec<f64> = Vec::with_capacity(total_days);

    for step in 0..total_days {
        let fitted = model.intercept + model.slope * step as f64;
        dates.push(start_date + Duration::days(step as i64));
        yhat.push(fitted);
        yhat_lower.push(fitted - INTERVAL_Z * model.sigma);
        yhat_upper.push(fitted + INTERVAL_Z * model.sigma);
    }

    let frame = DataFrame::new(vec![
        Series::new("ds", dates),
        Series::new("yhat", yhat),
        Series::new("yhat_lower", yhat_lower),
        Series::new("yhat_upper", yhat_upper),
    ])?;

    Ok(Forecast { frame })
}

/// Ordinary least squares over day index, with the residual standard
/// deviation as the spread estimate.
///
/// A constant series fits exactly flat, so a uniform daily signal
/// projects back to itself without floating-point drift.
fn fit_trend(values: &[f64]) -> Result<TrendModel, FitError> {
    let first = match values.first() {
        Some(first) => *first,
        None => return Err(FitError::EmptySeries),
    };
    if values.iter().all(|value| *value == first) {
        return Ok(TrendModel {
            slope: 0.0,
            intercept: first,
            sigma: 0.0,
        });
    }

    let n = values.len();
    let observations = Array2::from_shape_fn((2, n), |(row, col)| {
        if row == 0 {
            col as f64
        } else {
            values[col]
        }
    });
    let covariance = observations.cov(1.0).map_err(|_| FitError::EmptySeries)?;

    let slope = covariance[[0, 1]] / covariance[[0, 0]];
    let mean_x = (n - 1) as f64 / 2.0;
    let mean_y = values.iter().sum::<f64>() / n as f64;
    let intercept = mean_y - slope * mean_x;

    let sse: f64 = values
        .iter()
        .enumerate()
        .map(|(x, y)| {
            let residual = y - (intercept + slope * x as f64);
            residual * residual
        })
        .sum();
    let sigma = if n > 2 {
        (sse / (n - 2) as f64).sqrt()
    } else {
        0.0
    };

    Ok(TrendModel {
        slope,
        intercept,
        sigma,
    })
}
