use polars::prelude::PolarsError;

/// Reasons a forecast model can refuse a series.
#[derive(Debug, thiserror::Error)]
pub enum FitError {
    #[error("series is empty")]
    EmptySeries,

    #[error("series contains a non-finite value at row {0}")]
    NonFinite(usize),

    #[error(transparent)]
    Frame(#[from] PolarsError),
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid record for product {product_id}: {reason}")]
    InvalidRecord { product_id: String, reason: String },

    #[error("model fit failed for product {product_id}: {source}")]
    ModelFit {
        product_id: String,
        source: FitError,
    },

    #[error("dataframe error: {0}")]
    Frame(#[from] PolarsError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("thread pool error: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to open {}: {source}", path.display())]
    File {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub fn invalid_record(product_id: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::InvalidRecord {
            product_id: product_id.into(),
            reason: reason.into(),
        }
    }
}
