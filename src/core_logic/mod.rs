pub mod forecasting;
pub mod pipeline;
pub mod procurement;
pub mod report;
pub mod series;
