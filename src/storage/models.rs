use serde::{Deserialize, Serialize};

/// One row of the product demand dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "ProductID")]
    pub product_id: String,
    #[serde(rename = "ProductName")]
    pub product_name: String,
    #[serde(rename = "PastMonthDemand")]
    pub past_month_demand: f64,
    #[serde(rename = "BaselineOrder")]
    pub baseline_order: f64,
}

impl ProductRecord {
    /// Checks the row is usable before it reaches the model.
    pub fn validate(&self) -> Result<(), String> {
        if self.product_id.trim().is_empty() {
            return Err("ProductID is empty".to_string());
        }
        if !self.past_month_demand.is_finite() {
            return Err(format!(
                "PastMonthDemand is not a finite number: {}",
                self.past_month_demand
            ));
        }
        if self.past_month_demand < 0.0 {
            return Err(format!(
                "PastMonthDemand is negative: {}",
                self.past_month_demand
            ));
        }
        if !self.baseline_order.is_finite() {
            return Err(format!(
                "BaselineOrder is not a finite number: {}",
                self.baseline_order
            ));
        }
        if self.baseline_order < 0.0 {
            return Err(format!("BaselineOrder is negative: {}", self.baseline_order));
        }
        Ok(())
    }
}
