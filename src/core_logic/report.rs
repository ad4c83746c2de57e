use std::cmp::Ordering;

use crate::core_logic::procurement::PurchaseDecision;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportStatus {
    /// Every product is already covered; an empty report is a valid
    /// outcome, not an error.
    NoPurchasesRequired,
    PurchasesRequired {
        products: usize,
    },
}

/// Purchase decisions ordered by urgency.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    decisions: Vec<PurchaseDecision>,
}

/// Orders decisions by descending purchase amount, largest gap first.
/// Ties fall back to the product id so the order is reproducible.
pub fn assemble_report(mut decisions: Vec<PurchaseDecision>) -> Report {
    decisions.sort_by(|a, b| {
        b.purchase_amount
            .partial_cmp(&a.purchase_amount)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    Report { decisions }
}

impl Report {
    pub fn decisions(&self) -> &[PurchaseDecision] {
        &self.decisions
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    pub fn status(&self) -> ReportStatus {
        if self.is_empty() {
            ReportStatus::NoPurchasesRequired
        } else {
            ReportStatus::PurchasesRequired {
                products: self.len(),
            }
        }
    }

    /// Decisions where the baseline order exceeds the predicted demand.
    pub fn over_ordered(&self) -> Vec<&PurchaseDecision> {
        self.decisions
            .iter()
            .filter(|decision| decision.difference() < 0.0)
            .collect()
    }

    /// Decisions where the predicted demand exceeds the baseline order.
    pub fn under_ordered(&self) -> Vec<&PurchaseDecision> {
        self.decisions
            .iter()
            .filter(|decision| decision.difference() > 0.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(
        product_id: &str,
        purchase_amount: f64,
        predicted_demand: f64,
        baseline_order: f64,
    ) -> PurchaseDecision {
        PurchaseDecision {
            product_id: product_id.to_string(),
            product_name: format!("Product {product_id}"),
            predicted_demand,
            last_demand: predicted_demand - purchase_amount,
            baseline_order,
            purchase_amount,
        }
    }

    #[test]
    fn report_sorts_by_purchase_amount_descending() {
        // Arrange
        let decisions = vec![
            decision("P001", 10.0, 110.0, 90.0),
            decision("P002", 40.0, 140.0, 90.0),
            decision("P003", 25.0, 125.0, 90.0),
        ];

        // Act
        let report = assemble_report(decisions);

        // Assert
        let ids: Vec<&str> = report
            .decisions()
            .iter()
            .map(|d| d.product_id.as_str())
            .collect();
        assert_eq!(ids, vec!["P002", "P003", "P001"]);
    }

    #[test]
    fn equal_amounts_fall_back_to_product_id() {
        // Arrange
        let decisions = vec![
            decision("P002", 25.0, 125.0, 90.0),
            decision("P001", 25.0, 125.0, 90.0),
        ];

        // Act
        let report = assemble_report(decisions);

        // Assert
        let ids: Vec<&str> = report
            .decisions()
            .iter()
            .map(|d| d.product_id.as_str())
            .collect();
        assert_eq!(ids, vec!["P001", "P002"]);
    }

    #[test]
    fn reassembling_a_report_preserves_its_order() {
        // Arrange
        let decisions = vec![
            decision("P001", 10.0, 110.0, 90.0),
            decision("P002", 40.0, 140.0, 90.0),
        ];
        let report = assemble_report(decisions);

        // Act
        let reassembled = assemble_report(report.decisions().to_vec());

        // Assert
        assert_eq!(reassembled, report);
    }

    #[test]
    fn empty_report_signals_no_purchases_required() {
        // Arrange
        let decisions = Vec::new();

        // Act
        let report = assemble_report(decisions);

        // Assert
        assert!(report.is_empty());
        assert_eq!(report.status(), ReportStatus::NoPurchasesRequired);
    }

    #[test]
    fn status_counts_decided_products() {
        // Arrange
        let decisions = vec![
            decision("P001", 10.0, 110.0, 90.0),
            decision("P002", 40.0, 140.0, 90.0),
        ];

        // Act
        let report = assemble_report(decisions);

        // Assert
        assert_eq!(
            report.status(),
            ReportStatus::PurchasesRequired { products: 2 }
        );
    }

    #[test]
    fn deviation_groups_split_on_difference_sign() {
        // Arrange
        let decisions = vec![
            decision("P001", 10.0, 110.0, 90.0),
            decision("P002", 10.0, 110.0, 130.0),
            decision("P003", 10.0, 110.0, 110.0),
        ];

        // Act
        let report = assemble_report(decisions);

        // Assert
        let under: Vec<&str> = report
            .under_ordered()
            .iter()
            .map(|d| d.product_id.as_str())
            .collect();
        let over: Vec<&str> = report
            .over_ordered()
            .iter()
            .map(|d| d.product_id.as_str())
            .collect();
        assert_eq!(under, vec!["P001"]);
        assert_eq!(over, vec!["P002"]);
    }
}
