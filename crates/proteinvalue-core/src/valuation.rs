use serde::{Deserialize, Serialize};

/// The two derived cost-efficiency metrics for a product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    /// Dollars per gram of protein. Lower is better.
    pub cost_per_gram: f64,
    /// Grams of protein per dollar. Higher is better.
    pub protein_per_dollar: f64,
}

impl Valuation {
    /// Compute both metrics from a canonical total and a price.
    ///
    /// Requires `total_protein > 0` and `price > 0`; that is the admission
    /// gateway's job, and this function is only ever called after those
    /// checks pass. Pure - no validation, no side effects.
    pub fn compute(total_protein: f64, price: f64) -> Self {
        Self {
            cost_per_gram: price / total_protein,
            protein_per_dollar: total_protein / price,
        }
    }
}

/// The sole normalization from the per-serving input shape to the canonical
/// total-protein shape. Both shapes converge on the same `compute` call.
pub fn total_from_per_serving(servings: f64, grams_each: f64) -> f64 {
    servings * grams_each
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_both_metrics() {
        let v = Valuation::compute(720.0, 30.0);
        assert!((v.cost_per_gram - 0.041666666).abs() < 1e-6);
        assert_eq!(v.protein_per_dollar, 24.0);
    }

    #[test]
    fn metrics_are_reciprocal() {
        // protein_per_dollar == 1 / cost_per_gram, modulo float rounding
        for (grams, price) in [(720.0, 30.0), (400.0, 20.0), (33.3, 7.49), (1.0, 999.0)] {
            let v = Valuation::compute(grams, price);
            assert!((v.protein_per_dollar - 1.0 / v.cost_per_gram).abs() < 1e-9);
        }
    }

    #[test]
    fn per_serving_and_total_shapes_converge() {
        let total = total_from_per_serving(30.0, 24.0);
        let via_servings = Valuation::compute(total, 30.0);
        let via_total = Valuation::compute(720.0, 30.0);
        assert_eq!(via_servings, via_total);
    }
}
