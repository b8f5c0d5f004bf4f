// In crates/risk/src/dca.rs

use crate::types::{DcaSettings, DcaTarget};
use crate::{Error, Result};
use core_types::Position;

/// Plans additional buys that pull the average price of a losing position
/// toward the current price.
#[derive(Debug, Clone, Default)]
pub struct DcaPlanner {
    settings: DcaSettings,
}

impl DcaPlanner {
    pub fn new(settings: DcaSettings) -> Self {
        Self { settings }
    }

    pub fn plan(&self, position: &Position) -> Result<Vec<DcaTarget>> {
        calculate_dca(
            &position.symbol.0,
            position.current_price,
            position.quantity,
            position.average_price,
            &self.settings.reduction_targets,
        )
    }
}

/// Buys smaller than this fraction of the holding are treated as zero.
const MIN_BUY_RATIO: f64 = 1e-9;

/// Computes one [`DcaTarget`] per reduction goal, in the order given.
///
/// For a reduction `r` of the current loss `L`:
/// the target loss is `L * (1 - r/100)`, the target average is
/// `price / (1 - target_loss/100)` and the quantity to buy is
/// `(target_avg - buy_price) * qty / (price - target_avg)`. Goals that would need
/// a non-positive or non-finite quantity are left out. A position that is not at
/// a loss yields an empty plan.
pub fn calculate_dca(
    symbol: &str,
    price: f64,
    quantity: f64,
    buy_price: f64,
    reduction_targets: &[f64],
) -> Result<Vec<DcaTarget>> {
    if !(price > 0.0) {
        return Err(Error::InvalidInput {
            symbol: symbol.to_string(),
            reason: format!("current price must be positive, got {}", price),
        });
    }
    if !(quantity > 0.0) || !(buy_price > 0.0) {
        return Err(Error::InvalidInput {
            symbol: symbol.to_string(),
            reason: format!(
                "quantity and buy price must be positive, got qty={:.2} buy_price={:.2}",
                quantity, buy_price
            ),
        });
    }

    let loss_pct = (1.0 - price / buy_price) * 100.0;
    if loss_pct <= 0.0 {
        return Ok(Vec::new());
    }

    let plan = reduction_targets
        .iter()
        .filter_map(|&reduction| {
            let target_loss = loss_pct * (1.0 - reduction / 100.0);
            // A goal that does not lower the loss needs no buy at all.
            if !(target_loss < loss_pct) {
                return None;
            }
            let wanted_avg = price / (1.0 - target_loss / 100.0);
            let buy_qty = ((wanted_avg - buy_price) * quantity) / (price - wanted_avg);
            // Rounding noise around a zero buy is not a plan step.
            if !buy_qty.is_finite() || buy_qty <= quantity * MIN_BUY_RATIO {
                return None;
            }

            let total_qty = quantity + buy_qty;
            let new_avg = (buy_price * quantity + price * buy_qty) / total_qty;
            Some(DcaTarget {
                reduction_pct: reduction,
                target_avg: new_avg,
                buy_qty,
                total_qty,
                usdt_cost: buy_qty * price,
                new_loss_pct: (1.0 - price / new_avg) * 100.0,
            })
        })
        .collect();

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use core_types::Symbol;

    fn halve_loss(price: f64, qty: f64, buy: f64) -> Vec<DcaTarget> {
        calculate_dca("TESTUSDT", price, qty, buy, &[50.0]).unwrap()
    }

    #[test]
    fn halving_a_twenty_percent_loss() {
        let plan = halve_loss(80.0, 10.0, 100.0);
        assert_eq!(plan.len(), 1);
        let target = plan[0];
        // target loss 10% -> average 80 / 0.9
        assert_relative_eq!(target.target_avg, 80.0 / 0.9, epsilon = 1e-6);
        assert_relative_eq!(target.buy_qty, 12.5, epsilon = 1e-9);
        assert_relative_eq!(target.total_qty, 22.5, epsilon = 1e-9);
        assert_relative_eq!(target.usdt_cost, 1_000.0, epsilon = 1e-6);
        assert_relative_eq!(target.new_loss_pct, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn default_targets_keep_their_order() {
        let planner = DcaPlanner::default();
        let position = Position {
            symbol: Symbol("ADAUSDT".to_string()),
            quantity: 100.0,
            average_price: 0.5,
            current_price: 0.4,
        };
        let plan = planner.plan(&position).unwrap();
        assert_eq!(plan.len(), 3);
        let reductions: Vec<f64> = plan.iter().map(|t| t.reduction_pct).collect();
        assert_eq!(reductions, vec![30.0, 50.0, 80.0]);
        // Deeper reductions cost more.
        assert!(plan[0].buy_qty < plan[1].buy_qty);
        assert!(plan[1].buy_qty < plan[2].buy_qty);
    }

    #[test]
    fn no_loss_means_no_plan() {
        assert!(calculate_dca("X", 120.0, 1.0, 100.0, &[30.0, 50.0]).unwrap().is_empty());
        assert!(calculate_dca("X", 100.0, 1.0, 100.0, &[30.0]).unwrap().is_empty());
    }

    #[test]
    fn break_even_goal_never_yields_a_row() {
        // Rounding here once produced a buy of about 5e-15 units.
        let plan = calculate_dca(
            "X",
            9.547623975271005,
            10.0,
            87.63654700200593,
            &[30.0, 50.0, 80.0, 0.0],
        )
        .unwrap();
        let reductions: Vec<f64> = plan.iter().map(|t| t.reduction_pct).collect();
        assert_eq!(reductions, vec![30.0, 50.0, 80.0]);
    }

    #[test]
    fn unreachable_goals_are_skipped() {
        // 100% reduction needs an infinite buy; a negative one needs a sell.
        let plan = calculate_dca("X", 80.0, 10.0, 100.0, &[100.0, -10.0, 50.0]).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].reduction_pct, 50.0);
    }

    #[test]
    fn non_positive_inputs_are_rejected() {
        let err = calculate_dca("BTCUSDT", 0.0, 1.0, 100.0, &[50.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { ref symbol, .. } if symbol == "BTCUSDT"));
        assert!(calculate_dca("X", 80.0, 0.0, 100.0, &[50.0]).is_err());
        assert!(calculate_dca("X", 80.0, 1.0, -3.0, &[50.0]).is_err());
        assert!(calculate_dca("X", f64::NAN, 1.0, 100.0, &[50.0]).is_err());
    }

    proptest::proptest! {
        #[test]
        fn every_step_moves_the_average_toward_the_price(
            buy in 1.0f64..1_000.0,
            drop in 0.01f64..0.9,
            qty in 0.1f64..1_000.0,
            reduction in 1.0f64..99.0,
        ) {
            let price = buy * (1.0 - drop);
            let plan = calculate_dca("X", price, qty, buy, &[reduction, 0.0]).unwrap();
            proptest::prop_assert!(plan.iter().all(|t| t.reduction_pct != 0.0));
            for t in plan {
                proptest::prop_assert!(t.buy_qty > 0.0);
                proptest::prop_assert!(t.total_qty > qty);
                proptest::prop_assert!(t.target_avg < buy && t.target_avg > price);
                proptest::prop_assert!(t.new_loss_pct < drop * 100.0);
            }
        }
    }
}
