// In crates/api-client/src/cost_basis.rs

use crate::types::Trade;
use crate::{Error, Result};
use rust_decimal::Decimal;

/// Average prices derived from a symbol's fill history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBasis {
    /// Volume-weighted price of all buy fills.
    pub average_price: Decimal,
    /// Average cost of the quantity still held; `None` once everything was sold.
    pub cost_price: Option<Decimal>,
}

/// Replays fills in time order.
///
/// Buys add to the open quantity at their price; sells remove quantity at the
/// running average cost and never take the open quantity below zero.
pub fn compute_cost_basis(symbol: &str, trades: &[Trade]) -> Result<CostBasis> {
    if trades.is_empty() {
        return Err(Error::CostBasis {
            symbol: symbol.to_string(),
            reason: "no trade history".to_string(),
        });
    }

    let mut ordered: Vec<&Trade> = trades.iter().collect();
    ordered.sort_by_key(|t| t.time);

    let mut bought_qty = Decimal::ZERO;
    let mut bought_value = Decimal::ZERO;
    let mut open_qty = Decimal::ZERO;
    let mut open_cost = Decimal::ZERO;

    for trade in ordered {
        if trade.is_buyer {
            bought_qty += trade.qty;
            bought_value += trade.price * trade.qty;
            open_qty += trade.qty;
            open_cost += trade.price * trade.qty;
        } else if open_qty > Decimal::ZERO {
            let avg_cost = open_cost / open_qty;
            let reduce = trade.qty.min(open_qty);
            open_cost -= avg_cost * reduce;
            open_qty -= reduce;
        }
    }

    if bought_qty.is_zero() {
        return Err(Error::CostBasis {
            symbol: symbol.to_string(),
            reason: "no BUY trades found".to_string(),
        });
    }

    Ok(CostBasis {
        average_price: bought_value / bought_qty,
        cost_price: (!open_qty.is_zero()).then(|| open_cost / open_qty),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fill(time: i64, price: Decimal, qty: Decimal, is_buyer: bool) -> Trade {
        Trade {
            symbol: "ETHUSDT".to_string(),
            price,
            qty,
            is_buyer,
            time,
        }
    }

    #[test]
    fn weighted_average_of_buys() {
        let trades = vec![
            fill(1, dec!(100), dec!(1), true),
            fill(2, dec!(200), dec!(3), true),
        ];
        let basis = compute_cost_basis("ETHUSDT", &trades).unwrap();
        assert_eq!(basis.average_price, dec!(175));
        assert_eq!(basis.cost_price, Some(dec!(175)));
    }

    #[test]
    fn fills_are_replayed_in_time_order() {
        // The sell happens after the first buy only.
        let trades = vec![
            fill(3, dec!(300), dec!(1), true),
            fill(2, dec!(150), dec!(1), false),
            fill(1, dec!(100), dec!(2), true),
        ];
        let basis = compute_cost_basis("ETHUSDT", &trades).unwrap();
        // average over buys: (200 + 300) / 3
        assert_eq!(basis.average_price.round_dp(6), dec!(166.666667));
        // 1 left at 100 plus 1 at 300
        assert_eq!(basis.cost_price, Some(dec!(200)));
    }

    #[test]
    fn fully_sold_position_has_no_cost_price() {
        let trades = vec![
            fill(1, dec!(10), dec!(5), true),
            fill(2, dec!(12), dec!(7), false),
        ];
        let basis = compute_cost_basis("ETHUSDT", &trades).unwrap();
        assert_eq!(basis.average_price, dec!(10));
        assert_eq!(basis.cost_price, None);
    }

    #[test]
    fn history_without_buys_is_an_error() {
        assert!(compute_cost_basis("ETHUSDT", &[]).is_err());
        let sells = vec![fill(1, dec!(10), dec!(1), false)];
        assert!(matches!(
            compute_cost_basis("ETHUSDT", &sells),
            Err(Error::CostBasis { .. })
        ));
    }
}
