//! Position lifecycle state machine.
//!
//! The transition graph is a DAG with a single terminal state:
//!
//! ```text
//! Watching -> BuyOrdered -> {Bought, PartialBought} -> SellOrdered -> Sold
//! ```
//!
//! `Sold` clears the position record and resets the symbol to `Watching`
//! inside the store. Rollback edges (BuyOrdered -> Watching,
//! SellOrdered -> Bought) exist only for the external watchdog and for
//! immediate order rejections; they are accepted by `rollback_order`, not
//! by `set_status`.

use common::TradingStatus;

/// Whether `from -> to` is a forward edge of the lifecycle DAG.
pub fn is_valid_transition(from: TradingStatus, to: TradingStatus) -> bool {
    use TradingStatus::*;
    matches!(
        (from, to),
        (Watching, BuyOrdered)
            | (BuyOrdered, Bought)
            | (BuyOrdered, PartialBought)
            | (Bought, SellOrdered)
            | (PartialBought, SellOrdered)
            | (SellOrdered, Sold)
    )
}

/// Whether `from -> to` is one of the two watchdog rollback edges.
pub fn is_rollback_transition(from: TradingStatus, to: TradingStatus) -> bool {
    use TradingStatus::*;
    matches!((from, to), (BuyOrdered, Watching) | (SellOrdered, Bought))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::TradingStatus::*;

    const ALL: [common::TradingStatus; 6] =
        [Watching, BuyOrdered, PartialBought, Bought, SellOrdered, Sold];

    #[test]
    fn only_the_dag_edges_are_valid() {
        let valid = [
            (Watching, BuyOrdered),
            (BuyOrdered, Bought),
            (BuyOrdered, PartialBought),
            (Bought, SellOrdered),
            (PartialBought, SellOrdered),
            (SellOrdered, Sold),
        ];
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    is_valid_transition(from, to),
                    valid.contains(&(from, to)),
                    "unexpected validity for {from:?} -> {to:?}"
                );
            }
        }
    }

    #[test]
    fn sold_is_terminal() {
        for to in ALL {
            assert!(!is_valid_transition(Sold, to));
        }
    }

    #[test]
    fn rollback_edges_are_not_forward_edges() {
        assert!(is_rollback_transition(BuyOrdered, Watching));
        assert!(is_rollback_transition(SellOrdered, Bought));
        assert!(!is_valid_transition(BuyOrdered, Watching));
        assert!(!is_valid_transition(SellOrdered, Bought));
        assert!(!is_rollback_transition(Bought, Watching));
    }
}
