//! Account-level risk gate.
//!
//! Consulted on the buy side only; exits are never vetoed. The gate reads
//! a point-in-time counters copy, so a decision made concurrently with a
//! fill can overshoot by at most one position. The executor is the final
//! arbiter of available funds.

use common::RiskConfig;
use state_store::RiskCounters;

/// Why the gate refused a new entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskVeto {
    MaxPositions,
    DailyLossFloor,
    DailyTradeCap,
}

pub struct RiskGate;

impl RiskGate {
    /// Check a counters snapshot against the configured limits.
    pub fn check(counters: &RiskCounters, risk: &RiskConfig) -> Result<(), RiskVeto> {
        if counters.open_positions >= risk.max_positions as i64 {
            return Err(RiskVeto::MaxPositions);
        }
        if counters.daily_realized_pnl <= -risk.daily_loss_limit {
            return Err(RiskVeto::DailyLossFloor);
        }
        if counters.daily_trades >= risk.daily_trade_cap as u64 {
            return Err(RiskVeto::DailyTradeCap);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters(open: i64, trades: u64, pnl: f64) -> RiskCounters {
        RiskCounters {
            open_positions: open,
            daily_trades: trades,
            daily_realized_pnl: pnl,
            ..RiskCounters::default()
        }
    }

    #[test]
    fn clean_book_passes() {
        let risk = RiskConfig::default();
        assert!(RiskGate::check(&counters(0, 0, 0.0), &risk).is_ok());
        assert!(RiskGate::check(&counters(4, 10, -100_000.0), &risk).is_ok());
    }

    #[test]
    fn full_book_is_vetoed() {
        let risk = RiskConfig::default();
        assert_eq!(
            RiskGate::check(&counters(5, 0, 0.0), &risk),
            Err(RiskVeto::MaxPositions)
        );
    }

    #[test]
    fn loss_floor_is_inclusive() {
        let risk = RiskConfig::default();
        assert_eq!(
            RiskGate::check(&counters(0, 0, -500_000.0), &risk),
            Err(RiskVeto::DailyLossFloor)
        );
        assert!(RiskGate::check(&counters(0, 0, -499_999.0), &risk).is_ok());
    }

    #[test]
    fn trade_cap_stops_churn() {
        let risk = RiskConfig::default();
        assert_eq!(
            RiskGate::check(&counters(0, 30, 0.0), &risk),
            Err(RiskVeto::DailyTradeCap)
        );
    }
}
