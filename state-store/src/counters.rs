//! Process-wide risk and observability counters.
//!
//! All mutations anywhere in the system go through
//! `SymbolStateStore::increment_stat`; no component touches a counter
//! field directly.

use serde::Serialize;

/// Name of a single counter. The statistics domain stores one value per
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatCounter {
    /// Live open positions (fill-confirmed, not yet sold).
    OpenPositions,
    /// Trade entries today; the daily cap reads this.
    DailyTrades,
    /// Realized P&L accumulated today, in currency units.
    DailyRealizedPnl,
    /// Pipeline evaluations performed.
    Evaluations,
    BuySignals,
    SellSignals,
    Rejections,
}

/// Point-in-time copy of all counters, read by the risk gate before every
/// signal decision.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RiskCounters {
    pub open_positions: i64,
    pub daily_trades: u64,
    pub daily_realized_pnl: f64,
    pub evaluations: u64,
    pub buy_signals: u64,
    pub sell_signals: u64,
    pub rejections: u64,
}

impl RiskCounters {
    pub(crate) fn apply(&mut self, counter: StatCounter, delta: f64) {
        match counter {
            StatCounter::OpenPositions => {
                self.open_positions = (self.open_positions + delta as i64).max(0);
            }
            StatCounter::DailyTrades => self.daily_trades += delta.max(0.0) as u64,
            StatCounter::DailyRealizedPnl => self.daily_realized_pnl += delta,
            StatCounter::Evaluations => self.evaluations += delta.max(0.0) as u64,
            StatCounter::BuySignals => self.buy_signals += delta.max(0.0) as u64,
            StatCounter::SellSignals => self.sell_signals += delta.max(0.0) as u64,
            StatCounter::Rejections => self.rejections += delta.max(0.0) as u64,
        }
    }

    /// Session rollover: daily aggregates reset, open positions survive.
    pub(crate) fn reset_daily(&mut self) {
        self.daily_trades = 0;
        self.daily_realized_pnl = 0.0;
        self.evaluations = 0;
        self.buy_signals = 0;
        self.sell_signals = 0;
        self.rejections = 0;
    }
}
