//! Stage 3: structural eligibility.
//!
//! States in which the symbol must not be traded at all, no matter how
//! well it scores: trading halts, armed volatility interruptions, stale
//! or missing feed data, crashes, unusable spreads.

use crate::decision::EligibilityReason;
use common::{Snapshot, StrategyConfig};

pub fn run(snapshot: &Snapshot, strategy: &StrategyConfig) -> Result<(), EligibilityReason> {
    let rt = &snapshot.realtime;

    if rt.trading_halt {
        return Err(EligibilityReason::TradingHalt);
    }
    if rt.vi_reference_price > 0.0 || rt.vi_session() {
        return Err(EligibilityReason::ViArmed);
    }
    let kinds = usize::from(rt.has_orderbook_data())
        + usize::from(rt.has_volume_data())
        + usize::from(rt.has_contract_data());
    if kinds < strategy.min_realtime_data_kinds {
        return Err(EligibilityReason::MissingRealtimeData);
    }
    if rt.price_change_rate < strategy.min_price_change_rate {
        return Err(EligibilityReason::CrashingPrice);
    }
    if rt.has_orderbook_data() && rt.spread_rate() > strategy.max_spread_rate {
        return Err(EligibilityReason::WideSpread);
    }
    if rt.turnover_rate < strategy.min_turnover_rate {
        return Err(EligibilityReason::LowTurnover);
    }
    Ok(())
}
