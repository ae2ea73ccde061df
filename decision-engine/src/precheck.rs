//! Stage 1: pre-checks.
//!
//! Cheapest gates first, before any market data is inspected: lifecycle
//! state, buy window, per-symbol cooldown, then the account-level risk
//! gate.

use crate::decision::PreCheckReason;
use crate::risk_gate::{RiskGate, RiskVeto};
use chrono::{DateTime, Utc};
use common::{MarketPhase, Snapshot, TradingConfig, TradingStatus};
use state_store::RiskCounters;

pub fn run(
    snapshot: &Snapshot,
    phase: MarketPhase,
    now: DateTime<Utc>,
    counters: &RiskCounters,
    config: &TradingConfig,
) -> Result<(), PreCheckReason> {
    if snapshot.status != TradingStatus::Watching {
        return Err(PreCheckReason::NotWatching);
    }
    match phase {
        MarketPhase::Opening | MarketPhase::Active | MarketPhase::Lunch => {}
        MarketPhase::PreClose if config.strategy.allow_preclose_buys => {}
        _ => return Err(PreCheckReason::OutsideBuyWindow),
    }
    if let Some(last) = snapshot.last_buy_attempt {
        let elapsed = (now - last).num_seconds();
        if elapsed >= 0 && (elapsed as u64) < config.strategy.buy_cooldown_secs {
            return Err(PreCheckReason::CooldownActive);
        }
    }
    if let Err(veto) = RiskGate::check(counters, &config.risk) {
        return Err(match veto {
            RiskVeto::MaxPositions => PreCheckReason::MaxPositions,
            RiskVeto::DailyLossFloor => PreCheckReason::DailyLossFloor,
            RiskVeto::DailyTradeCap => PreCheckReason::DailyTradeCap,
        });
    }
    if snapshot.realtime.current_price <= 0.0 {
        return Err(PreCheckReason::NoPrice);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use common::{PositionInfo, RealtimeData, SymbolReference};

    fn snapshot() -> Snapshot {
        Snapshot {
            reference: SymbolReference {
                code: "000001".to_string(),
                name: "Test".to_string(),
                yesterday_close: 10_000.0,
                yesterday_volume: 100_000,
                avg_daily_volume: 100_000,
                listed_shares: 1_000_000,
                sma20: 10_000.0,
                pattern_score: 75.0,
                pattern_names: vec![],
            },
            realtime: RealtimeData {
                current_price: 10_100.0,
                ..RealtimeData::default()
            },
            status: TradingStatus::Watching,
            position: None::<PositionInfo>,
            last_buy_attempt: None,
        }
    }

    #[test]
    fn watching_symbol_in_active_phase_passes() {
        let snap = snapshot();
        let config = TradingConfig::default();
        let counters = RiskCounters::default();
        assert!(run(&snap, MarketPhase::Active, Utc::now(), &counters, &config).is_ok());
    }

    #[test]
    fn pending_order_is_not_re_entered() {
        let mut snap = snapshot();
        snap.status = TradingStatus::BuyOrdered;
        let config = TradingConfig::default();
        let counters = RiskCounters::default();
        assert_eq!(
            run(&snap, MarketPhase::Active, Utc::now(), &counters, &config),
            Err(PreCheckReason::NotWatching)
        );
    }

    #[test]
    fn closing_phase_blocks_buys_and_preclose_is_configurable() {
        let snap = snapshot();
        let mut config = TradingConfig::default();
        let counters = RiskCounters::default();
        assert_eq!(
            run(&snap, MarketPhase::Closing, Utc::now(), &counters, &config),
            Err(PreCheckReason::OutsideBuyWindow)
        );
        assert!(run(&snap, MarketPhase::PreClose, Utc::now(), &counters, &config).is_ok());
        config.strategy.allow_preclose_buys = false;
        assert_eq!(
            run(&snap, MarketPhase::PreClose, Utc::now(), &counters, &config),
            Err(PreCheckReason::OutsideBuyWindow)
        );
    }

    #[test]
    fn cooldown_expires() {
        let mut snap = snapshot();
        let config = TradingConfig::default();
        let counters = RiskCounters::default();
        let now = Utc::now();
        snap.last_buy_attempt = Some(now - Duration::seconds(5));
        assert_eq!(
            run(&snap, MarketPhase::Active, now, &counters, &config),
            Err(PreCheckReason::CooldownActive)
        );
        snap.last_buy_attempt = Some(now - Duration::seconds(11));
        assert!(run(&snap, MarketPhase::Active, now, &counters, &config).is_ok());
    }

    #[test]
    fn risk_gate_vetoes_surface_as_precheck_reasons() {
        let snap = snapshot();
        let config = TradingConfig::default();
        let counters = RiskCounters {
            open_positions: 5,
            ..RiskCounters::default()
        };
        assert_eq!(
            run(&snap, MarketPhase::Active, Utc::now(), &counters, &config),
            Err(PreCheckReason::MaxPositions)
        );
    }

    #[test]
    fn missing_price_is_rejected_last() {
        let mut snap = snapshot();
        snap.realtime.current_price = 0.0;
        let config = TradingConfig::default();
        let counters = RiskCounters::default();
        assert_eq!(
            run(&snap, MarketPhase::Active, Utc::now(), &counters, &config),
            Err(PreCheckReason::NoPrice)
        );
    }
}
