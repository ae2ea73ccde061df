//! Stage 2: first-pass market-pressure filters.
//!
//! Quick rejections on raw pressure readings before the more expensive
//! eligibility and scoring stages. Orderbook-ratio checks only apply when
//! both sides of the book have printed; absence of data is handled by the
//! eligibility stage, not here.

use crate::decision::FilterReason;
use common::{Snapshot, StrategyConfig};

pub fn run(
    snapshot: &Snapshot,
    liquidity_score: f64,
    strategy: &StrategyConfig,
) -> Result<(), FilterReason> {
    let rt = &snapshot.realtime;

    if rt.has_orderbook_data() {
        let bid_ask = rt.total_bid_qty as f64 / rt.total_ask_qty as f64;
        if bid_ask < strategy.min_bid_ask_qty_ratio {
            return Err(FilterReason::WeakBidSupport);
        }
        let ask_bid = rt.total_ask_qty as f64 / rt.total_bid_qty as f64;
        if ask_bid > strategy.max_ask_bid_qty_ratio {
            return Err(FilterReason::HeavySellPressure);
        }
    }
    if rt.buy_ratio < strategy.min_buy_ratio {
        return Err(FilterReason::LowBuyRatio);
    }
    if rt.contract_strength < strategy.min_contract_strength {
        return Err(FilterReason::WeakContractStrength);
    }
    if rt.price_change_rate >= strategy.max_price_change_rate {
        return Err(FilterReason::NearLimitUp);
    }
    if liquidity_score < strategy.min_liquidity_score {
        return Err(FilterReason::ThinLiquidity);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{PositionInfo, RealtimeData, SymbolReference, TradingStatus};

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
                current_price: 10_200.0,
                total_bid_qty: 60_000,
                total_ask_qty: 40_000,
                buy_ratio: 55.0,
                contract_strength: 110.0,
                price_change_rate: 2.0,
                ..RealtimeData::default()
            },
            status: TradingStatus::Watching,
            position: None::<PositionInfo>,
            last_buy_attempt: None,
        }
    }

    #[test]
    fn healthy_pressure_passes() {
        let snap = snapshot();
        assert!(run(&snap, 60.0, &StrategyConfig::default()).is_ok());
    }

    #[test]
    fn thin_bid_support_is_rejected() {
        let mut snap = snapshot();
        snap.realtime.total_bid_qty = 40_000;
        snap.realtime.total_ask_qty = 40_000;
        assert_eq!(
            run(&snap, 60.0, &StrategyConfig::default()),
            Err(FilterReason::WeakBidSupport)
        );
    }

    #[test]
    fn ask_wall_is_rejected() {
        let mut snap = snapshot();
        snap.realtime.total_bid_qty = 10_000;
        snap.realtime.total_ask_qty = 25_000;
        assert_eq!(
            run(&snap, 60.0, &StrategyConfig::default()),
            Err(FilterReason::WeakBidSupport)
        );
        // Below the bid floor it reads as weak support; flip the floor off
        // to see the sell-pressure cap fire on its own.
        let mut strategy = StrategyConfig::default();
        strategy.min_bid_ask_qty_ratio = 0.0;
        assert_eq!(
            run(&snap, 60.0, &strategy),
            Err(FilterReason::HeavySellPressure)
        );
    }

    #[test]
    fn missing_orderbook_defers_to_eligibility() {
        let mut snap = snapshot();
        snap.realtime.total_bid_qty = 0;
        snap.realtime.total_ask_qty = 0;
        assert!(run(&snap, 60.0, &StrategyConfig::default()).is_ok());
    }

    #[test]
    fn limit_up_chase_is_rejected() {
        let mut snap = snapshot();
        snap.realtime.price_change_rate = 26.0;
        assert_eq!(
            run(&snap, 60.0, &StrategyConfig::default()),
            Err(FilterReason::NearLimitUp)
        );
    }

    #[test]
    fn illiquid_names_are_rejected() {
        let snap = snapshot();
        assert_eq!(
            run(&snap, 10.0, &StrategyConfig::default()),
            Err(FilterReason::ThinLiquidity)
        );
    }
}
