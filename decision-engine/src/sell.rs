//! Sell-side decision table.
//!
//! No scoring: a fixed-priority list of conditions, checked top to
//! bottom, where the first match wins. Safety exits (halts, session end,
//! emergencies) outrank P&L exits, which outrank deterioration and
//! opportunity-cost exits. Exits are never blocked by the risk gate.

use crate::decision::SellSignal;
use chrono::{DateTime, Utc};
use common::{MarketPhase, PositionInfo, Snapshot, TradingConfig};
use serde::Serialize;

/// Exit reasons in strict priority order. `priority()` follows the
/// declaration order; lower ranks win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SellReason {
    TradingHalt,
    MarketClose,
    EmergencyStop,
    StopLoss,
    TimeDecayedStopLoss,
    RapidDeclineFromBuy,
    TakeProfit,
    PreCloseProfit,
    LongHoldProfit,
    WeakContractStrength,
    LowBuyRatio,
    OrderbookImbalance,
    VolumeDryUp,
    ContractImbalance,
    VolatilitySpike,
    OpportunityCost,
}

impl SellReason {
    pub fn priority(&self) -> u8 {
        *self as u8
    }

    /// Safety exits bypass the usual order-throttle paths downstream.
    pub fn is_urgent(&self) -> bool {
        matches!(
            self,
            SellReason::TradingHalt | SellReason::MarketClose | SellReason::EmergencyStop
        )
    }
}

/// Evaluate the decision table for a held position. Returns the highest
/// priority exit that applies, or `None` to keep holding.
pub fn evaluate(
    snapshot: &Snapshot,
    position: &PositionInfo,
    phase: MarketPhase,
    now: DateTime<Utc>,
    config: &TradingConfig,
) -> Option<SellSignal> {
    let rt = &snapshot.realtime;
    let sell = &config.sell;
    let pnl_rate = position.unrealized_pnl_rate(rt.current_price);
    let holding_minutes = position.holding_minutes(now);
    let signal = |reason| {
        Some(SellSignal {
            reason,
            pnl_rate,
            holding_minutes,
        })
    };

    if rt.trading_halt {
        return signal(SellReason::TradingHalt);
    }
    if matches!(phase, MarketPhase::Closing | MarketPhase::Closed) {
        return signal(SellReason::MarketClose);
    }
    if pnl_rate <= sell.emergency_stop_loss_rate
        && rt.volatility >= sell.emergency_volatility_threshold
    {
        return signal(SellReason::EmergencyStop);
    }
    if position.stop_loss_price > 0.0 && rt.current_price <= position.stop_loss_price {
        return signal(SellReason::StopLoss);
    }
    if pnl_rate <= sell.time_decayed_stop_rate(config.risk.stop_loss_rate, holding_minutes) {
        return signal(SellReason::TimeDecayedStopLoss);
    }
    if holding_minutes <= 30 && pnl_rate <= -sell.rapid_decline_from_buy {
        return signal(SellReason::RapidDeclineFromBuy);
    }
    if (position.take_profit_price > 0.0 && rt.current_price >= position.take_profit_price)
        || pnl_rate >= config.risk.take_profit_rate
    {
        return signal(SellReason::TakeProfit);
    }
    if phase == MarketPhase::PreClose && pnl_rate >= sell.preclose_profit_threshold {
        return signal(SellReason::PreCloseProfit);
    }
    if holding_minutes >= sell.long_hold_minutes && pnl_rate >= sell.long_hold_profit_threshold {
        return signal(SellReason::LongHoldProfit);
    }
    if rt.contract_strength < sell.weak_contract_strength && pnl_rate < 0.0 {
        return signal(SellReason::WeakContractStrength);
    }
    if rt.buy_ratio < sell.low_buy_ratio
        && (pnl_rate < 0.0 || holding_minutes >= sell.low_buy_ratio_hold_minutes)
    {
        return signal(SellReason::LowBuyRatio);
    }
    if rt.has_orderbook_data() && pnl_rate < 0.0 {
        let ask_bid = rt.total_ask_qty as f64 / rt.total_bid_qty as f64;
        if ask_bid >= sell.orderbook_ask_bid_ratio {
            return signal(SellReason::OrderbookImbalance);
        }
    }
    if rt.volume_spike_ratio < sell.volume_dry_up_ratio
        && holding_minutes >= sell.volume_dry_up_hold_minutes
    {
        return signal(SellReason::VolumeDryUp);
    }
    if rt.has_contract_data() && pnl_rate < 0.0 {
        let total = (rt.buy_contract_count + rt.sell_contract_count) as f64;
        let sell_share = rt.sell_contract_count as f64 / total * 100.0;
        if sell_share >= sell.contract_imbalance_ratio {
            return signal(SellReason::ContractImbalance);
        }
    }
    if rt.volatility >= sell.high_volatility_threshold && rt.today_high > 0.0 {
        let decline_from_high = (rt.today_high - rt.current_price) / rt.today_high * 100.0;
        if decline_from_high >= sell.decline_from_high_threshold {
            return signal(SellReason::VolatilitySpike);
        }
    }
    if holding_minutes >= sell.max_holding_minutes
        && pnl_rate > sell.opportunity_cost_min_loss
        && pnl_rate < sell.opportunity_cost_max_profit
    {
        return signal(SellReason::OpportunityCost);
    }
    None
}
