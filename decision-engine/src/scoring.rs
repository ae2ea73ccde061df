//! Weighted buy scoring.
//!
//! Seven categories with fixed maximums: momentum 40, divergence 25,
//! time-sensitivity 15, orderbook 10, contract balance 8, volume quality
//! 7, plus a bonus category capped at 10 per bonus source. Scoring is a
//! pure function of the snapshot, the phase and the clock minute; the
//! same inputs always produce the same breakdown.

use common::{MarketPhase, PhaseThresholds, Snapshot, StrategyConfig};
use serde::Serialize;

pub const MAX_MOMENTUM: u32 = 40;
pub const MAX_DIVERGENCE: u32 = 25;
pub const MAX_TIME_SENSITIVITY: u32 = 15;
pub const MAX_ORDERBOOK: u32 = 10;
pub const MAX_CONTRACT_BALANCE: u32 = 8;
pub const MAX_VOLUME_QUALITY: u32 = 7;
pub const MAX_BONUS_PER_SOURCE: u32 = 10;

/// Per-category scores for one evaluation, kept in the decision journal
/// alongside the signal it produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub momentum: u32,
    pub divergence: u32,
    pub time_sensitivity: u32,
    pub orderbook: u32,
    pub contract_balance: u32,
    pub volume_quality: u32,
    pub bonus: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.momentum
            + self.divergence
            + self.time_sensitivity
            + self.orderbook
            + self.contract_balance
            + self.volume_quality
            + self.bonus
    }
}

/// Score a snapshot. `minute_of_hour` feeds the time-sensitivity
/// category's intra-hour activity pattern.
pub fn score(
    snapshot: &Snapshot,
    phase: MarketPhase,
    minute_of_hour: u32,
    strategy: &StrategyConfig,
) -> ScoreBreakdown {
    let rt = &snapshot.realtime;
    ScoreBreakdown {
        momentum: momentum_score(rt.price_change_rate, rt.volume_spike_ratio, rt.contract_strength, phase),
        divergence: divergence_score(snapshot, phase),
        time_sensitivity: time_sensitivity_score(phase, minute_of_hour, rt.volume_spike_ratio),
        orderbook: orderbook_score(rt.total_bid_qty, rt.total_ask_qty),
        contract_balance: contract_balance_score(rt.buy_contract_count, rt.sell_contract_count),
        volume_quality: volume_quality_score(rt.turnover_rate, rt.prev_same_time_volume_rate, phase),
        bonus: bonus_score(rt.buy_ratio, snapshot.reference.pattern_score, strategy),
    }
}

/// All four phase thresholds must hold simultaneously for a signal.
pub fn passes_thresholds(
    breakdown: &ScoreBreakdown,
    snapshot: &Snapshot,
    thresholds: &PhaseThresholds,
) -> bool {
    breakdown.total() >= thresholds.min_total_score
        && breakdown.momentum >= thresholds.min_momentum_score
        && snapshot.realtime.buy_ratio >= thresholds.min_buy_ratio
        && snapshot.reference.pattern_score >= thresholds.min_pattern_score
}

/// Momentum (0-40): price change, volume spike and contract strength
/// tiers, scaled up in the opening window and down in pre-close.
fn momentum_score(
    price_change_rate: f64,
    volume_spike_ratio: f64,
    contract_strength: f64,
    phase: MarketPhase,
) -> u32 {
    let price = match price_change_rate {
        r if r >= 7.0 => 15,
        r if r >= 5.0 => 13,
        r if r >= 3.0 => 11,
        r if r >= 2.0 => 8,
        r if r >= 1.0 => 5,
        r if r >= 0.5 => 3,
        r if r > 0.0 => 1,
        _ => 0,
    };
    let volume = match volume_spike_ratio {
        v if v >= 5.0 => 15,
        v if v >= 3.0 => 12,
        v if v >= 2.0 => 9,
        v if v >= 1.5 => 6,
        v if v >= 1.0 => 3,
        _ => 0,
    };
    let strength = match contract_strength {
        s if s >= 130.0 => 10,
        s if s >= 120.0 => 8,
        s if s >= 110.0 => 6,
        s if s >= 105.0 => 4,
        s if s >= 100.0 => 2,
        _ => 0,
    };
    let factor = match phase {
        MarketPhase::Opening => 1.1,
        MarketPhase::PreClose => 0.9,
        _ => 1.0,
    };
    let raw: u32 = price + volume + strength;
    ((raw as f64 * factor).round() as u32).min(MAX_MOMENTUM)
}

/// Divergence from the 20-day average (0-25): a moderate breakout above
/// the SMA scores best; stretched or underwater prices score little.
/// Position within the day's range and the phase nudge the base band.
fn divergence_score(snapshot: &Snapshot, phase: MarketPhase) -> u32 {
    let rt = &snapshot.realtime;
    let sma20 = snapshot.reference.sma20;
    if sma20 <= 0.0 || rt.current_price <= 0.0 {
        return 0;
    }
    let gap = (rt.current_price - sma20) / sma20 * 100.0;
    let base: i32 = match gap {
        g if g > 0.5 && g <= 3.0 => 18,
        g if g > 0.0 && g <= 0.5 => 12,
        g if g > 3.0 && g <= 5.0 => 10,
        g if g > -1.0 && g <= 0.0 => 6,
        g if g > 5.0 && g <= 8.0 => 4,
        _ => 0,
    };
    let range = rt.today_high - rt.today_low;
    let position: i32 = if range > 0.0 {
        let pos = (rt.current_price - rt.today_low) / range;
        match pos {
            p if p >= 0.7 => 5,
            p if p >= 0.5 => 2,
            p if p <= 0.2 => -5,
            p if p <= 0.35 => -2,
            _ => 0,
        }
    } else {
        0
    };
    let phase_adj: i32 = match phase {
        MarketPhase::Opening => 2,
        MarketPhase::PreClose => -2,
        _ => 0,
    };
    (base + position + phase_adj).clamp(0, MAX_DIVERGENCE as i32) as u32
}

/// Time sensitivity (0-15): how much a fresh signal is worth right now.
/// Phase base, turn-of-hour activity and live volume feed it.
fn time_sensitivity_score(phase: MarketPhase, minute_of_hour: u32, volume_spike_ratio: f64) -> u32 {
    let base = match phase {
        MarketPhase::Opening => 6,
        MarketPhase::Active => 8,
        MarketPhase::Lunch => 4,
        MarketPhase::PreClose => 3,
        MarketPhase::Closing => 1,
        MarketPhase::Closed => 0,
    };
    let minute = match minute_of_hour {
        m if m < 10 || m >= 50 => 3,
        m if (25..35).contains(&m) => 1,
        _ => 0,
    };
    let activity = match volume_spike_ratio {
        v if v >= 2.0 => 4,
        v if v >= 1.2 => 2,
        _ => 0,
    };
    (base + minute + activity).min(MAX_TIME_SENSITIVITY)
}

/// Orderbook pressure (0-10) from the total bid/ask depth ratio.
fn orderbook_score(total_bid_qty: u64, total_ask_qty: u64) -> u32 {
    if total_bid_qty == 0 || total_ask_qty == 0 {
        return 0;
    }
    let ratio = total_bid_qty as f64 / total_ask_qty as f64;
    match ratio {
        r if r >= 2.0 => 10,
        r if r >= 1.5 => 8,
        r if r >= 1.2 => 6,
        r if r >= 1.0 => 4,
        r if r >= 0.8 => 2,
        _ => 0,
    }
}

/// Contract balance (0-8) from the buyer-initiated share of matched
/// trade counts.
fn contract_balance_score(buy_count: u64, sell_count: u64) -> u32 {
    let total = buy_count + sell_count;
    if total == 0 {
        return 0;
    }
    let buy_share = buy_count as f64 / total as f64 * 100.0;
    match buy_share {
        s if s >= 70.0 => 8,
        s if s >= 60.0 => 6,
        s if s >= 55.0 => 4,
        s if s >= 45.0 => 2,
        _ => 0,
    }
}

/// Volume quality (0-7): real turnover plus volume ahead of the same
/// minute yesterday, with a small opening allowance.
fn volume_quality_score(
    turnover_rate: f64,
    prev_same_time_volume_rate: f64,
    phase: MarketPhase,
) -> u32 {
    let turnover = match turnover_rate {
        t if t >= 2.0 => 4,
        t if t >= 1.0 => 3,
        t if t >= 0.5 => 2,
        t if t >= 0.2 => 1,
        _ => 0,
    };
    let relative = match prev_same_time_volume_rate {
        r if r >= 150.0 => 3,
        r if r >= 120.0 => 2,
        r if r >= 100.0 => 1,
        _ => 0,
    };
    let opening = u32::from(phase == MarketPhase::Opening);
    (turnover + relative + opening).min(MAX_VOLUME_QUALITY)
}

/// Bonus: each source (buy-ratio excess, pattern-score excess) scores up
/// to 10 above its threshold, or a partial 5 within 80% of it.
fn bonus_score(buy_ratio: f64, pattern_score: f64, strategy: &StrategyConfig) -> u32 {
    bonus_source(buy_ratio, strategy.bonus_buy_ratio_threshold)
        + bonus_source(pattern_score, strategy.bonus_pattern_score_threshold)
}

fn bonus_source(value: f64, threshold: f64) -> u32 {
    if value >= threshold {
        (7 + ((value - threshold) / 10.0) as u32).min(MAX_BONUS_PER_SOURCE)
    } else if value >= threshold * 0.8 {
        5
    } else {
        0
    }
}
