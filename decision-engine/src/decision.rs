//! Decision and rejection taxonomy.
//!
//! Every evaluation returns exactly one `Decision`. Rejections carry the
//! stage that produced them so operators can see which part of the
//! pipeline is filtering their watch set.

use crate::scoring::ScoreBreakdown;
use crate::sell::SellReason;
use serde::Serialize;
use std::fmt;

/// Outcome of one pipeline evaluation for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Decision {
    /// No trade; the rejection records which stage stopped the symbol.
    NoAction(Rejection),
    Buy(BuySignal),
    Sell(SellSignal),
}

impl Decision {
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Decision::NoAction(_))
    }
}

/// A sized buy recommendation with its full score breakdown attached for
/// the decision journal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuySignal {
    pub quantity: u32,
    /// Planned notional at the snapshot price.
    pub notional: f64,
    pub score: ScoreBreakdown,
}

/// An exit recommendation from the sell decision table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SellSignal {
    pub reason: SellReason,
    /// Unrealized P&L rate at decision time, in percent.
    pub pnl_rate: f64,
    pub holding_minutes: i64,
}

/// Which stage rejected the symbol, and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rejection {
    PreCheck(PreCheckReason),
    Filter(FilterReason),
    Eligibility(EligibilityReason),
    NoSignal(NoSignalReason),
}

impl Rejection {
    pub fn stage(&self) -> &'static str {
        match self {
            Rejection::PreCheck(_) => "precheck",
            Rejection::Filter(_) => "filter",
            Rejection::Eligibility(_) => "eligibility",
            Rejection::NoSignal(_) => "scoring",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::PreCheck(r) => write!(f, "precheck: {r:?}"),
            Rejection::Filter(r) => write!(f, "filter: {r:?}"),
            Rejection::Eligibility(r) => write!(f, "eligibility: {r:?}"),
            Rejection::NoSignal(r) => write!(f, "scoring: {r:?}"),
        }
    }
}

/// Cheap context gates checked before any market data is inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PreCheckReason {
    /// The symbol is not in a state that admits a new entry.
    NotWatching,
    /// A recent buy attempt is still inside the cooldown window.
    CooldownActive,
    /// The current phase does not admit new entries.
    OutsideBuyWindow,
    MaxPositions,
    DailyLossFloor,
    DailyTradeCap,
    /// No trade has printed yet; there is nothing to evaluate.
    NoPrice,
}

/// First-pass market-pressure filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FilterReason {
    WeakBidSupport,
    HeavySellPressure,
    LowBuyRatio,
    WeakContractStrength,
    NearLimitUp,
    ThinLiquidity,
}

/// Structural exclusions: states in which the symbol must not be traded
/// at all, regardless of how attractive it scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EligibilityReason {
    TradingHalt,
    /// A volatility interruption is armed or in effect.
    ViArmed,
    MissingRealtimeData,
    CrashingPrice,
    WideSpread,
    LowTurnover,
}

/// The symbol survived every gate but the score or sizing said no.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoSignalReason {
    BelowThreshold { total: u32 },
    /// The signal fired but the sized quantity rounded down to zero.
    ZeroQuantity { total: u32 },
    /// A held position matched no row of the sell decision table.
    KeepHolding,
}
