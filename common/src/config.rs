//! Trading configuration.
//!
//! All thresholds referenced by the decision pipeline live here, grouped by
//! the stage that consumes them. The core treats a loaded `TradingConfig`
//! as an immutable snapshot for the session: the engine is handed one
//! `Arc<TradingConfig>` per evaluation and never re-reads global state mid
//! decision. Each threshold has exactly one authoritative home; the
//! pipeline-stage-scoped value always wins.

use crate::phase::{MarketPhase, PhaseSchedule};
use serde::{Deserialize, Serialize};

/// Complete configuration snapshot injected at startup (or swapped whole
/// via the engine's reload entry point).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradingConfig {
    #[serde(default)]
    pub strategy: StrategyConfig,

    #[serde(default)]
    pub phases: PhaseThresholdTable,

    #[serde(default)]
    pub risk: RiskConfig,

    #[serde(default)]
    pub sell: SellConfig,

    #[serde(default)]
    pub schedule: PhaseSchedule,
}

/// Buy-side filter and eligibility thresholds (pipeline stages 1-3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Seconds a symbol is barred from a new buy attempt after the last one.
    pub buy_cooldown_secs: u64,

    /// Whether the pre-close window still admits new entries. Closing and
    /// closed phases never do.
    pub allow_preclose_buys: bool,

    /// Minimum total-bid / total-ask quantity ratio (buy-side pressure).
    pub min_bid_ask_qty_ratio: f64,

    /// Maximum total-ask / total-bid quantity ratio (sell-side pressure).
    pub max_ask_bid_qty_ratio: f64,

    /// Minimum buyer-initiated volume percentage at the filter stage.
    pub min_buy_ratio: f64,

    /// Minimum contract strength at the filter stage (100 = neutral).
    pub min_contract_strength: f64,

    /// Reject symbols already near limit-up (percent vs. prior close).
    pub max_price_change_rate: f64,

    /// Minimum composite liquidity score (0-100).
    pub min_liquidity_score: f64,

    /// How many of {orderbook, volume, matched-trade} data kinds must be
    /// present before a buy is considered.
    pub min_realtime_data_kinds: usize,

    /// Crash filter: minimum percent change vs. prior close.
    pub min_price_change_rate: f64,

    /// Maximum bid/ask spread in percent of the bid.
    pub max_spread_rate: f64,

    /// Minimum turnover rate in percent of outstanding shares.
    pub min_turnover_rate: f64,

    /// Buy ratio above which the bonus category starts scoring.
    pub bonus_buy_ratio_threshold: f64,

    /// Pattern score above which the bonus category starts scoring.
    pub bonus_pattern_score_threshold: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            buy_cooldown_secs: 10,
            allow_preclose_buys: true,
            min_bid_ask_qty_ratio: 1.2,
            max_ask_bid_qty_ratio: 2.0,
            min_buy_ratio: 40.0,
            min_contract_strength: 100.0,
            max_price_change_rate: 25.0,
            min_liquidity_score: 30.0,
            min_realtime_data_kinds: 1,
            min_price_change_rate: -5.0,
            max_spread_rate: 5.0,
            min_turnover_rate: 0.1,
            bonus_buy_ratio_threshold: 60.0,
            bonus_pattern_score_threshold: 70.0,
        }
    }
}

/// Phase-gated scoring thresholds. A buy signal fires only when all four
/// are met simultaneously (strict >=).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseThresholds {
    pub min_total_score: u32,
    pub min_momentum_score: u32,
    pub min_buy_ratio: f64,
    pub min_pattern_score: f64,
}

impl Default for PhaseThresholds {
    fn default() -> Self {
        // Normal-session defaults.
        Self {
            min_total_score: 60,
            min_momentum_score: 15,
            min_buy_ratio: 40.0,
            min_pattern_score: 70.0,
        }
    }
}

/// Per-phase threshold table. Lunch and active share the normal-session
/// row; closing/closed phases are rejected before scoring is reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseThresholdTable {
    pub opening: PhaseThresholds,
    pub active: PhaseThresholds,
    pub pre_close: PhaseThresholds,
}

impl Default for PhaseThresholdTable {
    fn default() -> Self {
        Self {
            opening: PhaseThresholds {
                min_total_score: 70,
                min_momentum_score: 20,
                min_buy_ratio: 44.0,
                min_pattern_score: 75.0,
            },
            active: PhaseThresholds::default(),
            pre_close: PhaseThresholds {
                min_total_score: 75,
                min_momentum_score: 25,
                min_buy_ratio: 48.0,
                min_pattern_score: 75.0,
            },
        }
    }
}

impl PhaseThresholdTable {
    pub fn for_phase(&self, phase: MarketPhase) -> &PhaseThresholds {
        match phase {
            MarketPhase::Opening => &self.opening,
            MarketPhase::PreClose => &self.pre_close,
            _ => &self.active,
        }
    }
}

/// Position sizing, the risk gate, and per-position stop/target rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Base notional per new position, in currency units.
    pub base_investment_amount: f64,

    /// Scale the base amount by `position_size_ratio` of account equity
    /// instead of using it verbatim.
    pub use_account_ratio: bool,

    /// Account equity snapshot used when `use_account_ratio` is set.
    pub account_equity: f64,

    /// Fraction of account equity per position.
    pub position_size_ratio: f64,

    /// Sizing reduction applied during the opening window.
    pub opening_reduction_ratio: f64,

    /// Sizing reduction applied during the pre-close window.
    pub preclose_reduction_ratio: f64,

    /// Further reduction once the book is nearly full.
    pub conservative_ratio: f64,

    /// Fraction of `max_positions` at which the conservative ratio kicks in.
    pub conservative_position_ratio: f64,

    /// Hard cap on a single position's notional.
    pub max_position_notional: f64,

    /// Maximum simultaneous open positions.
    pub max_positions: u32,

    /// Daily realized-loss floor; breaching it vetoes all new buys.
    pub daily_loss_limit: f64,

    /// Maximum round-trip trades per day.
    pub daily_trade_cap: u32,

    /// Watch-set capacity of the state store.
    pub max_watched_symbols: usize,

    /// Base stop-loss percentage (negative).
    pub stop_loss_rate: f64,

    /// Take-profit percentage (positive).
    pub take_profit_rate: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            base_investment_amount: 1_000_000.0,
            use_account_ratio: false,
            account_equity: 0.0,
            position_size_ratio: 0.1,
            opening_reduction_ratio: 0.5,
            preclose_reduction_ratio: 0.3,
            conservative_ratio: 0.7,
            conservative_position_ratio: 0.8,
            max_position_notional: 1_000_000.0,
            max_positions: 5,
            daily_loss_limit: 500_000.0,
            daily_trade_cap: 30,
            max_watched_symbols: 15,
            stop_loss_rate: -2.0,
            take_profit_rate: 4.0,
        }
    }
}

/// Sell-side decision table thresholds, in priority order of the table
/// that consumes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SellConfig {
    /// Loss percentage that, combined with high volatility, forces an
    /// emergency exit.
    pub emergency_stop_loss_rate: f64,
    pub emergency_volatility_threshold: f64,

    /// Time-decayed stop multipliers by holding-time band.
    pub time_stop_30min_multiplier: f64,
    pub time_stop_2hour_multiplier: f64,
    pub time_stop_4hour_multiplier: f64,
    pub time_stop_over4hour_multiplier: f64,

    /// Percent decline from the buy price treated as a rapid decline.
    pub rapid_decline_from_buy: f64,

    /// Profit percentage that locks in gains during pre-close.
    pub preclose_profit_threshold: f64,

    /// Long-hold profit taking: minutes held and minimum profit.
    pub long_hold_minutes: i64,
    pub long_hold_profit_threshold: f64,

    /// Contract strength below which a losing position is abandoned.
    pub weak_contract_strength: f64,

    /// Buy ratio below which the position is exited (when losing, or after
    /// the hold-minutes threshold).
    pub low_buy_ratio: f64,
    pub low_buy_ratio_hold_minutes: i64,

    /// Ask/bid depth ratio treated as a sell-side wall.
    pub orderbook_ask_bid_ratio: f64,

    /// Volume-spike ratio below which turnover has dried up.
    pub volume_dry_up_ratio: f64,
    pub volume_dry_up_hold_minutes: i64,

    /// Seller-initiated share of matched trades, in percent.
    pub contract_imbalance_ratio: f64,

    /// Volatility spike paired with a decline from the session high.
    pub high_volatility_threshold: f64,
    pub decline_from_high_threshold: f64,

    /// Opportunity-cost exit: maximum holding time and the small-P&L band
    /// it applies to.
    pub max_holding_minutes: i64,
    pub opportunity_cost_min_loss: f64,
    pub opportunity_cost_max_profit: f64,
}

impl Default for SellConfig {
    fn default() -> Self {
        Self {
            emergency_stop_loss_rate: -5.0,
            emergency_volatility_threshold: 3.0,
            time_stop_30min_multiplier: 1.0,
            time_stop_2hour_multiplier: 0.8,
            time_stop_4hour_multiplier: 0.6,
            time_stop_over4hour_multiplier: 0.4,
            rapid_decline_from_buy: 2.5,
            preclose_profit_threshold: 0.5,
            long_hold_minutes: 180,
            long_hold_profit_threshold: 0.3,
            weak_contract_strength: 80.0,
            low_buy_ratio: 30.0,
            low_buy_ratio_hold_minutes: 120,
            orderbook_ask_bid_ratio: 2.0,
            volume_dry_up_ratio: 0.3,
            volume_dry_up_hold_minutes: 60,
            contract_imbalance_ratio: 65.0,
            high_volatility_threshold: 5.0,
            decline_from_high_threshold: 3.0,
            max_holding_minutes: 240,
            opportunity_cost_min_loss: -2.0,
            opportunity_cost_max_profit: 1.0,
        }
    }
}

impl SellConfig {
    /// Effective stop percentage after time decay: the base rate shrinks
    /// as holding time grows through the bands.
    pub fn time_decayed_stop_rate(&self, base_stop_rate: f64, holding_minutes: i64) -> f64 {
        let multiplier = if holding_minutes <= 30 {
            self.time_stop_30min_multiplier
        } else if holding_minutes <= 120 {
            self.time_stop_2hour_multiplier
        } else if holding_minutes <= 240 {
            self.time_stop_4hour_multiplier
        } else {
            self.time_stop_over4hour_multiplier
        };
        base_stop_rate * multiplier
    }
}

/// Load a configuration snapshot from a TOML file.
pub fn load_config(path: &str) -> anyhow::Result<TradingConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: TradingConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save a configuration snapshot to a TOML file.
pub fn save_config(config: &TradingConfig, path: &str) -> anyhow::Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Write a config file pre-populated with the defaults, as a starting
/// point for operators.
pub fn write_config_template(path: &str) -> anyhow::Result<()> {
    save_config(&TradingConfig::default(), path)
}
