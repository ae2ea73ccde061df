//! Staged trading decision pipeline.
//!
//! Buy side: pre-checks -> first-pass filters -> eligibility -> weighted
//! scoring -> sizing, cheapest stage first, first rejection wins. Sell
//! side: a strict-priority decision table with no scoring. The pipeline
//! reads one immutable snapshot per evaluation and holds no store locks
//! while deciding; given the same snapshot, phase and clock minute it
//! always returns the same decision.

mod decision;
mod eligibility;
mod executor;
mod filters;
mod precheck;
mod risk_gate;
mod scoring;
mod sell;
mod sizing;

pub use decision::{
    BuySignal, Decision, EligibilityReason, FilterReason, NoSignalReason, PreCheckReason,
    Rejection, SellSignal,
};
pub use executor::OrderExecutor;
pub use risk_gate::{RiskGate, RiskVeto};
pub use scoring::{passes_thresholds, score, ScoreBreakdown};
pub use sell::SellReason;
pub use sizing::{position_size, PositionSize};

use chrono::{DateTime, FixedOffset, Utc};
use common::{
    MarketPhase, MarketPhaseClock, Snapshot, StoreError, TradingConfig, TradingStatus,
    KST_OFFSET_HOURS,
};
use state_store::{StatCounter, SymbolStateStore};
use std::sync::{Arc, RwLock};
use tracing::{debug, error, info};

fn exchange_offset() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_HOURS * 3600).expect("static offset is in range")
}

/// The decision core. Shared by scan workers behind an `Arc`; the config
/// snapshot can be swapped whole between evaluations, never mid decision.
pub struct DecisionEngine {
    store: Arc<SymbolStateStore>,
    clock: MarketPhaseClock,
    config: RwLock<Arc<TradingConfig>>,
}

impl DecisionEngine {
    pub fn new(store: Arc<SymbolStateStore>, config: TradingConfig) -> Self {
        let clock = MarketPhaseClock::new(config.schedule.clone());
        Self {
            store,
            clock,
            config: RwLock::new(Arc::new(config)),
        }
    }

    pub fn store(&self) -> &Arc<SymbolStateStore> {
        &self.store
    }

    pub fn clock(&self) -> &MarketPhaseClock {
        &self.clock
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> Arc<TradingConfig> {
        self.config.read().expect("config lock poisoned").clone()
    }

    /// Swap in a new configuration snapshot. Evaluations already in flight
    /// keep the snapshot they started with.
    pub fn reload(&self, config: TradingConfig) {
        *self.config.write().expect("config lock poisoned") = Arc::new(config);
        info!("configuration reloaded");
    }

    /// Evaluate one symbol at the current wall-clock time.
    pub fn evaluate(&self, symbol: &str) -> Result<Decision, StoreError> {
        self.evaluate_at(symbol, Utc::now())
    }

    /// Evaluate one symbol as of `now`. The explicit timestamp keeps the
    /// pipeline a pure function of snapshot and clock.
    pub fn evaluate_at(&self, symbol: &str, now: DateTime<Utc>) -> Result<Decision, StoreError> {
        let config = self.config();
        let snapshot = self.store.get_snapshot(symbol)?;
        self.store.increment_stat(StatCounter::Evaluations, 1.0);

        let local = now.with_timezone(&exchange_offset()).naive_local();
        let phase = self.clock.phase_at(local);
        let minute = MarketPhaseClock::minute_of_hour(local);

        let decision = match snapshot.status {
            TradingStatus::Bought | TradingStatus::PartialBought => {
                self.evaluate_sell(symbol, &snapshot, phase, now, &config)
            }
            _ => self.evaluate_buy(symbol, &snapshot, phase, now, minute, &config)?,
        };

        match &decision {
            Decision::Buy(signal) => {
                self.store.increment_stat(StatCounter::BuySignals, 1.0);
                info!(
                    symbol,
                    quantity = signal.quantity,
                    notional = signal.notional,
                    total_score = signal.score.total(),
                    ?phase,
                    "buy signal"
                );
            }
            Decision::Sell(signal) => {
                self.store.increment_stat(StatCounter::SellSignals, 1.0);
                info!(
                    symbol,
                    reason = ?signal.reason,
                    pnl_rate = signal.pnl_rate,
                    holding_minutes = signal.holding_minutes,
                    "sell signal"
                );
            }
            Decision::NoAction(rejection) => {
                self.store.increment_stat(StatCounter::Rejections, 1.0);
                debug!(symbol, stage = rejection.stage(), %rejection, "no action");
            }
        }
        Ok(decision)
    }

    fn evaluate_buy(
        &self,
        symbol: &str,
        snapshot: &Snapshot,
        phase: MarketPhase,
        now: DateTime<Utc>,
        minute: u32,
        config: &TradingConfig,
    ) -> Result<Decision, StoreError> {
        let counters = self.store.counters();
        if let Err(reason) = precheck::run(snapshot, phase, now, &counters, config) {
            return Ok(Decision::NoAction(Rejection::PreCheck(reason)));
        }
        let liquidity = self.store.liquidity_score(symbol)?;
        if let Err(reason) = filters::run(snapshot, liquidity, &config.strategy) {
            return Ok(Decision::NoAction(Rejection::Filter(reason)));
        }
        if let Err(reason) = eligibility::run(snapshot, &config.strategy) {
            return Ok(Decision::NoAction(Rejection::Eligibility(reason)));
        }
        let breakdown = scoring::score(snapshot, phase, minute, &config.strategy);
        let thresholds = config.phases.for_phase(phase);
        if !scoring::passes_thresholds(&breakdown, snapshot, thresholds) {
            return Ok(Decision::NoAction(Rejection::NoSignal(
                NoSignalReason::BelowThreshold {
                    total: breakdown.total(),
                },
            )));
        }
        let size = sizing::position_size(
            snapshot.realtime.current_price,
            phase,
            counters.open_positions,
            &config.risk,
        );
        if size.quantity == 0 {
            return Ok(Decision::NoAction(Rejection::NoSignal(
                NoSignalReason::ZeroQuantity {
                    total: breakdown.total(),
                },
            )));
        }
        Ok(Decision::Buy(BuySignal {
            quantity: size.quantity,
            notional: size.notional,
            score: breakdown,
        }))
    }

    fn evaluate_sell(
        &self,
        symbol: &str,
        snapshot: &Snapshot,
        phase: MarketPhase,
        now: DateTime<Utc>,
        config: &TradingConfig,
    ) -> Decision {
        let Some(position) = snapshot.position.as_ref() else {
            error!(symbol, status = ?snapshot.status, "held symbol has no position record");
            return Decision::NoAction(Rejection::PreCheck(PreCheckReason::NotWatching));
        };
        match sell::evaluate(snapshot, position, phase, now, config) {
            Some(signal) => Decision::Sell(signal),
            None => Decision::NoAction(Rejection::NoSignal(NoSignalReason::KeepHolding)),
        }
    }
}
