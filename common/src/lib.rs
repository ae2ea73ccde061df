//! Shared data model for the intraday equities decision core.
//!
//! This crate holds everything the state store and the decision engine
//! agree on: per-symbol reference and realtime data, the trading status
//! enumeration, position records, the market-phase clock, the injected
//! configuration snapshot, and the error taxonomy.

mod config;
mod error;
mod orders;
mod phase;
mod types;

pub use config::{
    load_config, save_config, write_config_template, PhaseThresholds, PhaseThresholdTable,
    RiskConfig, SellConfig, StrategyConfig, TradingConfig,
};
pub use error::StoreError;
pub use orders::{FillResult, OrderHandle, OrderIntent, OrderSide};
pub use phase::{now_kst, MarketPhase, MarketPhaseClock, PhaseSchedule, KST_OFFSET_HOURS};
pub use types::{
    PositionInfo, RealtimeData, RealtimeUpdate, Snapshot, SymbolReference, TradingStatus,
};
