//! Hard errors of the core.
//!
//! High-frequency rejects (pre-check, filter, eligibility, below-threshold)
//! are ordinary return values in the decision engine and never appear
//! here. These variants indicate a broken caller contract and are logged
//! loudly at the point of detection.

use crate::types::TradingStatus;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("invalid status transition for {symbol}: {from:?} -> {to:?}")]
    InvalidTransition {
        symbol: String,
        from: TradingStatus,
        to: TradingStatus,
    },

    #[error("symbol already registered: {0}")]
    AlreadyRegistered(String),

    #[error("watch set full ({capacity} symbols)")]
    WatchSetFull { capacity: usize },
}
