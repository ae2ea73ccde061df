//! Types crossing the execution boundary. The brokerage wire format is
//! external; these are only the core-side shapes of an order intent and
//! its asynchronous result.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// What the core hands to the executor. `price_hint` is the snapshot
/// price the decision was made at; the executor owns actual pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderIntent {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: u32,
    pub price_hint: f64,
}

/// Opaque handle returned by the executor, echoed back on fill callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderHandle(pub Uuid);

impl OrderHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OrderHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Asynchronous execution result delivered by the executor's callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FillResult {
    Filled { price: f64, quantity: u32 },
    PartialFill { price: f64, quantity: u32 },
    Rejected { reason: String },
}
