//! The execution boundary.
//!
//! The core hands order intents to an `OrderExecutor` and hears back
//! through fill callbacks; brokerage sessions, wire formats and actual
//! pricing live entirely on the other side of this trait. Submission
//! happens with no store locks held, so a slow executor can never stall
//! the feed thread.

use crate::decision::Decision;
use crate::DecisionEngine;
use async_trait::async_trait;
use chrono::Utc;
use common::{FillResult, OrderHandle, OrderIntent, OrderSide, StoreError, TradingStatus};
use state_store::StatCounter;
use tracing::{info, warn};

#[async_trait]
pub trait OrderExecutor: Send + Sync {
    /// Submit an order intent. The returned handle is echoed back on the
    /// fill callback; a submission error leaves the symbol's state
    /// untouched.
    async fn submit_order(&self, intent: OrderIntent) -> anyhow::Result<OrderHandle>;
}

impl DecisionEngine {
    /// Evaluate a symbol and, when the decision is actionable, submit the
    /// order and advance the lifecycle. The store transition happens only
    /// after the executor accepts the intent.
    pub async fn evaluate_and_submit(
        &self,
        executor: &dyn OrderExecutor,
        symbol: &str,
    ) -> anyhow::Result<Decision> {
        self.evaluate_and_submit_at(executor, symbol, Utc::now())
            .await
    }

    /// As `evaluate_and_submit`, with an explicit evaluation timestamp.
    pub async fn evaluate_and_submit_at(
        &self,
        executor: &dyn OrderExecutor,
        symbol: &str,
        now: chrono::DateTime<Utc>,
    ) -> anyhow::Result<Decision> {
        let decision = self.evaluate_at(symbol, now)?;
        match &decision {
            Decision::Buy(signal) => {
                let snapshot = self.store().get_snapshot(symbol)?;
                self.store().mark_buy_attempt(symbol, now)?;
                let intent = OrderIntent {
                    symbol: symbol.to_string(),
                    side: OrderSide::Buy,
                    quantity: signal.quantity,
                    price_hint: snapshot.realtime.current_price,
                };
                let handle = executor.submit_order(intent).await?;
                self.store().set_status(symbol, TradingStatus::BuyOrdered)?;
                info!(symbol, handle = %handle.0, quantity = signal.quantity, "buy order submitted");
            }
            Decision::Sell(signal) => {
                let snapshot = self.store().get_snapshot(symbol)?;
                let quantity = snapshot.position.as_ref().map(|p| p.quantity).unwrap_or(0);
                let intent = OrderIntent {
                    symbol: symbol.to_string(),
                    side: OrderSide::Sell,
                    quantity,
                    price_hint: snapshot.realtime.current_price,
                };
                let handle = executor.submit_order(intent).await?;
                self.store().set_status(symbol, TradingStatus::SellOrdered)?;
                info!(
                    symbol,
                    handle = %handle.0,
                    reason = ?signal.reason,
                    urgent = signal.reason.is_urgent(),
                    "sell order submitted"
                );
            }
            Decision::NoAction(_) => {}
        }
        Ok(decision)
    }

    /// Apply an asynchronous execution result to the lifecycle and the
    /// counters. Rejections roll the symbol back to its pre-order state.
    pub fn on_fill(
        &self,
        symbol: &str,
        side: OrderSide,
        result: FillResult,
    ) -> Result<(), StoreError> {
        match (side, result) {
            (OrderSide::Buy, FillResult::Filled { price, quantity }) => {
                self.record_buy(symbol, price, quantity, false)
            }
            (OrderSide::Buy, FillResult::PartialFill { price, quantity }) => {
                self.record_buy(symbol, price, quantity, true)
            }
            (OrderSide::Buy, FillResult::Rejected { reason }) => {
                warn!(symbol, %reason, "buy order rejected");
                self.store().rollback_order(symbol)?;
                Ok(())
            }
            (OrderSide::Sell, FillResult::Filled { price, .. })
            | (OrderSide::Sell, FillResult::PartialFill { price, .. }) => {
                let position = self.store().record_sell_fill(symbol)?;
                let realized = (price - position.buy_price) * position.quantity as f64;
                self.store()
                    .increment_stat(StatCounter::DailyRealizedPnl, realized);
                self.store().increment_stat(StatCounter::OpenPositions, -1.0);
                info!(
                    symbol,
                    price,
                    quantity = position.quantity,
                    realized,
                    "position closed"
                );
                Ok(())
            }
            (OrderSide::Sell, FillResult::Rejected { reason }) => {
                warn!(symbol, %reason, "sell order rejected");
                self.store().rollback_order(symbol)?;
                Ok(())
            }
        }
    }

    fn record_buy(
        &self,
        symbol: &str,
        price: f64,
        quantity: u32,
        partial: bool,
    ) -> Result<(), StoreError> {
        let config = self.config();
        let stop_loss_price = price * (1.0 + config.risk.stop_loss_rate / 100.0);
        let take_profit_price = price * (1.0 + config.risk.take_profit_rate / 100.0);
        self.store().record_buy_fill(
            symbol,
            price,
            quantity,
            stop_loss_price,
            take_profit_price,
            partial,
        )?;
        self.store().increment_stat(StatCounter::OpenPositions, 1.0);
        self.store().increment_stat(StatCounter::DailyTrades, 1.0);
        info!(symbol, price, quantity, partial, "position opened");
        Ok(())
    }
}
