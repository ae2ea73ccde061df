//! Per-symbol data model: reference data, realtime feed fields, trading
//! status and position records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable per-symbol reference data, fixed when the scanner registers
/// the symbol into the watch set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolReference {
    /// Listing code (e.g. "005930").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Prior-session close, basis for the price-change rate.
    pub yesterday_close: f64,
    /// Prior-session cumulative volume.
    pub yesterday_volume: u64,
    /// Trailing average daily volume, basis for the volume-spike ratio.
    pub avg_daily_volume: u64,
    /// Outstanding shares, basis for the turnover rate.
    pub listed_shares: u64,
    /// Trailing 20-day average price, basis for divergence scoring.
    pub sma20: f64,
    /// Scanner pattern score carried as a listing attribute.
    pub pattern_score: f64,
    /// Names of the patterns the scanner matched.
    pub pattern_names: Vec<String>,
}

/// Mutable realtime fields, continuously overwritten by the streaming feed.
///
/// `contract_strength` uses 100 as neutral; `buy_ratio` is the percentage
/// of matched volume that was buyer-initiated. A nonzero
/// `vi_reference_price` means a volatility interruption is armed for the
/// symbol and it must be excluded from all decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeData {
    pub current_price: f64,
    pub bid_price: f64,
    pub ask_price: f64,
    pub total_bid_qty: u64,
    pub total_ask_qty: u64,
    pub contract_strength: f64,
    pub buy_ratio: f64,
    /// Percent change vs. the prior close.
    pub price_change_rate: f64,
    /// Cumulative volume vs. the same time yesterday.
    pub volume_spike_ratio: f64,
    /// Cumulative volume as a percentage of outstanding shares.
    pub turnover_rate: f64,
    pub acc_volume: u64,
    pub buy_contract_count: u64,
    pub sell_contract_count: u64,
    pub trading_halt: bool,
    pub vi_reference_price: f64,
    /// Raw exchange session classification code ("51"/"52" mark a VI
    /// session).
    pub session_code: String,
    pub today_high: f64,
    pub today_low: f64,
    /// Intraday range as a percentage of the day low.
    pub volatility: f64,
    /// Volume vs. the same minute of the prior session, in percent.
    pub prev_same_time_volume_rate: f64,
    /// Monotonic per-symbol update counter, bumped on every feed apply.
    pub update_seq: u64,
    pub last_updated: DateTime<Utc>,
}

impl Default for RealtimeData {
    fn default() -> Self {
        Self {
            current_price: 0.0,
            bid_price: 0.0,
            ask_price: 0.0,
            total_bid_qty: 0,
            total_ask_qty: 0,
            contract_strength: 100.0,
            buy_ratio: 50.0,
            price_change_rate: 0.0,
            volume_spike_ratio: 1.0,
            turnover_rate: 0.0,
            acc_volume: 0,
            buy_contract_count: 0,
            sell_contract_count: 0,
            trading_halt: false,
            vi_reference_price: 0.0,
            session_code: "0".to_string(),
            today_high: 0.0,
            today_low: 0.0,
            volatility: 0.0,
            prev_same_time_volume_rate: 0.0,
            update_seq: 0,
            last_updated: DateTime::<Utc>::MIN_UTC,
        }
    }
}

impl RealtimeData {
    /// Spread between best ask and best bid as a percentage of the bid.
    pub fn spread_rate(&self) -> f64 {
        if self.bid_price > 0.0 && self.ask_price > 0.0 {
            (self.ask_price - self.bid_price) / self.bid_price * 100.0
        } else {
            0.0
        }
    }

    pub fn has_orderbook_data(&self) -> bool {
        self.total_bid_qty > 0 && self.total_ask_qty > 0
    }

    pub fn has_volume_data(&self) -> bool {
        self.turnover_rate > 0.0
    }

    pub fn has_contract_data(&self) -> bool {
        self.buy_contract_count > 0 || self.sell_contract_count > 0
    }

    /// VI session classification from the raw exchange codes.
    pub fn vi_session(&self) -> bool {
        matches!(self.session_code.as_str(), "51" | "52")
    }
}

/// A partial feed update; only `Some` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct RealtimeUpdate {
    pub current_price: Option<f64>,
    pub bid_price: Option<f64>,
    pub ask_price: Option<f64>,
    pub total_bid_qty: Option<u64>,
    pub total_ask_qty: Option<u64>,
    pub contract_strength: Option<f64>,
    pub buy_ratio: Option<f64>,
    pub acc_volume: Option<u64>,
    pub buy_contract_count: Option<u64>,
    pub sell_contract_count: Option<u64>,
    pub trading_halt: Option<bool>,
    pub vi_reference_price: Option<f64>,
    pub session_code: Option<String>,
    pub today_high: Option<f64>,
    pub today_low: Option<f64>,
    pub turnover_rate: Option<f64>,
    pub prev_same_time_volume_rate: Option<f64>,
}

impl RealtimeUpdate {
    /// Shorthand for the most common tick: a trade at `price` with the
    /// running cumulative volume.
    pub fn trade(price: f64, acc_volume: u64) -> Self {
        Self {
            current_price: Some(price),
            acc_volume: Some(acc_volume),
            ..Self::default()
        }
    }
}

/// Exactly one value per symbol at any instant, mutated only through the
/// position lifecycle under the status lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradingStatus {
    Watching,
    BuyOrdered,
    PartialBought,
    Bought,
    SellOrdered,
    Sold,
}

impl TradingStatus {
    /// True while the symbol carries a live position record.
    pub fn is_holding(&self) -> bool {
        matches!(
            self,
            TradingStatus::BuyOrdered
                | TradingStatus::PartialBought
                | TradingStatus::Bought
                | TradingStatus::SellOrdered
        )
    }

    /// True when a submitted order is awaiting an execution callback.
    pub fn is_pending_order(&self) -> bool {
        matches!(self, TradingStatus::BuyOrdered | TradingStatus::SellOrdered)
    }
}

/// Present only while status is between BuyOrdered and SellOrdered.
/// Unrealized P&L is derived on demand, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionInfo {
    pub buy_price: f64,
    pub quantity: u32,
    pub order_time: DateTime<Utc>,
    pub stop_loss_price: f64,
    pub take_profit_price: f64,
}

impl PositionInfo {
    /// Unrealized P&L in currency units at `current_price`.
    pub fn unrealized_pnl(&self, current_price: f64) -> f64 {
        (current_price - self.buy_price) * self.quantity as f64
    }

    /// Unrealized P&L as a percentage of the buy price.
    pub fn unrealized_pnl_rate(&self, current_price: f64) -> f64 {
        if self.buy_price > 0.0 {
            (current_price - self.buy_price) / self.buy_price * 100.0
        } else {
            0.0
        }
    }

    /// Whole minutes since the order was placed.
    pub fn holding_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.order_time).num_minutes()
    }
}

/// Immutable point-in-time copy of a symbol's reference, realtime and
/// status data, assembled under the store's fixed lock order. Never
/// mutated in place; re-read rather than cached across evaluations.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub reference: SymbolReference,
    pub realtime: RealtimeData,
    pub status: TradingStatus,
    pub position: Option<PositionInfo>,
    pub last_buy_attempt: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn position_pnl_rate() {
        let pos = PositionInfo {
            buy_price: 50_000.0,
            quantity: 10,
            order_time: Utc::now(),
            stop_loss_price: 49_000.0,
            take_profit_price: 52_000.0,
        };
        assert_eq!(pos.unrealized_pnl(51_000.0), 10_000.0);
        assert!((pos.unrealized_pnl_rate(49_250.0) - (-1.5)).abs() < 1e-9);
    }

    #[test]
    fn holding_minutes_counts_whole_minutes() {
        let now = Utc::now();
        let pos = PositionInfo {
            buy_price: 1.0,
            quantity: 1,
            order_time: now - Duration::minutes(130),
            stop_loss_price: 0.0,
            take_profit_price: 0.0,
        };
        assert_eq!(pos.holding_minutes(now), 130);
    }

    #[test]
    fn status_classification() {
        assert!(TradingStatus::Bought.is_holding());
        assert!(!TradingStatus::Watching.is_holding());
        assert!(!TradingStatus::Sold.is_holding());
        assert!(TradingStatus::SellOrdered.is_pending_order());
        assert!(!TradingStatus::Bought.is_pending_order());
    }

    #[test]
    fn realtime_data_presence_flags() {
        let mut rt = RealtimeData::default();
        assert!(!rt.has_orderbook_data());
        assert!(!rt.has_volume_data());
        rt.total_bid_qty = 100;
        rt.total_ask_qty = 80;
        rt.turnover_rate = 0.5;
        rt.buy_contract_count = 3;
        assert!(rt.has_orderbook_data());
        assert!(rt.has_volume_data());
        assert!(rt.has_contract_data());
    }

    #[test]
    fn status_serializes_for_the_journal() {
        assert_eq!(
            serde_json::to_string(&TradingStatus::BuyOrdered).unwrap(),
            "\"BUY_ORDERED\""
        );
        let status: TradingStatus = serde_json::from_str("\"PARTIAL_BOUGHT\"").unwrap();
        assert_eq!(status, TradingStatus::PartialBought);
    }

    #[test]
    fn vi_session_codes() {
        let mut rt = RealtimeData::default();
        assert!(!rt.vi_session());
        rt.session_code = "51".to_string();
        assert!(rt.vi_session());
    }
}
