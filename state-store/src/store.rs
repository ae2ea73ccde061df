//! The five-domain symbol state store.
//!
//! Domain acquisition order is fixed globally:
//! reference -> realtime -> status -> cache -> statistics.
//! No operation acquires out of order, holds two domains of the same
//! rank, or blocks on external I/O while holding any domain.

use crate::counters::{RiskCounters, StatCounter};
use crate::lifecycle;
use crate::lock_order::{Domain, DomainToken};
use chrono::{DateTime, Utc};
use common::{
    PositionInfo, RealtimeData, RealtimeUpdate, Snapshot, StoreError, SymbolReference,
    TradingStatus,
};
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

/// Status-domain record for one symbol.
#[derive(Debug, Clone)]
struct StatusEntry {
    status: TradingStatus,
    position: Option<PositionInfo>,
    last_buy_attempt: Option<DateTime<Utc>>,
    order_time: Option<DateTime<Utc>>,
}

impl StatusEntry {
    fn watching() -> Self {
        Self {
            status: TradingStatus::Watching,
            position: None,
            last_buy_attempt: None,
            order_time: None,
        }
    }
}

/// Derived-cache record, keyed to the realtime update it was computed
/// from.
#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    seq: u64,
    liquidity_score: f64,
}

/// A pending order's age, exposed for the external watchdog. The core
/// never times out its own transitions.
#[derive(Debug, Clone)]
pub struct PendingOrder {
    pub symbol: String,
    pub status: TradingStatus,
    pub ordered_at: DateTime<Utc>,
    pub age_secs: i64,
}

/// Concurrent store of all per-symbol state, shared by the feed thread,
/// the scan workers and the control threads.
#[derive(Debug)]
pub struct SymbolStateStore {
    reference: RwLock<HashMap<String, SymbolReference>>,
    realtime: RwLock<HashMap<String, RealtimeData>>,
    status: Mutex<HashMap<String, StatusEntry>>,
    cache: Mutex<HashMap<String, CacheEntry>>,
    statistics: Mutex<RiskCounters>,
    capacity: usize,
}

impl SymbolStateStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            reference: RwLock::new(HashMap::new()),
            realtime: RwLock::new(HashMap::new()),
            status: Mutex::new(HashMap::new()),
            cache: Mutex::new(HashMap::new()),
            statistics: Mutex::new(RiskCounters::default()),
            capacity,
        }
    }

    /// Add a symbol to the watch set. The reference data is immutable for
    /// the symbol's lifetime in the store.
    pub fn register(&self, reference: SymbolReference) -> Result<(), StoreError> {
        let code = reference.code.clone();
        let _ref_token = DomainToken::acquire(Domain::Reference);
        let mut refs = self.reference.write().expect("reference lock poisoned");
        if refs.contains_key(&code) {
            return Err(StoreError::AlreadyRegistered(code));
        }
        if refs.len() >= self.capacity {
            warn!(
                symbol = %code,
                capacity = self.capacity,
                "watch set full, registration refused"
            );
            return Err(StoreError::WatchSetFull {
                capacity: self.capacity,
            });
        }
        let _rt_token = DomainToken::acquire(Domain::Realtime);
        let mut realtime = self.realtime.write().expect("realtime lock poisoned");
        let _st_token = DomainToken::acquire(Domain::Status);
        let mut status = self.status.lock().expect("status lock poisoned");

        info!(symbol = %code, name = %reference.name, "symbol registered");
        realtime.insert(code.clone(), RealtimeData::default());
        status.insert(code.clone(), StatusEntry::watching());
        refs.insert(code, reference);
        Ok(())
    }

    /// Remove a symbol from the watch set. Removing a symbol that still
    /// holds a position is allowed (the scanner's policy call) but logged.
    pub fn deregister(&self, symbol: &str) -> Result<(), StoreError> {
        let _ref_token = DomainToken::acquire(Domain::Reference);
        let mut refs = self.reference.write().expect("reference lock poisoned");
        if refs.remove(symbol).is_none() {
            return Err(StoreError::UnknownSymbol(symbol.to_string()));
        }
        let _rt_token = DomainToken::acquire(Domain::Realtime);
        let mut realtime = self.realtime.write().expect("realtime lock poisoned");
        realtime.remove(symbol);
        let _st_token = DomainToken::acquire(Domain::Status);
        let mut status = self.status.lock().expect("status lock poisoned");
        if let Some(entry) = status.remove(symbol) {
            if entry.status.is_holding() {
                warn!(
                    symbol,
                    status = ?entry.status,
                    "symbol deregistered while holding a position"
                );
            }
        }
        let _cache_token = DomainToken::acquire(Domain::Cache);
        self.cache
            .lock()
            .expect("cache lock poisoned")
            .remove(symbol);
        info!(symbol, "symbol deregistered");
        Ok(())
    }

    /// Symbols currently in the watch set.
    pub fn symbols(&self) -> Vec<String> {
        let _token = DomainToken::acquire(Domain::Reference);
        let refs = self.reference.read().expect("reference lock poisoned");
        refs.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        let _token = DomainToken::acquire(Domain::Reference);
        self.reference
            .read()
            .expect("reference lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Atomically copy reference + realtime + status into an immutable
    /// value. Never returns a partially-updated view.
    pub fn get_snapshot(&self, symbol: &str) -> Result<Snapshot, StoreError> {
        let _ref_token = DomainToken::acquire(Domain::Reference);
        let refs = self.reference.read().expect("reference lock poisoned");
        let reference = refs
            .get(symbol)
            .ok_or_else(|| StoreError::UnknownSymbol(symbol.to_string()))?
            .clone();
        let _rt_token = DomainToken::acquire(Domain::Realtime);
        let realtime = self
            .realtime
            .read()
            .expect("realtime lock poisoned")
            .get(symbol)
            .ok_or_else(|| StoreError::UnknownSymbol(symbol.to_string()))?
            .clone();
        let _st_token = DomainToken::acquire(Domain::Status);
        let status_map = self.status.lock().expect("status lock poisoned");
        let entry = status_map
            .get(symbol)
            .ok_or_else(|| StoreError::UnknownSymbol(symbol.to_string()))?;
        Ok(Snapshot {
            reference,
            realtime,
            status: entry.status,
            position: entry.position.clone(),
            last_buy_attempt: entry.last_buy_attempt,
        })
    }

    /// Symbols per requested status, gathered under a single status-domain
    /// acquisition. Callers must use this instead of looping a
    /// single-status accessor: every extra call is an extra lock
    /// acquisition, and repeated short acquisitions under load degrade
    /// latency for the feed thread.
    pub fn get_batch_by_status(
        &self,
        statuses: &[TradingStatus],
    ) -> HashMap<TradingStatus, Vec<String>> {
        let _token = DomainToken::acquire(Domain::Status);
        let status_map = self.status.lock().expect("status lock poisoned");
        let mut result: HashMap<TradingStatus, Vec<String>> =
            statuses.iter().map(|s| (*s, Vec::new())).collect();
        for (symbol, entry) in status_map.iter() {
            if let Some(bucket) = result.get_mut(&entry.status) {
                bucket.push(symbol.clone());
            }
        }
        result
    }

    pub fn status_of(&self, symbol: &str) -> Result<TradingStatus, StoreError> {
        let _token = DomainToken::acquire(Domain::Status);
        let status_map = self.status.lock().expect("status lock poisoned");
        status_map
            .get(symbol)
            .map(|e| e.status)
            .ok_or_else(|| StoreError::UnknownSymbol(symbol.to_string()))
    }

    /// Apply a feed update and recompute the derived fields. The derived
    /// cache entry for the symbol is invalidated inside the same call,
    /// with the cache domain taken strictly after realtime, so the
    /// invalidation is atomic with the update that caused it.
    pub fn update_realtime(&self, symbol: &str, update: RealtimeUpdate) -> Result<(), StoreError> {
        let _ref_token = DomainToken::acquire(Domain::Reference);
        let refs = self.reference.read().expect("reference lock poisoned");
        let reference = refs
            .get(symbol)
            .ok_or_else(|| StoreError::UnknownSymbol(symbol.to_string()))?;

        let _rt_token = DomainToken::acquire(Domain::Realtime);
        let mut realtime = self.realtime.write().expect("realtime lock poisoned");
        let rt = realtime
            .get_mut(symbol)
            .ok_or_else(|| StoreError::UnknownSymbol(symbol.to_string()))?;

        apply_update(rt, &update);
        recompute_derived(rt, reference);
        rt.update_seq += 1;
        rt.last_updated = Utc::now();

        let _cache_token = DomainToken::acquire(Domain::Cache);
        self.cache
            .lock()
            .expect("cache lock poisoned")
            .remove(symbol);
        Ok(())
    }

    /// Validated forward transition. Equal states are a no-op; anything
    /// off the lifecycle DAG fails with `InvalidTransition` and leaves the
    /// state unchanged.
    pub fn set_status(
        &self,
        symbol: &str,
        new_status: TradingStatus,
    ) -> Result<TradingStatus, StoreError> {
        let _token = DomainToken::acquire(Domain::Status);
        let mut status_map = self.status.lock().expect("status lock poisoned");
        let entry = status_map
            .get_mut(symbol)
            .ok_or_else(|| StoreError::UnknownSymbol(symbol.to_string()))?;
        let old = entry.status;
        if old == new_status {
            return Ok(old);
        }
        if !lifecycle::is_valid_transition(old, new_status) {
            error!(
                symbol,
                from = ?old,
                to = ?new_status,
                "invalid status transition requested"
            );
            return Err(StoreError::InvalidTransition {
                symbol: symbol.to_string(),
                from: old,
                to: new_status,
            });
        }
        apply_transition(symbol, entry, new_status);
        Ok(old)
    }

    /// Watchdog / immediate-rejection rollback: BuyOrdered -> Watching or
    /// SellOrdered -> Bought. Returns the restored status.
    pub fn rollback_order(&self, symbol: &str) -> Result<TradingStatus, StoreError> {
        let _token = DomainToken::acquire(Domain::Status);
        let mut status_map = self.status.lock().expect("status lock poisoned");
        let entry = status_map
            .get_mut(symbol)
            .ok_or_else(|| StoreError::UnknownSymbol(symbol.to_string()))?;
        let restored = match entry.status {
            TradingStatus::BuyOrdered => TradingStatus::Watching,
            TradingStatus::SellOrdered => TradingStatus::Bought,
            other => {
                return Err(StoreError::InvalidTransition {
                    symbol: symbol.to_string(),
                    from: other,
                    to: other,
                })
            }
        };
        debug_assert!(lifecycle::is_rollback_transition(entry.status, restored));
        warn!(symbol, from = ?entry.status, to = ?restored, "order rolled back");
        if restored == TradingStatus::Watching {
            entry.position = None;
            entry.order_time = None;
        }
        entry.status = restored;
        Ok(restored)
    }

    /// Record that a buy was attempted, starting the per-symbol cooldown.
    pub fn mark_buy_attempt(&self, symbol: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        let _token = DomainToken::acquire(Domain::Status);
        let mut status_map = self.status.lock().expect("status lock poisoned");
        let entry = status_map
            .get_mut(symbol)
            .ok_or_else(|| StoreError::UnknownSymbol(symbol.to_string()))?;
        entry.last_buy_attempt = Some(at);
        Ok(())
    }

    /// Buy fill callback: BuyOrdered -> Bought (or PartialBought) and
    /// creation of the position record.
    pub fn record_buy_fill(
        &self,
        symbol: &str,
        fill_price: f64,
        quantity: u32,
        stop_loss_price: f64,
        take_profit_price: f64,
        partial: bool,
    ) -> Result<(), StoreError> {
        let new_status = if partial {
            TradingStatus::PartialBought
        } else {
            TradingStatus::Bought
        };
        let _token = DomainToken::acquire(Domain::Status);
        let mut status_map = self.status.lock().expect("status lock poisoned");
        let entry = status_map
            .get_mut(symbol)
            .ok_or_else(|| StoreError::UnknownSymbol(symbol.to_string()))?;
        if !lifecycle::is_valid_transition(entry.status, new_status) {
            error!(symbol, from = ?entry.status, to = ?new_status, "buy fill in wrong state");
            return Err(StoreError::InvalidTransition {
                symbol: symbol.to_string(),
                from: entry.status,
                to: new_status,
            });
        }
        entry.position = Some(PositionInfo {
            buy_price: fill_price,
            quantity,
            order_time: entry.order_time.unwrap_or_else(Utc::now),
            stop_loss_price,
            take_profit_price,
        });
        apply_transition(symbol, entry, new_status);
        Ok(())
    }

    /// Reinstate a known holding, e.g. when reconciling with the
    /// brokerage account at startup. The symbol moves straight to Bought
    /// with the supplied position record.
    pub fn restore_position(
        &self,
        symbol: &str,
        position: PositionInfo,
    ) -> Result<(), StoreError> {
        let _token = DomainToken::acquire(Domain::Status);
        let mut status_map = self.status.lock().expect("status lock poisoned");
        let entry = status_map
            .get_mut(symbol)
            .ok_or_else(|| StoreError::UnknownSymbol(symbol.to_string()))?;
        if entry.status != TradingStatus::Watching {
            return Err(StoreError::InvalidTransition {
                symbol: symbol.to_string(),
                from: entry.status,
                to: TradingStatus::Bought,
            });
        }
        info!(
            symbol,
            buy_price = position.buy_price,
            quantity = position.quantity,
            "position restored"
        );
        entry.order_time = Some(position.order_time);
        entry.position = Some(position);
        entry.status = TradingStatus::Bought;
        Ok(())
    }

    /// Sell fill callback: SellOrdered -> Sold, which clears the position
    /// and resets the symbol to Watching. Returns the closed position so
    /// the caller can realize P&L outside the lock.
    pub fn record_sell_fill(&self, symbol: &str) -> Result<PositionInfo, StoreError> {
        let _token = DomainToken::acquire(Domain::Status);
        let mut status_map = self.status.lock().expect("status lock poisoned");
        let entry = status_map
            .get_mut(symbol)
            .ok_or_else(|| StoreError::UnknownSymbol(symbol.to_string()))?;
        if !lifecycle::is_valid_transition(entry.status, TradingStatus::Sold) {
            error!(symbol, from = ?entry.status, "sell fill in wrong state");
            return Err(StoreError::InvalidTransition {
                symbol: symbol.to_string(),
                from: entry.status,
                to: TradingStatus::Sold,
            });
        }
        let Some(position) = entry.position.take() else {
            error!(symbol, "position record missing on sell fill");
            return Err(StoreError::InvalidTransition {
                symbol: symbol.to_string(),
                from: entry.status,
                to: TradingStatus::Sold,
            });
        };
        apply_transition(symbol, entry, TradingStatus::Sold);
        Ok(position)
    }

    /// Sole mutation entry point for the process-wide counters.
    pub fn increment_stat(&self, counter: StatCounter, delta: f64) {
        let _token = DomainToken::acquire(Domain::Statistics);
        let mut counters = self.statistics.lock().expect("statistics lock poisoned");
        counters.apply(counter, delta);
        debug!(?counter, delta, "counter updated");
    }

    /// Point-in-time copy of all counters.
    pub fn counters(&self) -> RiskCounters {
        let _token = DomainToken::acquire(Domain::Statistics);
        *self.statistics.lock().expect("statistics lock poisoned")
    }

    /// Session rollover; daily aggregates reset, open positions survive.
    pub fn reset_daily_counters(&self) {
        let _token = DomainToken::acquire(Domain::Statistics);
        self.statistics
            .lock()
            .expect("statistics lock poisoned")
            .reset_daily();
        info!("daily counters reset");
    }

    /// Pending orders and their ages, for the external watchdog.
    pub fn pending_order_ages(&self, now: DateTime<Utc>) -> Vec<PendingOrder> {
        let _token = DomainToken::acquire(Domain::Status);
        let status_map = self.status.lock().expect("status lock poisoned");
        status_map
            .iter()
            .filter(|(_, e)| e.status.is_pending_order())
            .filter_map(|(symbol, e)| {
                e.order_time.map(|ordered_at| PendingOrder {
                    symbol: symbol.clone(),
                    status: e.status,
                    ordered_at,
                    age_secs: (now - ordered_at).num_seconds(),
                })
            })
            .collect()
    }

    /// Memoized composite liquidity score, recomputed only when the
    /// symbol's realtime data has changed since the cached value.
    pub fn liquidity_score(&self, symbol: &str) -> Result<f64, StoreError> {
        let _rt_token = DomainToken::acquire(Domain::Realtime);
        let realtime = self.realtime.read().expect("realtime lock poisoned");
        let rt = realtime
            .get(symbol)
            .ok_or_else(|| StoreError::UnknownSymbol(symbol.to_string()))?;

        let _cache_token = DomainToken::acquire(Domain::Cache);
        let mut cache = self.cache.lock().expect("cache lock poisoned");
        if let Some(entry) = cache.get(symbol) {
            if entry.seq == rt.update_seq {
                return Ok(entry.liquidity_score);
            }
        }
        let score = compute_liquidity_score(rt);
        cache.insert(
            symbol.to_string(),
            CacheEntry {
                seq: rt.update_seq,
                liquidity_score: score,
            },
        );
        Ok(score)
    }
}

/// Caller must hold the status domain. Sold clears the position record
/// and resets the symbol to Watching so it stays watchable for a future
/// cycle.
fn apply_transition(symbol: &str, entry: &mut StatusEntry, new_status: TradingStatus) {
    let old = entry.status;
    match new_status {
        TradingStatus::BuyOrdered | TradingStatus::SellOrdered => {
            entry.order_time = Some(Utc::now());
            entry.status = new_status;
        }
        TradingStatus::Sold => {
            entry.position = None;
            entry.order_time = None;
            entry.status = TradingStatus::Watching;
        }
        _ => entry.status = new_status,
    }
    info!(symbol, from = ?old, to = ?new_status, "status transition");
}

fn apply_update(rt: &mut RealtimeData, update: &RealtimeUpdate) {
    if let Some(v) = update.current_price {
        rt.current_price = v;
        if v > rt.today_high {
            rt.today_high = v;
        }
        if rt.today_low == 0.0 || v < rt.today_low {
            rt.today_low = v;
        }
    }
    if let Some(v) = update.bid_price {
        rt.bid_price = v;
    }
    if let Some(v) = update.ask_price {
        rt.ask_price = v;
    }
    if let Some(v) = update.total_bid_qty {
        rt.total_bid_qty = v;
    }
    if let Some(v) = update.total_ask_qty {
        rt.total_ask_qty = v;
    }
    if let Some(v) = update.contract_strength {
        rt.contract_strength = v;
    }
    if let Some(v) = update.buy_ratio {
        rt.buy_ratio = v;
    }
    if let Some(v) = update.acc_volume {
        rt.acc_volume = v;
    }
    if let Some(v) = update.buy_contract_count {
        rt.buy_contract_count = v;
    }
    if let Some(v) = update.sell_contract_count {
        rt.sell_contract_count = v;
    }
    if let Some(v) = update.trading_halt {
        rt.trading_halt = v;
    }
    if let Some(v) = update.vi_reference_price {
        rt.vi_reference_price = v;
    }
    if let Some(v) = &update.session_code {
        rt.session_code = v.clone();
    }
    if let Some(v) = update.today_high {
        rt.today_high = v;
    }
    if let Some(v) = update.today_low {
        rt.today_low = v;
    }
    if let Some(v) = update.turnover_rate {
        rt.turnover_rate = v;
    }
    if let Some(v) = update.prev_same_time_volume_rate {
        rt.prev_same_time_volume_rate = v;
    }
}

/// Derived metrics recomputed on every feed apply, from the immutable
/// reference data.
fn recompute_derived(rt: &mut RealtimeData, reference: &SymbolReference) {
    if reference.yesterday_close > 0.0 && rt.current_price > 0.0 {
        rt.price_change_rate =
            (rt.current_price - reference.yesterday_close) / reference.yesterday_close * 100.0;
    }
    if reference.avg_daily_volume > 0 {
        rt.volume_spike_ratio = rt.acc_volume as f64 / reference.avg_daily_volume as f64;
    }
    if rt.turnover_rate == 0.0 && reference.listed_shares > 0 {
        rt.turnover_rate = rt.acc_volume as f64 / reference.listed_shares as f64 * 100.0;
    }
    if rt.today_high > 0.0 && rt.today_low > 0.0 {
        rt.volatility = (rt.today_high - rt.today_low) / rt.today_low * 100.0;
    }
}

/// Composite liquidity score, 0-100: tight spreads, deep books and real
/// turnover each contribute a banded component.
pub fn compute_liquidity_score(rt: &RealtimeData) -> f64 {
    let spread_score = if !rt.has_orderbook_data() {
        0.0
    } else {
        match rt.spread_rate() {
            s if s <= 0.1 => 40.0,
            s if s <= 0.3 => 30.0,
            s if s <= 0.5 => 22.0,
            s if s <= 1.0 => 15.0,
            s if s <= 2.0 => 8.0,
            _ => 0.0,
        }
    };
    let depth = rt.total_bid_qty + rt.total_ask_qty;
    let depth_score = match depth {
        d if d >= 100_000 => 30.0,
        d if d >= 50_000 => 24.0,
        d if d >= 20_000 => 18.0,
        d if d >= 5_000 => 10.0,
        d if d > 0 => 4.0,
        _ => 0.0,
    };
    let turnover_score = match rt.turnover_rate {
        t if t >= 2.0 => 30.0,
        t if t >= 1.0 => 24.0,
        t if t >= 0.5 => 16.0,
        t if t >= 0.2 => 8.0,
        _ => 0.0,
    };
    spread_score + depth_score + turnover_score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(code: &str) -> SymbolReference {
        SymbolReference {
            code: code.to_string(),
            name: format!("Test {code}"),
            yesterday_close: 50_000.0,
            yesterday_volume: 1_000_000,
            avg_daily_volume: 1_000_000,
            listed_shares: 50_000_000,
            sma20: 49_500.0,
            pattern_score: 80.0,
            pattern_names: vec!["bull_flag".to_string()],
        }
    }

    fn store_with(codes: &[&str]) -> SymbolStateStore {
        let store = SymbolStateStore::new(15);
        for code in codes {
            store.register(reference(code)).unwrap();
        }
        store
    }

    #[test]
    fn register_rejects_duplicates_and_overflow() {
        let store = SymbolStateStore::new(2);
        store.register(reference("000001")).unwrap();
        assert!(matches!(
            store.register(reference("000001")),
            Err(StoreError::AlreadyRegistered(_))
        ));
        store.register(reference("000002")).unwrap();
        assert!(matches!(
            store.register(reference("000003")),
            Err(StoreError::WatchSetFull { capacity: 2 })
        ));
    }

    #[test]
    fn snapshot_of_unknown_symbol_is_a_hard_error() {
        let store = store_with(&[]);
        assert!(matches!(
            store.get_snapshot("999999"),
            Err(StoreError::UnknownSymbol(_))
        ));
    }

    #[test]
    fn update_realtime_recomputes_derived_metrics() {
        let store = store_with(&["005930"]);
        store
            .update_realtime(
                "005930",
                RealtimeUpdate {
                    current_price: Some(51_000.0),
                    acc_volume: Some(2_000_000),
                    ..Default::default()
                },
            )
            .unwrap();
        let snap = store.get_snapshot("005930").unwrap();
        assert!((snap.realtime.price_change_rate - 2.0).abs() < 1e-9);
        assert!((snap.realtime.volume_spike_ratio - 2.0).abs() < 1e-9);
        assert!((snap.realtime.turnover_rate - 4.0).abs() < 1e-9);
        assert_eq!(snap.realtime.today_high, 51_000.0);
        assert_eq!(snap.realtime.update_seq, 1);
    }

    #[test]
    fn realtime_update_invalidates_liquidity_cache() {
        let store = store_with(&["005930"]);
        store
            .update_realtime(
                "005930",
                RealtimeUpdate {
                    current_price: Some(50_000.0),
                    bid_price: Some(50_000.0),
                    ask_price: Some(50_050.0),
                    total_bid_qty: Some(60_000),
                    total_ask_qty: Some(40_000),
                    turnover_rate: Some(1.5),
                    ..Default::default()
                },
            )
            .unwrap();
        let first = store.liquidity_score("005930").unwrap();
        assert!(first > 0.0);
        // Blow out the spread; the cached value must not survive.
        store
            .update_realtime(
                "005930",
                RealtimeUpdate {
                    ask_price: Some(53_000.0),
                    ..Default::default()
                },
            )
            .unwrap();
        let second = store.liquidity_score("005930").unwrap();
        assert!(second < first);
    }

    #[test]
    fn batch_by_status_groups_under_one_acquisition() {
        let store = store_with(&["000001", "000002", "000003"]);
        store.set_status("000002", TradingStatus::BuyOrdered).unwrap();
        store
            .record_buy_fill("000002", 50_000.0, 10, 49_000.0, 52_000.0, false)
            .unwrap();
        let batch =
            store.get_batch_by_status(&[TradingStatus::Watching, TradingStatus::Bought]);
        let mut watching = batch[&TradingStatus::Watching].clone();
        watching.sort();
        assert_eq!(watching, vec!["000001", "000003"]);
        assert_eq!(batch[&TradingStatus::Bought], vec!["000002"]);
    }

    #[test]
    fn invalid_transition_leaves_state_unchanged() {
        let store = store_with(&["000001"]);
        let err = store.set_status("000001", TradingStatus::Sold);
        assert!(matches!(err, Err(StoreError::InvalidTransition { .. })));
        assert_eq!(
            store.status_of("000001").unwrap(),
            TradingStatus::Watching
        );
    }

    #[test]
    fn equal_status_is_a_no_op() {
        let store = store_with(&["000001"]);
        let old = store.set_status("000001", TradingStatus::Watching).unwrap();
        assert_eq!(old, TradingStatus::Watching);
    }

    #[test]
    fn full_lifecycle_round_trip() {
        let store = store_with(&["000001"]);
        store.set_status("000001", TradingStatus::BuyOrdered).unwrap();
        store
            .record_buy_fill("000001", 50_000.0, 20, 49_000.0, 52_000.0, false)
            .unwrap();
        assert_eq!(store.status_of("000001").unwrap(), TradingStatus::Bought);
        store.set_status("000001", TradingStatus::SellOrdered).unwrap();
        let position = store.record_sell_fill("000001").unwrap();
        assert_eq!(position.quantity, 20);
        // Sold resets to Watching and clears the position.
        let snap = store.get_snapshot("000001").unwrap();
        assert_eq!(snap.status, TradingStatus::Watching);
        assert!(snap.position.is_none());
    }

    #[test]
    fn partial_fill_enters_partial_bought() {
        let store = store_with(&["000001"]);
        store.set_status("000001", TradingStatus::BuyOrdered).unwrap();
        store
            .record_buy_fill("000001", 50_000.0, 5, 49_000.0, 52_000.0, true)
            .unwrap();
        assert_eq!(
            store.status_of("000001").unwrap(),
            TradingStatus::PartialBought
        );
        store.set_status("000001", TradingStatus::SellOrdered).unwrap();
        store.record_sell_fill("000001").unwrap();
    }

    #[test]
    fn restored_position_enters_bought_directly() {
        let store = store_with(&["000001"]);
        let position = PositionInfo {
            buy_price: 48_000.0,
            quantity: 7,
            order_time: Utc::now() - chrono::Duration::minutes(90),
            stop_loss_price: 47_000.0,
            take_profit_price: 50_000.0,
        };
        store.restore_position("000001", position).unwrap();
        let snap = store.get_snapshot("000001").unwrap();
        assert_eq!(snap.status, TradingStatus::Bought);
        assert_eq!(snap.position.unwrap().quantity, 7);
        // A second restore on the same symbol is refused.
        let position = PositionInfo {
            buy_price: 48_000.0,
            quantity: 7,
            order_time: Utc::now(),
            stop_loss_price: 0.0,
            take_profit_price: 0.0,
        };
        assert!(matches!(
            store.restore_position("000001", position),
            Err(StoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn rollback_restores_prior_state() {
        let store = store_with(&["000001"]);
        store.set_status("000001", TradingStatus::BuyOrdered).unwrap();
        assert_eq!(
            store.rollback_order("000001").unwrap(),
            TradingStatus::Watching
        );
        assert!(matches!(
            store.rollback_order("000001"),
            Err(StoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn pending_order_ages_cover_only_pending_states() {
        let store = store_with(&["000001", "000002"]);
        store.set_status("000001", TradingStatus::BuyOrdered).unwrap();
        let pending = store.pending_order_ages(Utc::now());
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].symbol, "000001");
        assert_eq!(pending[0].status, TradingStatus::BuyOrdered);
        assert!(pending[0].age_secs >= 0);
    }

    #[test]
    fn counters_flow_through_the_single_entry_point() {
        let store = store_with(&[]);
        store.increment_stat(StatCounter::OpenPositions, 1.0);
        store.increment_stat(StatCounter::DailyTrades, 1.0);
        store.increment_stat(StatCounter::DailyRealizedPnl, -12_500.0);
        let counters = store.counters();
        assert_eq!(counters.open_positions, 1);
        assert_eq!(counters.daily_trades, 1);
        assert!((counters.daily_realized_pnl - (-12_500.0)).abs() < 1e-9);
        store.reset_daily_counters();
        let counters = store.counters();
        assert_eq!(counters.open_positions, 1);
        assert_eq!(counters.daily_trades, 0);
    }

    #[test]
    fn liquidity_score_bands() {
        let mut rt = RealtimeData::default();
        assert_eq!(compute_liquidity_score(&rt), 0.0);
        rt.bid_price = 50_000.0;
        rt.ask_price = 50_050.0; // 0.1% spread
        rt.total_bid_qty = 60_000;
        rt.total_ask_qty = 50_000;
        rt.turnover_rate = 2.5;
        assert_eq!(compute_liquidity_score(&rt), 100.0);
    }
}
