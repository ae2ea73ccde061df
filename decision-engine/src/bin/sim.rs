//! Scripted end-to-end simulation: a small watch set, a deterministic
//! tape, an executor that fills at the hinted price. Shows the full cycle
//! from registration through a buy signal, a fill, a stop-loss exit and
//! the realized P&L in the counters.
//!
//! Run with `RUST_LOG=debug` to see per-stage rejection logging.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, FixedOffset, Utc, Weekday};
use common::{
    FillResult, OrderHandle, OrderIntent, OrderSide, RealtimeUpdate, SymbolReference,
    TradingConfig, KST_OFFSET_HOURS,
};
use decision_engine::{Decision, DecisionEngine, OrderExecutor};
use state_store::SymbolStateStore;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Fills every order immediately at the hinted price.
struct ImmediateFillExecutor;

#[async_trait]
impl OrderExecutor for ImmediateFillExecutor {
    async fn submit_order(&self, intent: OrderIntent) -> anyhow::Result<OrderHandle> {
        info!(
            symbol = %intent.symbol,
            side = ?intent.side,
            quantity = intent.quantity,
            price_hint = intent.price_hint,
            "executor accepted order"
        );
        Ok(OrderHandle::new())
    }
}

fn reference(code: &str, name: &str, yesterday_close: f64) -> SymbolReference {
    SymbolReference {
        code: code.to_string(),
        name: name.to_string(),
        yesterday_close,
        yesterday_volume: 1_200_000,
        avg_daily_volume: 1_000_000,
        listed_shares: 50_000_000,
        sma20: yesterday_close * 0.99,
        pattern_score: 80.0,
        pattern_names: vec!["range_breakout".to_string()],
    }
}

/// 10:15 exchange-local on the next weekday, always in the future so the
/// scripted holding times stay positive.
fn next_active_session() -> DateTime<Utc> {
    let offset = FixedOffset::east_opt(KST_OFFSET_HOURS * 3600).expect("static offset is in range");
    let mut date = (Utc::now() + Duration::days(1))
        .with_timezone(&offset)
        .date_naive();
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date = date.succ_opt().expect("date in range");
    }
    let local = date
        .and_hms_opt(10, 15, 0)
        .expect("static time is valid")
        .and_local_timezone(offset)
        .single()
        .expect("fixed offset is unambiguous");
    local.with_timezone(&Utc)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = TradingConfig::default();
    let store = Arc::new(SymbolStateStore::new(config.risk.max_watched_symbols));
    let engine = DecisionEngine::new(Arc::clone(&store), config);
    let executor = ImmediateFillExecutor;

    store.register(reference("005930", "Hot Breakout", 50_000.0))?;
    store.register(reference("000660", "Halted Name", 80_000.0))?;
    store.register(reference("035720", "Quiet Tape", 30_000.0))?;

    // Scripted morning tape.
    store.update_realtime(
        "005930",
        RealtimeUpdate {
            current_price: Some(51_600.0),
            bid_price: Some(51_590.0),
            ask_price: Some(51_600.0),
            total_bid_qty: Some(60_000),
            total_ask_qty: Some(40_000),
            contract_strength: Some(115.0),
            buy_ratio: Some(55.0),
            acc_volume: Some(2_500_000),
            buy_contract_count: Some(620),
            sell_contract_count: Some(380),
            prev_same_time_volume_rate: Some(130.0),
            ..RealtimeUpdate::default()
        },
    )?;
    store.update_realtime(
        "000660",
        RealtimeUpdate {
            current_price: Some(81_000.0),
            bid_price: Some(80_990.0),
            ask_price: Some(81_000.0),
            total_bid_qty: Some(90_000),
            total_ask_qty: Some(50_000),
            contract_strength: Some(120.0),
            buy_ratio: Some(58.0),
            acc_volume: Some(1_800_000),
            trading_halt: Some(true),
            ..RealtimeUpdate::default()
        },
    )?;
    store.update_realtime("035720", RealtimeUpdate::trade(30_050.0, 120_000))?;

    let morning = next_active_session();
    info!(%morning, "evaluating the watch set");
    for symbol in ["005930", "000660", "035720"] {
        let decision = engine
            .evaluate_and_submit_at(&executor, symbol, morning)
            .await?;
        if let Decision::NoAction(rejection) = &decision {
            info!(symbol, stage = rejection.stage(), %rejection, "passed over");
        }
    }

    // The breakout buy fills in full.
    engine.on_fill(
        "005930",
        OrderSide::Buy,
        FillResult::Filled {
            price: 51_600.0,
            quantity: 19,
        },
    )?;

    // The tape turns: a 3% slide puts the position through its stop.
    store.update_realtime("005930", RealtimeUpdate::trade(50_000.0, 3_100_000))?;
    let later = morning + Duration::minutes(20);
    let decision = engine
        .evaluate_and_submit_at(&executor, "005930", later)
        .await?;
    info!(decision = %serde_json::to_string(&decision)?, "exit evaluation");
    engine.on_fill(
        "005930",
        OrderSide::Sell,
        FillResult::Filled {
            price: 50_000.0,
            quantity: 19,
        },
    )?;

    let counters = store.counters();
    info!(
        evaluations = counters.evaluations,
        buy_signals = counters.buy_signals,
        sell_signals = counters.sell_signals,
        rejections = counters.rejections,
        daily_trades = counters.daily_trades,
        realized_pnl = counters.daily_realized_pnl,
        "session summary"
    );
    Ok(())
}
