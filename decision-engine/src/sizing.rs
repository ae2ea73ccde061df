//! Stage 5: position sizing.
//!
//! Notional flows from the configured base (or an account-equity ratio),
//! shrinks in the riskier session windows and when the book is nearly
//! full, is clamped to the per-position cap, then floors to whole shares.
//! A quantity of zero downgrades the signal; the caller never rounds up.

use common::{MarketPhase, RiskConfig};

/// Planned size for a new entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSize {
    pub quantity: u32,
    /// Quantity times the snapshot price.
    pub notional: f64,
}

pub fn position_size(
    price: f64,
    phase: MarketPhase,
    open_positions: i64,
    risk: &RiskConfig,
) -> PositionSize {
    if price <= 0.0 {
        return PositionSize {
            quantity: 0,
            notional: 0.0,
        };
    }
    let mut notional = if risk.use_account_ratio && risk.account_equity > 0.0 {
        risk.account_equity * risk.position_size_ratio
    } else {
        risk.base_investment_amount
    };
    notional *= match phase {
        MarketPhase::Opening => risk.opening_reduction_ratio,
        MarketPhase::PreClose => risk.preclose_reduction_ratio,
        _ => 1.0,
    };
    let conservative_floor =
        (risk.max_positions as f64 * risk.conservative_position_ratio).ceil() as i64;
    if open_positions >= conservative_floor {
        notional *= risk.conservative_ratio;
    }
    notional = notional.min(risk.max_position_notional);
    let quantity = (notional / price).floor() as u32;
    PositionSize {
        quantity,
        notional: quantity as f64 * price,
    }
}
