//! Market-phase clock: a pure mapping from exchange-local wall-clock time
//! to the named session phase. Stateless and lock-free; safe to call from
//! any thread.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, NaiveTime, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Exchange timezone offset (KST, no DST).
pub const KST_OFFSET_HOURS: i32 = 9;

/// Current exchange-local time.
pub fn now_kst() -> DateTime<FixedOffset> {
    let offset =
        FixedOffset::east_opt(KST_OFFSET_HOURS * 3600).expect("static offset is in range");
    Utc::now().with_timezone(&offset)
}

/// Named segment of the trading session. Each entry phase carries its own
/// decision thresholds; `Closing` and `Closed` never admit new entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketPhase {
    Opening,
    Active,
    Lunch,
    PreClose,
    Closing,
    Closed,
}

/// Session boundaries. Defaults follow the 09:00-15:30 KRX cash session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseSchedule {
    pub open: NaiveTime,
    /// End of the opening window.
    pub opening_end: NaiveTime,
    pub lunch_start: NaiveTime,
    pub lunch_end: NaiveTime,
    /// Start of the pre-close window.
    pub pre_close_start: NaiveTime,
    /// Start of the closing auction window.
    pub closing_start: NaiveTime,
    pub close: NaiveTime,
}

impl Default for PhaseSchedule {
    fn default() -> Self {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).expect("static time is valid");
        Self {
            open: t(9, 0),
            opening_end: t(9, 30),
            lunch_start: t(12, 0),
            lunch_end: t(13, 0),
            pre_close_start: t(14, 50),
            closing_start: t(15, 0),
            close: t(15, 30),
        }
    }
}

/// Pure function of wall-clock time; consumed by every other component.
#[derive(Debug, Clone, Default)]
pub struct MarketPhaseClock {
    schedule: PhaseSchedule,
}

impl MarketPhaseClock {
    pub fn new(schedule: PhaseSchedule) -> Self {
        Self { schedule }
    }

    /// Phase at an exchange-local timestamp.
    pub fn phase_at(&self, ts: NaiveDateTime) -> MarketPhase {
        if matches!(ts.weekday(), Weekday::Sat | Weekday::Sun) {
            return MarketPhase::Closed;
        }
        let s = &self.schedule;
        let t = ts.time();
        if t < s.open || t > s.close {
            MarketPhase::Closed
        } else if t <= s.opening_end {
            MarketPhase::Opening
        } else if t <= s.lunch_start {
            MarketPhase::Active
        } else if t <= s.lunch_end {
            MarketPhase::Lunch
        } else if t <= s.pre_close_start {
            MarketPhase::Active
        } else if t <= s.closing_start {
            MarketPhase::PreClose
        } else {
            MarketPhase::Closing
        }
    }

    /// Phase right now, in exchange-local time.
    pub fn phase_now(&self) -> MarketPhase {
        self.phase_at(now_kst().naive_local())
    }

    /// Whole minutes since the session open, clamped at zero before open.
    pub fn session_minute(&self, ts: NaiveDateTime) -> u32 {
        let open = ts.date().and_time(self.schedule.open);
        (ts - open).num_minutes().max(0) as u32
    }

    /// Minute of the current hour, used by the time-sensitivity score.
    pub fn minute_of_hour(ts: NaiveDateTime) -> u32 {
        ts.time().minute()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        // 2026-03-02 is a Monday.
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn weekday_phases() {
        let clock = MarketPhaseClock::default();
        assert_eq!(clock.phase_at(at(8, 59)), MarketPhase::Closed);
        assert_eq!(clock.phase_at(at(9, 0)), MarketPhase::Opening);
        assert_eq!(clock.phase_at(at(9, 30)), MarketPhase::Opening);
        assert_eq!(clock.phase_at(at(10, 15)), MarketPhase::Active);
        assert_eq!(clock.phase_at(at(12, 30)), MarketPhase::Lunch);
        assert_eq!(clock.phase_at(at(14, 0)), MarketPhase::Active);
        assert_eq!(clock.phase_at(at(14, 55)), MarketPhase::PreClose);
        assert_eq!(clock.phase_at(at(15, 10)), MarketPhase::Closing);
        assert_eq!(clock.phase_at(at(15, 31)), MarketPhase::Closed);
    }

    #[test]
    fn weekend_is_closed() {
        let clock = MarketPhaseClock::default();
        let saturday = NaiveDate::from_ymd_opt(2026, 3, 7)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(clock.phase_at(saturday), MarketPhase::Closed);
    }

    #[test]
    fn session_minute_counts_from_open() {
        let clock = MarketPhaseClock::default();
        assert_eq!(clock.session_minute(at(9, 0)), 0);
        assert_eq!(clock.session_minute(at(9, 12)), 12);
        assert_eq!(clock.session_minute(at(8, 0)), 0);
        assert_eq!(clock.session_minute(at(14, 50)), 350);
    }
}
