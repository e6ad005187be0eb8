//! Time Engine - timezone-aware wall-clock readings
//!
//! Resolves IANA identifiers through chrono-tz and turns a single UTC instant
//! into the local fields every clock face is drawn from. Offsets always come
//! from the timezone database, so DST and historical rule changes are handled
//! without any offset arithmetic here.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Duration, Offset, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while resolving a timezone
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// The identifier is not in the IANA database
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// AM/PM indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Meridiem {
    AM,
    PM,
}

impl std::fmt::Display for Meridiem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Meridiem::AM => write!(f, "AM"),
            Meridiem::PM => write!(f, "PM"),
        }
    }
}

/// Local wall-clock fields for one timezone at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSnapshot {
    /// Hour in 24-hour format (0-23)
    pub hours: u32,
    /// Minute (0-59)
    pub minutes: u32,
    /// Second (0-59)
    pub seconds: u32,
    /// Sub-second fraction in [0.0, 1.0)
    pub second_fraction: f64,
    /// Hour in 12-hour format (1-12)
    pub hour12: u32,
    /// AM/PM indicator
    pub meridiem: Meridiem,
    /// UTC offset in minutes (e.g., -480 for UTC-8)
    pub utc_offset_minutes: i32,
    /// "HH:MM:SS" in 24-hour format
    pub formatted_time: String,
    /// Short date, e.g. "Wed, Oct 19"
    pub formatted_date: String,
    /// Offset as "+HH:MM" / "-HH:MM"
    pub utc_offset: String,
}

impl TimeSnapshot {
    /// Format the time as "HH:MM"
    pub fn format_hh_mm(&self) -> String {
        format!("{:02}:{:02}", self.hours, self.minutes)
    }

    /// Format the UTC offset as "UTC±hh:mm"
    pub fn format_utc_offset(&self) -> String {
        format!("UTC{}", self.utc_offset)
    }
}

/// Format an offset in minutes as "+HH:MM" / "-HH:MM"
pub fn format_offset(offset_minutes: i32) -> String {
    let sign = if offset_minutes >= 0 { "+" } else { "-" };
    let abs_minutes = offset_minutes.abs();
    format!("{}{:02}:{:02}", sign, abs_minutes / 60, abs_minutes % 60)
}

/// Source of the current wall-clock instant
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the operating system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A hand-driven clock for simulated time
///
/// Clones share the same instant, so a test can keep one handle and give the
/// other to the code under test.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        self.now.set(instant);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Timezone-aware time computation
pub trait TimeSource {
    /// Local fields for `timezone_id` at `instant`
    fn snapshot_at(&self, timezone_id: &str, instant: DateTime<Utc>)
        -> Result<TimeSnapshot, TimeError>;

    /// Formatted UTC offset for `timezone_id` at `instant`
    fn offset_at(&self, timezone_id: &str, instant: DateTime<Utc>) -> Result<String, TimeError> {
        self.snapshot_at(timezone_id, instant).map(|s| s.utc_offset)
    }
}

/// `TimeSource` backed by the bundled IANA database
#[derive(Debug, Clone, Copy, Default)]
pub struct ChronoTimeSource;

impl TimeSource for ChronoTimeSource {
    fn snapshot_at(
        &self,
        timezone_id: &str,
        instant: DateTime<Utc>,
    ) -> Result<TimeSnapshot, TimeError> {
        let tz = parse_timezone(timezone_id)?;
        Ok(compute_snapshot_at(tz, instant))
    }

    fn offset_at(&self, timezone_id: &str, instant: DateTime<Utc>) -> Result<String, TimeError> {
        let tz = parse_timezone(timezone_id)?;
        let offset = instant.with_timezone(&tz).offset().fix();
        Ok(format_offset(offset.local_minus_utc() / 60))
    }
}

/// Current local time for a timezone identifier
pub fn current_time(timezone_id: &str) -> Result<TimeSnapshot, TimeError> {
    ChronoTimeSource.snapshot_at(timezone_id, Utc::now())
}

/// Current UTC offset for a timezone identifier
pub fn current_offset(timezone_id: &str) -> Result<String, TimeError> {
    ChronoTimeSource.offset_at(timezone_id, Utc::now())
}

/// Compute the snapshot for a timezone at a specific instant
pub fn compute_snapshot_at(tz: Tz, instant: DateTime<Utc>) -> TimeSnapshot {
    let local = instant.with_timezone(&tz);

    let hours = local.hour();
    let hour12 = match hours {
        0 => 12,
        1..=12 => hours,
        _ => hours - 12,
    };
    let meridiem = if hours < 12 { Meridiem::AM } else { Meridiem::PM };

    // Leap seconds report nanos >= 1e9 on second 59
    let nanos = local.nanosecond() % 1_000_000_000;
    let second_fraction = nanos as f64 / 1_000_000_000.0;

    let utc_offset_minutes = local.offset().fix().local_minus_utc() / 60;

    TimeSnapshot {
        hours,
        minutes: local.minute(),
        seconds: local.second(),
        second_fraction,
        hour12,
        meridiem,
        utc_offset_minutes,
        formatted_time: format!(
            "{:02}:{:02}:{:02}",
            hours,
            local.minute(),
            local.second()
        ),
        formatted_date: local.format("%a, %b %-d").to_string(),
        utc_offset: format_offset(utc_offset_minutes),
    }
}

/// Parse a timezone string into a Tz
pub fn parse_timezone(tz_str: &str) -> Result<Tz, TimeError> {
    tz_str
        .parse::<Tz>()
        .map_err(|_| TimeError::UnknownTimezone(tz_str.to_string()))
}
