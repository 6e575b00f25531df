//! Time Helpers
//!
//! Metric step resolutions understood by the Cube evaluator, plus helpers for
//! computing query bounds.

use chrono::{DateTime, Datelike, Duration, Months, TimeZone, Utc};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Metric step resolution
///
/// The evaluator only accepts these five steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// 10 seconds (`1e4` ms)
    TenSeconds,
    /// 1 minute (`6e4` ms)
    OneMinute,
    /// 5 minutes (`3e5` ms)
    FiveMinutes,
    /// 1 hour (`36e5` ms)
    OneHour,
    /// 1 day (`864e5` ms)
    OneDay,
}

impl Resolution {
    /// All resolutions, finest first
    pub fn all() -> &'static [Resolution] {
        &[
            Self::TenSeconds,
            Self::OneMinute,
            Self::FiveMinutes,
            Self::OneHour,
            Self::OneDay,
        ]
    }

    /// Step length in milliseconds
    pub fn as_millis(&self) -> u64 {
        match self {
            Self::TenSeconds => 10_000,
            Self::OneMinute => 60_000,
            Self::FiveMinutes => 300_000,
            Self::OneHour => 3_600_000,
            Self::OneDay => 86_400_000,
        }
    }

    /// Value sent as the `step` query parameter
    pub fn as_step(&self) -> &'static str {
        match self {
            Self::TenSeconds => "1e4",
            Self::OneMinute => "6e4",
            Self::FiveMinutes => "3e5",
            Self::OneHour => "36e5",
            Self::OneDay => "864e5",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::TenSeconds => "10 seconds",
            Self::OneMinute => "1 minute",
            Self::FiveMinutes => "5 minutes",
            Self::OneHour => "1 hour",
            Self::OneDay => "1 day",
        }
    }

    /// Look up a resolution by its length in milliseconds
    pub fn from_millis(millis: u64) -> TimeResult<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|r| r.as_millis() == millis)
            .ok_or_else(|| TimeError::InvalidResolution {
                millis,
                choices: Self::choices(),
            })
    }

    fn choices() -> String {
        Self::all()
            .iter()
            .map(|r| format!("{} ({})", r.as_millis(), r.label()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_step())
    }
}

impl FromStr for Resolution {
    type Err = TimeError;

    /// Accepts step strings (`"1e4"`), short labels (`"10s"`, `"1m"`, `"5m"`,
    /// `"1h"`, `"1d"`) and plain millisecond counts.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "10s" => return Ok(Self::TenSeconds),
            "1m" => return Ok(Self::OneMinute),
            "5m" => return Ok(Self::FiveMinutes),
            "1h" => return Ok(Self::OneHour),
            "1d" => return Ok(Self::OneDay),
            _ => {}
        }

        if let Some(r) = Self::all().iter().find(|r| r.as_step() == s) {
            return Ok(*r);
        }

        let millis = s
            .parse::<u64>()
            .map_err(|_| TimeError::InvalidDuration(format!("Unknown step: {}", s)))?;
        Self::from_millis(millis)
    }
}

/// Errors raised by time helpers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("{millis} is not a valid resolution. Valid choices are {choices}")]
    InvalidResolution { millis: u64, choices: String },

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
}

/// Result type for time helpers
pub type TimeResult<T> = Result<T, TimeError>;

/// Current UTC time
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Same moment one day earlier
pub fn yesterday(start: DateTime<Utc>) -> DateTime<Utc> {
    start - Duration::days(1)
}

/// Same moment seven days earlier
pub fn last_week(start: DateTime<Utc>) -> DateTime<Utc> {
    start - Duration::days(7)
}

/// Midnight on the first day of the month containing `timestamp`
pub fn start_of_month(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(timestamp.year(), timestamp.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(timestamp)
}

/// Truncate `start` to the beginning of its `resolution` bucket
///
/// Sub-second precision is dropped. Buckets are aligned to the Unix epoch,
/// which for every supported resolution matches wall-clock UTC boundaries.
pub fn floor(start: DateTime<Utc>, resolution: Resolution) -> DateTime<Utc> {
    let millis = start.timestamp_millis();
    let step = resolution.as_millis() as i64;
    DateTime::from_timestamp_millis(millis - millis.rem_euclid(step)).unwrap_or(start)
}

/// [`floor`] with the resolution given in milliseconds
pub fn floor_millis(start: DateTime<Utc>, resolution_ms: u64) -> TimeResult<DateTime<Utc>> {
    Ok(floor(start, Resolution::from_millis(resolution_ms)?))
}

fn timeago_pattern() -> TimeResult<&'static Regex> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    if let Some(re) = PATTERN.get() {
        return Ok(re);
    }

    let re = Regex::new(r"^(\d+)([smhDWMY])$")
        .map_err(|e| TimeError::InvalidDuration(e.to_string()))?;
    Ok(PATTERN.get_or_init(|| re))
}

/// Step back from `start` by a relative duration such as `"1D"` or `"3W"`
///
/// Units: `s` seconds, `m` minutes, `h` hours, `D` days, `W` weeks,
/// `M` calendar months, `Y` calendar years.
pub fn timeago(ago: &str, start: DateTime<Utc>) -> TimeResult<DateTime<Utc>> {
    let caps = timeago_pattern()?
        .captures(ago.trim())
        .ok_or_else(|| TimeError::InvalidDuration(format!("Cannot parse '{}'. Use e.g. 30s, 5m, 1h, 1D, 1W, 1M, 1Y", ago)))?;

    let amount: u32 = caps[1]
        .parse()
        .map_err(|_| TimeError::InvalidDuration(format!("Invalid number in '{}'", ago)))?;

    let out_of_range = || TimeError::InvalidDuration(format!("'{}' is out of range", ago));

    let result = match &caps[2] {
        "s" => start.checked_sub_signed(Duration::seconds(amount.into())),
        "m" => start.checked_sub_signed(Duration::minutes(amount.into())),
        "h" => start.checked_sub_signed(Duration::hours(amount.into())),
        "D" => start.checked_sub_signed(Duration::days(amount.into())),
        "W" => start.checked_sub_signed(Duration::weeks(amount.into())),
        "M" => start.checked_sub_months(Months::new(amount)),
        "Y" => amount
            .checked_mul(12)
            .and_then(|months| start.checked_sub_months(Months::new(months))),
        unit => {
            return Err(TimeError::InvalidDuration(format!(
                "Invalid time unit: {}",
                unit
            )))
        }
    };

    result.ok_or_else(out_of_range)
}
