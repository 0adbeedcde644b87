use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::RwLock;

use chrono::{DateTime, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};

/// Zone used when none is configured.
pub const DEFAULT_TIMEZONE: &str = "Asia/Tokyo";

/// A local calendar day in the configured timezone.
///
/// ```
/// use fortune_core::CalendarDate;
///
/// let date: CalendarDate = "2024-03-15".parse().unwrap();
/// assert_eq!(date.yyyymmdd(), "20240315");
/// assert_eq!(date.to_string(), "2024-03-15");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    /// Compact form used when deriving seeds.
    pub fn yyyymmdd(&self) -> String {
        self.0.format("%Y%m%d").to_string()
    }

    /// Long form shown in rendered fortunes, e.g. `2024年03月15日`.
    pub fn japanese(&self) -> String {
        self.0.format("%Y年%m月%d日").to_string()
    }

    pub fn next_day(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl Display for CalendarDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for CalendarDate {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map(Self)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown timezone `{0}`")]
pub struct InvalidTimezone(pub String);

/// An IANA timezone resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(Tz);

impl Timezone {
    pub fn parse(name: &str) -> Result<Self, InvalidTimezone> {
        name.trim()
            .parse::<Tz>()
            .map(Self)
            .map_err(|_| InvalidTimezone(name.to_string()))
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    pub fn to_calendar_date(&self, now: DateTime<Utc>) -> CalendarDate {
        CalendarDate(now.with_timezone(&self.0).date_naive())
    }

    pub fn local_hour(&self, now: DateTime<Utc>) -> u32 {
        now.with_timezone(&self.0).hour()
    }

    /// The UTC instant of a local wall-clock time, if it exists unambiguously.
    pub fn at_local(&self, date: CalendarDate, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
        let naive = date.0.and_hms_opt(hour, minute, 0)?;
        self.0
            .from_local_datetime(&naive)
            .single()
            .map(|local| local.with_timezone(&Utc))
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::Asia::Tokyo)
    }
}

impl Display for Timezone {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and previews.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        let mut guard = self.now.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
