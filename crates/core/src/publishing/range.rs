use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

const DEFAULT_CALENDAR_DAYS: u64 = 30;
/// "All Time" is a fixed lookback, far enough to cover any stored post.
const ALL_TIME_DAYS: u64 = 36_500;

/// Publishing platforms tracked in the `posts` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
    Tiktok,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Facebook, Platform::Instagram, Platform::Tiktok];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::Tiktok => "tiktok",
        }
    }

    /// Parse a comma-separated selection. Blank selects Facebook only.
    pub fn parse_list(value: Option<&str>) -> Result<Vec<Platform>, ValidationError> {
        let raw = value.map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Ok(vec![Platform::Facebook]);
        }
        let mut platforms = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<Platform>)
            .collect::<Result<Vec<Platform>, _>>()?;
        platforms.sort();
        platforms.dedup();
        if platforms.is_empty() {
            return Err(ValidationError::NoPlatforms);
        }
        Ok(platforms)
    }

    pub fn names(platforms: &[Platform]) -> Vec<String> {
        platforms.iter().map(|p| p.as_str().to_string()).collect()
    }
}

impl FromStr for Platform {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| ValidationError::UnknownValue {
                field: "platform",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookback presets of the analytics screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalyticsRange {
    Last7Days,
    #[default]
    Last30Days,
    Last90Days,
    AllTime,
}

impl AnalyticsRange {
    pub fn parse(value: Option<&str>) -> Result<Self, ValidationError> {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("30d") => Ok(Self::Last30Days),
            Some("7d") => Ok(Self::Last7Days),
            Some("90d") => Ok(Self::Last90Days),
            Some("all") => Ok(Self::AllTime),
            Some(v) => Err(ValidationError::UnknownValue {
                field: "range",
                value: v.to_string(),
            }),
        }
    }

    pub fn days(&self) -> u64 {
        match self {
            Self::Last7Days => 7,
            Self::Last30Days => 30,
            Self::Last90Days => 90,
            Self::AllTime => ALL_TIME_DAYS,
        }
    }

    /// Earliest `published_at` included, relative to `now`.
    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_days(Days::new(self.days()))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Query string of the calendar screen.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Inclusive day window, expressed as a half-open instant range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl CalendarWindow {
    /// Missing ends default to the last thirty days ending `today`.
    pub fn resolve(params: &CalendarParams, today: NaiveDate) -> Result<Self, ValidationError> {
        let to = params.to.unwrap_or(today);
        let from = params.from.unwrap_or_else(|| {
            to.checked_sub_days(Days::new(DEFAULT_CALENDAR_DAYS))
                .unwrap_or(NaiveDate::MIN)
        });
        if from > to {
            return Err(ValidationError::InvertedRange {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(Self { from, to })
    }

    /// First instant inside the window.
    pub fn start(&self) -> DateTime<Utc> {
        self.from.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    /// First instant after the window: midnight following `to`.
    pub fn end(&self) -> DateTime<Utc> {
        self.to
            .succ_opt()
            .unwrap_or(NaiveDate::MAX)
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
    }
}
