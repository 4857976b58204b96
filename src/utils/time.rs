use crate::error::{parse_error, AgentResult, Error};
use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, SecondsFormat,
    TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

/// Source of the current time
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Format used for timestamps without an offset
const FLOATING_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Accepted layouts for timestamps without an offset
const FLOATING_LAYOUTS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// An ISO-8601 timestamp as produced by the language model
///
/// Floating timestamps carry no offset and are read in the user's timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    Floating(NaiveDateTime),
    Fixed(DateTime<FixedOffset>),
}

impl Timestamp {
    /// Shift the timestamp by a duration, keeping its kind
    pub fn plus(self, duration: Duration) -> AgentResult<Self> {
        let shifted = match self {
            Timestamp::Floating(dt) => dt.checked_add_signed(duration).map(Timestamp::Floating),
            Timestamp::Fixed(dt) => dt.checked_add_signed(duration).map(Timestamp::Fixed),
        };
        shifted.ok_or_else(|| parse_error(&format!("{} plus {} is out of range", self, duration)))
    }

    /// Whether the timestamp carries an explicit offset
    pub fn is_floating(&self) -> bool {
        matches!(self, Timestamp::Floating(_))
    }

    /// Resolve the timestamp to an instant in the given timezone
    pub fn in_timezone(&self, tz: Tz) -> AgentResult<DateTime<Tz>> {
        match self {
            Timestamp::Fixed(dt) => Ok(dt.with_timezone(&tz)),
            Timestamp::Floating(naive) => match tz.from_local_datetime(naive) {
                LocalResult::Single(dt) => Ok(dt),
                // Repeated hour at a DST change, take the first occurrence
                LocalResult::Ambiguous(earliest, _) => Ok(earliest),
                LocalResult::None => Err(parse_error(&format!(
                    "{} does not exist in {}",
                    self, tz
                ))),
            },
        }
    }

    /// RFC 3339 representation with an explicit offset
    pub fn to_rfc3339(&self, tz: Tz) -> AgentResult<String> {
        Ok(self
            .in_timezone(tz)?
            .to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Timestamp::Fixed(dt));
        }

        for layout in FLOATING_LAYOUTS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, layout) {
                return Ok(Timestamp::Floating(dt));
            }
        }

        // A bare date means the start of that day
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Ok(Timestamp::Floating(dt));
            }
        }

        Err(parse_error(&format!("Invalid timestamp: {}", s)))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Floating(dt) => write!(f, "{}", dt.format(FLOATING_FORMAT)),
            Timestamp::Fixed(dt) => write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse an IANA timezone name, falling back when it is missing or unknown
pub fn parse_timezone(name: Option<&str>, fallback: Tz) -> Tz {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name.parse().unwrap_or_else(|_| {
            warn!("Unknown timezone {}, using {}", name, fallback);
            fallback
        }),
        None => fallback,
    }
}

/// Human readable start time shown in confirmations
pub fn localize(timestamp: &Timestamp, tz: Tz) -> String {
    match timestamp.in_timezone(tz) {
        Ok(dt) => dt.format("%a, %b %-d, %Y at %-I:%M %p").to_string(),
        Err(_) => timestamp.to_string(),
    }
}
