//! 12-hour wall-clock codec.
//!
//! Stored instants live on an *offset-normalized* timeline: the local
//! wall-clock fields read as if they were UTC. That keeps all schedule
//! arithmetic plain integer seconds with no zone database involved. The
//! captured zone offset enters exactly once — when mapping the real system
//! clock onto that timeline via [`TimeCodec::now`].

use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// AM/PM half of a 12-hour clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Meridiem {
    Am,
    Pm,
}

impl std::fmt::Display for Meridiem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Meridiem::Am => "AM",
            Meridiem::Pm => "PM",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Meridiem {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "am" => Ok(Meridiem::Am),
            "pm" => Ok(Meridiem::Pm),
            other => Err(format!("unknown meridiem: {other}")),
        }
    }
}

/// One wall-clock reading: 12-hour time plus calendar date.
///
/// `hour12` is 1–12 as a clock face shows it; validity of the fields is not
/// enforced here — [`TimeCodec::compose`] rejects unrepresentable dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallClock {
    pub hour12: u32,
    pub minute: u32,
    pub meridiem: Meridiem,
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

/// Converts between wall-clock fields and offset-normalized instants.
#[derive(Debug, Clone, Copy)]
pub struct TimeCodec {
    offset_secs: i64,
}

static SYSTEM_OFFSET: OnceLock<i64> = OnceLock::new();

impl TimeCodec {
    /// Codec using the local zone offset, captured once per process.
    ///
    /// Later zone changes (DST flips, TZ edits) are deliberately not picked
    /// up: round-trip stability requires a single fixed offset per session.
    pub fn system() -> Self {
        let offset =
            *SYSTEM_OFFSET.get_or_init(|| Local::now().offset().local_minus_utc() as i64);
        Self {
            offset_secs: offset,
        }
    }

    /// Codec with an explicit offset in seconds east of UTC.
    pub fn with_offset(offset_secs: i64) -> Self {
        Self { offset_secs }
    }

    pub fn offset_secs(&self) -> i64 {
        self.offset_secs
    }

    /// Current time on the offset-normalized timeline.
    pub fn now(&self) -> i64 {
        Utc::now().timestamp() + self.offset_secs
    }

    /// Split an instant into wall-clock fields.
    ///
    /// Returns `None` only for instants outside chrono's representable
    /// calendar range.
    pub fn decompose(&self, instant: i64) -> Option<WallClock> {
        let dt = DateTime::from_timestamp(instant, 0)?;
        let hour = dt.hour();
        let (hour12, meridiem) = match hour {
            0 => (12, Meridiem::Am),
            1..=11 => (hour, Meridiem::Am),
            12 => (12, Meridiem::Pm),
            _ => (hour - 12, Meridiem::Pm),
        };
        Some(WallClock {
            hour12,
            minute: dt.minute(),
            meridiem,
            day: dt.day(),
            month: dt.month(),
            year: dt.year(),
        })
    }

    /// Inverse of [`decompose`](Self::decompose). Hour 12 is treated as hour
    /// 0 before the PM offset is applied (12:00 AM → 00:00, 12:00 PM →
    /// 12:00); seconds are always 0.
    ///
    /// Returns `None` for fields that name no real calendar time (month 13,
    /// Feb 30, minute 75).
    pub fn compose(&self, wc: &WallClock) -> Option<i64> {
        let mut hour = if wc.hour12 == 12 { 0 } else { wc.hour12 };
        if wc.meridiem == Meridiem::Pm {
            hour += 12;
        }
        Utc.with_ymd_and_hms(wc.year, wc.month, wc.day, hour, wc.minute, 0)
            .single()
            .map(|dt| dt.timestamp())
    }
}
