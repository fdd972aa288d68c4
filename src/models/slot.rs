use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// One-hour slot start time, rendered as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot(NaiveTime);

impl TimeSlot {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

impl FromStr for TimeSlot {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 2 || parts.iter().any(|p| p.len() != 2) {
            return Err(anyhow::anyhow!("invalid time slot: {s}"));
        }
        let hour: u32 = parts[0]
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid hour in: {s}"))?;
        let minute: u32 = parts[1]
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid minute in: {s}"))?;
        Self::from_hm(hour, minute).ok_or_else(|| anyhow::anyhow!("time out of range: {s}"))
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.to_string()
    }
}

/// The studio's hourly slots, 09:00 through 21:00.
pub fn default_time_slots() -> Vec<TimeSlot> {
    (9..=21).filter_map(|h| TimeSlot::from_hm(h, 0)).collect()
}
