use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AppError;

/// Teaching days, Monday (`T2`) through Sunday (`CN`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Mon => "T2",
            Weekday::Tue => "T3",
            Weekday::Wed => "T4",
            Weekday::Thu => "T5",
            Weekday::Fri => "T6",
            Weekday::Sat => "T7",
            Weekday::Sun => "CN",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl FromStr for Weekday {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weekday::ALL
            .into_iter()
            .find(|d| d.label() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown weekday: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DaySession {
    Morning,
    Afternoon,
    Evening,
}

impl DaySession {
    pub const ALL: [DaySession; 3] = [
        DaySession::Morning,
        DaySession::Afternoon,
        DaySession::Evening,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DaySession::Morning => "Sáng",
            DaySession::Afternoon => "Chiều",
            DaySession::Evening => "Tối",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl FromStr for DaySession {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DaySession::ALL
            .into_iter()
            .find(|session| session.label() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown session: {}", s)))
    }
}

/// A weekday/session pair, written on the wire as `T2_Sáng`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    pub day: Weekday,
    pub session: DaySession,
}

impl SlotKey {
    pub fn new(day: Weekday, session: DaySession) -> Self {
        Self { day, session }
    }

    /// All 21 slots, day-major.
    pub fn all() -> impl Iterator<Item = SlotKey> {
        Weekday::ALL.into_iter().flat_map(|day| {
            DaySession::ALL
                .into_iter()
                .map(move |session| SlotKey::new(day, session))
        })
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.day.label(), self.session.label())
    }
}

impl FromStr for SlotKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (day, session) = s
            .split_once('_')
            .ok_or_else(|| AppError::Validation(format!("Malformed time slot: {}", s)))?;
        Ok(SlotKey::new(day.trim().parse()?, session.trim().parse()?))
    }
}

impl Serialize for SlotKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
