use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::Course;

/// A course picked for scheduling. `priority` is derived from the subject's
/// position in the selection and is overwritten whenever the list changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedSubject {
    #[serde(flatten)]
    pub course: Course,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub subject_type: Option<String>,
    #[serde(default, with = "hhmm")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm")]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_retake: bool,
    #[serde(default)]
    pub priority: u8,
}

impl SelectedSubject {
    pub fn from_course(course: Course) -> Self {
        Self {
            course,
            instructor: None,
            subject_type: None,
            start_time: None,
            end_time: None,
            start_date: None,
            end_date: None,
            is_retake: false,
            priority: 0,
        }
    }

    pub fn code(&self) -> &str {
        &self.course.code
    }

    pub fn name(&self) -> &str {
        &self.course.name
    }
}

/// Boolean preferences forwarded untouched to the optimizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintToggles {
    #[serde(default)]
    pub avoid_consecutive: bool,
    #[serde(default)]
    pub balance_days: bool,
    #[serde(default)]
    pub prefer_morning: bool,
    #[serde(default)]
    pub allow_saturday: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectPayload {
    pub name: String,
    pub code: String,
    pub credits: u32,
    pub instructor: Option<String>,
    pub subject_type: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub is_retake: bool,
    pub priority: u8,
}

/// Body of `POST /api/schedule`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleRequest {
    pub subjects: Vec<SubjectPayload>,
    pub available_time_slots: Vec<String>,
    pub constraints: HashMap<String, Vec<String>>,
    #[serde(rename = "additionalConstraints")]
    pub additional_constraints: ConstraintToggles,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub subject: String,
    pub time: String,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub sessions: Option<u32>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub is_retake: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovedEntry {
    pub subject: String,
    #[serde(default)]
    pub kept_with: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    #[serde(default, alias = "scheduleEntries")]
    pub schedule: Vec<ScheduleEntry>,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub db_id: Option<String>,
    #[serde(default, alias = "removed")]
    pub removed_conflicts: Vec<RemovedEntry>,
}

pub(crate) const TIME_FORMAT: &str = "%H:%M";

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIME_FORMAT;

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => serializer.collect_str(&time.format(TIME_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveTime::parse_from_str(s, TIME_FORMAT)
                .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
