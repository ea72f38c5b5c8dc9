use std::collections::HashMap;

use crate::error::AppError;
use crate::models::{ConstraintToggles, ScheduleRequest, SelectedSubject, SubjectPayload};
use crate::models::schedule::TIME_FORMAT;
use crate::schedule::free_time::FreeTimeGrid;
use crate::schedule::priority::priority_for;

pub const EMPTY_SELECTION_MESSAGE: &str =
    "Select at least one subject before generating a schedule.";

/// Turns the current selection into a `POST /api/schedule` body. Priorities
/// are recomputed from list order; nothing is sent for an empty selection.
pub fn build_request(
    subjects: &[SelectedSubject],
    grid: &FreeTimeGrid,
    toggles: ConstraintToggles,
) -> Result<ScheduleRequest, AppError> {
    if subjects.is_empty() {
        return Err(AppError::Validation(EMPTY_SELECTION_MESSAGE.to_string()));
    }

    let payloads = subjects
        .iter()
        .enumerate()
        .map(|(index, subject)| subject_payload(index, subject))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ScheduleRequest {
        subjects: payloads,
        available_time_slots: grid.available_tokens(),
        constraints: HashMap::new(),
        additional_constraints: toggles,
    })
}

fn subject_payload(index: usize, subject: &SelectedSubject) -> Result<SubjectPayload, AppError> {
    let name = subject.name().trim();
    if name.is_empty() {
        return Err(AppError::Validation(format!(
            "Subject {} has no name",
            subject.code()
        )));
    }

    let (Some(start_date), Some(end_date)) = (subject.start_date, subject.end_date) else {
        return Err(AppError::Validation(format!(
            "Subject {} needs a start and end date",
            name
        )));
    };
    if end_date < start_date {
        return Err(AppError::Validation(format!(
            "Subject {} ends before it starts",
            name
        )));
    }

    Ok(SubjectPayload {
        name: name.to_string(),
        code: subject.code().to_string(),
        credits: subject.course.credits,
        instructor: subject.instructor.clone(),
        subject_type: subject.subject_type.clone(),
        start_time: subject.start_time.map(|t| t.format(TIME_FORMAT).to_string()),
        end_time: subject.end_time.map(|t| t.format(TIME_FORMAT).to_string()),
        start_date: start_date.format("%Y-%m-%d").to_string(),
        end_date: end_date.format("%Y-%m-%d").to_string(),
        is_retake: subject.is_retake,
        priority: priority_for(index, subject.is_retake),
    })
}
