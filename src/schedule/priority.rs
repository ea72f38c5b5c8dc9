//! Priority is a function of list position: earlier subjects rank higher,
//! retakes get a bonus, and nothing goes above [`MAX_PRIORITY`].

use crate::models::SelectedSubject;

pub const MAX_PRIORITY: u8 = 10;
pub const MIN_PRIORITY: u8 = 1;
pub const RETAKE_BONUS: u8 = 2;

pub fn base_priority(index: usize) -> u8 {
    let base = (MAX_PRIORITY as usize).saturating_sub(index);
    base.max(MIN_PRIORITY as usize) as u8
}

pub fn priority_for(index: usize, is_retake: bool) -> u8 {
    let bonus = if is_retake { RETAKE_BONUS } else { 0 };
    (base_priority(index) + bonus).min(MAX_PRIORITY)
}

/// Priority of the subject at `index`, or `None` past the end of the list.
pub fn priority_at(subjects: &[SelectedSubject], index: usize) -> Option<u8> {
    subjects
        .get(index)
        .map(|subject| priority_for(index, subject.is_retake))
}

pub fn recompute(subjects: &mut [SelectedSubject]) {
    for (index, subject) in subjects.iter_mut().enumerate() {
        subject.priority = priority_for(index, subject.is_retake);
    }
}
