use crate::models::{Course, SelectedSubject};
use crate::schedule::priority;

/// Ordered subject selection. Every mutation recomputes priorities, so the
/// stored `priority` of each subject always matches its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionList {
    subjects: Vec<SelectedSubject>,
}

impl SelectionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_subjects(subjects: Vec<SelectedSubject>) -> Self {
        let mut list = Self { subjects };
        list.refresh();
        list
    }

    pub fn subjects(&self) -> &[SelectedSubject] {
        &self.subjects
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.position(code).is_some()
    }

    pub fn position(&self, code: &str) -> Option<usize> {
        self.subjects.iter().position(|s| s.code() == code)
    }

    /// Appends `subject` unless a subject with the same code is already
    /// selected. Returns whether it was added.
    pub fn add(&mut self, subject: SelectedSubject) -> bool {
        if self.contains(subject.code()) {
            return false;
        }
        self.subjects.push(subject);
        self.refresh();
        true
    }

    /// Selects `course` if absent, deselects it otherwise. Returns whether
    /// the course is selected afterwards.
    pub fn toggle(&mut self, course: Course) -> bool {
        if self.remove(&course.code).is_some() {
            false
        } else {
            self.add(SelectedSubject::from_course(course))
        }
    }

    pub fn remove(&mut self, code: &str) -> Option<SelectedSubject> {
        let index = self.position(code)?;
        let removed = self.subjects.remove(index);
        self.refresh();
        Some(removed)
    }

    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.subjects.len() {
            return false;
        }
        self.subjects.swap(index - 1, index);
        self.refresh();
        true
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        if index >= self.subjects.len().saturating_sub(1) {
            return false;
        }
        self.subjects.swap(index, index + 1);
        self.refresh();
        true
    }

    pub fn set_retake(&mut self, code: &str, is_retake: bool) -> bool {
        self.update(code, |subject| subject.is_retake = is_retake)
    }

    /// Edits the subject with `code` in place.
    pub fn update<F>(&mut self, code: &str, edit: F) -> bool
    where
        F: FnOnce(&mut SelectedSubject),
    {
        let Some(index) = self.position(code) else {
            return false;
        };
        edit(&mut self.subjects[index]);
        self.refresh();
        true
    }

    pub fn total_credits(&self) -> u32 {
        self.subjects.iter().map(|s| s.course.credits).sum()
    }

    fn refresh(&mut self) {
        priority::recompute(&mut self.subjects);
    }
}
