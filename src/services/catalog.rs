use std::sync::Arc;

use tracing::{info, warn};

use crate::api::SchedulerApi;
use crate::models::{Course, CourseFilter};

pub const CATALOG_ERROR_MESSAGE: &str = "Could not load the course list. Please try again.";

/// Courses available for the current semester/major filter. Holds only the
/// last result; a failed fetch leaves an error and an empty list.
pub struct CourseCatalog {
    api: Arc<dyn SchedulerApi>,
    filter: Option<CourseFilter>,
    courses: Vec<Course>,
    error: Option<String>,
}

impl CourseCatalog {
    pub fn new(api: Arc<dyn SchedulerApi>) -> Self {
        Self {
            api,
            filter: None,
            courses: Vec::new(),
            error: None,
        }
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn filter(&self) -> Option<&CourseFilter> {
        self.filter.as_ref()
    }

    pub fn find(&self, code: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.code == code)
    }

    /// Fetches courses for `semester` and `major` unconditionally.
    pub async fn list_courses(&mut self, semester: &str, major: Option<&str>) -> &[Course] {
        self.filter = Some(CourseFilter::new(semester, major.map(str::to_string)));
        self.refresh().await;
        &self.courses
    }

    /// Refetches only when the filter differs from the current one. Returns
    /// whether a fetch happened.
    pub async fn set_filter(&mut self, semester: &str, major: Option<&str>) -> bool {
        let next = CourseFilter::new(semester, major.map(str::to_string));
        if self.filter.as_ref() == Some(&next) {
            return false;
        }
        self.filter = Some(next);
        self.refresh().await;
        true
    }

    pub async fn refresh(&mut self) {
        let Some(filter) = self.filter.clone() else {
            return;
        };

        match self.api.list_courses(&filter).await {
            Ok(courses) => {
                info!("loaded {} courses for semester {}", courses.len(), filter.semester);
                self.courses = courses;
                self.error = None;
            }
            Err(e) => {
                warn!("course list failed for semester {}: {}", filter.semester, e);
                self.courses.clear();
                self.error = Some(CATALOG_ERROR_MESSAGE.to_string());
            }
        }
    }
}
