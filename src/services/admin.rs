use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::api::SchedulerApi;
use crate::error::AppError;
use crate::models::{Course, CourseFile, CourseUpload, NewCourseRequest, UploadSummary};
use crate::services::catalog::CourseCatalog;

pub const UPLOAD_ERROR_MESSAGE: &str = "Upload failed.";
pub const ADD_COURSE_ERROR_MESSAGE: &str = "Could not save the course.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

/// Raw single-course form fields, as typed.
#[derive(Debug, Clone, Default)]
pub struct ManualCourseInput {
    pub code: String,
    pub name: String,
    pub credits: String,
    pub department: String,
    pub major: String,
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Course administration for one semester. The embedded catalog follows the
/// console's semester and major.
pub struct AdminConsole {
    api: Arc<dyn SchedulerApi>,
    catalog: CourseCatalog,
    semester: String,
    department: Option<String>,
    major: Option<String>,
    last_upload: Option<UploadSummary>,
    notice: Option<Notice>,
}

impl AdminConsole {
    pub fn new(api: Arc<dyn SchedulerApi>, semester: impl Into<String>) -> Self {
        Self {
            catalog: CourseCatalog::new(api.clone()),
            api,
            semester: semester.into(),
            department: None,
            major: None,
            last_upload: None,
            notice: None,
        }
    }

    pub fn catalog(&self) -> &CourseCatalog {
        &self.catalog
    }

    pub fn last_upload(&self) -> Option<&UploadSummary> {
        self.last_upload.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn set_department(&mut self, department: Option<&str>) {
        self.department = department.and_then(non_blank);
    }

    /// Loads the catalog for the current semester and major.
    pub async fn load(&mut self) {
        self.catalog
            .list_courses(&self.semester, self.major.as_deref())
            .await;
    }

    pub async fn set_semester(&mut self, semester: &str) {
        self.semester = semester.trim().to_string();
        self.catalog
            .set_filter(&self.semester, self.major.as_deref())
            .await;
    }

    pub async fn set_major(&mut self, major: Option<&str>) {
        self.major = major.and_then(non_blank);
        self.catalog
            .set_filter(&self.semester, self.major.as_deref())
            .await;
    }

    pub async fn upload_courses(
        &mut self,
        file: Option<CourseFile>,
    ) -> Result<UploadSummary, AppError> {
        let upload = match self.validate_upload(file) {
            Ok(upload) => upload,
            Err(e) => {
                self.notice = Some(Notice::error(e.user_message(UPLOAD_ERROR_MESSAGE)));
                return Err(e);
            }
        };

        match self.api.upload_courses(&upload).await {
            Ok(summary) => {
                info!(
                    "uploaded {} courses for semester {} from {}",
                    summary.inserted, summary.semester, upload.file.file_name
                );
                self.notice = Some(Notice::success(format!(
                    "Imported {} courses for semester {}.",
                    summary.inserted, summary.semester
                )));
                self.last_upload = Some(summary.clone());
                self.catalog.refresh().await;
                Ok(summary)
            }
            Err(e) => {
                warn!("course upload failed: {}", e);
                self.notice = Some(Notice::error(e.user_message(UPLOAD_ERROR_MESSAGE)));
                Err(e)
            }
        }
    }

    pub async fn add_course(&mut self, input: &ManualCourseInput) -> Result<Course, AppError> {
        let request = match self.validate_course(input) {
            Ok(request) => request,
            Err(e) => {
                self.notice = Some(Notice::error(e.user_message(ADD_COURSE_ERROR_MESSAGE)));
                return Err(e);
            }
        };

        match self.api.upsert_course(&request).await {
            Ok(course) => {
                info!("saved course {} for semester {}", course.code, request.semester);
                self.notice = Some(Notice::success(format!(
                    "Saved course {} - {}.",
                    course.code, course.name
                )));
                self.catalog.refresh().await;
                Ok(course)
            }
            Err(e) => {
                warn!("course upsert failed: {}", e);
                self.notice = Some(Notice::error(e.user_message(ADD_COURSE_ERROR_MESSAGE)));
                Err(e)
            }
        }
    }

    fn validate_upload(&self, file: Option<CourseFile>) -> Result<CourseUpload, AppError> {
        let file = file.ok_or_else(|| {
            AppError::Validation("Choose a PDF, Excel or CSV file to upload.".to_string())
        })?;
        if file.bytes.is_empty() {
            return Err(AppError::Validation(format!("{} is empty.", file.file_name)));
        }
        if self.semester.is_empty() {
            return Err(AppError::Validation("Semester is required.".to_string()));
        }

        Ok(CourseUpload {
            semester: self.semester.clone(),
            department: self.department.clone(),
            major: self.major.clone(),
            file,
        })
    }

    fn validate_course(&self, input: &ManualCourseInput) -> Result<NewCourseRequest, AppError> {
        let code = input.code.trim();
        let name = input.name.trim();
        if code.is_empty() || name.is_empty() {
            return Err(AppError::Validation(
                "Course code and name are required.".to_string(),
            ));
        }
        if self.semester.is_empty() {
            return Err(AppError::Validation("Semester is required.".to_string()));
        }

        let raw_credits = input.credits.trim();
        let credits = if raw_credits.is_empty() {
            0
        } else {
            raw_credits.parse::<u32>().map_err(|_| {
                AppError::Validation("Credits must be a non-negative number.".to_string())
            })?
        };

        Ok(NewCourseRequest {
            code: code.to_uppercase(),
            name: name.to_string(),
            credits,
            semester: self.semester.clone(),
            department: non_blank(&input.department).or_else(|| self.department.clone()),
            major: non_blank(&input.major).or_else(|| self.major.clone()),
            metadata: HashMap::new(),
        })
    }
}
