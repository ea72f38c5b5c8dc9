use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub credits: u32,
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Body of `POST /api/admin/courses`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourseRequest {
    pub code: String,
    pub name: String,
    pub credits: u32,
    pub semester: String,
    pub department: Option<String>,
    pub major: Option<String>,
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CourseFilter {
    pub semester: String,
    pub major: Option<String>,
}

impl CourseFilter {
    pub fn new(semester: impl Into<String>, major: Option<String>) -> Self {
        Self {
            semester: semester.into(),
            major: major
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSummary {
    #[serde(alias = "insertedCount")]
    pub inserted: usize,
    pub semester: String,
    #[serde(default)]
    pub sample: Vec<Course>,
}

/// A course file picked for upload.
#[derive(Debug, Clone)]
pub struct CourseFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A validated `POST /api/admin/upload-courses` submission.
#[derive(Debug, Clone)]
pub struct CourseUpload {
    pub semester: String,
    pub department: Option<String>,
    pub major: Option<String>,
    pub file: CourseFile,
}
