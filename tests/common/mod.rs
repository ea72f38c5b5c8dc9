#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use smart_scheduler::models::{
    Course, CourseFilter, CourseUpload, Credentials, NewCourseRequest, Profile, RegisterRequest,
    ScheduleRequest, ScheduleResult, UploadSummary,
};
use smart_scheduler::session::{ChannelNavigator, MemoryTokenStore, Route, SessionStore, TokenCell};
use smart_scheduler::{AppError, SchedulerApi};
use tokio::sync::Notify;
use tokio::sync::mpsc::UnboundedReceiver;

/// Scripted stand-in for the remote service. `None` in a response slot makes
/// the matching call fail.
#[derive(Default)]
pub struct FakeApi {
    pub token: Option<String>,
    pub profile: Option<Profile>,
    pub courses: Option<Vec<Course>>,
    pub schedule: Option<ScheduleResult>,
    pub schedule_error: Option<String>,
    pub chat_reply: Option<String>,
    pub register_error: Option<String>,
    /// Holds `fetch_profile` until notified.
    pub profile_gate: Option<Arc<Notify>>,
    pub calls: Mutex<Vec<String>>,
    pub course_filters: Mutex<Vec<CourseFilter>>,
    pub schedule_requests: Mutex<Vec<ScheduleRequest>>,
    pub upserts: Mutex<Vec<NewCourseRequest>>,
    pub uploads: Mutex<Vec<CourseUpload>>,
    pub registrations: Mutex<Vec<RegisterRequest>>,
}

impl FakeApi {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == name).count()
    }

    fn record(&self, name: &str) {
        self.calls.lock().expect("calls lock").push(name.to_string());
    }
}

pub fn profile(username: &str, is_admin: bool) -> Profile {
    Profile {
        username: username.to_string(),
        is_admin,
        email: None,
        id: None,
    }
}

pub fn course(code: &str, credits: u32) -> Course {
    Course {
        code: code.to_string(),
        name: format!("Course {}", code),
        credits,
        semester: Some("2023-2".to_string()),
        department: None,
        major: None,
        metadata: Default::default(),
    }
}

fn server_error(detail: &str) -> AppError {
    AppError::Server {
        status: StatusCode::BAD_REQUEST,
        detail: Some(detail.to_string()),
    }
}

#[async_trait]
impl SchedulerApi for FakeApi {
    async fn login(&self, _credentials: &Credentials) -> Result<String, AppError> {
        self.record("login");
        self.token
            .clone()
            .ok_or_else(|| AppError::Unauthorized(Some("Invalid username or password".to_string())))
    }

    async fn fetch_profile(&self) -> Result<Profile, AppError> {
        self.record("fetch_profile");
        if let Some(gate) = &self.profile_gate {
            gate.notified().await;
        }
        self.profile.clone().ok_or(AppError::Unauthorized(None))
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), AppError> {
        self.record("register");
        self.registrations.lock().expect("lock").push(request.clone());
        match &self.register_error {
            Some(detail) => Err(server_error(detail)),
            None => Ok(()),
        }
    }

    async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>, AppError> {
        self.record("list_courses");
        self.course_filters.lock().expect("lock").push(filter.clone());
        self.courses.clone().ok_or(AppError::Timeout)
    }

    async fn upload_courses(&self, upload: &CourseUpload) -> Result<UploadSummary, AppError> {
        self.record("upload_courses");
        self.uploads.lock().expect("lock").push(upload.clone());
        Ok(UploadSummary {
            inserted: 2,
            semester: upload.semester.clone(),
            sample: vec![course("MATH101", 3), course("PHYS101", 4)],
        })
    }

    async fn upsert_course(&self, request: &NewCourseRequest) -> Result<Course, AppError> {
        self.record("upsert_course");
        self.upserts.lock().expect("lock").push(request.clone());
        Ok(Course {
            code: request.code.clone(),
            name: request.name.clone(),
            credits: request.credits,
            semester: Some(request.semester.clone()),
            department: request.department.clone(),
            major: request.major.clone(),
            metadata: Default::default(),
        })
    }

    async fn generate_schedule(
        &self,
        request: &ScheduleRequest,
    ) -> Result<ScheduleResult, AppError> {
        self.record("generate_schedule");
        self.schedule_requests.lock().expect("lock").push(request.clone());
        if let Some(detail) = &self.schedule_error {
            return Err(server_error(detail));
        }
        self.schedule.clone().ok_or(AppError::Timeout)
    }

    async fn chat(&self, message: &str) -> Result<String, AppError> {
        self.record("chat");
        self.chat_reply
            .as_ref()
            .map(|reply| format!("{} ({})", reply, message))
            .ok_or(AppError::Timeout)
    }
}

pub struct Harness {
    pub api: Arc<FakeApi>,
    pub tokens: Arc<MemoryTokenStore>,
    pub cell: TokenCell,
    pub session: SessionStore,
    pub routes: UnboundedReceiver<Route>,
}

impl Harness {
    pub fn new(api: FakeApi) -> Self {
        Self::with_tokens(api, MemoryTokenStore::default())
    }

    pub fn with_tokens(api: FakeApi, tokens: MemoryTokenStore) -> Self {
        let api = Arc::new(api);
        let tokens = Arc::new(tokens);
        let cell = TokenCell::default();
        let (navigator, routes) = ChannelNavigator::new();
        let session =
            SessionStore::new(api.clone(), tokens.clone(), cell.clone(), Arc::new(navigator));
        Self {
            api,
            tokens,
            cell,
            session,
            routes,
        }
    }

    pub fn drain_routes(&mut self) -> Vec<Route> {
        let mut seen = Vec::new();
        while let Ok(route) = self.routes.try_recv() {
            seen.push(route);
        }
        seen
    }
}
