pub mod dto;
pub mod hooks;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::AppError;
use crate::models::{
    Course, CourseFilter, CourseUpload, Credentials, NewCourseRequest, Profile, RegisterRequest,
    ScheduleRequest, ScheduleResult, UploadSummary,
};

use hooks::{
    BearerAuth, FailureLogger, RequestContext, RequestHook, RequestIdHeader, ResponseHook,
    TimeoutLogger, TokenProvider,
};

/// The remote Smart Scheduler service.
#[async_trait]
pub trait SchedulerApi: Send + Sync {
    /// Exchanges credentials for an access token.
    async fn login(&self, credentials: &Credentials) -> Result<String, AppError>;
    async fn fetch_profile(&self) -> Result<Profile, AppError>;
    async fn register(&self, request: &RegisterRequest) -> Result<(), AppError>;
    async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>, AppError>;
    async fn upload_courses(&self, upload: &CourseUpload) -> Result<UploadSummary, AppError>;
    async fn upsert_course(&self, course: &NewCourseRequest) -> Result<Course, AppError>;
    async fn generate_schedule(
        &self,
        request: &ScheduleRequest,
    ) -> Result<ScheduleResult, AppError>;
    async fn chat(&self, message: &str) -> Result<String, AppError>;
}

pub struct HttpApiClient {
    client: Client,
    base_url: String,
    request_hooks: Vec<Arc<dyn RequestHook>>,
    response_hooks: Vec<Arc<dyn ResponseHook>>,
}

impl HttpApiClient {
    /// Builds a client with the standard hooks: request id, bearer token from
    /// `tokens`, timeout logging and failure logging.
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self, AppError> {
        Ok(Self::bare(config)?
            .with_request_hook(Arc::new(RequestIdHeader))
            .with_request_hook(Arc::new(BearerAuth::new(tokens)))
            .with_response_hook(Arc::new(TimeoutLogger))
            .with_response_hook(Arc::new(FailureLogger)))
    }

    /// A client with no hooks registered.
    pub fn bare(config: &ClientConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_hooks: Vec::new(),
            response_hooks: Vec::new(),
        })
    }

    pub fn with_request_hook(mut self, hook: Arc<dyn RequestHook>) -> Self {
        self.request_hooks.push(hook);
        self
    }

    pub fn with_response_hook(mut self, hook: Arc<dyn ResponseHook>) -> Self {
        self.response_hooks.push(hook);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends one call and reads its whole body. Every failure, including a
    /// body that times out mid-read, is reported to the response hooks.
    async fn send<F>(&self, method: Method, path: &str, build: F) -> Result<Reply, AppError>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder + Send,
    {
        let ctx = RequestContext::new(method.clone(), path);
        let url = format!("{}{}", self.base_url, path);

        let mut request = build(self.client.request(method, &url));
        for hook in &self.request_hooks {
            request = hook.on_request(&ctx, request);
        }

        let result = self.execute(&ctx, request).await;
        if let Err(err) = &result {
            for hook in &self.response_hooks {
                hook.on_error(&ctx, err);
            }
        }
        result
    }

    async fn execute(
        &self,
        ctx: &RequestContext,
        request: RequestBuilder,
    ) -> Result<Reply, AppError> {
        let response = request.send().await?;
        let status = response.status();
        for hook in &self.response_hooks {
            hook.on_response(ctx, status);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_body(status, &body));
        }
        let body = response.text().await?;
        Ok(Reply { status, body })
    }
}

/// A successful response with its body already read.
struct Reply {
    status: StatusCode,
    body: String,
}

impl Reply {
    fn json<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        serde_json::from_str::<T>(&self.body).map_err(|e| {
            tracing::error!("Failed to parse response: {}", e);
            AppError::Decode(e.to_string())
        })
    }
}

fn error_from_body(status: StatusCode, body: &str) -> AppError {
    let detail = serde_json::from_str::<dto::ErrorBody>(body)
        .ok()
        .and_then(dto::ErrorBody::into_message);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Unauthorized(detail),
        _ => AppError::Server { status, detail },
    }
}

#[async_trait]
impl SchedulerApi for HttpApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<String, AppError> {
        let response = self
            .send(Method::POST, "/api/login", |req| req.form(credentials))
            .await?;
        let token: dto::TokenResponse = response.json()?;
        if token.access_token.is_empty() {
            return Err(AppError::Decode("login response carried an empty token".to_string()));
        }
        Ok(token.access_token)
    }

    async fn fetch_profile(&self) -> Result<Profile, AppError> {
        let response = self.send(Method::GET, "/api/users/me", |req| req).await?;
        response.json()
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), AppError> {
        let response = self
            .send(Method::POST, "/api/register", |req| req.json(request))
            .await?;
        if response.status != StatusCode::CREATED {
            return Err(AppError::Server {
                status: response.status,
                detail: None,
            });
        }
        Ok(())
    }

    async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>, AppError> {
        let mut query = vec![("semester", filter.semester.as_str())];
        if let Some(major) = filter.major.as_deref() {
            query.push(("major", major));
        }

        let response = self
            .send(Method::GET, "/api/courses", |req| req.query(&query))
            .await?;
        let list: dto::CourseListResponse = response.json()?;
        Ok(list.items)
    }

    async fn upload_courses(&self, upload: &CourseUpload) -> Result<UploadSummary, AppError> {
        let mut form = Form::new().text("semester", upload.semester.clone());
        if let Some(department) = &upload.department {
            form = form.text("department", department.clone());
        }
        if let Some(major) = &upload.major {
            form = form.text("major", major.clone());
        }
        let part = Part::bytes(upload.file.bytes.clone()).file_name(upload.file.file_name.clone());
        form = form.part("file", part);

        let response = self
            .send(Method::POST, "/api/admin/upload-courses", |req| req.multipart(form))
            .await?;
        response.json()
    }

    async fn upsert_course(&self, course: &NewCourseRequest) -> Result<Course, AppError> {
        let response = self
            .send(Method::POST, "/api/admin/courses", |req| req.json(course))
            .await?;
        response.json()
    }

    async fn generate_schedule(
        &self,
        request: &ScheduleRequest,
    ) -> Result<ScheduleResult, AppError> {
        let response = self
            .send(Method::POST, "/api/schedule", |req| req.json(request))
            .await?;
        response.json()
    }

    async fn chat(&self, message: &str) -> Result<String, AppError> {
        let body = dto::ChatRequest { message };
        let response = self
            .send(Method::POST, "/api/chat", |req| req.json(&body))
            .await?;
        let reply: dto::ChatReply = response.json()?;
        Ok(reply.reply)
    }
}
