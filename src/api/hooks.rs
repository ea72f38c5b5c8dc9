use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::AppError;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Identifies one outgoing call for the hooks that see it.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub request_id: Uuid,
}

impl RequestContext {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            request_id: Uuid::new_v4(),
        }
    }
}

/// Source of the bearer token attached to outgoing calls.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

pub trait RequestHook: Send + Sync {
    fn on_request(&self, ctx: &RequestContext, request: RequestBuilder) -> RequestBuilder;
}

pub trait ResponseHook: Send + Sync {
    fn on_response(&self, _ctx: &RequestContext, _status: StatusCode) {}

    fn on_error(&self, _ctx: &RequestContext, _err: &AppError) {}
}

pub struct BearerAuth {
    provider: Arc<dyn TokenProvider>,
}

impl BearerAuth {
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self { provider }
    }
}

impl RequestHook for BearerAuth {
    fn on_request(&self, _ctx: &RequestContext, request: RequestBuilder) -> RequestBuilder {
        match self.provider.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

pub struct RequestIdHeader;

impl RequestHook for RequestIdHeader {
    fn on_request(&self, ctx: &RequestContext, request: RequestBuilder) -> RequestBuilder {
        debug!("{} {} [{}]", ctx.method, ctx.path, ctx.request_id);
        request.header(REQUEST_ID_HEADER, ctx.request_id.to_string())
    }
}

pub struct TimeoutLogger;

impl ResponseHook for TimeoutLogger {
    fn on_error(&self, ctx: &RequestContext, err: &AppError) {
        if matches!(err, AppError::Timeout) {
            warn!(
                "request timed out: {} {} [{}]",
                ctx.method, ctx.path, ctx.request_id
            );
        }
    }
}

pub struct FailureLogger;

impl ResponseHook for FailureLogger {
    fn on_response(&self, ctx: &RequestContext, status: StatusCode) {
        debug!("{} {} -> {} [{}]", ctx.method, ctx.path, status, ctx.request_id);
    }

    fn on_error(&self, ctx: &RequestContext, err: &AppError) {
        match err {
            AppError::Timeout => {}
            AppError::Server { status, .. } if status.is_server_error() => {
                error!("{} {} failed: {} [{}]", ctx.method, ctx.path, err, ctx.request_id);
            }
            _ => warn!("{} {} failed: {} [{}]", ctx.method, ctx.path, err, ctx.request_id),
        }
    }
}
