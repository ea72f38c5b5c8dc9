use tracing::info;

use crate::api::SchedulerApi;
use crate::error::AppError;
use crate::models::RegisterRequest;
use crate::session::{Route, SessionStore};

pub const LOGIN_FAILED_MESSAGE: &str =
    "Login failed. Check your username and password or try again later.";
pub const REGISTER_FAILED_MESSAGE: &str = "Registration failed for an unknown reason.";
pub const REGISTERED_MESSAGE: &str = "Registration successful! You can log in now.";
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub message: Option<String>,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            message: None,
        }
    }

    /// Logs in through `session`. On failure the fields stay as typed and
    /// `message` explains what went wrong.
    pub async fn submit(&mut self, session: &SessionStore) -> Result<Route, AppError> {
        self.message = None;
        match session.login(self.username.trim(), &self.password).await {
            Ok(route) => Ok(route),
            Err(e) => {
                self.message = Some(e.user_message(LOGIN_FAILED_MESSAGE));
                Err(e)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub message: Option<String>,
}

impl RegisterForm {
    fn validate(&self) -> Result<RegisterRequest, AppError> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(AppError::Validation("Username is required.".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters.",
                MIN_PASSWORD_LEN
            )));
        }
        if self.password != self.confirm_password {
            return Err(AppError::Validation("Passwords do not match.".to_string()));
        }

        let email = self.email.trim();
        Ok(RegisterRequest {
            username: username.to_string(),
            email: (!email.is_empty()).then(|| email.to_string()),
            password: self.password.clone(),
        })
    }

    /// Registers the account. Success clears every field and leaves a
    /// confirmation in `message`.
    pub async fn submit(&mut self, api: &dyn SchedulerApi) -> Result<(), AppError> {
        self.message = None;
        let request = match self.validate() {
            Ok(request) => request,
            Err(e) => {
                self.message = Some(e.user_message(REGISTER_FAILED_MESSAGE));
                return Err(e);
            }
        };

        match api.register(&request).await {
            Ok(()) => {
                info!("registered {}", request.username);
                *self = Self {
                    message: Some(REGISTERED_MESSAGE.to_string()),
                    ..Self::default()
                };
                Ok(())
            }
            Err(e) => {
                self.message = Some(e.user_message(REGISTER_FAILED_MESSAGE));
                Err(e)
            }
        }
    }
}
