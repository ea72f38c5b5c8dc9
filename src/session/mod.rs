pub mod token_store;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::api::SchedulerApi;
use crate::error::AppError;
use crate::models::{Credentials, Profile};

pub use token_store::{MemoryTokenStore, SqliteTokenStore, TokenCell, TokenStore};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub profile: Option<Profile>,
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.profile.as_ref().is_some_and(|p| p.is_admin)
    }
}

/// Where the front end should go after a session transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Scheduler,
    Admin,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Scheduler => "/app",
            Route::Admin => "/admin",
        }
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Logs the destination; used by front ends that decide routing themselves.
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: Route) {
        info!("navigate to {}", route.path());
    }
}

/// Forwards every navigation to a channel.
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<Route>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Route>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, route: Route) {
        if self.tx.send(route).is_err() {
            debug!("navigation to {} dropped, receiver closed", route.path());
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LogoutOptions {
    pub navigate: bool,
}

impl Default for LogoutOptions {
    fn default() -> Self {
        Self { navigate: true }
    }
}

impl LogoutOptions {
    pub fn silent() -> Self {
        Self { navigate: false }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub logout_on_failure: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            logout_on_failure: true,
        }
    }
}

pub struct SessionStore {
    api: Arc<dyn SchedulerApi>,
    tokens: Arc<dyn TokenStore>,
    token_cell: TokenCell,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<Session>,
}

impl SessionStore {
    /// `token_cell` must be the same cell the API client reads its bearer
    /// token from.
    pub fn new(
        api: Arc<dyn SchedulerApi>,
        tokens: Arc<dyn TokenStore>,
        token_cell: TokenCell,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            api,
            tokens,
            token_cell,
            navigator,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn current(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.borrow().is_logged_in()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.state.borrow().profile.clone()
    }

    /// The route actually reachable when `requested` is asked for: protected
    /// routes fall back to login, the admin route to the scheduler for
    /// non-admins.
    pub fn authorize(&self, requested: Route) -> Route {
        let session = self.state.borrow();
        match requested {
            Route::Login => Route::Login,
            _ if !session.is_logged_in() => Route::Login,
            Route::Admin if !session.is_admin() => Route::Scheduler,
            route => route,
        }
    }

    pub fn require_admin(&self) -> Result<Profile, AppError> {
        match self.profile() {
            Some(profile) if profile.is_admin && self.is_logged_in() => Ok(profile),
            Some(_) => Err(AppError::Unauthorized(Some(
                "Administrator rights are required".to_string(),
            ))),
            None => Err(AppError::Unauthorized(None)),
        }
    }

    /// Restores a persisted session on startup. Any failure leaves the
    /// session logged out without surfacing an error.
    pub async fn restore(&self) -> Session {
        let token = match self.tokens.load().await {
            Ok(Some(token)) => token,
            Ok(None) => return self.current(),
            Err(e) => {
                warn!("could not read persisted token: {}", e);
                return self.current();
            }
        };

        self.token_cell.set(Some(token.clone()));
        self.state.send_replace(Session {
            token: Some(token),
            profile: None,
        });

        if let Err(e) = self.fetch_current_user(FetchOptions::default()).await {
            debug!("persisted session discarded: {}", e);
        }
        self.current()
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Route, AppError> {
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };

        let token = self.api.login(&credentials).await.map_err(|e| {
            warn!("login failed for {}: {}", username, e);
            e
        })?;

        if let Err(e) = self.tokens.save(&token).await {
            warn!("could not persist access token: {}", e);
        }
        self.token_cell.set(Some(token.clone()));
        self.state.send_replace(Session {
            token: Some(token.clone()),
            profile: None,
        });

        let profile = match self.api.fetch_profile().await {
            Ok(profile) => profile,
            Err(e) => {
                warn!("profile fetch after login failed, using fallback: {}", e);
                Profile::fallback(username)
            }
        };

        let route = if profile.is_admin {
            Route::Admin
        } else {
            Route::Scheduler
        };
        let (username, is_admin) = (profile.username.clone(), profile.is_admin);
        if !self.publish_profile(&token, profile) {
            info!("login for {} superseded by logout", username);
            return Err(AppError::Unauthorized(None));
        }
        info!("logged in as {} (admin: {})", username, is_admin);
        self.navigator.navigate(route);
        Ok(route)
    }

    pub async fn logout(&self, options: LogoutOptions) {
        self.token_cell.set(None);
        if let Err(e) = self.tokens.clear().await {
            warn!("could not clear persisted token: {}", e);
        }
        self.state.send_replace(Session::default());
        info!("logged out");

        if options.navigate {
            self.navigator.navigate(Route::Login);
        }
    }

    pub async fn fetch_current_user(&self, options: FetchOptions) -> Result<Profile, AppError> {
        let Some(token) = self.token_cell.get() else {
            if options.logout_on_failure {
                self.logout(LogoutOptions::silent()).await;
            }
            return Err(AppError::Unauthorized(None));
        };

        let result = self.api.fetch_profile().await;
        if !self.is_current(&token) {
            debug!("profile fetch outlived its session, result dropped");
            return Err(AppError::Unauthorized(None));
        }

        match result {
            Ok(profile) => {
                if !self.publish_profile(&token, profile.clone()) {
                    return Err(AppError::Unauthorized(None));
                }
                Ok(profile)
            }
            Err(e) => {
                if options.logout_on_failure {
                    self.logout(LogoutOptions::silent()).await;
                }
                Err(e)
            }
        }
    }

    /// Whether `token` still backs both the published session and the bearer
    /// cell. A logout or a newer login in the meantime makes it stale.
    fn is_current(&self, token: &str) -> bool {
        self.token_cell.get().as_deref() == Some(token)
            && self.state.borrow().token.as_deref() == Some(token)
    }

    /// Attaches `profile` to the session started with `token`. Returns false,
    /// leaving the state untouched, if that session has ended.
    fn publish_profile(&self, token: &str, profile: Profile) -> bool {
        self.state.send_if_modified(|session| {
            let current = session.token.as_deref() == Some(token)
                && self.token_cell.get().as_deref() == Some(token);
            if current {
                session.profile = Some(profile);
            }
            current
        })
    }
}
