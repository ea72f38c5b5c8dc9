use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use crate::api::hooks::TokenProvider;
use crate::error::AppError;

const ACCESS_TOKEN_KEY: &str = "access_token";

/// Durable home of the access token between runs.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Result<Option<String>, AppError>;
    async fn save(&self, token: &str) -> Result<(), AppError>;
    async fn clear(&self) -> Result<(), AppError>;
}

pub struct SqliteTokenStore {
    db: SqlitePool,
}

impl SqliteTokenStore {
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        // One connection keeps `sqlite::memory:` databases coherent.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(db: SqlitePool) -> Result<Self, AppError> {
        sqlx::migrate!("./migrations").run(&db).await?;
        Ok(Self { db })
    }
}

#[async_trait]
impl TokenStore for SqliteTokenStore {
    async fn load(&self) -> Result<Option<String>, AppError> {
        let token = sqlx::query_scalar::<_, String>(
            "SELECT value FROM session_tokens WHERE key = ?",
        )
        .bind(ACCESS_TOKEN_KEY)
        .fetch_optional(&self.db)
        .await?;
        Ok(token.filter(|t| !t.is_empty()))
    }

    async fn save(&self, token: &str) -> Result<(), AppError> {
        let now = chrono::Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO session_tokens (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(ACCESS_TOKEN_KEY)
        .bind(token)
        .bind(now)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM session_tokens WHERE key = ?")
            .bind(ACCESS_TOKEN_KEY)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<String>, AppError> {
        Ok(self.token.lock().clone())
    }

    async fn save(&self, token: &str) -> Result<(), AppError> {
        *self.token.lock() = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        *self.token.lock() = None;
        Ok(())
    }
}

/// In-memory copy of the current token, shared between the session store
/// (sole writer) and the HTTP client's bearer hook.
#[derive(Clone, Default)]
pub struct TokenCell {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenCell {
    pub fn get(&self) -> Option<String> {
        self.inner.read().clone()
    }

    pub(crate) fn set(&self, token: Option<String>) {
        *self.inner.write() = token;
    }
}

impl TokenProvider for TokenCell {
    fn token(&self) -> Option<String> {
        self.get()
    }
}
