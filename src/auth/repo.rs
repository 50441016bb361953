use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{Session, User};
use crate::db::Database;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// Inserts a user. Returns `None` when the email is already registered.
    async fn insert(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(
        &self,
        user_id: Uuid,
        token: &str,
        expires: OffsetDateTime,
    ) -> anyhow::Result<Session>;
    /// Session matching both token and user that has not expired at `now`.
    async fn find_active(
        &self,
        token: &str,
        user_id: Uuid,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<Session>>;
    async fn delete_by_token(&self, token: &str) -> anyhow::Result<bool>;
}

pub struct PgUserStore {
    db: Arc<Database>,
}

impl PgUserStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(self.db.pool().await?)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool().await?)
        .await?;
        Ok(user)
    }

    async fn insert(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_optional(self.db.pool().await?)
        .await?;
        Ok(user)
    }
}

pub struct PgSessionStore {
    db: Arc<Database>,
}

impl PgSessionStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(
        &self,
        user_id: Uuid,
        token: &str,
        expires: OffsetDateTime,
    ) -> anyhow::Result<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, user_id, token, expires)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, token, expires
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(token)
        .bind(expires)
        .fetch_one(self.db.pool().await?)
        .await?;
        Ok(session)
    }

    async fn find_active(
        &self,
        token: &str,
        user_id: Uuid,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, token, expires
            FROM sessions
            WHERE token = $1 AND user_id = $2 AND expires > $3
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(now)
        .fetch_optional(self.db.pool().await?)
        .await?;
        Ok(session)
    }

    async fn delete_by_token(&self, token: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(self.db.pool().await?)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
