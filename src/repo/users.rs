use std::collections::HashMap;

use chrono::Utc;

use sqlx::PgPool;

use tokio::sync::RwLock;

use crate::domain::EmailAddress;
use crate::error::Result;
use crate::model::User;

/// Directory of known users that dashboards can be assigned to
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look up a user by canonical email
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>>;

    /// Register a user, returning the existing record if the email is already known
    async fn insert(&self, email: &EmailAddress) -> Result<User>;
}

/// Postgres-backed user directory
#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserDirectory for PgUserDirectory {
    #[tracing::instrument(name = "Find user by email", skip(self))]
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("select id, email, created_at from users where email=$1")
            .bind(email.as_ref())
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    #[tracing::instrument(name = "Insert a new user record", skip(self))]
    async fn insert(&self, email: &EmailAddress) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            "insert into users(email) values ($1) \
             on conflict (email) do update set email=excluded.email \
             returning id, email, created_at",
        )
        .bind(email.as_ref())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}

/// In-memory user directory, seeded up front
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<EmailAddress, User>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(emails: impl IntoIterator<Item = EmailAddress>) -> Self {
        let now = Utc::now();
        let users = emails
            .into_iter()
            .enumerate()
            .map(|(index, email)| {
                let user = User {
                    id: index as i64 + 1,
                    email: email.to_string(),
                    created_at: now,
                };
                (email, user)
            })
            .collect();

        Self {
            users: RwLock::new(users),
        }
    }
}

#[async_trait::async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn insert(&self, email: &EmailAddress) -> Result<User> {
        let mut users = self.users.write().await;
        let next_id = users.len() as i64 + 1;
        let user = users.entry(email.clone()).or_insert_with(|| User {
            id: next_id,
            email: email.to_string(),
            created_at: Utc::now(),
        });

        Ok(user.clone())
    }
}
