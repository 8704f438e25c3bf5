use chrono::{DateTime, Utc};

use serde::Serialize;

/// Stored user directory record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    /// Canonical email address
    pub email: String,
    pub created_at: DateTime<Utc>,
}
