use chrono::{DateTime, Utc};

use crate::domain::{DashboardData, DashboardDataError, DashboardId, EmailAddress};
use crate::error::{Error, Result};

/// Writable part of a dashboard record
#[derive(Debug, Clone)]
pub struct DashboardContent {
    /// Owning user, `None` for rows written without an owner
    pub owner: Option<EmailAddress>,
    /// JSON text of the dashboard document
    pub data: String,
}

impl DashboardContent {
    pub fn new(owner: &EmailAddress, data: &DashboardData) -> Self {
        Self {
            owner: Some(owner.clone()),
            data: data.to_json_string(),
        }
    }
}

/// Stored dashboard record
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Dashboard {
    pub id: DashboardId,
    pub owner: Option<String>,
    /// Raw JSON text, not guaranteed to be valid
    pub data: String,
    /// Creation and update timestamps
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Dashboard {
    /// Parse the stored document, reporting the row as corrupt if it is not a JSON object
    pub fn parse_data(&self) -> Result<DashboardData> {
        DashboardData::parse(&self.data).map_err(|e| {
            let (id, found) = (self.id, self.data.clone());
            match e {
                DashboardDataError::InvalidJson(_) => Error::CorruptDashboard { id, found },
                DashboardDataError::NotAnObject => Error::DashboardNotAnObject { id, found },
            }
        })
    }
}
