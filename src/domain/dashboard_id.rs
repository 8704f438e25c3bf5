use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};

/// Auto-assigned identifier of a stored dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct DashboardId(i64);

impl From<i64> for DashboardId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<DashboardId> for i64 {
    fn from(value: DashboardId) -> i64 {
        value.0
    }
}

impl FromStr for DashboardId {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        value
            .trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| Error::ParsingError(format!("{} is not a dashboard ID", value)))
    }
}

impl fmt::Display for DashboardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
