use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use serde_json::json;

use thiserror::Error;

use crate::domain::DashboardId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    // Parsing errors
    #[error("{0}")]
    ParsingError(String),
    // User directory errors
    #[error("The user {0} does not exist.")]
    UserNotFound(String),
    // Stored dashboard errors
    #[error("The \"data\" field in dashboard row {id} must be valid JSON.  Found:\n{found}")]
    CorruptDashboard { id: DashboardId, found: String },
    #[error("The \"data\" field in dashboard row {id} must be a JSON object.  Found:\n{found}")]
    DashboardNotAnObject { id: DashboardId, found: String },
    // Database errors
    #[error(transparent)]
    DatabaseError(#[from] sqlx::Error),
}

pub type RestResult<T> = std::result::Result<T, RestError>;

#[derive(Debug, Error)]
pub enum RestError {
    #[error("The \"{0}\" parameter is required.")]
    MissingParameter(String),

    #[error("The \"{name}\" parameter must be an integer.  Found \"{found}\".")]
    NotAnInteger { name: String, found: String },

    #[error("The \"{name}\" parameter must be valid JSON.  Found:\n{found}")]
    InvalidJson { name: String, found: String },

    #[error("The \"{name}\" parameter must be a JSON object.  Found:\n{found}")]
    NotAnObject { name: String, found: String },

    #[error("The \"data\" field in dashboard row {id} must be valid JSON.  Found:\n{found}")]
    CorruptDashboard { id: DashboardId, found: String },

    #[error("The \"data\" field in dashboard row {id} must be a JSON object.  Found:\n{found}")]
    DashboardNotAnObject { id: DashboardId, found: String },

    #[error("No dashboard with ID {0} was found.")]
    DashboardNotFound(DashboardId),

    #[error("The user {0} does not exist.")]
    UserNotFound(String),

    #[error("{0}")]
    ParseError(String),

    #[error("Unauthorized Access: {0}")]
    Unauthorized(String),

    #[error("Internal Server Error")]
    InternalError(String),

    #[error("Internal Server Error")]
    Other(#[from] anyhow::Error),
}

impl From<Error> for RestError {
    fn from(e: Error) -> Self {
        match e {
            Error::ParsingError(msg) => Self::ParseError(msg),
            Error::UserNotFound(email) => Self::UserNotFound(email),
            Error::CorruptDashboard { id, found } => Self::CorruptDashboard { id, found },
            Error::DashboardNotAnObject { id, found } => Self::DashboardNotAnObject { id, found },
            Error::DatabaseError(e) => {
                tracing::error!(error.cause_chain = ?e, "Database error");
                Self::InternalError("Database error".into())
            }
        }
    }
}

impl ResponseError for RestError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_)
            | Self::NotAnInteger { .. }
            | Self::InvalidJson { .. }
            | Self::NotAnObject { .. }
            | Self::CorruptDashboard { .. }
            | Self::DashboardNotAnObject { .. }
            | Self::DashboardNotFound(_)
            | Self::UserNotFound(_)
            | Self::ParseError(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::InternalError(_) | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::Other(e) = self {
            tracing::error!(error.cause_chain = ?e, "Unhandled error");
        }
        HttpResponse::build(self.status_code()).json(json!({ "message": self.to_string() }))
    }
}
