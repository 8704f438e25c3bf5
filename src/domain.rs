mod dashboard_data;
mod dashboard_id;
mod email_address;

pub use dashboard_data::{DashboardData, DashboardDataError};
pub use dashboard_id::DashboardId;
pub use email_address::EmailAddress;
