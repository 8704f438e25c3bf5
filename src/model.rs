mod dashboard;
mod user;

pub use dashboard::{Dashboard, DashboardContent};
pub use user::User;
