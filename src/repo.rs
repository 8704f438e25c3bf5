mod dashboards;
mod users;

pub use dashboards::{DashboardRepo, InMemoryDashboardRepo, PgDashboardRepo};
pub use users::{InMemoryUserDirectory, PgUserDirectory, UserDirectory};
