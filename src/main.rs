use std::net::TcpListener;
use std::sync::Arc;

use anyhow::Context;

use dashkit::app;
use dashkit::ownership::OwnerResolver;
use dashkit::repo::{PgDashboardRepo, PgUserDirectory};
use dashkit::settings::Settings;
use dashkit::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;

    let subscriber = telemetry::create_subscriber(settings.app.log_level(), std::io::stdout);
    telemetry::set_subscriber(subscriber)?;

    let pool = settings
        .database
        .pool_options()
        .connect_with(settings.database.with_db())
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let dashboard_repo = Arc::new(PgDashboardRepo::new(pool.clone()));
    let owner_resolver = OwnerResolver::new(
        Arc::new(PgUserDirectory::new(pool)),
        settings.dashboards.default_domain(),
    );
    let identity_header = settings.dashboards.identity_header()?;

    let listener = TcpListener::bind(settings.app.addr())?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    app::run(
        listener,
        dashboard_repo,
        owner_resolver,
        identity_header,
        settings.dashboards.max_payload(),
    )?
        .await
        .context("Failed to run app")
}
