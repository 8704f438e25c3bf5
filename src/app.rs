use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{get, HttpResponse, Responder};
use actix_web::{web, App, HttpServer};

use tracing_actix_web::TracingLogger;

use crate::auth::IdentityHeader;
use crate::controller::dashboards;
use crate::ownership::OwnerResolver;
use crate::repo::DashboardRepo;

/// Simple health-check endpoint
#[tracing::instrument(name = "Health check")]
#[get("/health_check")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().finish()
}

/// Run the application on a specified TCP listener
pub fn run(
    listener: TcpListener,
    dashboard_repo: Arc<dyn DashboardRepo>,
    owner_resolver: OwnerResolver,
    identity_header: IdentityHeader,
    max_payload: usize,
) -> anyhow::Result<Server> {
    // Wrap application data
    let dashboard_repo: web::Data<dyn DashboardRepo> = web::Data::from(dashboard_repo);
    let owner_resolver = web::Data::new(owner_resolver);
    let identity_header = web::Data::new(identity_header);
    // Start the server
    let server = HttpServer::new(move || {
        // Dashboard documents are posted as url-encoded form fields
        let form_config = web::FormConfig::default().limit(max_payload);
        App::new()
            .wrap(TracingLogger::default())
            .app_data(dashboard_repo.clone())
            .app_data(owner_resolver.clone())
            .app_data(identity_header.clone())
            .app_data(form_config)
            .service(health_check)
            .service(dashboards::scope())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
