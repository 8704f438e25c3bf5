use actix_web::dev::HttpServiceFactory;
use actix_web::{get, post, web, HttpResponse, Responder};

use serde::Serialize;
use serde_json::json;

use crate::auth::CurrentUser;
use crate::controller::Params;
use crate::domain::{DashboardId, EmailAddress};
use crate::error::{RestError, RestResult};
use crate::model::{Dashboard, DashboardContent};
use crate::ownership::OwnerResolver;
use crate::repo::DashboardRepo;

/// Entry of the dashboard listing
#[derive(Debug, Serialize)]
struct DashboardSummary {
    id: String,
    title: Option<String>,
    owner: Option<String>,
}

impl From<&Dashboard> for DashboardSummary {
    fn from(dashboard: &Dashboard) -> Self {
        let title = match dashboard.parse_data() {
            Ok(data) => data.title().map(String::from),
            Err(error) => {
                tracing::warn!(
                    error.cause_chain = ?error,
                    "Listing dashboard {} without a title",
                    dashboard.id
                );
                None
            }
        };

        Self {
            id: dashboard.id.to_string(),
            title,
            owner: dashboard.owner.clone(),
        }
    }
}

#[tracing::instrument(name = "View a dashboard", skip(dashboards))]
#[get("/view")]
async fn view(params: Params, dashboards: web::Data<dyn DashboardRepo>) -> RestResult<impl Responder> {
    let id = params.required_id("id")?;

    let data = fetch(dashboards.get_ref(), id).await?.parse_data()?;

    Ok(HttpResponse::Ok().json(data))
}

#[tracing::instrument(name = "List dashboards", skip(dashboards, owners))]
#[get("/list")]
async fn list(
    params: Params,
    current_user: Option<CurrentUser>,
    dashboards: web::Data<dyn DashboardRepo>,
    owners: web::Data<OwnerResolver>,
) -> RestResult<impl Responder> {
    let owner = if params.flag("mine") {
        let current_user = current_user.ok_or_else(|| {
            RestError::Unauthorized("Listing your own dashboards requires a signed in user".into())
        })?;
        Some(current_user.as_ref().clone())
    } else {
        match params.optional("owner") {
            Some(owner) => Some(owners.canonical_email(owner)?),
            None => None,
        }
    };

    let summaries: Vec<DashboardSummary> = dashboards
        .fetch_all(owner.as_ref())
        .await?
        .iter()
        .map(DashboardSummary::from)
        .collect();

    Ok(HttpResponse::Ok().json(json!({ "data": summaries })))
}

#[tracing::instrument(name = "Create a dashboard", skip(dashboards, owners))]
#[post("/create")]
async fn create(
    params: Params,
    current_user: CurrentUser,
    dashboards: web::Data<dyn DashboardRepo>,
    owners: web::Data<OwnerResolver>,
) -> RestResult<impl Responder> {
    let mut data = params.required_data("data")?;
    data.clear_warnings();

    let resolved = owners
        .resolve_or_default(data.owner(), current_user.as_ref())
        .await?;
    data.set_owner(&resolved.owner);
    data.set_warnings(resolved.warnings());

    let id = dashboards
        .insert(&DashboardContent::new(&resolved.owner, &data))
        .await?;
    data.set_id(id);
    store(dashboards.get_ref(), id, &DashboardContent::new(&resolved.owner, &data)).await?;

    Ok(HttpResponse::Ok().json(data))
}

#[tracing::instrument(name = "Copy a dashboard", skip(dashboards))]
#[post("/copy")]
async fn copy(
    params: Params,
    current_user: CurrentUser,
    dashboards: web::Data<dyn DashboardRepo>,
) -> RestResult<impl Responder> {
    let id = params.required_id("id")?;
    let title = params.optional("title");

    let mut data = fetch(dashboards.get_ref(), id).await?.parse_data()?;
    if let Some(title) = title {
        data.set_title(title);
    }
    let owner = current_user.as_ref();
    data.set_owner(owner);
    data.clear_warnings();

    let new_id = dashboards
        .insert(&DashboardContent::new(owner, &data))
        .await?;
    data.set_id(new_id);
    store(dashboards.get_ref(), new_id, &DashboardContent::new(owner, &data)).await?;

    Ok(HttpResponse::Ok().json(json!({ "id": new_id.to_string() })))
}

#[tracing::instrument(name = "Edit a dashboard", skip(dashboards, owners))]
#[post("/edit")]
async fn edit(
    params: Params,
    current_user: CurrentUser,
    dashboards: web::Data<dyn DashboardRepo>,
    owners: web::Data<OwnerResolver>,
) -> RestResult<impl Responder> {
    let id = params.required_id("id")?;
    let mut data = params.required_data("data")?;
    data.clear_warnings();

    fetch(dashboards.get_ref(), id).await?;

    let resolved = owners
        .resolve_or_default(data.owner(), current_user.as_ref())
        .await?;
    data.set_owner(&resolved.owner);
    data.set_warnings(resolved.warnings());

    store(dashboards.get_ref(), id, &DashboardContent::new(&resolved.owner, &data)).await?;

    Ok(HttpResponse::Ok().json(data))
}

#[tracing::instrument(name = "Change the owner of a dashboard", skip(dashboards, owners))]
#[post("/edit-owner")]
async fn edit_owner(
    params: Params,
    _current_user: CurrentUser,
    dashboards: web::Data<dyn DashboardRepo>,
    owners: web::Data<OwnerResolver>,
) -> RestResult<impl Responder> {
    let id = params.required_id("id")?;
    let email = params.required("email")?;

    let mut data = fetch(dashboards.get_ref(), id).await?.parse_data()?;

    let user = owners.lookup(email).await?;
    let owner: EmailAddress = user.email.parse()?;
    data.set_owner(&owner);

    store(dashboards.get_ref(), id, &DashboardContent::new(&owner, &data)).await?;

    Ok(HttpResponse::Ok().json(data))
}

#[tracing::instrument(name = "Delete a dashboard", skip(dashboards))]
#[post("/delete")]
async fn delete(
    params: Params,
    _current_user: CurrentUser,
    dashboards: web::Data<dyn DashboardRepo>,
) -> RestResult<impl Responder> {
    let id = params.required_id("id")?;

    if !dashboards.delete_by_id(id).await? {
        return Err(RestError::DashboardNotFound(id));
    }

    Ok(HttpResponse::Ok().json(json!({})))
}

/// Fetch a dashboard that must exist
async fn fetch(dashboards: &dyn DashboardRepo, id: DashboardId) -> RestResult<Dashboard> {
    dashboards
        .fetch_by_id(id)
        .await?
        .ok_or(RestError::DashboardNotFound(id))
}

/// Overwrite a dashboard that must exist
async fn store(
    dashboards: &dyn DashboardRepo,
    id: DashboardId,
    content: &DashboardContent,
) -> RestResult<()> {
    if dashboards.update(id, content).await? {
        Ok(())
    } else {
        Err(RestError::DashboardNotFound(id))
    }
}

/// Dashboard API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/dashboard")
        .service(view)
        .service(list)
        .service(create)
        .service(copy)
        .service(edit)
        .service(edit_owner)
        .service(delete)
}
