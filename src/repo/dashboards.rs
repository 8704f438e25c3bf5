use std::collections::BTreeMap;

use chrono::Utc;

use sqlx::PgPool;

use tokio::sync::RwLock;

use crate::domain::{DashboardId, EmailAddress};
use crate::error::Result;
use crate::model::{Dashboard, DashboardContent};

/// Dashboard repository trait, implemented for each storage backend.
/// NOTE: Object safe so handlers can be served from Postgres or from memory in tests
#[async_trait::async_trait]
pub trait DashboardRepo: Send + Sync {
    /// Insert a new dashboard, returning its assigned ID
    async fn insert(&self, content: &DashboardContent) -> Result<DashboardId>;

    /// Fetch a single dashboard by ID
    async fn fetch_by_id(&self, id: DashboardId) -> Result<Option<Dashboard>>;

    /// Fetch all dashboards ordered by ID, optionally only those owned by `owner`
    async fn fetch_all(&self, owner: Option<&EmailAddress>) -> Result<Vec<Dashboard>>;

    /// Replace the owner and data of a dashboard. `false` if no such dashboard exists
    async fn update(&self, id: DashboardId, content: &DashboardContent) -> Result<bool>;

    /// Delete a dashboard. `false` if no such dashboard exists
    async fn delete_by_id(&self, id: DashboardId) -> Result<bool>;
}

/// Postgres Dashboard Repository
#[derive(Debug, Clone)]
pub struct PgDashboardRepo {
    pool: PgPool,
}

impl PgDashboardRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl DashboardRepo for PgDashboardRepo {
    #[tracing::instrument(name = "Insert dashboard", skip(self))]
    async fn insert(&self, content: &DashboardContent) -> Result<DashboardId> {
        let id = sqlx::query_scalar::<_, i64>(
            "insert into dashboards(owner, data) values ($1, $2) returning id",
        )
        .bind(content.owner.as_ref().map(AsRef::<str>::as_ref))
        .bind(&content.data)
        .fetch_one(&self.pool)
        .await?;

        Ok(id.into())
    }

    #[tracing::instrument(name = "Fetch dashboard by id", skip(self))]
    async fn fetch_by_id(&self, id: DashboardId) -> Result<Option<Dashboard>> {
        let dashboard = sqlx::query_as::<_, Dashboard>(
            "select id, owner, data, created_at, updated_at from dashboards where id=$1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(dashboard)
    }

    #[tracing::instrument(name = "Fetch all dashboards", skip(self))]
    async fn fetch_all(&self, owner: Option<&EmailAddress>) -> Result<Vec<Dashboard>> {
        let dashboards = sqlx::query_as::<_, Dashboard>(
            "select id, owner, data, created_at, updated_at from dashboards \
             where $1::text is null or owner=$1 order by id",
        )
        .bind(owner.map(AsRef::<str>::as_ref))
        .fetch_all(&self.pool)
        .await?;

        Ok(dashboards)
    }

    #[tracing::instrument(name = "Update dashboard", skip(self))]
    async fn update(&self, id: DashboardId, content: &DashboardContent) -> Result<bool> {
        let result =
            sqlx::query("update dashboards set owner=$2, data=$3, updated_at=now() where id=$1")
                .bind(id)
                .bind(content.owner.as_ref().map(AsRef::<str>::as_ref))
                .bind(&content.data)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "Delete dashboard", skip(self))]
    async fn delete_by_id(&self, id: DashboardId) -> Result<bool> {
        let result = sqlx::query("delete from dashboards where id=$1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Default)]
struct InMemoryDashboards {
    last_id: i64,
    rows: BTreeMap<DashboardId, Dashboard>,
}

/// In-memory Dashboard Repository, IDs start at 1 and are never reused
#[derive(Debug, Default)]
pub struct InMemoryDashboardRepo {
    inner: RwLock<InMemoryDashboards>,
}

impl InMemoryDashboardRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DashboardRepo for InMemoryDashboardRepo {
    async fn insert(&self, content: &DashboardContent) -> Result<DashboardId> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;

        let id = DashboardId::from(inner.last_id);
        let now = Utc::now();
        inner.rows.insert(
            id,
            Dashboard {
                id,
                owner: content.owner.as_ref().map(ToString::to_string),
                data: content.data.clone(),
                created_at: now,
                updated_at: now,
            },
        );

        Ok(id)
    }

    async fn fetch_by_id(&self, id: DashboardId) -> Result<Option<Dashboard>> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn fetch_all(&self, owner: Option<&EmailAddress>) -> Result<Vec<Dashboard>> {
        let inner = self.inner.read().await;
        let dashboards = inner
            .rows
            .values()
            .filter(|dashboard| match owner {
                Some(owner) => dashboard.owner.as_deref() == Some(owner.as_ref()),
                None => true,
            })
            .cloned()
            .collect();

        Ok(dashboards)
    }

    async fn update(&self, id: DashboardId, content: &DashboardContent) -> Result<bool> {
        let mut inner = self.inner.write().await;
        match inner.rows.get_mut(&id) {
            Some(dashboard) => {
                dashboard.owner = content.owner.as_ref().map(ToString::to_string);
                dashboard.data = content.data.clone();
                dashboard.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: DashboardId) -> Result<bool> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }
}
