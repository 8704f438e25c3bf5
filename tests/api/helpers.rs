use std::net::TcpListener;
use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response};

use dashkit::app;
use dashkit::auth::IdentityHeader;
use dashkit::domain::{DashboardId, EmailAddress};
use dashkit::model::{Dashboard, DashboardContent};
use dashkit::ownership::OwnerResolver;
use dashkit::repo::{DashboardRepo, InMemoryDashboardRepo, InMemoryUserDirectory};
use dashkit::telemetry;

pub const DEFAULT_DOMAIN: &str = "mydomain.com";
pub const IDENTITY_HEADER: &str = "x-goog-authenticated-user-email";
/// Users known to the directory, the first one makes the requests
pub const DEFAULT_USERS: [&str; 2] = ["test01@mydomain.com", "newowner@mydomain.com"];
/// Form body limit of test instances
pub const MAX_PAYLOAD: usize = 64 * 1024;

lazy_static::lazy_static! {
    static ref TRACING: () = {
        if std::env::var("TEST_LOG").is_ok() {
            let subscriber = telemetry::create_subscriber("debug", std::io::stdout);
            telemetry::set_subscriber(subscriber).expect("Failed to set tracing subscriber");
        }
    };
}

pub struct TestApp {
    addr: String,

    pub client: Client,
    pub dashboards: Arc<InMemoryDashboardRepo>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_users(&DEFAULT_USERS).await
    }

    /// Spawn an instance whose user directory starts out with `users`
    pub async fn spawn_with_users(users: &[&str]) -> Self {
        lazy_static::initialize(&TRACING);

        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to listen on random port");
        let port = listener.local_addr().unwrap().port();

        let addr = format!("http://127.0.0.1:{}", port);

        let dashboards = Arc::new(InMemoryDashboardRepo::new());
        let directory = InMemoryUserDirectory::with_users(
            users
                .iter()
                .map(|email| email.parse().expect("Failed to parse test user email")),
        );
        let owner_resolver = OwnerResolver::new(Arc::new(directory), DEFAULT_DOMAIN);
        let identity_header =
            IdentityHeader::new(IDENTITY_HEADER).expect("Failed to create identity header");

        let server = app::run(
            listener,
            dashboards.clone(),
            owner_resolver,
            identity_header,
            MAX_PAYLOAD,
        )
        .expect("Failed to spawn app instance");
        let _ = tokio::spawn(server);

        let client = Client::new();

        Self {
            addr,
            client,
            dashboards,
        }
    }

    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let url = format!("{}/{}", &self.addr, url);
        self.client.request(method, url)
    }

    /// Request made on behalf of the first default user
    pub fn signed_in_request(&self, method: Method, url: &str) -> RequestBuilder {
        self.request_as(DEFAULT_USERS[0], method, url)
    }

    pub fn request_as(&self, user: &str, method: Method, url: &str) -> RequestBuilder {
        self.request(method, url)
            .header(IDENTITY_HEADER, format!("accounts.google.com:{}", user))
    }

    pub async fn health_check(&self) -> reqwest::Result<Response> {
        self.request(Method::GET, "health_check").send().await
    }

    pub async fn get(&self, url: &str, params: &[(&str, &str)]) -> reqwest::Result<Response> {
        self.signed_in_request(Method::GET, url)
            .query(params)
            .send()
            .await
    }

    pub async fn post(&self, url: &str, params: &[(&str, &str)]) -> reqwest::Result<Response> {
        self.signed_in_request(Method::POST, url)
            .form(params)
            .send()
            .await
    }

    pub async fn post_as(
        &self,
        user: &str,
        url: &str,
        params: &[(&str, &str)],
    ) -> reqwest::Result<Response> {
        self.request_as(user, Method::POST, url)
            .form(params)
            .send()
            .await
    }

    /// Store a dashboard directly, bypassing the API
    pub async fn insert_dashboard(&self, owner: Option<&str>, data: &str) -> DashboardId {
        let owner: Option<EmailAddress> =
            owner.map(|o| o.parse().expect("Failed to parse owner email"));
        let content = DashboardContent {
            owner,
            data: data.into(),
        };
        self.dashboards
            .insert(&content)
            .await
            .expect("Failed to insert dashboard")
    }

    pub async fn stored_dashboard(&self, id: DashboardId) -> Option<Dashboard> {
        self.dashboards
            .fetch_by_id(id)
            .await
            .expect("Failed to fetch dashboard")
    }
}
