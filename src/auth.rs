use std::future::Future;
use std::pin::Pin;

use actix_web::http::header::{HeaderMap, HeaderName};
use actix_web::{dev, web, FromRequest, HttpRequest};

use anyhow::Context;

use crate::domain::EmailAddress;
use crate::error::RestError;
use crate::ownership::OwnerResolver;

/// Name of the header an authenticating proxy uses to pass the user's identity
#[derive(Debug, Clone)]
pub struct IdentityHeader(HeaderName);

impl IdentityHeader {
    pub fn new(name: &str) -> anyhow::Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("Invalid identity header name: {}", name))?;
        Ok(Self(name))
    }

    /// Extract the raw identity from the headers of a request.
    ///
    /// Values may carry an issuer prefix, e.g. `accounts.google.com:user@example.com`.
    pub fn identity<'a>(&self, headers: &'a HeaderMap) -> anyhow::Result<&'a str> {
        let value = headers
            .get(&self.0)
            .with_context(|| format!("Missing {} in header", self.0))?
            .to_str()
            .context("Identity header is not valid text")?;
        let identity = match value.rsplit_once(':') {
            Some((_issuer, identity)) => identity,
            None => value,
        };
        Ok(identity.trim())
    }
}

impl AsRef<HeaderName> for IdentityHeader {
    fn as_ref(&self) -> &HeaderName {
        &self.0
    }
}

/// The user on whose behalf a request is made
#[derive(Debug, Clone)]
pub struct CurrentUser(EmailAddress);

impl FromRequest for CurrentUser {
    type Error = RestError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            // NOTE: Both must be registered with the application at startup
            let header = req
                .app_data::<web::Data<IdentityHeader>>()
                .context("Identity header not registered for application")?;
            let owners = req
                .app_data::<web::Data<OwnerResolver>>()
                .context("Owner resolver not registered for application")?;

            let identity = header
                .identity(req.headers())
                .map_err(|e| RestError::Unauthorized(e.to_string()))?;
            let email = owners
                .canonical_email(identity)
                .map_err(|e| RestError::Unauthorized(e.to_string()))?;
            // Anyone who has used the service can be named as a dashboard owner
            owners.register(&email).await?;

            Ok(CurrentUser(email))
        })
    }
}

impl AsRef<EmailAddress> for CurrentUser {
    fn as_ref(&self) -> &EmailAddress {
        &self.0
    }
}
