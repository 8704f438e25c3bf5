use std::sync::Arc;

use crate::domain::EmailAddress;
use crate::error::{Error, Result};
use crate::model::User;
use crate::repo::UserDirectory;

/// Outcome of resolving a requested owner with fallback
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOwner {
    pub owner: EmailAddress,
    /// Set when the requested owner was unknown and the current user was used instead
    pub warning: Option<String>,
}

impl ResolvedOwner {
    pub fn warnings(&self) -> Vec<String> {
        self.warning.iter().cloned().collect()
    }
}

/// Maps owner strings from requests onto users in the directory
#[derive(Clone)]
pub struct OwnerResolver {
    directory: Arc<dyn UserDirectory>,
    default_domain: String,
}

impl OwnerResolver {
    pub fn new(directory: Arc<dyn UserDirectory>, default_domain: impl Into<String>) -> Self {
        Self {
            directory,
            default_domain: default_domain.into(),
        }
    }

    pub fn canonical_email(&self, owner: &str) -> Result<EmailAddress> {
        EmailAddress::canonicalize(owner, &self.default_domain)
    }

    /// Record a signed-in user in the directory so others can hand dashboards to them
    #[tracing::instrument(name = "Register signed-in user", skip(self))]
    pub async fn register(&self, email: &EmailAddress) -> Result<User> {
        self.directory.insert(email).await
    }

    /// Find the user an owner string refers to
    #[tracing::instrument(name = "Look up dashboard owner", skip(self))]
    pub async fn lookup(&self, owner: &str) -> Result<User> {
        let email = self
            .canonical_email(owner)
            .map_err(|_| Error::UserNotFound(owner.trim().to_string()))?;

        self.directory
            .find_by_email(&email)
            .await?
            .ok_or_else(|| Error::UserNotFound(email.to_string()))
    }

    /// Resolve the owner of a dashboard, falling back to `current_user` when the
    /// requested owner does not exist.
    #[tracing::instrument(name = "Resolve dashboard owner", skip(self))]
    pub async fn resolve_or_default(
        &self,
        owner: Option<&str>,
        current_user: &EmailAddress,
    ) -> Result<ResolvedOwner> {
        let owner = match owner.map(str::trim) {
            Some(owner) if !owner.is_empty() => owner,
            _ => return Ok(resolved(current_user)),
        };

        if let Ok(email) = self.canonical_email(owner) {
            if &email == current_user {
                return Ok(resolved(current_user));
            }
        }

        match self.lookup(owner).await {
            Ok(user) => {
                let owner: EmailAddress = user.email.parse()?;
                Ok(ResolvedOwner {
                    owner,
                    warning: None,
                })
            }
            Err(Error::UserNotFound(missing)) => {
                tracing::warn!(
                    "Unknown owner {}, assigning dashboard to {}",
                    missing,
                    current_user
                );
                Ok(ResolvedOwner {
                    owner: current_user.clone(),
                    warning: Some(format!(
                        "The user {} does not exist.  Owner set to {}.",
                        missing, current_user
                    )),
                })
            }
            Err(e) => Err(e),
        }
    }
}

fn resolved(owner: &EmailAddress) -> ResolvedOwner {
    ResolvedOwner {
        owner: owner.clone(),
        warning: None,
    }
}
