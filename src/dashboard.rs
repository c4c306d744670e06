//! Dashboard assembly
//!
//! Loads the four startup resources concurrently and derives the
//! per-domain views the front end renders.

use crate::api::{ApiClient, ApiError};
use crate::classification::{has_threats, logs_for_domain};
use crate::models::{AttackStats, Domain, SecurityLogRecord, User};
use serde::Serialize;
use thiserror::Error;

/// Failures of a single dashboard action. These are reported next to the
/// control that triggered them and leave the loaded dashboard in place.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("{0}")]
    AddDomain(#[source] ApiError),

    #[error("Failed to delete domain. Please try again.")]
    DeleteDomain(#[source] ApiError),

    #[error("Failed to refresh domains: {0}")]
    Refresh(#[source] ApiError),

    /// The registry accepted the domain; only the follow-up list fetch failed
    #[error("Added {} but failed to refresh domains: {source}", .domain.name)]
    AddedRefreshFailed {
        domain: Domain,
        #[source]
        source: ApiError,
    },
}

impl ActionError {
    pub fn api_error(&self) -> &ApiError {
        match self {
            ActionError::AddDomain(e) | ActionError::DeleteDomain(e) | ActionError::Refresh(e) => e,
            ActionError::AddedRefreshFailed { source, .. } => source,
        }
    }

    /// The domain that was created despite the error, if any
    pub fn created_domain(&self) -> Option<&Domain> {
        match self {
            ActionError::AddedRefreshFailed { domain, .. } => Some(domain),
            _ => None,
        }
    }
}

/// Add a domain from user input, then fetch the updated domain list
pub async fn add_and_refresh(
    api: &ApiClient,
    input: &str,
) -> Result<(Domain, Vec<Domain>), ActionError> {
    let created = api
        .add_domain_from_input(input)
        .await
        .map_err(ActionError::AddDomain)?;
    log::info!("Added domain {} ({})", created.name, created.id);

    match api.list_domains().await {
        Ok(domains) => Ok((created, domains)),
        Err(source) => {
            log::warn!("Domain {} was added but the refresh failed: {}", created.id, source);
            Err(ActionError::AddedRefreshFailed {
                domain: created,
                source,
            })
        }
    }
}

/// Delete a domain, then fetch the updated domain list
pub async fn delete_and_refresh(api: &ApiClient, domain_id: &str) -> Result<Vec<Domain>, ActionError> {
    api.delete_domain(domain_id)
        .await
        .map_err(ActionError::DeleteDomain)?;
    log::info!("Deleted domain {}", domain_id);

    api.list_domains().await.map_err(ActionError::Refresh)
}

/// Everything the dashboard shows
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub user: User,
    pub domains: Vec<Domain>,
    pub logs: Vec<SecurityLogRecord>,
    pub stats: AttackStats,
}

/// A domain with the log records associated with it
#[derive(Debug, Clone, Serialize)]
pub struct DomainView<'a> {
    pub domain: &'a Domain,
    pub logs: Vec<&'a SecurityLogRecord>,
    pub has_threats: bool,
}

impl DomainView<'_> {
    pub fn status_text(&self) -> &'static str {
        if self.has_threats {
            "Threats Detected"
        } else {
            "Secure"
        }
    }
}

/// Outcome of a full dashboard load
#[derive(Debug)]
pub enum LoadState {
    Loaded(Dashboard),
    /// The session ended or never existed; the user was sent to sign in
    SignedOut,
    /// Blocking error screen; the only recovery is a full reload
    Failed(String),
}

impl LoadState {
    pub fn from_result(result: Result<Dashboard, ApiError>) -> Self {
        match result {
            Ok(dashboard) => LoadState::Loaded(dashboard),
            Err(e) if e.is_auth() => LoadState::SignedOut,
            Err(e) => LoadState::Failed(e.to_string()),
        }
    }
}

impl Dashboard {
    /// Issue the user, domain, log and stats calls concurrently.
    ///
    /// Ready only when all four succeed; the first failure fails the whole
    /// load.
    pub async fn load(api: &ApiClient) -> Result<Self, ApiError> {
        let (user, domains, logs, stats) = tokio::try_join!(
            api.current_user(),
            api.list_domains(),
            api.list_security_logs(),
            api.attack_stats(),
        )
        .map_err(|e| {
            log::error!("Dashboard load failed: {}", e);
            e
        })?;

        log::info!(
            "Dashboard loaded: {} domain(s), {} log record(s)",
            domains.len(),
            logs.len()
        );

        Ok(Dashboard {
            user,
            domains,
            logs,
            stats,
        })
    }

    /// Log records whose agent name matches `domain_name`
    pub fn logs_for(&self, domain_name: &str) -> Vec<&SecurityLogRecord> {
        logs_for_domain(domain_name, &self.logs)
    }

    /// One view per domain, in registry order
    pub fn domain_views(&self) -> Vec<DomainView<'_>> {
        self.domains
            .iter()
            .map(|domain| {
                let logs = self.logs_for(&domain.name);
                let has_threats = has_threats(logs.iter().copied());
                DomainView {
                    domain,
                    logs,
                    has_threats,
                }
            })
            .collect()
    }

    /// Re-fetch the domain list after a change
    pub async fn refresh_domains(&mut self, api: &ApiClient) -> Result<(), ActionError> {
        self.domains = api.list_domains().await.map_err(ActionError::Refresh)?;
        Ok(())
    }

    /// Add a domain from user input, then refresh the list.
    ///
    /// When only the refresh fails, the created domain is appended to the
    /// current list so it still shows up.
    pub async fn add_domain(&mut self, api: &ApiClient, input: &str) -> Result<Domain, ActionError> {
        match add_and_refresh(api, input).await {
            Ok((created, domains)) => {
                self.domains = domains;
                Ok(created)
            }
            Err(e) => {
                if let Some(domain) = e.created_domain() {
                    self.domains.push(domain.clone());
                }
                Err(e)
            }
        }
    }

    /// Delete a domain, then refresh the list
    pub async fn delete_domain(&mut self, api: &ApiClient, domain_id: &str) -> Result<(), ActionError> {
        self.domains = delete_and_refresh(api, domain_id).await?;
        Ok(())
    }
}
