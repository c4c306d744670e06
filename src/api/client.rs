//! Collaborator calls against the SYRA API

use super::transport::{HttpMethod, Transport, TransportRequest};
use super::ApiError;
use crate::classification::RuleTable;
use crate::models::{AttackStats, Domain, NewDomain, SecurityLogRecord, User};
use crate::session::SessionContext;
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub const USER_PATH: &str = "/api/user";
pub const DOMAIN_PATH: &str = "/api/domain";
pub const SECURITY_LOGS_PATH: &str = "/api/security-logs";

/// Client for the user, domain and security-log endpoints
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: SessionContext,
    rules: RuleTable,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session: SessionContext) -> Self {
        ApiClient {
            transport,
            session,
            rules: RuleTable::default(),
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Fetch the signed-in user
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get_json(USER_PATH).await
    }

    /// Fetch every registered domain
    pub async fn list_domains(&self) -> Result<Vec<Domain>, ApiError> {
        self.get_json(DOMAIN_PATH).await
    }

    /// Register a domain
    pub async fn add_domain(&self, domain: &NewDomain) -> Result<Domain, ApiError> {
        let token = self.session.require_token()?;
        let request = TransportRequest::new(HttpMethod::Post, DOMAIN_PATH, token)
            .with_body(serde_json::to_value(domain)?);
        let body = self.execute(request).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Normalize raw user input and register it as a domain
    pub async fn add_domain_from_input(&self, input: &str) -> Result<Domain, ApiError> {
        let domain = NewDomain::from_input(input)?;
        self.add_domain(&domain).await
    }

    /// Remove a domain by id; the response body is ignored
    pub async fn delete_domain(&self, domain_id: &str) -> Result<(), ApiError> {
        let token = self.session.require_token()?;
        let request = TransportRequest::new(HttpMethod::Delete, DOMAIN_PATH, token)
            .with_query("domainId", domain_id);
        self.execute(request).await?;
        Ok(())
    }

    /// Fetch all security logs, unfiltered
    pub async fn list_security_logs(&self) -> Result<Vec<SecurityLogRecord>, ApiError> {
        self.get_json(SECURITY_LOGS_PATH).await
    }

    /// Fetch the security logs and aggregate them into attack counters
    pub async fn attack_stats(&self) -> Result<AttackStats, ApiError> {
        let logs = self.list_security_logs().await?;
        Ok(self.rules.aggregate(&logs))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let token = self.session.require_token()?;
        let request = TransportRequest::new(HttpMethod::Get, path, token);
        let body = self.execute(request).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn execute(&self, request: TransportRequest) -> Result<String, ApiError> {
        log::debug!("{} {}", request.method, request.path);
        let method = request.method;
        let path = request.path.clone();

        let response = self.transport.send(request).await.map_err(|e| {
            log::warn!("{} {} failed: {}", method, path, e);
            e
        })?;

        self.session.validate_response(response.status, response.body)
    }
}
