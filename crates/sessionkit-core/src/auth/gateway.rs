//! Credential acquisition and revocation.

use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::claims::{self, Claims};
use super::store::TokenStore;
use crate::api::{ApiError, HttpClient};
use crate::config::Config;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Outcome of a successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub token: String,
    pub claims: Claims,
    /// Full response body as returned by the server
    pub response: Value,
}

#[derive(Clone)]
pub struct AuthGateway {
    client: HttpClient,
    auth_path: String,
}

impl AuthGateway {
    pub fn new(client: HttpClient, auth_path: impl Into<String>) -> Self {
        Self {
            client,
            auth_path: auth_path.into(),
        }
    }

    pub fn from_config(config: &Config, store: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        Ok(Self::new(HttpClient::new(config, store)?, config.auth_path.clone()))
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    fn store(&self) -> &dyn TokenStore {
        self.client.store().as_ref()
    }

    /// POST the credentials to the login endpoint and keep the returned token.
    ///
    /// The store is only written once the response carries a decodable
    /// `token`; every failure leaves it as it was.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, ApiError> {
        let body = LoginRequest { username, password };
        let response: Value = self
            .client
            .request_anonymous(Method::POST, &self.auth_path, Some(&body))
            .await?;

        let token = response
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::InvalidResponse("login response has no token".to_string()))?
            .to_string();
        let claims = claims::decode(&token)?;

        self.store().set(&token)?;
        info!(username = username, token_len = token.len(), exp = ?claims.exp, "Logged in");

        Ok(LoginResult { token, claims, response })
    }

    /// Drop the stored credential. No network call; never fails.
    pub fn logout(&self) {
        match self.store().clear() {
            Ok(()) => info!("Logged out"),
            Err(e) => warn!(error = %e, "Failed to clear token store on logout"),
        }
    }

    pub fn token(&self) -> Option<String> {
        claims::read_token(self.store())
    }

    pub fn logged_in(&self) -> bool {
        claims::logged_in(self.store(), Utc::now())
    }

    pub fn profile(&self) -> Option<Claims> {
        claims::profile(self.store())
    }
}
