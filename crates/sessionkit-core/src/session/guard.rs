use serde::{Deserialize, Serialize};

use super::Snapshot;
use crate::config::{Config, DEFAULT_REDIRECT_URL};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteDecision {
    Render,
    Redirect { to: String },
}

/// Where the router should go for a concrete requested route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteTarget {
    Render { route: String },
    Redirect { to: String },
}

/// Render when authenticated, otherwise send the user to `redirect_target`.
pub fn decide(snapshot: &Snapshot, redirect_target: &str) -> RouteDecision {
    if snapshot.authenticated {
        RouteDecision::Render
    } else {
        RouteDecision::Redirect {
            to: redirect_target.to_string(),
        }
    }
}

/// Gate for protected routes with a fixed redirect target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    redirect_url: String,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(DEFAULT_REDIRECT_URL)
    }
}

impl RouteGuard {
    pub fn new(redirect_url: impl Into<String>) -> Self {
        Self {
            redirect_url: redirect_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.redirect_url.clone())
    }

    pub fn redirect_url(&self) -> &str {
        &self.redirect_url
    }

    pub fn decide(&self, snapshot: &Snapshot) -> RouteDecision {
        decide(snapshot, &self.redirect_url)
    }

    pub fn check(&self, snapshot: &Snapshot, requested: &str) -> RouteTarget {
        match self.decide(snapshot) {
            RouteDecision::Render => RouteTarget::Render {
                route: requested.to_string(),
            },
            RouteDecision::Redirect { to } => RouteTarget::Redirect { to },
        }
    }

    /// Path the router should show for `requested`
    pub fn target<'a>(&'a self, snapshot: &Snapshot, requested: &'a str) -> &'a str {
        if snapshot.authenticated {
            requested
        } else {
            &self.redirect_url
        }
    }
}
