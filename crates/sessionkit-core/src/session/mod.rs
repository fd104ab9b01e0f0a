//! Authentication state distribution for the UI layer.
//!
//! `SessionBroadcaster` holds the current `Snapshot` and notifies
//! subscribers synchronously whenever it changes. `RouteGuard` maps a
//! snapshot onto a render-or-redirect decision for the router.

pub mod broadcaster;
pub mod guard;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{claims, Claims, TokenStore};

pub use broadcaster::{SessionBroadcaster, Subscription};
pub use guard::{decide, RouteDecision, RouteGuard, RouteTarget};

/// What the UI is allowed to see right now.
///
/// `authenticated` holds exactly when the store has a credential that
/// decodes and has not expired; `profile` is only present in that case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub authenticated: bool,
    pub profile: Option<Claims>,
}

impl Snapshot {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn from_store(store: &dyn TokenStore, now: DateTime<Utc>) -> Self {
        let profile = claims::valid_token(store, now).and_then(|token| claims::decode(&token).ok());
        Self {
            authenticated: profile.is_some(),
            profile,
        }
    }
}
