//! Snapshot holder that republishes auth state after every sign-in/out.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info};

use super::guard::{RouteDecision, RouteGuard};
use super::Snapshot;
use crate::api::{ApiError, HttpClient};
use crate::auth::{AuthGateway, Claims, TokenStore};
use crate::config::Config;

type Callback = dyn Fn(&Snapshot) + Send + Sync;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    entries: Vec<(u64, Arc<Callback>)>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Handle returned by [`SessionBroadcaster::subscribe`].
#[must_use = "dropping a Subscription keeps the callback registered; call unsubscribe() to remove it"]
pub struct Subscription {
    id: u64,
    subscribers: Weak<Mutex<Subscribers>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            lock(&subscribers).entries.retain(|(id, _)| *id != self.id);
            debug!(id = self.id, "Subscriber removed");
        }
    }
}

pub struct SessionBroadcaster {
    gateway: AuthGateway,
    guard: RouteGuard,
    snapshot: Mutex<Snapshot>,
    subscribers: Arc<Mutex<Subscribers>>,
    watch_tx: watch::Sender<Snapshot>,
}

impl SessionBroadcaster {
    /// Snapshot starts from whatever the store already holds.
    pub fn new(gateway: AuthGateway, guard: RouteGuard) -> Self {
        let initial = Snapshot::from_store(gateway.client().store().as_ref(), Utc::now());
        info!(authenticated = initial.authenticated, "Session initialized");
        let (watch_tx, _) = watch::channel(initial.clone());

        Self {
            gateway,
            guard,
            snapshot: Mutex::new(initial),
            subscribers: Arc::new(Mutex::new(Subscribers::default())),
            watch_tx,
        }
    }

    pub fn from_config(config: &Config, store: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let gateway = AuthGateway::from_config(config, store)?;
        Ok(Self::new(gateway, RouteGuard::from_config(config)))
    }

    pub fn snapshot(&self) -> Snapshot {
        lock(&self.snapshot).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        lock(&self.snapshot).authenticated
    }

    /// Client for protected calls, sharing this session's token store
    pub fn client(&self) -> &HttpClient {
        self.gateway.client()
    }

    pub fn gateway(&self) -> &AuthGateway {
        &self.gateway
    }

    pub fn redirect_url(&self) -> &str {
        self.guard.redirect_url()
    }

    /// Route decision against the current snapshot
    pub fn decide(&self) -> RouteDecision {
        self.guard.decide(&self.snapshot())
    }

    /// Log in, publish the new snapshot, then return the token's claims.
    ///
    /// Subscribers have already been notified when this returns `Ok`. On
    /// error nothing is published.
    pub async fn signin(&self, username: &str, password: &str) -> Result<Claims, ApiError> {
        let result = self.gateway.login(username, password).await?;
        let snapshot = Snapshot::from_store(self.gateway.client().store().as_ref(), Utc::now());
        self.publish(snapshot);
        Ok(result.claims)
    }

    pub async fn signout(&self) {
        self.gateway.logout();
        self.publish(Snapshot::signed_out());
    }

    /// Re-evaluate the store (e.g. after `exp` elapsed). Publishes only on change.
    pub fn refresh(&self) -> bool {
        let next = Snapshot::from_store(self.gateway.client().store().as_ref(), Utc::now());
        if *lock(&self.snapshot) == next {
            return false;
        }
        self.publish(next)
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        let mut subscribers = lock(&self.subscribers);
        let id = subscribers.next_id;
        subscribers.next_id += 1;
        subscribers.entries.push((id, Arc::new(callback)));
        debug!(id = id, total = subscribers.entries.len(), "Subscriber added");

        Subscription {
            id,
            subscribers: Arc::downgrade(&self.subscribers),
        }
    }

    /// Async view of the same snapshot stream
    pub fn watch(&self) -> watch::Receiver<Snapshot> {
        self.watch_tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.subscribers).entries.len()
    }

    /// Store and fan out `snapshot`. Returns whether it differed from the
    /// previous one; subscribers are notified either way.
    fn publish(&self, snapshot: Snapshot) -> bool {
        let previous = std::mem::replace(&mut *lock(&self.snapshot), snapshot.clone());
        let changed = previous != snapshot;
        if changed {
            info!(authenticated = snapshot.authenticated, "Session state changed");
        } else {
            debug!(authenticated = snapshot.authenticated, "Session state republished unchanged");
        }

        self.watch_tx.send_replace(snapshot.clone());

        // Callbacks run without any lock held so they may call back in
        let callbacks: Vec<Arc<Callback>> = lock(&self.subscribers)
            .entries
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(&snapshot);
        }
        changed
    }
}
