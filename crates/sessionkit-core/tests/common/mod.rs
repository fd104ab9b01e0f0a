#![allow(dead_code)]

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use serde_json::{json, Value};
use sessionkit_core::{Config, MemoryTokenStore, TokenStore};
use wiremock::MockServer;

pub fn make_token(payload: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{}.{}.signature", header, body)
}

/// Token for `sub` expiring `secs` from now (negative for already expired)
pub fn token_expiring_in(sub: &str, secs: i64) -> String {
    make_token(json!({"exp": Utc::now().timestamp() + secs, "sub": sub}))
}

pub fn config_for(server: &MockServer) -> Config {
    Config::default().with_origin(server.uri())
}

pub fn empty_store() -> Arc<dyn TokenStore> {
    Arc::new(MemoryTokenStore::new())
}

pub fn store_with(token: &str) -> Arc<dyn TokenStore> {
    Arc::new(MemoryTokenStore::with_token(token))
}
