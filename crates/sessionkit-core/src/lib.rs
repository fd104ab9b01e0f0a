//! Core library for sessionkit - token store, request decoration, auth state.
//!
//! A client holds one bearer credential in a [`TokenStore`], decides whether
//! the session is valid from the credential's own `exp` claim, attaches it
//! to outbound requests through [`HttpClient`], and republishes the
//! authenticated/profile [`Snapshot`] to subscribers after every sign-in or
//! sign-out.
//!
//! Credentials are decoded without signature verification. That is only
//! safe because the server validates the token on every protected request;
//! nothing here should be treated as proof of identity.

pub mod api;
pub mod auth;
pub mod config;
pub mod session;

pub use api::{ApiError, HttpClient, HttpError};
pub use auth::{
    AuthGateway, Claims, DecodeError, FileTokenStore, KeyringTokenStore, LoginResult, MemoryTokenStore,
    StoreError, TokenStore,
};
pub use config::Config;
pub use session::{RouteDecision, RouteGuard, RouteTarget, SessionBroadcaster, Snapshot, Subscription};
