//! Authentication module for managing the bearer credential.
//!
//! This module provides:
//! - `TokenStore`: the persisted credential slot (memory, keychain, file)
//! - `claims`: credential decoding and validity checks
//! - `AuthGateway`: login and logout against the configured endpoint
//!
//! Tokens are never proactively cleared when they expire; validity is
//! re-evaluated on every check.

pub mod claims;
pub mod gateway;
pub mod store;

pub use claims::{Claims, DecodeError};
pub use gateway::{AuthGateway, LoginResult};
pub use store::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, StoreError, TokenStore};
