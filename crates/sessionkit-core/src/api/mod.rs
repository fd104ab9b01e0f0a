//! REST client module for the session's API.
//!
//! This module provides the `HttpClient` that decorates outbound requests
//! with the stored bearer token and normalizes failures into `ApiError`.

pub mod client;
pub mod error;

pub use client::HttpClient;
pub use error::{ApiError, HttpError};
