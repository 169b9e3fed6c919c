//! REST API adapter for the TechFlow backend.
//!
//! This module provides the `HttpClient` used by every domain service.
//! It attaches the current bearer credential to outbound requests and
//! normalizes failures into `ApiError`: non-2xx responses keep their
//! status code and server message, network-level failures are reported
//! as a distinct kind. The adapter never retries and never mutates
//! session state - a 401 is surfaced to the caller like any other
//! server error.

pub mod client;
pub mod error;

pub use client::HttpClient;
pub use error::{ApiError, ApiResult};
