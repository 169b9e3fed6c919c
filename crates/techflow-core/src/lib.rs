//! Core library for the TechFlow client.
//!
//! TechFlow is a project and task tracker; this crate is everything a
//! frontend needs short of rendering: the session store and route guard,
//! the HTTP adapter that carries the bearer credential, the per-resource
//! domain services, the wire models, and client configuration.
//!
//! The intended wiring, from the bottom up:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use techflow_core::api::HttpClient;
//! use techflow_core::config::Config;
//! use techflow_core::services::{AuthService, ProjectService};
//! use techflow_core::session::{KeychainStorage, RouteGuard, SessionStore};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let storage = KeychainStorage::new(Config::data_dir()?);
//! let session = Arc::new(SessionStore::new(Box::new(storage)));
//! session.initialize();
//!
//! let http = HttpClient::new(&config.resolved_base_url(), session.clone())?;
//! let auth = AuthService::new(http.clone());
//! let projects = ProjectService::new(http.clone());
//! let guard = RouteGuard::new(session.clone());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod models;
pub mod services;
pub mod session;

pub use api::{ApiError, ApiResult, HttpClient};
pub use config::Config;
pub use session::{RouteDecision, RouteGuard, SessionState, SessionStore};
