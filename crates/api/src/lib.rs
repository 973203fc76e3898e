//! igrejas API Library
//!
//! HTTP surface for the church management SaaS: plan lookups, session and
//! route guard decisions, onboarding and the super-admin console.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
