//! Error types shared across igrejas crates

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IgrejasError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
