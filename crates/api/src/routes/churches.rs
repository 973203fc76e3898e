//! Church onboarding

use axum::{extract::State, http::StatusCode, Extension, Json};
use igrejas_access::{ChurchRegistration, OnboardingReport};
use serde::Deserialize;

use crate::{
    auth::AuthSession,
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateChurchRequest {
    /// Defaults to `Igreja de <first name>`
    pub nome: Option<String>,
}

/// Register the caller's church and open its trial
pub async fn create_church(
    State(state): State<AppState>,
    Extension(AuthSession(session)): Extension<AuthSession>,
    Json(req): Json<CreateChurchRequest>,
) -> ApiResult<(StatusCode, Json<OnboardingReport>)> {
    if !state.config.enable_signup {
        return Err(ApiError::SignupDisabled);
    }
    if session.user.igreja_id.is_some() {
        return Err(ApiError::Conflict(
            "User already belongs to a church".to_string(),
        ));
    }

    let user = session.user;
    let report = state
        .onboarding()
        .register_church(ChurchRegistration {
            user_id: user.id,
            owner_name: user.name,
            owner_email: Some(user.email).filter(|e| !e.is_empty()),
            church_name: req.nome,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(report)))
}
