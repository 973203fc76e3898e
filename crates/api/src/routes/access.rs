//! Session, navigation and route guard endpoints

use axum::{extract::State, Extension, Json};
use igrejas_access::{
    navigation_for, DisplayPreference, GuardOutcome, Navigation, PlanTier, TeamUsage, ViewMode,
};
use igrejas_shared::types::{Feature, User};
use serde::{Deserialize, Serialize};

use crate::{
    auth::AuthSession,
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub view: ViewMode,
    pub home: &'static str,
    pub plan: PlanTier,
    pub features: &'static [Feature],
    pub team_limit: u32,
}

#[derive(Debug, Serialize)]
pub struct SwitchViewResponse {
    pub view: ViewMode,
    pub home: &'static str,
    /// Preference the client should persist on the device
    pub preference: DisplayPreference,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub path: String,
    #[serde(flatten)]
    pub outcome: GuardOutcome,
    /// Where the client should go, absent when it stays on `path`
    pub redirect_to: Option<&'static str>,
}

pub async fn get_session(
    Extension(AuthSession(session)): Extension<AuthSession>,
) -> Json<SessionResponse> {
    let plan = PlanTier::resolve(session.user.plan_id());
    Json(SessionResponse {
        home: session.view.home_path(),
        view: session.view,
        plan,
        features: plan.features(),
        team_limit: plan.team_limit(),
        user: session.user,
    })
}

pub async fn switch_view(
    Extension(AuthSession(mut session)): Extension<AuthSession>,
) -> ApiResult<Json<SwitchViewResponse>> {
    let preference = session.switch_view().ok_or(ApiError::Forbidden)?;
    Ok(Json(SwitchViewResponse {
        view: session.view,
        home: session.view.home_path(),
        preference,
    }))
}

/// Team size of the user's church against its plan limit
pub async fn get_team(
    State(state): State<AppState>,
    Extension(AuthSession(session)): Extension<AuthSession>,
) -> ApiResult<Json<TeamUsage>> {
    let igreja_id = session.user.igreja_id.ok_or(ApiError::NotFound)?;
    let members = state.profiles().count_team(igreja_id).await?;
    Ok(Json(TeamUsage::new(session.user.plan_id(), members)))
}

pub async fn get_navigation(
    Extension(AuthSession(session)): Extension<AuthSession>,
) -> Json<Navigation> {
    Json(navigation_for(&session.user, session.view))
}

pub async fn evaluate_route(
    State(state): State<AppState>,
    Extension(AuthSession(session)): Extension<AuthSession>,
    Json(req): Json<EvaluateRequest>,
) -> Json<EvaluateResponse> {
    let outcome = state
        .guard
        .navigate(Some(&session.user), session.view, &req.path);

    Json(EvaluateResponse {
        path: req.path,
        redirect_to: outcome.target_path(),
        outcome,
    })
}
