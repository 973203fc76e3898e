//! SaaS console endpoints (super admin only)
//!
//! The allow-list gate runs as a route layer in front of every handler here.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use igrejas_access::{admin::filter_churches, SaasOverview, UpgradeDecision};
use igrejas_shared::{
    church_clients_csv, church_report_filename,
    types::{
        ChurchClient, PendingSubscription, SaasPlan, SaasPlanInput, SubscriptionStatus,
        UpgradeRequest, UpgradeRequestStatus,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{auth::AuthSession, error::ApiResult, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct ChurchListQuery {
    /// Case-insensitive church name filter
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: SubscriptionStatus,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse<S> {
    pub id: Uuid,
    pub status: S,
}

pub async fn overview(State(state): State<AppState>) -> ApiResult<Json<SaasOverview>> {
    let today = Utc::now().date_naive();
    Ok(Json(state.saas_admin().overview(today).await?))
}

async fn filtered_churches(
    state: &AppState,
    query: &ChurchListQuery,
) -> ApiResult<Vec<ChurchClient>> {
    let churches = state.saas_admin().list_churches().await?;
    Ok(match query.q.as_deref() {
        Some(q) => filter_churches(&churches, q).into_iter().cloned().collect(),
        None => churches,
    })
}

pub async fn list_churches(
    State(state): State<AppState>,
    Query(query): Query<ChurchListQuery>,
) -> ApiResult<Json<Vec<ChurchClient>>> {
    Ok(Json(filtered_churches(&state, &query).await?))
}

/// CSV download of the church client report
pub async fn export_churches(
    State(state): State<AppState>,
    Extension(AuthSession(session)): Extension<AuthSession>,
    Query(query): Query<ChurchListQuery>,
) -> ApiResult<Response> {
    let churches = filtered_churches(&state, &query).await?;
    let filename = church_report_filename(Utc::now().date_naive());

    tracing::info!(
        user_id = %session.user.id,
        rows = churches.len(),
        "Church report exported"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        church_clients_csv(&churches),
    )
        .into_response())
}

pub async fn toggle_church_status(
    State(state): State<AppState>,
    Path(igreja_id): Path<Uuid>,
) -> ApiResult<Json<StatusResponse<SubscriptionStatus>>> {
    let status = state.saas_admin().toggle_church_status(igreja_id).await?;
    Ok(Json(StatusResponse {
        id: igreja_id,
        status,
    }))
}

pub async fn list_saas_plans(State(state): State<AppState>) -> ApiResult<Json<Vec<SaasPlan>>> {
    Ok(Json(state.saas_admin().list_plans().await?))
}

pub async fn create_saas_plan(
    State(state): State<AppState>,
    Json(input): Json<SaasPlanInput>,
) -> ApiResult<(StatusCode, Json<SaasPlan>)> {
    let plan = state.saas_admin().create_plan(input).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn update_saas_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Json(input): Json<SaasPlanInput>,
) -> ApiResult<Json<SaasPlan>> {
    Ok(Json(state.saas_admin().update_plan(plan_id, input).await?))
}

pub async fn list_upgrades(State(state): State<AppState>) -> ApiResult<Json<Vec<UpgradeRequest>>> {
    Ok(Json(state.saas_admin().list_upgrade_requests().await?))
}

async fn decide(
    state: &AppState,
    request_id: Uuid,
    decision: UpgradeDecision,
) -> ApiResult<Json<StatusResponse<UpgradeRequestStatus>>> {
    let status = state
        .saas_admin()
        .decide_upgrade(request_id, decision)
        .await?;
    Ok(Json(StatusResponse {
        id: request_id,
        status,
    }))
}

pub async fn approve_upgrade(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> ApiResult<Json<StatusResponse<UpgradeRequestStatus>>> {
    decide(&state, request_id, UpgradeDecision::Approve).await
}

pub async fn decline_upgrade(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> ApiResult<Json<StatusResponse<UpgradeRequestStatus>>> {
    decide(&state, request_id, UpgradeDecision::Decline).await
}

pub async fn list_pending_subscriptions(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PendingSubscription>>> {
    Ok(Json(state.saas_admin().list_pending_subscriptions().await?))
}

pub async fn set_subscription_status(
    State(state): State<AppState>,
    Path(subscription_id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> ApiResult<Json<StatusResponse<SubscriptionStatus>>> {
    state
        .saas_admin()
        .set_subscription_status(subscription_id, req.status)
        .await?;
    Ok(Json(StatusResponse {
        id: subscription_id,
        status: req.status,
    }))
}
