//! Public plan catalog lookups

use axum::{extract::Path, Json};
use igrejas_access::{
    can_access, granted_features, minimum_tier_for, plan_catalog, PlanSummary, PlanTier,
};
use igrejas_shared::types::Feature;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Serialize)]
pub struct PlanFeaturesResponse {
    /// Identifier as requested
    pub plan_id: String,
    /// Tier actually applied (unknown identifiers resolve to the lowest tier)
    pub tier: PlanTier,
    pub features: &'static [Feature],
}

#[derive(Debug, Serialize)]
pub struct FeatureAccessResponse {
    pub plan_id: String,
    pub feature: Feature,
    pub allowed: bool,
    pub required_tier: Option<PlanTier>,
}

pub async fn list_plans() -> Json<Vec<PlanSummary>> {
    Json(plan_catalog())
}

pub async fn plan_features(Path(plan_id): Path<String>) -> Json<PlanFeaturesResponse> {
    Json(PlanFeaturesResponse {
        tier: PlanTier::resolve(Some(&plan_id)),
        features: granted_features(Some(&plan_id)),
        plan_id,
    })
}

pub async fn feature_access(
    Path((plan_id, feature)): Path<(String, String)>,
) -> ApiResult<Json<FeatureAccessResponse>> {
    let feature: Feature = feature.parse().map_err(ApiError::BadRequest)?;

    Ok(Json(FeatureAccessResponse {
        allowed: can_access(Some(&plan_id), feature),
        required_tier: minimum_tier_for(feature),
        plan_id,
        feature,
    }))
}
