//! Authentication middleware
//!
//! `require_auth` verifies the bearer token, resolves the session from the
//! profile tables and stores it as a request extension. `require_super_admin`
//! runs after it on SaaS routes.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
    Extension,
};
use igrejas_access::{is_authorized_super_admin, DisplayPreference, Session};

use crate::{error::ApiError, state::AppState};

/// Header carrying the device's display preference (`super_admin` or a church role)
pub const PREFERRED_ROLE_HEADER: &str = "x-preferred-role";

/// Session of the authenticated caller
#[derive(Debug, Clone)]
pub struct AuthSession(pub Session);

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn display_preference(headers: &HeaderMap) -> DisplayPreference {
    DisplayPreference::from_stored(
        headers
            .get(PREFERRED_ROLE_HEADER)
            .and_then(|h| h.to_str().ok()),
    )
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers()).ok_or(ApiError::Unauthorized)?;

    let identity = state.verifier.verify_identity(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        ApiError::InvalidToken
    })?;

    let preference = display_preference(req.headers());
    let session = state.profiles().load_session(identity, preference).await?;

    req.extensions_mut().insert(AuthSession(session));
    Ok(next.run(req).await)
}

/// Allow-list gate for SaaS console routes
pub async fn require_super_admin(
    Extension(AuthSession(session)): Extension<AuthSession>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !is_authorized_super_admin(&session.user) {
        tracing::warn!(
            user_id = %session.user.id,
            role = %session.user.role,
            "Super admin route denied"
        );
        return Err(ApiError::Forbidden);
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use igrejas_shared::types::UserRole;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_display_preference_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(display_preference(&headers).preferred_role, None);

        headers.insert(PREFERRED_ROLE_HEADER, HeaderValue::from_static("admin_igreja"));
        assert_eq!(
            display_preference(&headers).preferred_role,
            Some(UserRole::AdminIgreja)
        );
    }
}
