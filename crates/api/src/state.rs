//! Shared application state

use std::sync::Arc;

use igrejas_access::{OnboardingService, ProfileService, RouteGuard, SaasAdminService};
use sqlx::PgPool;

use crate::{auth::SupabaseVerifier, config::Config};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub verifier: SupabaseVerifier,
    pub guard: RouteGuard,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let verifier = SupabaseVerifier::new(&config.supabase_jwt_secret);
        Self {
            pool,
            config: Arc::new(config),
            verifier,
            guard: RouteGuard::default(),
        }
    }

    pub fn profiles(&self) -> ProfileService {
        ProfileService::new(self.pool.clone())
    }

    pub fn onboarding(&self) -> OnboardingService {
        OnboardingService::with_trial_days(self.pool.clone(), self.config.trial_days)
    }

    pub fn saas_admin(&self) -> SaasAdminService {
        SaasAdminService::new(self.pool.clone())
    }
}
