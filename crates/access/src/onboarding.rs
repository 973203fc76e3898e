//! Tenant Onboarding
//!
//! Signup creates the church, links the owner's profile to it and opens an
//! Enterprise trial. The first two steps run in one transaction and must
//! succeed. The trial is best-effort: when it cannot be created the church is
//! left without a subscription and the route guard sends it to billing.

use chrono::{Days, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AccessError, AccessResult};
use crate::plans::PlanTier;

/// Trial length when none is configured
pub const DEFAULT_TRIAL_DAYS: u32 = 14;

/// Longest church name accepted
const MAX_CHURCH_NAME_LEN: usize = 120;

/// Reason reported to the caller when the trial insert fails; details stay in the log
pub const TRIAL_FAILED_REASON: &str = "Trial subscription could not be created";

/// Input for [`OnboardingService::register_church`]
#[derive(Debug, Clone)]
pub struct ChurchRegistration {
    pub user_id: Uuid,
    pub owner_name: String,
    pub owner_email: Option<String>,
    /// Defaults to `Igreja de <first name>` when blank
    pub church_name: Option<String>,
}

/// What happened to the trial subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum TrialOutcome {
    Created {
        subscription_id: Uuid,
        plan: PlanTier,
        expires_on: NaiveDate,
    },
    /// Trials are switched off (zero trial days)
    Disabled,
    /// No active plan named like the trial tier
    PlanUnavailable,
    Failed { reason: String },
}

impl TrialOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OnboardingReport {
    pub igreja_id: Uuid,
    pub church_name: String,
    pub trial: TrialOutcome,
}

/// Church name to use for a registration
pub fn church_name_for(owner_name: &str, requested: Option<&str>) -> AccessResult<String> {
    if let Some(name) = requested.map(str::trim).filter(|n| !n.is_empty()) {
        if name.chars().count() > MAX_CHURCH_NAME_LEN {
            return Err(AccessError::InvalidInput(format!(
                "Church name must be at most {} characters",
                MAX_CHURCH_NAME_LEN
            )));
        }
        return Ok(name.to_string());
    }

    let first_name = owner_name
        .split_whitespace()
        .next()
        .ok_or_else(|| AccessError::InvalidInput("Owner name is required".to_string()))?;
    Ok(format!("Igreja de {}", first_name))
}

/// Last day of a trial started on `start`
pub fn trial_expiration(start: NaiveDate, trial_days: u32) -> Option<NaiveDate> {
    start.checked_add_days(Days::new(u64::from(trial_days)))
}

pub struct OnboardingService {
    pool: PgPool,
    trial_days: u32,
}

impl OnboardingService {
    pub fn new(pool: PgPool) -> Self {
        Self::with_trial_days(pool, DEFAULT_TRIAL_DAYS)
    }

    pub fn with_trial_days(pool: PgPool, trial_days: u32) -> Self {
        Self { pool, trial_days }
    }

    /// Create the church and link its owner, then try to open the trial
    pub async fn register_church(
        &self,
        registration: ChurchRegistration,
    ) -> AccessResult<OnboardingReport> {
        let church_name = church_name_for(
            &registration.owner_name,
            registration.church_name.as_deref(),
        )?;

        let mut tx = self.pool.begin().await?;

        let existing: Option<(Option<Uuid>,)> =
            sqlx::query_as("SELECT igreja_id FROM perfis WHERE id = $1 FOR UPDATE")
                .bind(registration.user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if let Some((Some(current),)) = existing {
            return Err(AccessError::Conflict(format!(
                "User already belongs to church {}",
                current
            )));
        }

        let (igreja_id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO igrejas (nome, email_principal)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(&church_name)
        .bind(registration.owner_email.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO perfis (id, nome, email, role, igreja_id)
            VALUES ($1, $2, $3, 'admin_igreja', $4)
            ON CONFLICT (id) DO UPDATE SET igreja_id = EXCLUDED.igreja_id
            "#,
        )
        .bind(registration.user_id)
        .bind(&registration.owner_name)
        .bind(registration.owner_email.as_deref())
        .bind(igreja_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            igreja_id = %igreja_id,
            user_id = %registration.user_id,
            "Church registered"
        );

        let trial = self.start_trial(igreja_id).await;

        Ok(OnboardingReport {
            igreja_id,
            church_name,
            trial,
        })
    }

    async fn start_trial(&self, igreja_id: Uuid) -> TrialOutcome {
        if self.trial_days == 0 {
            return TrialOutcome::Disabled;
        }

        match self.create_trial_subscription(igreja_id).await {
            Ok(outcome) => {
                if let TrialOutcome::PlanUnavailable = outcome {
                    tracing::warn!(
                        igreja_id = %igreja_id,
                        plan = PlanTier::Enterprise.display_name(),
                        "Trial plan not found, church left without subscription"
                    );
                }
                outcome
            }
            Err(e) => {
                tracing::warn!(
                    igreja_id = %igreja_id,
                    error = %e,
                    "Failed to create trial subscription"
                );
                TrialOutcome::Failed {
                    reason: TRIAL_FAILED_REASON.to_string(),
                }
            }
        }
    }

    async fn create_trial_subscription(&self, igreja_id: Uuid) -> AccessResult<TrialOutcome> {
        let plan = PlanTier::Enterprise;
        let plano: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM planos WHERE nome = $1 AND COALESCE(ativo, true) LIMIT 1",
        )
        .bind(plan.display_name())
        .fetch_optional(&self.pool)
        .await?;

        let Some((plano_id,)) = plano else {
            return Ok(TrialOutcome::PlanUnavailable);
        };

        let today = Utc::now().date_naive();
        let expires_on = trial_expiration(today, self.trial_days)
            .ok_or_else(|| AccessError::Internal("Trial end date out of range".to_string()))?;

        let (subscription_id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO assinaturas
                (igreja_id, plano_id, status, data_inicio, data_expiracao, renovacao_automatica)
            VALUES ($1, $2, 'ativa', $3, $4, false)
            RETURNING id
            "#,
        )
        .bind(igreja_id)
        .bind(plano_id)
        .bind(today)
        .bind(expires_on)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            igreja_id = %igreja_id,
            subscription_id = %subscription_id,
            %expires_on,
            "Trial subscription created"
        );

        Ok(TrialOutcome::Created {
            subscription_id,
            plan,
            expires_on,
        })
    }
}
