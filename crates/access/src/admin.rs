//! SaaS Administration
//!
//! Super-admin operations across tenants: church client report, plan catalog,
//! plan change requests and the subscription approval queue. Callers must check
//! [`crate::security::is_authorized_super_admin`] before using this service.

use chrono::{DateTime, NaiveDate, Utc};
use igrejas_shared::types::{
    ChurchClient, PendingSubscription, SaasPlan, SaasPlanInput, SubscriptionStatus,
    UpgradeRequest, UpgradeRequestStatus,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AccessError, AccessResult};
use crate::overview::{BilledSubscription, SaasOverview};

const NO_EMAIL: &str = "Sem e-mail";
const NO_PLAN: &str = "Nenhum";
const UNKNOWN_CHURCH: &str = "Igreja Desconhecida";
const UNKNOWN_PLAN: &str = "Desconhecido";
const NO_CURRENT_PLAN: &str = "Sem Plano";

/// `planos` columns in the shape [`SaasPlanRow`] reads
const PLAN_COLUMNS: &str = "id, nome, preco::float8 AS preco, limite_membros, \
    ARRAY(SELECT jsonb_array_elements_text(COALESCE(recursos, '[]'::jsonb))) AS recursos, \
    COALESCE(ativo, true) AS ativo";

/// Decision on a plan change request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeDecision {
    Approve,
    Decline,
}

impl UpgradeDecision {
    pub fn resulting_status(&self) -> UpgradeRequestStatus {
        match self {
            Self::Approve => UpgradeRequestStatus::Aprovado,
            Self::Decline => UpgradeRequestStatus::Recusado,
        }
    }
}

/// Statuses a super admin may set on a subscription directly
pub fn check_admin_status(status: SubscriptionStatus) -> AccessResult<SubscriptionStatus> {
    match status {
        SubscriptionStatus::Ativa
        | SubscriptionStatus::Cancelada
        | SubscriptionStatus::Bloqueada => Ok(status),
        other => Err(AccessError::InvalidInput(format!(
            "Subscription status cannot be set to {}",
            other
        ))),
    }
}

/// Status the church list toggle moves to
pub fn toggled_status(current: SubscriptionStatus) -> SubscriptionStatus {
    if current.is_active() {
        SubscriptionStatus::Bloqueada
    } else {
        SubscriptionStatus::Ativa
    }
}

/// Case-insensitive church name filter used by the client list
pub fn filter_churches<'a>(churches: &'a [ChurchClient], query: &str) -> Vec<&'a ChurchClient> {
    let query = query.trim().to_lowercase();
    churches
        .iter()
        .filter(|c| query.is_empty() || c.nome.to_lowercase().contains(&query))
        .collect()
}

pub struct SaasAdminService {
    pool: PgPool,
}

impl SaasAdminService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Overview
    // =========================================================================

    /// Dashboard figures as of `today`
    pub async fn overview(&self, today: NaiveDate) -> AccessResult<SaasOverview> {
        let (total_churches,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM igrejas")
            .fetch_one(&self.pool)
            .await?;

        let (pending_upgrades,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM solicitacoes_upgrade WHERE status = 'pendente'",
        )
        .fetch_one(&self.pool)
        .await?;

        let rows: Vec<BilledSubscriptionRow> = sqlx::query_as(
            r#"
            SELECT
                a.status,
                p.nome AS plano_nome,
                COALESCE(p.preco, 0)::float8 AS preco,
                COALESCE(a.data_inicio::date, a.created_at::date) AS started_on,
                a.data_expiracao::date AS expires_on
            FROM assinaturas a
            LEFT JOIN planos p ON p.id = a.plano_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let subscriptions: Vec<BilledSubscription> = rows
            .into_iter()
            .map(BilledSubscriptionRow::into_billed)
            .collect();

        tracing::debug!(
            churches = total_churches,
            subscriptions = subscriptions.len(),
            "SaaS overview computed"
        );
        Ok(SaasOverview::build(
            total_churches,
            pending_upgrades,
            &subscriptions,
            today,
        ))
    }

    // =========================================================================
    // Church clients
    // =========================================================================

    /// All churches with their latest subscription and member count
    pub async fn list_churches(&self) -> AccessResult<Vec<ChurchClient>> {
        let rows: Vec<ChurchClientRow> = sqlx::query_as(
            r#"
            SELECT
                i.id,
                i.nome,
                i.email_principal,
                s.plano_nome,
                s.status,
                s.data_expiracao,
                (SELECT COUNT(*) FROM membros m WHERE m.igreja_id = i.id) AS membros_atuais
            FROM igrejas i
            LEFT JOIN LATERAL (
                SELECT p.nome AS plano_nome, a.status, a.data_expiracao::date AS data_expiracao
                FROM assinaturas a
                LEFT JOIN planos p ON p.id = a.plano_id
                WHERE a.igreja_id = i.id
                ORDER BY a.created_at DESC
                LIMIT 1
            ) s ON true
            ORDER BY i.nome
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ChurchClientRow::into_client).collect())
    }

    /// Flip a church's subscription between `ativa` and `bloqueada`
    pub async fn toggle_church_status(&self, igreja_id: Uuid) -> AccessResult<SubscriptionStatus> {
        let current: Option<(Option<String>,)> = sqlx::query_as(
            r#"
            SELECT status FROM assinaturas
            WHERE igreja_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(igreja_id)
        .fetch_optional(&self.pool)
        .await?;

        let (status,) = current.ok_or_else(|| {
            AccessError::NotFound(format!("Church {} has no subscription", igreja_id))
        })?;
        let next = toggled_status(
            status
                .as_deref()
                .map(SubscriptionStatus::from_str_lossy)
                .unwrap_or_default(),
        );

        sqlx::query("UPDATE assinaturas SET status = $1 WHERE igreja_id = $2")
            .bind(next.as_str())
            .bind(igreja_id)
            .execute(&self.pool)
            .await?;

        tracing::info!(igreja_id = %igreja_id, status = %next, "Church status toggled");
        Ok(next)
    }

    // =========================================================================
    // Plan catalog
    // =========================================================================

    /// Priced plans, cheapest first
    pub async fn list_plans(&self) -> AccessResult<Vec<SaasPlan>> {
        let plans: Vec<SaasPlanRow> = sqlx::query_as(&format!(
            "SELECT {} FROM planos ORDER BY preco, nome",
            PLAN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(plans.into_iter().map(|row| row.0).collect())
    }

    pub async fn create_plan(&self, input: SaasPlanInput) -> AccessResult<SaasPlan> {
        let input = input.normalized()?;

        let row: SaasPlanRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO planos (nome, preco, limite_membros, recursos, ativo)
            VALUES ($1, $2::numeric, $3, to_jsonb($4::text[]), $5)
            RETURNING {}
            "#,
            PLAN_COLUMNS
        ))
        .bind(&input.nome)
        .bind(input.preco)
        .bind(input.limite_membros)
        .bind(&input.recursos)
        .bind(input.ativo)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(plano_id = %row.0.id, nome = %row.0.nome, "Plan created");
        Ok(row.0)
    }

    pub async fn update_plan(
        &self,
        plano_id: Uuid,
        input: SaasPlanInput,
    ) -> AccessResult<SaasPlan> {
        let input = input.normalized()?;

        let row: Option<SaasPlanRow> = sqlx::query_as(&format!(
            r#"
            UPDATE planos
            SET nome = $2,
                preco = $3::numeric,
                limite_membros = $4,
                recursos = to_jsonb($5::text[]),
                ativo = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PLAN_COLUMNS
        ))
        .bind(plano_id)
        .bind(&input.nome)
        .bind(input.preco)
        .bind(input.limite_membros)
        .bind(&input.recursos)
        .bind(input.ativo)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| AccessError::NotFound(format!("Plan {} not found", plano_id)))?;
        tracing::info!(plano_id = %plano_id, ativo = row.0.ativo, "Plan updated");
        Ok(row.0)
    }

    // =========================================================================
    // Upgrade requests
    // =========================================================================

    /// Plan change requests, newest first
    pub async fn list_upgrade_requests(&self) -> AccessResult<Vec<UpgradeRequest>> {
        let rows: Vec<UpgradeRequestRow> = sqlx::query_as(
            r#"
            SELECT
                r.id,
                r.igreja_id,
                r.status,
                r.created_at,
                r.plano_solicitado_id,
                i.nome AS igreja_nome,
                pa.nome AS plano_atual_nome,
                ps.nome AS plano_solicitado_nome
            FROM solicitacoes_upgrade r
            LEFT JOIN igrejas i ON i.id = r.igreja_id
            LEFT JOIN planos pa ON pa.id = r.plano_atual_id
            LEFT JOIN planos ps ON ps.id = r.plano_solicitado_id
            ORDER BY r.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UpgradeRequestRow::into_request).collect())
    }

    /// Approve or decline a pending request.
    ///
    /// Approval also moves the church's subscription to the requested plan,
    /// in the same transaction.
    pub async fn decide_upgrade(
        &self,
        request_id: Uuid,
        decision: UpgradeDecision,
    ) -> AccessResult<UpgradeRequestStatus> {
        let mut tx = self.pool.begin().await?;

        let request: Option<(Uuid, Uuid, String)> = sqlx::query_as(
            r#"
            SELECT igreja_id, plano_solicitado_id, status
            FROM solicitacoes_upgrade
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (igreja_id, plano_solicitado_id, status) = request.ok_or_else(|| {
            AccessError::NotFound(format!("Upgrade request {} not found", request_id))
        })?;

        if status.parse::<UpgradeRequestStatus>().ok() != Some(UpgradeRequestStatus::Pendente) {
            return Err(AccessError::Conflict(format!(
                "Upgrade request {} is already {}",
                request_id, status
            )));
        }

        let new_status = decision.resulting_status();
        sqlx::query("UPDATE solicitacoes_upgrade SET status = $1 WHERE id = $2")
            .bind(new_status.as_str())
            .bind(request_id)
            .execute(&mut *tx)
            .await?;

        if decision == UpgradeDecision::Approve {
            let updated = sqlx::query("UPDATE assinaturas SET plano_id = $1 WHERE igreja_id = $2")
                .bind(plano_solicitado_id)
                .bind(igreja_id)
                .execute(&mut *tx)
                .await?;

            if updated.rows_affected() == 0 {
                return Err(AccessError::Conflict(format!(
                    "Church {} has no subscription to upgrade",
                    igreja_id
                )));
            }
        }

        tx.commit().await?;

        tracing::info!(
            request_id = %request_id,
            igreja_id = %igreja_id,
            status = %new_status,
            "Upgrade request decided"
        );
        Ok(new_status)
    }

    // =========================================================================
    // Subscription approvals
    // =========================================================================

    /// Subscriptions waiting for approval or unblocking, newest first
    pub async fn list_pending_subscriptions(&self) -> AccessResult<Vec<PendingSubscription>> {
        let rows: Vec<PendingSubscriptionRow> = sqlx::query_as(
            r#"
            SELECT
                a.id,
                a.status,
                a.created_at,
                p.nome AS plano_nome,
                i.nome AS igreja_nome,
                i.email_principal AS igreja_email
            FROM assinaturas a
            LEFT JOIN planos p ON p.id = a.plano_id
            LEFT JOIN igrejas i ON i.id = a.igreja_id
            WHERE a.status IN ('pendente', 'bloqueada')
            ORDER BY a.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(PendingSubscriptionRow::into_pending)
            .collect())
    }

    /// Approve (`ativa`), reject (`cancelada`) or block (`bloqueada`)
    pub async fn set_subscription_status(
        &self,
        subscription_id: Uuid,
        status: SubscriptionStatus,
    ) -> AccessResult<()> {
        let status = check_admin_status(status)?;

        let result = sqlx::query("UPDATE assinaturas SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(subscription_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AccessError::NotFound(format!(
                "Subscription {} not found",
                subscription_id
            )));
        }

        tracing::info!(
            subscription_id = %subscription_id,
            status = %status,
            "Subscription status set"
        );
        Ok(())
    }
}

// =============================================================================
// Rows
// =============================================================================

struct SaasPlanRow(SaasPlan);

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for SaasPlanRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Self(SaasPlan {
            id: row.try_get("id")?,
            nome: row.try_get("nome")?,
            preco: row.try_get("preco")?,
            limite_membros: row.try_get("limite_membros")?,
            recursos: row.try_get("recursos")?,
            ativo: row.try_get("ativo")?,
        }))
    }
}

struct ChurchClientRow {
    id: Uuid,
    nome: String,
    email_principal: Option<String>,
    plano_nome: Option<String>,
    status: Option<String>,
    data_expiracao: Option<NaiveDate>,
    membros_atuais: i64,
}

impl ChurchClientRow {
    fn into_client(self) -> ChurchClient {
        ChurchClient {
            id: self.id,
            nome: self.nome,
            email_admin: self
                .email_principal
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| NO_EMAIL.to_string()),
            plano_nome: self.plano_nome.unwrap_or_else(|| NO_PLAN.to_string()),
            status: self
                .status
                .as_deref()
                .map(SubscriptionStatus::from_str_lossy)
                .unwrap_or_default(),
            data_expiracao: self.data_expiracao,
            membros_atuais: self.membros_atuais,
        }
    }
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for ChurchClientRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Self {
            id: row.try_get("id")?,
            nome: row.try_get("nome")?,
            email_principal: row.try_get("email_principal")?,
            plano_nome: row.try_get("plano_nome")?,
            status: row.try_get("status")?,
            data_expiracao: row.try_get("data_expiracao")?,
            membros_atuais: row.try_get("membros_atuais")?,
        })
    }
}

struct UpgradeRequestRow {
    id: Uuid,
    igreja_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    plano_solicitado_id: Uuid,
    igreja_nome: Option<String>,
    plano_atual_nome: Option<String>,
    plano_solicitado_nome: Option<String>,
}

impl UpgradeRequestRow {
    fn into_request(self) -> UpgradeRequest {
        UpgradeRequest {
            id: self.id,
            igreja_id: self.igreja_id,
            igreja_nome: self
                .igreja_nome
                .unwrap_or_else(|| UNKNOWN_CHURCH.to_string()),
            plano_atual_nome: self
                .plano_atual_nome
                .unwrap_or_else(|| NO_CURRENT_PLAN.to_string()),
            plano_solicitado_id: self.plano_solicitado_id,
            plano_solicitado_nome: self
                .plano_solicitado_nome
                .unwrap_or_else(|| UNKNOWN_PLAN.to_string()),
            data_solicitacao: self.created_at,
            status: self.status.parse().unwrap_or(UpgradeRequestStatus::Pendente),
        }
    }
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for UpgradeRequestRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Self {
            id: row.try_get("id")?,
            igreja_id: row.try_get("igreja_id")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            plano_solicitado_id: row.try_get("plano_solicitado_id")?,
            igreja_nome: row.try_get("igreja_nome")?,
            plano_atual_nome: row.try_get("plano_atual_nome")?,
            plano_solicitado_nome: row.try_get("plano_solicitado_nome")?,
        })
    }
}

struct PendingSubscriptionRow {
    id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    plano_nome: Option<String>,
    igreja_nome: Option<String>,
    igreja_email: Option<String>,
}

impl PendingSubscriptionRow {
    fn into_pending(self) -> PendingSubscription {
        PendingSubscription {
            id: self.id,
            status: SubscriptionStatus::from_str_lossy(&self.status),
            plano_nome: self.plano_nome.unwrap_or_else(|| UNKNOWN_PLAN.to_string()),
            igreja_nome: self
                .igreja_nome
                .unwrap_or_else(|| UNKNOWN_CHURCH.to_string()),
            igreja_email: self.igreja_email,
            created_at: self.created_at,
        }
    }
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for PendingSubscriptionRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Self {
            id: row.try_get("id")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            plano_nome: row.try_get("plano_nome")?,
            igreja_nome: row.try_get("igreja_nome")?,
            igreja_email: row.try_get("igreja_email")?,
        })
    }
}

struct BilledSubscriptionRow {
    status: Option<String>,
    plano_nome: Option<String>,
    preco: f64,
    started_on: NaiveDate,
    expires_on: Option<NaiveDate>,
}

impl BilledSubscriptionRow {
    fn into_billed(self) -> BilledSubscription {
        BilledSubscription {
            status: self
                .status
                .as_deref()
                .map(SubscriptionStatus::from_str_lossy)
                .unwrap_or_default(),
            plano_nome: self.plano_nome,
            preco: self.preco,
            started_on: self.started_on,
            expires_on: self.expires_on,
        }
    }
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for BilledSubscriptionRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Self {
            status: row.try_get("status")?,
            plano_nome: row.try_get("plano_nome")?,
            preco: row.try_get("preco")?,
            started_on: row.try_get("started_on")?,
            expires_on: row.try_get("expires_on")?,
        })
    }
}
