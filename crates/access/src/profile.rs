//! Profile and subscription loading
//!
//! Reads the rows session resolution needs. A missing profile or subscription
//! is a normal state (fresh signups, churches that never subscribed), so both
//! loaders return `Option`.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AccessResult;
use crate::session::{
    DisplayPreference, ProfileRecord, Session, SubscriptionRecord, VerifiedIdentity,
};

pub struct ProfileService {
    pool: PgPool,
}

impl ProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the `perfis` row for a user
    pub async fn load_profile(&self, user_id: Uuid) -> AccessResult<Option<ProfileRecord>> {
        let profile: Option<ProfileRecord> = sqlx::query_as(
            r#"
            SELECT id, nome, email, avatar_url, role, igreja_id
            FROM perfis
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Latest subscription of a church, with its plan name
    pub async fn load_subscription(
        &self,
        igreja_id: Uuid,
    ) -> AccessResult<Option<SubscriptionRecord>> {
        let subscription: Option<SubscriptionRecord> = sqlx::query_as(
            r#"
            SELECT
                a.id,
                a.igreja_id,
                p.nome AS plano_nome,
                a.status,
                a.data_inicio::date AS data_inicio,
                a.data_expiracao::date AS data_expiracao
            FROM assinaturas a
            LEFT JOIN planos p ON p.id = a.plano_id
            WHERE a.igreja_id = $1
            ORDER BY a.created_at DESC
            LIMIT 1
            "#,
        )
        .bind(igreja_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscription)
    }

    /// Number of profiles linked to a church
    pub async fn count_team(&self, igreja_id: Uuid) -> AccessResult<u64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM perfis WHERE igreja_id = $1")
                .bind(igreja_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Resolve the full session for a verified identity
    pub async fn load_session(
        &self,
        identity: VerifiedIdentity,
        preference: DisplayPreference,
    ) -> AccessResult<Session> {
        let profile = self.load_profile(identity.user_id).await?;

        // Church link from `perfis` only; token metadata is user-editable
        let igreja_id = profile.as_ref().and_then(|p| p.igreja_id);
        let subscription = match igreja_id {
            Some(id) => self.load_subscription(id).await?,
            None => None,
        };

        Ok(Session::resolve(identity, profile, subscription, preference))
    }
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for ProfileRecord {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Self {
            id: row.try_get("id")?,
            nome: row.try_get("nome")?,
            email: row.try_get("email")?,
            avatar_url: row.try_get("avatar_url")?,
            role: row.try_get("role")?,
            igreja_id: row.try_get("igreja_id")?,
        })
    }
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for SubscriptionRecord {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Self {
            id: row.try_get("id")?,
            igreja_id: row.try_get("igreja_id")?,
            plano_nome: row.try_get("plano_nome")?,
            status: row.try_get("status")?,
            data_inicio: row.try_get("data_inicio")?,
            data_expiracao: row.try_get("data_expiracao")?,
        })
    }
}
