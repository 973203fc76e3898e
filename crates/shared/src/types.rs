//! Common types used across the igrejas platform

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::IgrejasError;

// =============================================================================
// Feature Catalog
// =============================================================================

/// Gateable capability (screen) identifier.
///
/// The set is closed: anything the frontend can navigate to is listed here.
/// The `Saas*` variants belong to the super-admin console and are never
/// granted by a church plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Dashboard,
    ChurchConfig,
    Members,
    Finances,
    FinanceTypes,
    Events,
    Billing,
    Analytics,
    Settings,
    AiAssistant,
    SaasDashboard,
    SaasChurches,
    SaasPlans,
    SaasUpgrades,
    SaasSettings,
}

impl Feature {
    pub const ALL: [Feature; 15] = [
        Feature::Dashboard,
        Feature::ChurchConfig,
        Feature::Members,
        Feature::Finances,
        Feature::FinanceTypes,
        Feature::Events,
        Feature::Billing,
        Feature::Analytics,
        Feature::Settings,
        Feature::AiAssistant,
        Feature::SaasDashboard,
        Feature::SaasChurches,
        Feature::SaasPlans,
        Feature::SaasUpgrades,
        Feature::SaasSettings,
    ];

    /// Wire name of the feature
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::ChurchConfig => "church_config",
            Self::Members => "members",
            Self::Finances => "finances",
            Self::FinanceTypes => "finance_types",
            Self::Events => "events",
            Self::Billing => "billing",
            Self::Analytics => "analytics",
            Self::Settings => "settings",
            Self::AiAssistant => "ai_assistant",
            Self::SaasDashboard => "saas_dashboard",
            Self::SaasChurches => "saas_churches",
            Self::SaasPlans => "saas_plans",
            Self::SaasUpgrades => "saas_upgrades",
            Self::SaasSettings => "saas_settings",
        }
    }

    /// Features that only exist inside the super-admin console
    pub fn is_super_admin_only(&self) -> bool {
        matches!(
            self,
            Self::SaasDashboard
                | Self::SaasChurches
                | Self::SaasPlans
                | Self::SaasUpgrades
                | Self::SaasSettings
        )
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Feature::ALL
            .iter()
            .copied()
            .find(|feature| feature.as_str() == wanted)
            .ok_or_else(|| format!("Invalid feature: {}", s))
    }
}

// =============================================================================
// Enums
// =============================================================================

/// Role claim attached to a user profile.
///
/// The role is stored in the hosted backend and can be adjusted by the client
/// for display purposes, so it is never sufficient on its own to grant
/// super-admin access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    AdminIgreja,
    MembroIgreja,
    Admin,
    Lider,
    Secretaria,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::AdminIgreja
    }
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::AdminIgreja => "admin_igreja",
            Self::MembroIgreja => "membro_igreja",
            Self::Admin => "admin",
            Self::Lider => "lider",
            Self::Secretaria => "secretaria",
        }
    }

    /// Parse a role from string (case insensitive).
    /// Unknown roles collapse to the least privileged church role.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "super_admin" => Self::SuperAdmin,
            "admin_igreja" => Self::AdminIgreja,
            "membro_igreja" | "user" | "membro" => Self::MembroIgreja,
            "admin" => Self::Admin,
            "lider" => Self::Lider,
            "secretaria" => Self::Secretaria,
            _ => Self::MembroIgreja,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription status as persisted in `assinaturas.status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Ativa,
    Pendente,
    Cancelada,
    Expirada,
    Bloqueada,
}

impl Default for SubscriptionStatus {
    fn default() -> Self {
        Self::Pendente
    }
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ativa => "ativa",
            Self::Pendente => "pendente",
            Self::Cancelada => "cancelada",
            Self::Expirada => "expirada",
            Self::Bloqueada => "bloqueada",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Ativa)
    }

    /// Statuses listed in the super-admin approval queue
    pub fn awaits_review(&self) -> bool {
        matches!(self, Self::Pendente | Self::Bloqueada)
    }

    /// Parse a status coming from the backend. Anything unrecognised is
    /// treated as `pendente`, which is never active.
    pub fn from_str_lossy(s: &str) -> Self {
        s.parse().unwrap_or(Self::Pendente)
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ativa" => Ok(Self::Ativa),
            "pendente" => Ok(Self::Pendente),
            "cancelada" => Ok(Self::Cancelada),
            "expirada" => Ok(Self::Expirada),
            "bloqueada" => Ok(Self::Bloqueada),
            _ => Err(format!("Invalid subscription status: {}", s)),
        }
    }
}

/// Status of a plan change request (`solicitacoes_upgrade.status`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeRequestStatus {
    Pendente,
    Aprovado,
    Recusado,
}

impl UpgradeRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pendente => "pendente",
            Self::Aprovado => "aprovado",
            Self::Recusado => "recusado",
        }
    }
}

impl std::fmt::Display for UpgradeRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UpgradeRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pendente" => Ok(Self::Pendente),
            "aprovado" => Ok(Self::Aprovado),
            "recusado" => Ok(Self::Recusado),
            _ => Err(format!("Invalid upgrade request status: {}", s)),
        }
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// A church's subscription, reduced to what access decisions need
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub igreja_id: Uuid,
    /// Plan key (`basico`, `profissional`, `enterprise`); unknown keys fall
    /// back to the lowest tier when checked
    pub plan_id: String,
    pub status: SubscriptionStatus,
    pub start_date: Option<NaiveDate>,
    pub renewal_date: Option<NaiveDate>,
}

/// Resolved user for the current session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub igreja_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub subscription: Option<Subscription>,
    /// Email is on the super-admin allow-list (computed at session load)
    pub is_whitelist: bool,
}

impl User {
    /// Plan key of the user's subscription, if any
    pub fn plan_id(&self) -> Option<&str> {
        self.subscription.as_ref().map(|s| s.plan_id.as_str())
    }

    /// Whether the user's subscription exists and is `ativa`
    pub fn has_active_subscription(&self) -> bool {
        self.subscription
            .as_ref()
            .map(|s| s.status.is_active())
            .unwrap_or(false)
    }
}

/// Row of the super-admin church client list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurchClient {
    pub id: Uuid,
    pub nome: String,
    pub email_admin: String,
    pub plano_nome: String,
    pub status: SubscriptionStatus,
    pub data_expiracao: Option<NaiveDate>,
    pub membros_atuais: i64,
}

/// Plan change requested by a church, awaiting super-admin review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeRequest {
    pub id: Uuid,
    pub igreja_id: Uuid,
    pub igreja_nome: String,
    pub plano_atual_nome: String,
    pub plano_solicitado_id: Uuid,
    pub plano_solicitado_nome: String,
    pub data_solicitacao: DateTime<Utc>,
    pub status: UpgradeRequestStatus,
}

/// Subscription waiting for approval or unblocking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingSubscription {
    pub id: Uuid,
    pub status: SubscriptionStatus,
    pub plano_nome: String,
    pub igreja_nome: String,
    pub igreja_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Priced plan as managed from the SaaS console (`planos`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaasPlan {
    pub id: Uuid,
    pub nome: String,
    pub preco: f64,
    pub limite_membros: i32,
    /// Marketing bullet points shown on the pricing page
    pub recursos: Vec<String>,
    pub ativo: bool,
}

/// Fields accepted when creating or editing a plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaasPlanInput {
    pub nome: String,
    pub preco: f64,
    pub limite_membros: i32,
    #[serde(default)]
    pub recursos: Vec<String>,
    #[serde(default = "default_true")]
    pub ativo: bool,
}

fn default_true() -> bool {
    true
}

impl SaasPlanInput {
    /// Trim the name and bullet points, dropping blank and repeated bullets
    pub fn normalized(mut self) -> Result<Self, IgrejasError> {
        self.nome = self.nome.trim().to_string();
        if self.nome.is_empty() {
            return Err(IgrejasError::Validation("Plan name is required".to_string()));
        }
        if !self.preco.is_finite() || self.preco < 0.0 {
            return Err(IgrejasError::Validation(
                "Plan price must be zero or positive".to_string(),
            ));
        }
        if self.limite_membros <= 0 {
            return Err(IgrejasError::Validation(
                "Member limit must be positive".to_string(),
            ));
        }

        let mut recursos: Vec<String> = Vec::with_capacity(self.recursos.len());
        for recurso in self.recursos.iter().map(|r| r.trim()) {
            if !recurso.is_empty() && !recursos.iter().any(|r| r == recurso) {
                recursos.push(recurso.to_string());
            }
        }
        self.recursos = recursos;
        Ok(self)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_wire_names_round_trip() {
        for feature in Feature::ALL {
            assert_eq!(feature.as_str().parse::<Feature>().unwrap(), feature);
            assert_eq!(
                serde_json::to_value(feature).unwrap(),
                serde_json::Value::String(feature.as_str().to_string())
            );
        }
    }

    #[test]
    fn test_feature_from_str_is_case_insensitive() {
        assert_eq!("FINANCES".parse::<Feature>().unwrap(), Feature::Finances);
        assert_eq!(" ai_assistant ".parse::<Feature>().unwrap(), Feature::AiAssistant);
        assert!("reports".parse::<Feature>().is_err());
    }

    #[test]
    fn test_super_admin_only_features() {
        assert!(Feature::SaasChurches.is_super_admin_only());
        assert!(Feature::SaasSettings.is_super_admin_only());
        assert!(!Feature::Dashboard.is_super_admin_only());
        assert!(!Feature::AiAssistant.is_super_admin_only());
    }

    #[test]
    fn test_user_role_from_str_lossy() {
        assert_eq!(UserRole::from_str_lossy("super_admin"), UserRole::SuperAdmin);
        assert_eq!(UserRole::from_str_lossy("ADMIN_IGREJA"), UserRole::AdminIgreja);
        assert_eq!(UserRole::from_str_lossy("user"), UserRole::MembroIgreja);
        assert_eq!(UserRole::from_str_lossy("pastor"), UserRole::MembroIgreja);
    }

    fn plan_input(nome: &str, preco: f64, limite: i32) -> SaasPlanInput {
        SaasPlanInput {
            nome: nome.to_string(),
            preco,
            limite_membros: limite,
            recursos: vec![
                " Suporte por E-mail ".to_string(),
                "".to_string(),
                "Suporte por E-mail".to_string(),
                "API de Integração".to_string(),
            ],
            ativo: true,
        }
    }

    #[test]
    fn test_plan_input_normalization() {
        let input = plan_input("  Profissional ", 99.9, 500).normalized().unwrap();
        assert_eq!(input.nome, "Profissional");
        assert_eq!(input.recursos, vec!["Suporte por E-mail", "API de Integração"]);
    }

    #[test]
    fn test_plan_input_validation() {
        assert!(plan_input("  ", 10.0, 100).normalized().is_err());
        assert!(plan_input("Básico", -1.0, 100).normalized().is_err());
        assert!(plan_input("Básico", f64::NAN, 100).normalized().is_err());
        assert!(plan_input("Básico", 0.0, 0).normalized().is_err());
        assert!(plan_input("Básico", 0.0, 100).normalized().is_ok());
    }

    #[test]
    fn test_plan_input_defaults() {
        let input: SaasPlanInput =
            serde_json::from_str(r#"{"nome":"Enterprise","preco":299.0,"limite_membros":5000}"#)
                .unwrap();
        assert!(input.ativo);
        assert!(input.recursos.is_empty());
    }

    #[test]
    fn test_user_role_default() {
        assert_eq!(UserRole::default(), UserRole::AdminIgreja);
    }

    #[test]
    fn test_subscription_status_parse() {
        assert_eq!(
            "ativa".parse::<SubscriptionStatus>().unwrap(),
            SubscriptionStatus::Ativa
        );
        assert_eq!(
            "Bloqueada".parse::<SubscriptionStatus>().unwrap(),
            SubscriptionStatus::Bloqueada
        );
        assert!("active".parse::<SubscriptionStatus>().is_err());
        assert_eq!(
            SubscriptionStatus::from_str_lossy("active"),
            SubscriptionStatus::Pendente
        );
    }

    #[test]
    fn test_subscription_status_flags() {
        assert!(SubscriptionStatus::Ativa.is_active());
        assert!(!SubscriptionStatus::Expirada.is_active());
        assert!(SubscriptionStatus::Pendente.awaits_review());
        assert!(SubscriptionStatus::Bloqueada.awaits_review());
        assert!(!SubscriptionStatus::Cancelada.awaits_review());
    }

    #[test]
    fn test_user_without_subscription_is_not_active() {
        let user = User {
            id: Uuid::new_v4(),
            igreja_id: None,
            name: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            avatar_url: None,
            role: UserRole::AdminIgreja,
            subscription: None,
            is_whitelist: false,
        };
        assert!(!user.has_active_subscription());
        assert_eq!(user.plan_id(), None);
    }

    #[test]
    fn test_upgrade_request_status_display_and_parse() {
        for status in [
            UpgradeRequestStatus::Pendente,
            UpgradeRequestStatus::Aprovado,
            UpgradeRequestStatus::Recusado,
        ] {
            assert_eq!(status.to_string().parse::<UpgradeRequestStatus>().unwrap(), status);
        }
    }
}
