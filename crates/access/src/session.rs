//! Session resolution
//!
//! Builds the typed [`User`] from what the hosted auth and the profile tables
//! return, and keeps the user's display preference (which console they are
//! looking at) apart from anything the authorization gate reads.

use chrono::NaiveDate;
use igrejas_shared::types::{Subscription, SubscriptionStatus, User, UserRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::plans::PlanTier;
use crate::security::is_whitelisted_email;

/// Identity proven by the hosted auth token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    pub user_id: Uuid,
    pub email: Option<String>,
    /// `user_metadata.nome` captured at signup
    pub name: Option<String>,
}

/// Row of `perfis`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: Uuid,
    pub nome: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<String>,
    pub igreja_id: Option<Uuid>,
}

/// Row of `assinaturas` joined with the plan name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub id: Uuid,
    pub igreja_id: Uuid,
    pub plano_nome: Option<String>,
    pub status: Option<String>,
    pub data_inicio: Option<NaiveDate>,
    pub data_expiracao: Option<NaiveDate>,
}

impl SubscriptionRecord {
    /// Typed subscription. Unknown statuses become `pendente`; plan names are
    /// mapped to plan keys when recognised and kept verbatim otherwise.
    pub fn into_subscription(self) -> Subscription {
        let plan_id = match self.plano_nome {
            Some(name) => match PlanTier::from_display_name(&name) {
                Some(tier) => tier.as_str().to_string(),
                None => name,
            },
            None => String::new(),
        };
        let status = self
            .status
            .as_deref()
            .map(SubscriptionStatus::from_str_lossy)
            .unwrap_or_default();

        Subscription {
            id: self.id,
            igreja_id: self.igreja_id,
            plan_id,
            status,
            start_date: self.data_inicio,
            renewal_date: self.data_expiracao,
        }
    }
}

/// Which console the user is looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    SaasConsole,
    Tenant,
}

impl ViewMode {
    pub fn for_role(role: UserRole) -> Self {
        match role {
            UserRole::SuperAdmin => Self::SaasConsole,
            _ => Self::Tenant,
        }
    }

    /// Landing page of this console
    pub fn home_path(&self) -> &'static str {
        match self {
            Self::SaasConsole => "/saas",
            Self::Tenant => "/dashboard",
        }
    }
}

/// Display-only role preference stored on the device.
///
/// Only honoured for allow-listed users and only to pick a console. The
/// route guard never sees it; it receives the resolved [`ViewMode`] for
/// choosing redirect targets and nothing else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPreference {
    pub preferred_role: Option<UserRole>,
}

impl DisplayPreference {
    pub fn from_stored(raw: Option<&str>) -> Self {
        Self {
            preferred_role: raw
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(UserRole::from_str_lossy),
        }
    }

    pub fn view_for(&self, user: &User) -> ViewMode {
        if !user.is_whitelist {
            return ViewMode::for_role(user.role);
        }
        match self.preferred_role {
            Some(role) if role != UserRole::SuperAdmin => ViewMode::Tenant,
            _ => ViewMode::SaasConsole,
        }
    }
}

/// Resolved session: the user plus the console they are viewing
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user: User,
    pub view: ViewMode,
}

impl Session {
    pub fn resolve(
        identity: VerifiedIdentity,
        profile: Option<ProfileRecord>,
        subscription: Option<SubscriptionRecord>,
        preference: DisplayPreference,
    ) -> Self {
        let user = resolve_user(identity, profile, subscription);
        let view = preference.view_for(&user);

        tracing::debug!(
            user_id = %user.id,
            role = %user.role,
            ?view,
            is_whitelist = user.is_whitelist,
            "Session resolved"
        );

        Self { user, view }
    }

    /// Flip between the SaaS console and the church view.
    /// Returns the preference to persist, or `None` if the user cannot switch.
    pub fn switch_view(&mut self) -> Option<DisplayPreference> {
        if !self.user.is_whitelist {
            return None;
        }
        let (view, role) = match self.view {
            ViewMode::SaasConsole => (ViewMode::Tenant, UserRole::AdminIgreja),
            ViewMode::Tenant => (ViewMode::SaasConsole, UserRole::SuperAdmin),
        };
        self.view = view;
        Some(DisplayPreference {
            preferred_role: Some(role),
        })
    }
}

/// Build the session user.
///
/// Email and allow-list membership come from the verified token only; the
/// profile row is client-writable. Allow-listed emails get the `super_admin`
/// role; everyone else gets their profile role, defaulting to `admin_igreja`
/// when there is no profile or no role on it. The church link (and with it
/// the subscription) comes from the profile only.
pub fn resolve_user(
    identity: VerifiedIdentity,
    profile: Option<ProfileRecord>,
    subscription: Option<SubscriptionRecord>,
) -> User {
    let profile = profile.unwrap_or_else(|| ProfileRecord {
        id: identity.user_id,
        ..ProfileRecord::default()
    });

    let email = identity
        .email
        .map(|e| e.trim().to_string())
        .unwrap_or_default();
    let is_whitelist = is_whitelisted_email(Some(&email));

    let role = if is_whitelist {
        UserRole::SuperAdmin
    } else {
        profile
            .role
            .as_deref()
            .map(UserRole::from_str_lossy)
            .unwrap_or_default()
    };

    let name = profile
        .nome
        .filter(|n| !n.trim().is_empty())
        .or(identity.name)
        .unwrap_or_else(|| email.clone());

    let igreja_id = profile.igreja_id;
    let subscription = subscription
        .filter(|s| Some(s.igreja_id) == igreja_id)
        .map(SubscriptionRecord::into_subscription);

    User {
        id: identity.user_id,
        igreja_id,
        name,
        email,
        avatar_url: profile.avatar_url,
        role,
        subscription,
        is_whitelist,
    }
}
