//! Application route table
//!
//! Every screen the frontend can navigate to, with the role restriction and
//! plan feature it declares. Paths are the ones the web app uses.

use igrejas_shared::types::{Feature, UserRole};
use serde::Serialize;

pub const LOGIN_PATH: &str = "/login";
pub const BILLING_PATH: &str = "/assinatura";
pub const TENANT_HOME_PATH: &str = "/dashboard";
pub const SAAS_HOME_PATH: &str = "/saas";

const SUPER_ADMIN_ONLY: &[UserRole] = &[UserRole::SuperAdmin];

/// Access requirements declared by a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoutePolicy {
    pub path: &'static str,
    /// Roles allowed on this route, `None` for any authenticated user
    pub allowed_roles: Option<&'static [UserRole]>,
    /// Plan feature the route requires
    pub required_feature: Option<Feature>,
    /// Screen shown by the route, for menus
    pub feature: Feature,
}

impl RoutePolicy {
    const fn open(path: &'static str, feature: Feature) -> Self {
        Self {
            path,
            allowed_roles: None,
            required_feature: None,
            feature,
        }
    }

    const fn gated(path: &'static str, feature: Feature) -> Self {
        Self {
            path,
            allowed_roles: None,
            required_feature: Some(feature),
            feature,
        }
    }

    const fn super_admin(path: &'static str, feature: Feature) -> Self {
        Self {
            path,
            allowed_roles: Some(SUPER_ADMIN_ONLY),
            required_feature: None,
            feature,
        }
    }

    pub fn is_billing(&self) -> bool {
        self.path == BILLING_PATH
    }
}

pub const APP_ROUTES: &[RoutePolicy] = &[
    RoutePolicy::open("/dashboard", Feature::Dashboard),
    RoutePolicy::open("/configuracoes", Feature::ChurchConfig),
    RoutePolicy::open("/membros", Feature::Members),
    RoutePolicy::gated("/financeiro", Feature::Finances),
    RoutePolicy::gated("/tipos-financeiros", Feature::FinanceTypes),
    RoutePolicy::open("/agenda", Feature::Events),
    RoutePolicy::open("/equipe", Feature::Settings),
    RoutePolicy::open(BILLING_PATH, Feature::Billing),
    RoutePolicy::gated("/ia", Feature::AiAssistant),
    RoutePolicy::super_admin(SAAS_HOME_PATH, Feature::SaasDashboard),
    RoutePolicy::super_admin("/saas/clientes", Feature::SaasChurches),
    RoutePolicy::super_admin("/saas/planos", Feature::SaasPlans),
    RoutePolicy::super_admin("/saas/upgrades", Feature::SaasUpgrades),
];

/// Strip query, fragment and trailing slashes
pub fn normalize_path(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Route declared for `path` in `routes`, if any
pub fn lookup(routes: &'static [RoutePolicy], path: &str) -> Option<&'static RoutePolicy> {
    let path = normalize_path(path);
    routes.iter().find(|route| route.path == path)
}
