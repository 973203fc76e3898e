//! Sidebar menus
//!
//! The church menu always lists every screen; entries the plan does not
//! include are returned `locked` so the UI can show them with an upgrade hint.

use igrejas_shared::types::{Feature, User};
use serde::Serialize;

use crate::plans::{can_access, minimum_tier_for, PlanTier};
use crate::security::is_authorized_super_admin;
use crate::session::ViewMode;

struct MenuEntry {
    path: &'static str,
    label: &'static str,
    feature: Feature,
}

const CHURCH_MENU: &[MenuEntry] = &[
    MenuEntry {
        path: "/dashboard",
        label: "Início",
        feature: Feature::Dashboard,
    },
    MenuEntry {
        path: "/configuracoes",
        label: "Instituição",
        feature: Feature::ChurchConfig,
    },
    MenuEntry {
        path: "/membros",
        label: "Comunidade",
        feature: Feature::Members,
    },
    MenuEntry {
        path: "/financeiro",
        label: "Tesouraria",
        feature: Feature::Finances,
    },
    MenuEntry {
        path: "/agenda",
        label: "Agenda",
        feature: Feature::Events,
    },
    MenuEntry {
        path: "/equipe",
        label: "Equipe",
        feature: Feature::Settings,
    },
    MenuEntry {
        path: "/assinatura",
        label: "Assinatura",
        feature: Feature::Billing,
    },
    MenuEntry {
        path: "/ia",
        label: "Insights IA",
        feature: Feature::AiAssistant,
    },
];

const SAAS_MENU: &[MenuEntry] = &[
    MenuEntry {
        path: "/saas",
        label: "Visão Geral",
        feature: Feature::SaasDashboard,
    },
    MenuEntry {
        path: "/saas/clientes",
        label: "Clientes",
        feature: Feature::SaasChurches,
    },
    MenuEntry {
        path: "/saas/planos",
        label: "Planos",
        feature: Feature::SaasPlans,
    },
    MenuEntry {
        path: "/saas/upgrades",
        label: "Upgrades",
        feature: Feature::SaasUpgrades,
    },
];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NavItem {
    pub path: &'static str,
    pub label: &'static str,
    pub feature: Feature,
    pub locked: bool,
    /// Tier that unlocks the entry, only set when locked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_tier: Option<PlanTier>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Navigation {
    pub view: ViewMode,
    pub home: &'static str,
    pub items: Vec<NavItem>,
    /// Whether the console switch is offered
    pub can_switch_view: bool,
}

/// Menu for the console the user is looking at
pub fn navigation_for(user: &User, view: ViewMode) -> Navigation {
    let authorized = is_authorized_super_admin(user);

    // Only authorized super admins get the SaaS menu, whatever the view says
    let (view, entries) = match view {
        ViewMode::SaasConsole if authorized => (view, SAAS_MENU),
        _ => (ViewMode::Tenant, CHURCH_MENU),
    };

    let items = entries
        .iter()
        .map(|entry| {
            let locked = !authorized && !can_access(user.plan_id(), entry.feature);
            NavItem {
                path: entry.path,
                label: entry.label,
                feature: entry.feature,
                locked,
                required_tier: if locked {
                    minimum_tier_for(entry.feature)
                } else {
                    None
                },
            }
        })
        .collect();

    Navigation {
        view,
        home: view.home_path(),
        items,
        can_switch_view: user.is_whitelist && authorized,
    }
}
