//! Route Guard
//!
//! Decides, for one navigation, whether to render the screen, send the user
//! somewhere else, or render the upgrade prompt in place. Checks run in a
//! fixed order and the first match wins:
//!
//! 1. not authenticated → login
//! 2. role restriction (super-admin routes need the allow-list too)
//! 3. subscription not `ativa` → billing (except on the billing route itself)
//! 4. plan lacks the route's feature → upgrade prompt
//! 5. allow
//!
//! Super-admin bypasses in steps 3 and 4 require an authorized super admin;
//! the role claim alone never skips a check.

use igrejas_shared::types::{Feature, User, UserRole};
use serde::Serialize;

use crate::plans::{can_access, minimum_tier_for, PlanTier};
use crate::route_table::{self, RoutePolicy, BILLING_PATH, LOGIN_PATH, TENANT_HOME_PATH};
use crate::security::is_authorized_super_admin;
use crate::session::ViewMode;

/// Terminal outcome of a guard evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GuardOutcome {
    Allow,
    RedirectToLogin,
    RedirectToHome { target: &'static str },
    RedirectToBilling,
    /// Rendered inline; the user keeps their place in the app
    UpgradePrompt {
        feature: Feature,
        required_tier: Option<PlanTier>,
    },
}

impl GuardOutcome {
    /// Where the client should navigate, `None` when it stays on the route
    pub fn target_path(&self) -> Option<&'static str> {
        match self {
            Self::Allow | Self::UpgradePrompt { .. } => None,
            Self::RedirectToLogin => Some(LOGIN_PATH),
            Self::RedirectToHome { target } => Some(*target),
            Self::RedirectToBilling => Some(BILLING_PATH),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::RedirectToLogin => "redirect_to_login",
            Self::RedirectToHome { .. } => "redirect_to_home",
            Self::RedirectToBilling => "redirect_to_billing",
            Self::UpgradePrompt { .. } => "upgrade_prompt",
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Evaluate one route for one user.
///
/// `view` is the console the user is looking at. It only picks the home page
/// for role redirects and never grants anything.
pub fn evaluate(user: Option<&User>, view: ViewMode, route: &RoutePolicy) -> GuardOutcome {
    let Some(user) = user else {
        return GuardOutcome::RedirectToLogin;
    };

    let authorized_super_admin = is_authorized_super_admin(user);

    if let Some(allowed_roles) = route.allowed_roles {
        if allowed_roles.contains(&UserRole::SuperAdmin) {
            if !authorized_super_admin {
                return GuardOutcome::RedirectToHome {
                    target: TENANT_HOME_PATH,
                };
            }
        } else if !allowed_roles.contains(&user.role) {
            return GuardOutcome::RedirectToHome {
                target: view.home_path(),
            };
        }
    }

    if !authorized_super_admin && !user.has_active_subscription() && !route.is_billing() {
        return GuardOutcome::RedirectToBilling;
    }

    if let Some(feature) = route.required_feature {
        if !authorized_super_admin && !can_access(user.plan_id(), feature) {
            return GuardOutcome::UpgradePrompt {
                feature,
                required_tier: minimum_tier_for(feature),
            };
        }
    }

    GuardOutcome::Allow
}

/// Guard over the application's route table
#[derive(Debug, Clone, Copy)]
pub struct RouteGuard {
    routes: &'static [RoutePolicy],
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(route_table::APP_ROUTES)
    }
}

impl RouteGuard {
    pub fn new(routes: &'static [RoutePolicy]) -> Self {
        Self { routes }
    }

    /// Decide a navigation to `path`.
    ///
    /// `/` and undeclared paths send authenticated users to the home of their
    /// current console.
    pub fn navigate(&self, user: Option<&User>, view: ViewMode, path: &str) -> GuardOutcome {
        let normalized = route_table::normalize_path(path);
        let outcome = match route_table::lookup(self.routes, normalized) {
            Some(route) => evaluate(user, view, route),
            None if user.is_none() => GuardOutcome::RedirectToLogin,
            None => GuardOutcome::RedirectToHome {
                target: view.home_path(),
            },
        };

        tracing::debug!(
            path = normalized,
            user_id = ?user.map(|u| u.id),
            outcome = outcome.kind(),
            "Route guard decision"
        );

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use igrejas_shared::types::{Subscription, SubscriptionStatus};
    use uuid::Uuid;

    fn church_admin(plan: &str, status: SubscriptionStatus) -> User {
        let igreja_id = Uuid::new_v4();
        User {
            id: Uuid::new_v4(),
            igreja_id: Some(igreja_id),
            name: "Ana".to_string(),
            email: "ana@igreja.org".to_string(),
            avatar_url: None,
            role: UserRole::AdminIgreja,
            subscription: Some(Subscription {
                id: Uuid::new_v4(),
                igreja_id,
                plan_id: plan.to_string(),
                status,
                start_date: None,
                renewal_date: None,
            }),
            is_whitelist: false,
        }
    }

    fn super_admin(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            igreja_id: None,
            name: "Admin".to_string(),
            email: email.to_string(),
            avatar_url: None,
            role: UserRole::SuperAdmin,
            subscription: None,
            is_whitelist: false,
        }
    }

    fn guard() -> RouteGuard {
        RouteGuard::default()
    }

    #[test]
    fn test_unauthenticated_goes_to_login() {
        assert_eq!(
            guard().navigate(None, ViewMode::Tenant, "/dashboard"),
            GuardOutcome::RedirectToLogin
        );
        assert_eq!(
            guard().navigate(None, ViewMode::Tenant, "/qualquer"),
            GuardOutcome::RedirectToLogin
        );
    }

    #[test]
    fn test_basico_gets_upgrade_prompt_for_finances() {
        let user = church_admin("basico", SubscriptionStatus::Ativa);
        assert_eq!(
            guard().navigate(Some(&user), ViewMode::Tenant, "/financeiro"),
            GuardOutcome::UpgradePrompt {
                feature: Feature::Finances,
                required_tier: Some(PlanTier::Profissional),
            }
        );
    }

    #[test]
    fn test_profissional_can_open_finances() {
        let user = church_admin("profissional", SubscriptionStatus::Ativa);
        assert!(guard()
            .navigate(Some(&user), ViewMode::Tenant, "/financeiro")
            .is_allowed());
    }

    #[test]
    fn test_expired_subscription_goes_to_billing() {
        let user = church_admin("enterprise", SubscriptionStatus::Expirada);
        let outcome = guard().navigate(Some(&user), ViewMode::Tenant, "/dashboard");
        assert_eq!(outcome, GuardOutcome::RedirectToBilling);
        assert_eq!(outcome.target_path(), Some("/assinatura"));
    }

    #[test]
    fn test_billing_route_never_loops() {
        let user = church_admin("basico", SubscriptionStatus::Expirada);
        assert!(guard()
            .navigate(Some(&user), ViewMode::Tenant, "/assinatura")
            .is_allowed());
    }

    #[test]
    fn test_missing_subscription_goes_to_billing() {
        let mut user = church_admin("basico", SubscriptionStatus::Ativa);
        user.subscription = None;
        assert_eq!(
            guard().navigate(Some(&user), ViewMode::Tenant, "/membros"),
            GuardOutcome::RedirectToBilling
        );
    }

    #[test]
    fn test_inactive_subscription_wins_over_upgrade_prompt() {
        let user = church_admin("basico", SubscriptionStatus::Bloqueada);
        assert_eq!(
            guard().navigate(Some(&user), ViewMode::Tenant, "/ia"),
            GuardOutcome::RedirectToBilling
        );
    }

    #[test]
    fn test_church_admin_cannot_open_saas_console() {
        let user = church_admin("enterprise", SubscriptionStatus::Ativa);
        assert_eq!(
            guard().navigate(Some(&user), ViewMode::Tenant, "/saas/planos"),
            GuardOutcome::RedirectToHome {
                target: "/dashboard"
            }
        );
    }

    #[test]
    fn test_impostor_super_admin_is_sent_to_tenant_home() {
        let impostor = super_admin("random@x.com");
        assert_eq!(
            guard().navigate(Some(&impostor), ViewMode::SaasConsole, "/saas"),
            GuardOutcome::RedirectToHome {
                target: "/dashboard"
            }
        );
    }

    #[test]
    fn test_impostor_gets_no_billing_or_plan_bypass() {
        let impostor = super_admin("random@x.com");
        assert_eq!(
            guard().navigate(Some(&impostor), ViewMode::SaasConsole, "/financeiro"),
            GuardOutcome::RedirectToBilling
        );
    }

    #[test]
    fn test_authorized_super_admin_bypasses_billing_and_plans() {
        let admin = super_admin("altechzero@gmail.com");
        let g = guard();
        assert!(g.navigate(Some(&admin), ViewMode::SaasConsole, "/saas/upgrades").is_allowed());
        assert!(g.navigate(Some(&admin), ViewMode::Tenant, "/ia").is_allowed());
        assert!(g.navigate(Some(&admin), ViewMode::Tenant, "/dashboard").is_allowed());
    }

    #[test]
    fn test_role_restricted_route_uses_view_home() {
        const LEADERS_ONLY: &[UserRole] = &[UserRole::Lider];
        let route = RoutePolicy {
            path: "/escala",
            allowed_roles: Some(LEADERS_ONLY),
            required_feature: None,
            feature: Feature::Events,
        };

        let user = church_admin("basico", SubscriptionStatus::Ativa);
        assert_eq!(
            evaluate(Some(&user), ViewMode::Tenant, &route),
            GuardOutcome::RedirectToHome {
                target: "/dashboard"
            }
        );

        let admin = super_admin("altechzero@gmail.com");
        assert_eq!(
            evaluate(Some(&admin), ViewMode::SaasConsole, &route),
            GuardOutcome::RedirectToHome { target: "/saas" }
        );

        let mut lider = church_admin("basico", SubscriptionStatus::Ativa);
        lider.role = UserRole::Lider;
        assert!(evaluate(Some(&lider), ViewMode::Tenant, &route).is_allowed());
    }

    #[test]
    fn test_root_and_unknown_paths_go_home() {
        let user = church_admin("basico", SubscriptionStatus::Ativa);
        let admin = super_admin("altechzero@gmail.com");
        let g = guard();
        assert_eq!(
            g.navigate(Some(&user), ViewMode::Tenant, "/"),
            GuardOutcome::RedirectToHome {
                target: "/dashboard"
            }
        );
        assert_eq!(
            g.navigate(Some(&admin), ViewMode::SaasConsole, "/nao-existe"),
            GuardOutcome::RedirectToHome { target: "/saas" }
        );
    }

    #[test]
    fn test_unknown_plan_is_treated_as_basico() {
        let user = church_admin("diamante", SubscriptionStatus::Ativa);
        let g = guard();
        assert!(g.navigate(Some(&user), ViewMode::Tenant, "/membros").is_allowed());
        assert!(matches!(
            g.navigate(Some(&user), ViewMode::Tenant, "/tipos-financeiros"),
            GuardOutcome::UpgradePrompt { .. }
        ));
    }

    #[test]
    fn test_custom_route_table() {
        const ROUTES: &[RoutePolicy] = &[RoutePolicy {
            path: "/escala",
            allowed_roles: None,
            required_feature: Some(Feature::Events),
            feature: Feature::Events,
        }];
        let g = RouteGuard::new(ROUTES);
        let user = church_admin("basico", SubscriptionStatus::Ativa);
        assert!(g.navigate(Some(&user), ViewMode::Tenant, "/escala/?semana=2").is_allowed());
        assert_eq!(
            g.navigate(Some(&user), ViewMode::Tenant, "/dashboard"),
            GuardOutcome::RedirectToHome {
                target: "/dashboard"
            }
        );
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(GuardOutcome::UpgradePrompt {
            feature: Feature::AiAssistant,
            required_tier: Some(PlanTier::Enterprise),
        })
        .unwrap();
        assert_eq!(json["outcome"], "upgrade_prompt");
        assert_eq!(json["feature"], "ai_assistant");
        assert_eq!(json["required_tier"], "enterprise");
    }
}
