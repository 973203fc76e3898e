//! igrejas Access Control
//!
//! Plan entitlements, the super-admin allow-list, session resolution and the
//! route guard, plus the tenant lifecycle services that change what a church
//! can access (onboarding and SaaS administration) and the SaaS overview.

pub mod admin;
pub mod error;
pub mod guard;
pub mod navigation;
pub mod onboarding;
pub mod overview;
pub mod plans;
pub mod profile;
pub mod route_table;
pub mod security;
pub mod session;

pub use admin::{SaasAdminService, UpgradeDecision};
pub use error::{AccessError, AccessResult};
pub use guard::{GuardOutcome, RouteGuard};
pub use navigation::{navigation_for, NavItem, Navigation};
pub use onboarding::{ChurchRegistration, OnboardingReport, OnboardingService, TrialOutcome};
pub use overview::{MonthlyRevenue, PlanPopularity, SaasOverview};
pub use plans::{
    can_access, can_add_team_member, granted_features, minimum_tier_for, plan_catalog,
    team_limit, PlanSummary, PlanTier, TeamUsage,
};
pub use profile::ProfileService;
pub use route_table::RoutePolicy;
pub use security::{is_authorized_super_admin, is_whitelisted_email};
pub use session::{DisplayPreference, Session, VerifiedIdentity, ViewMode};
