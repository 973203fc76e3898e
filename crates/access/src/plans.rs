//! Plan-to-Feature Map
//!
//! Answers the question: "does this church's plan include this screen?"
//!
//! ## Design Principles
//!
//! 1. **Total**: every plan identifier, including missing or unknown ones,
//!    maps to a feature set. Only the exact keys `basico`, `profissional`
//!    and `enterprise` are known; anything else gets the lowest tier.
//! 2. **Deterministic**: the table is static, so checks are safe on every request.
//! 3. **Monotonic**: each tier's list starts with the whole list of the tier
//!    below it. The tests hold the table to that.
//!
//! Plan names as stored in the database are mapped to keys once, when the
//! subscription row is read (see [`PlanTier::from_display_name`]).

use igrejas_shared::types::Feature;
use serde::{Deserialize, Serialize};

const BASICO_FEATURES: &[Feature] = &[
    Feature::Dashboard,
    Feature::Members,
    Feature::ChurchConfig,
    Feature::Events,
    Feature::Settings,
    Feature::Billing,
];

const PROFISSIONAL_FEATURES: &[Feature] = &[
    Feature::Dashboard,
    Feature::Members,
    Feature::ChurchConfig,
    Feature::Events,
    Feature::Settings,
    Feature::Billing,
    Feature::Finances,
    Feature::FinanceTypes,
];

const ENTERPRISE_FEATURES: &[Feature] = &[
    Feature::Dashboard,
    Feature::Members,
    Feature::ChurchConfig,
    Feature::Events,
    Feature::Settings,
    Feature::Billing,
    Feature::Finances,
    Feature::FinanceTypes,
    Feature::Analytics,
    Feature::AiAssistant,
];

/// Priced tier, ordered from most to least restrictive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Basico,
    Profissional,
    Enterprise,
}

impl Default for PlanTier {
    fn default() -> Self {
        Self::LOWEST
    }
}

impl PlanTier {
    pub const ALL: [PlanTier; 3] = [Self::Basico, Self::Profissional, Self::Enterprise];

    /// Fallback for missing or unknown plan identifiers
    pub const LOWEST: PlanTier = Self::Basico;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basico => "basico",
            Self::Profissional => "profissional",
            Self::Enterprise => "enterprise",
        }
    }

    /// Name shown to customers and stored in `planos.nome`
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Basico => "Básico",
            Self::Profissional => "Profissional",
            Self::Enterprise => "Enterprise",
        }
    }

    /// Features granted by this tier, in menu order
    pub fn features(&self) -> &'static [Feature] {
        match self {
            Self::Basico => BASICO_FEATURES,
            Self::Profissional => PROFISSIONAL_FEATURES,
            Self::Enterprise => ENTERPRISE_FEATURES,
        }
    }

    pub fn grants(&self, feature: Feature) -> bool {
        self.features().contains(&feature)
    }

    /// Team members (profiles) a church on this tier may have
    pub fn team_limit(&self) -> u32 {
        match self {
            Self::Basico => 2,
            Self::Profissional => 5,
            Self::Enterprise => 8,
        }
    }

    /// Resolve a plan identifier, falling back to the lowest tier
    pub fn resolve(plan_id: Option<&str>) -> Self {
        plan_id
            .and_then(|id| id.parse().ok())
            .unwrap_or(Self::LOWEST)
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlanTier {
    type Err = String;

    /// Exact plan keys only
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| format!("Invalid plan: {}", s))
    }
}

impl PlanTier {
    /// Match a plan name as stored in `planos.nome` (`"Básico"`, `"PROFISSIONAL"`).
    /// Case, accents and surrounding whitespace are ignored.
    pub fn from_display_name(name: &str) -> Option<Self> {
        let folded = fold_plan_name(name);
        Self::ALL.into_iter().find(|tier| tier.as_str() == folded)
    }
}

fn fold_plan_name(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Features granted by `plan_id` (lowest tier when missing or unknown)
pub fn granted_features(plan_id: Option<&str>) -> &'static [Feature] {
    PlanTier::resolve(plan_id).features()
}

/// Entitlement check: does `plan_id` grant `feature`?
pub fn can_access(plan_id: Option<&str>, feature: Feature) -> bool {
    PlanTier::resolve(plan_id).grants(feature)
}

/// Team size allowed by `plan_id` (lowest tier when missing or unknown)
pub fn team_limit(plan_id: Option<&str>) -> u32 {
    PlanTier::resolve(plan_id).team_limit()
}

/// Whether a church with `current` team members may add one more
pub fn can_add_team_member(plan_id: Option<&str>, current: u64) -> bool {
    current < u64::from(team_limit(plan_id))
}

/// Team size of a church measured against its plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamUsage {
    pub plan: PlanTier,
    pub members: u64,
    pub limit: u32,
    pub can_invite: bool,
}

impl TeamUsage {
    pub fn new(plan_id: Option<&str>, members: u64) -> Self {
        let plan = PlanTier::resolve(plan_id);
        Self {
            plan,
            members,
            limit: plan.team_limit(),
            can_invite: can_add_team_member(plan_id, members),
        }
    }
}

/// Cheapest tier that unlocks `feature`, `None` for super-admin screens
pub fn minimum_tier_for(feature: Feature) -> Option<PlanTier> {
    PlanTier::ALL.into_iter().find(|tier| tier.grants(feature))
}

/// Public description of a tier
#[derive(Debug, Clone, Serialize)]
pub struct PlanSummary {
    pub id: PlanTier,
    pub name: &'static str,
    pub features: &'static [Feature],
    pub team_limit: u32,
}

/// All tiers, cheapest first
pub fn plan_catalog() -> Vec<PlanSummary> {
    PlanTier::ALL
        .into_iter()
        .map(|tier| PlanSummary {
            id: tier,
            name: tier.display_name(),
            features: tier.features(),
            team_limit: tier.team_limit(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_basico_lacks_finances() {
        assert!(!can_access(Some("basico"), Feature::Finances));
        assert!(can_access(Some("basico"), Feature::Members));
        assert!(can_access(Some("basico"), Feature::Billing));
    }

    #[test]
    fn test_profissional_unlocks_finances_only() {
        assert!(can_access(Some("profissional"), Feature::Finances));
        assert!(can_access(Some("profissional"), Feature::FinanceTypes));
        assert!(!can_access(Some("profissional"), Feature::Analytics));
        assert!(!can_access(Some("profissional"), Feature::AiAssistant));
    }

    #[test]
    fn test_enterprise_unlocks_everything_for_churches() {
        for feature in Feature::ALL {
            assert_eq!(
                can_access(Some("enterprise"), feature),
                !feature.is_super_admin_only(),
                "enterprise vs {}",
                feature
            );
        }
    }

    #[test]
    fn test_missing_plan_falls_back_to_basico() {
        assert_eq!(granted_features(None), BASICO_FEATURES);
        assert_eq!(granted_features(Some("")), BASICO_FEATURES);
        assert_eq!(granted_features(Some("premium")), BASICO_FEATURES);
    }

    #[test]
    fn test_plan_keys_are_exact() {
        for plan in ["ENTERPRISE", "Enterprise", " enterprise ", "Profissional", "básico"] {
            assert_eq!(PlanTier::resolve(Some(plan)), PlanTier::Basico, "{:?}", plan);
            assert!(!can_access(Some(plan), Feature::AiAssistant), "{:?}", plan);
        }
        assert!(can_access(Some("enterprise"), Feature::AiAssistant));
    }

    #[test]
    fn test_display_names_map_to_tiers() {
        assert_eq!(PlanTier::from_display_name("Básico"), Some(PlanTier::Basico));
        assert_eq!(
            PlanTier::from_display_name(" PROFISSIONAL "),
            Some(PlanTier::Profissional)
        );
        assert_eq!(PlanTier::from_display_name("Enterprise"), Some(PlanTier::Enterprise));
        assert_eq!(PlanTier::from_display_name("gold"), None);
    }

    #[test]
    fn test_team_usage() {
        let usage = TeamUsage::new(Some("profissional"), 4);
        assert_eq!(usage.plan, PlanTier::Profissional);
        assert_eq!(usage.limit, 5);
        assert!(usage.can_invite);

        let full = TeamUsage::new(None, 2);
        assert_eq!(full.plan, PlanTier::Basico);
        assert!(!full.can_invite);

        // Over the limit after a downgrade
        let over = TeamUsage::new(Some("basico"), 6);
        assert_eq!(over.members, 6);
        assert!(!over.can_invite);
    }

    #[test]
    fn test_team_limits() {
        assert_eq!(team_limit(Some("basico")), 2);
        assert_eq!(team_limit(Some("profissional")), 5);
        assert_eq!(team_limit(Some("enterprise")), 8);
        assert_eq!(team_limit(Some("diamante")), 2);
        assert_eq!(team_limit(None), 2);

        assert!(can_add_team_member(Some("basico"), 1));
        assert!(!can_add_team_member(Some("basico"), 2));
        assert!(can_add_team_member(Some("enterprise"), 7));
        assert!(!can_add_team_member(Some("enterprise"), 8));
    }

    #[test]
    fn test_no_plan_grants_super_admin_screens() {
        for tier in PlanTier::ALL {
            assert!(tier.features().iter().all(|f| !f.is_super_admin_only()));
        }
        assert_eq!(minimum_tier_for(Feature::SaasPlans), None);
    }

    #[test]
    fn test_minimum_tier_for() {
        assert_eq!(minimum_tier_for(Feature::Dashboard), Some(PlanTier::Basico));
        assert_eq!(minimum_tier_for(Feature::Finances), Some(PlanTier::Profissional));
        assert_eq!(minimum_tier_for(Feature::AiAssistant), Some(PlanTier::Enterprise));
    }

    #[test]
    fn test_higher_tiers_are_supersets() {
        for pair in PlanTier::ALL.windows(2) {
            let (lower, higher) = (pair[0], pair[1]);
            for feature in lower.features() {
                assert!(higher.grants(*feature), "{} missing {}", higher, feature);
            }
        }
    }

    #[test]
    fn test_catalog_is_ordered() {
        let catalog = plan_catalog();
        let ids: Vec<_> = catalog.iter().map(|p| p.id).collect();
        assert_eq!(ids, PlanTier::ALL.to_vec());
        assert_eq!(catalog[0].name, "Básico");
    }

    fn any_feature() -> impl Strategy<Value = Feature> {
        proptest::sample::select(Feature::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_can_access_is_deterministic(plan in ".{0,16}", feature in any_feature()) {
            prop_assert_eq!(
                can_access(Some(&plan), feature),
                can_access(Some(&plan), feature)
            );
        }

        #[test]
        fn prop_unknown_plans_match_basico(plan in "\\PC{0,16}", feature in any_feature()) {
            prop_assume!(plan.parse::<PlanTier>().is_err());
            prop_assert_eq!(
                can_access(Some(&plan), feature),
                can_access(Some("basico"), feature)
            );
        }

        #[test]
        fn prop_tiers_are_monotonic(feature in any_feature()) {
            let granted: Vec<bool> = PlanTier::ALL.iter().map(|t| t.grants(feature)).collect();
            for pair in granted.windows(2) {
                prop_assert!(!pair[0] || pair[1]);
            }
        }

        #[test]
        fn prop_team_limits_are_monotonic(plan in "\\PC{0,16}") {
            let limit = team_limit(Some(&plan));
            prop_assert!(limit >= PlanTier::Basico.team_limit());
            prop_assert!(limit <= PlanTier::Enterprise.team_limit());
        }
    }
}
