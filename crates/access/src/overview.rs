//! SaaS console overview
//!
//! Headline figures for the super-admin landing page. The database queries
//! live in [`crate::admin::SaasAdminService::overview`]; everything here is
//! computed from the rows it returns.

use std::collections::HashMap;

use chrono::{Datelike, Days, Months, NaiveDate};
use igrejas_shared::types::SubscriptionStatus;
use serde::Serialize;

/// Months covered by the revenue chart, current month included
pub const REVENUE_HISTORY_MONTHS: u32 = 6;

const TOP_PLANS: usize = 3;
const UNKNOWN_PLAN: &str = "Desconhecido";
const MONTH_LABELS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Subscription with the price of its plan
#[derive(Debug, Clone)]
pub struct BilledSubscription {
    pub status: SubscriptionStatus,
    pub plano_nome: Option<String>,
    /// Monthly price, zero when the plan is missing
    pub preco: f64,
    /// `data_inicio`, or the creation date when it was never set
    pub started_on: NaiveDate,
    pub expires_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanPopularity {
    pub name: String,
    pub active_subscriptions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: u32,
    pub label: &'static str,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaasOverview {
    pub total_churches: i64,
    pub active_subscriptions: u64,
    /// Monthly recurring revenue of active subscriptions
    pub mrr: f64,
    pub popular_plans: Vec<PlanPopularity>,
    pub pending_upgrades: i64,
    pub expired_subscriptions: u64,
    pub revenue_history: Vec<MonthlyRevenue>,
}

impl SaasOverview {
    pub fn build(
        total_churches: i64,
        pending_upgrades: i64,
        subscriptions: &[BilledSubscription],
        today: NaiveDate,
    ) -> Self {
        let count = |status: SubscriptionStatus| {
            subscriptions.iter().filter(|s| s.status == status).count() as u64
        };

        Self {
            total_churches,
            active_subscriptions: count(SubscriptionStatus::Ativa),
            mrr: monthly_recurring_revenue(subscriptions),
            popular_plans: popular_plans(subscriptions),
            pending_upgrades,
            expired_subscriptions: count(SubscriptionStatus::Expirada),
            revenue_history: revenue_history(subscriptions, today),
        }
    }
}

pub fn monthly_recurring_revenue(subscriptions: &[BilledSubscription]) -> f64 {
    subscriptions
        .iter()
        .filter(|s| s.status.is_active())
        .map(|s| s.preco)
        .sum()
}

/// Plans with the most active subscriptions, at most three.
/// Ties are broken by name.
pub fn popular_plans(subscriptions: &[BilledSubscription]) -> Vec<PlanPopularity> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for sub in subscriptions.iter().filter(|s| s.status.is_active()) {
        let name = sub.plano_nome.as_deref().unwrap_or(UNKNOWN_PLAN);
        *counts.entry(name).or_default() += 1;
    }

    let mut plans: Vec<PlanPopularity> = counts
        .into_iter()
        .map(|(name, active_subscriptions)| PlanPopularity {
            name: name.to_string(),
            active_subscriptions,
        })
        .collect();
    plans.sort_by(|a, b| {
        b.active_subscriptions
            .cmp(&a.active_subscriptions)
            .then_with(|| a.name.cmp(&b.name))
    });
    plans.truncate(TOP_PLANS);
    plans
}

/// Revenue of each of the last six months, oldest first.
///
/// A subscription counts towards a month when it started by the month's last
/// day and is either still active or expired on or after the month's first day.
pub fn revenue_history(
    subscriptions: &[BilledSubscription],
    today: NaiveDate,
) -> Vec<MonthlyRevenue> {
    let Some(current) = today.checked_sub_days(Days::new(u64::from(today.day0()))) else {
        return Vec::new();
    };

    (0..REVENUE_HISTORY_MONTHS)
        .rev()
        .filter_map(|back| {
            let first = current.checked_sub_months(Months::new(back))?;
            let last = first
                .checked_add_months(Months::new(1))?
                .checked_sub_days(Days::new(1))?;

            let revenue = subscriptions
                .iter()
                .filter(|s| s.started_on <= last)
                .filter(|s| s.status.is_active() || s.expires_on.is_some_and(|e| e >= first))
                .map(|s| s.preco)
                .sum();

            Some(MonthlyRevenue {
                year: first.year(),
                month: first.month(),
                label: MONTH_LABELS[first.month0() as usize],
                revenue,
            })
        })
        .collect()
}
