use std::collections::BTreeMap;

use serde::Serialize;

use crate::subscriptions::repo::Subscription;

#[derive(Debug, Serialize, PartialEq)]
pub struct Summary {
    pub monthly_total: f64,
    pub annual_total: f64,
    pub active_subscriptions: usize,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    pub count: usize,
}

pub fn summarize(subs: &[Subscription]) -> Summary {
    Summary {
        monthly_total: subs.iter().map(Subscription::monthly_cost).sum(),
        annual_total: subs.iter().map(Subscription::annual_cost).sum(),
        active_subscriptions: subs.len(),
    }
}

/// Groups by category, normalized to monthly cost. Sorted by category name
/// so the output order is stable.
pub fn category_breakdown(subs: &[Subscription]) -> Vec<CategoryTotal> {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for sub in subs {
        let entry = groups.entry(sub.category.as_str()).or_insert((0.0, 0));
        entry.0 += sub.monthly_cost();
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category: category.to_string(),
            total,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscriptions::repo::BillingCycle;
    use time::macros::date;
    use time::OffsetDateTime;

    fn sub(name: &str, category: &str, cost: f64, cycle: BillingCycle) -> Subscription {
        Subscription {
            id: 0,
            user_id: 1,
            name: name.into(),
            cost,
            category: category.into(),
            billing_cycle: cycle,
            next_payment: date!(2024 - 01 - 01),
            notes: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn empty_set_yields_zeros() {
        let summary = summarize(&[]);
        assert_eq!(summary.monthly_total, 0.0);
        assert_eq!(summary.annual_total, 0.0);
        assert_eq!(summary.active_subscriptions, 0);
        assert!(category_breakdown(&[]).is_empty());
    }

    #[test]
    fn summary_mixes_cycles() {
        let subs = vec![
            sub("Netflix", "Streaming", 15.99, BillingCycle::Monthly),
            sub("Backup", "Tools", 120.0, BillingCycle::Yearly),
        ];
        let summary = summarize(&subs);
        assert!((summary.monthly_total - 25.99).abs() < 1e-9);
        assert!((summary.annual_total - 311.88).abs() < 1e-9);
        assert_eq!(summary.active_subscriptions, 2);
    }

    #[test]
    fn breakdown_partitions_by_category() {
        let subs = vec![
            sub("Netflix", "Streaming", 15.99, BillingCycle::Monthly),
            sub("Spotify", "Streaming", 9.99, BillingCycle::Monthly),
            sub("Backup", "Tools", 120.0, BillingCycle::Yearly),
        ];
        let breakdown = category_breakdown(&subs);
        assert_eq!(breakdown.len(), 2);
        // Alphabetical order.
        assert_eq!(breakdown[0].category, "Streaming");
        assert!((breakdown[0].total - 25.98).abs() < 1e-9);
        assert_eq!(breakdown[0].count, 2);
        assert_eq!(breakdown[1].category, "Tools");
        assert!((breakdown[1].total - 10.0).abs() < 1e-9);
        assert_eq!(breakdown[1].count, 1);
    }

    #[test]
    fn breakdown_totals_cover_every_subscription() {
        let subs = vec![
            sub("a", "A", 1.0, BillingCycle::Monthly),
            sub("b", "B", 24.0, BillingCycle::Yearly),
            sub("c", "A", 3.0, BillingCycle::Monthly),
        ];
        let breakdown = category_breakdown(&subs);
        let grouped: f64 = breakdown.iter().map(|g| g.total).sum();
        let direct: f64 = subs.iter().map(Subscription::monthly_cost).sum();
        assert!((grouped - direct).abs() < 1e-9);
        let counted: usize = breakdown.iter().map(|g| g.count).sum();
        assert_eq!(counted, subs.len());
    }
}
