use serde::{Deserialize, Serialize};
use time::Date;

use crate::error::ApiError;
use crate::subscriptions::repo::{format_date, parse_date, BillingCycle, NewSubscription, Subscription};

/// Create payload. Every field is optional at the serde level so missing or
/// malformed input surfaces as a 400 with a specific message instead of a
/// generic body rejection.
#[derive(Debug, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub name: Option<String>,
    pub cost: Option<f64>,
    pub category: Option<String>,
    pub billing_cycle: Option<String>,
    pub next_payment: Option<String>,
    pub notes: Option<String>,
}

impl CreateSubscriptionRequest {
    pub fn validate(self) -> Result<NewSubscription, ApiError> {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ApiError::Validation("name is required".into()))?;
        let cost = self
            .cost
            .ok_or_else(|| ApiError::Validation("cost is required".into()))?;
        validate_cost(cost)?;
        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "General".to_string());
        let billing_cycle = match self.billing_cycle.as_deref() {
            Some(raw) => raw.parse()?,
            None => BillingCycle::Monthly,
        };
        let next_payment = self
            .next_payment
            .as_deref()
            .ok_or_else(|| ApiError::Validation("next_payment is required".into()))
            .and_then(parse_date)?;

        Ok(NewSubscription {
            name,
            cost,
            category,
            billing_cycle,
            next_payment,
            notes: self.notes,
        })
    }
}

/// Partial update payload; absent fields are left untouched. A JSON
/// `notes: null` deserializes the same as an absent field, so notes cannot
/// be cleared through this endpoint, only overwritten.
#[derive(Debug, Deserialize)]
pub struct UpdateSubscriptionRequest {
    pub name: Option<String>,
    pub cost: Option<f64>,
    pub category: Option<String>,
    pub billing_cycle: Option<String>,
    pub next_payment: Option<String>,
    pub notes: Option<String>,
}

impl UpdateSubscriptionRequest {
    /// Validates every supplied field before touching the record, then
    /// applies them all, so the eventual write is all-or-nothing.
    pub fn apply_to(self, sub: &mut Subscription) -> Result<(), ApiError> {
        let billing_cycle: Option<BillingCycle> =
            self.billing_cycle.as_deref().map(str::parse).transpose()?;
        let next_payment: Option<Date> =
            self.next_payment.as_deref().map(parse_date).transpose()?;
        if let Some(cost) = self.cost {
            validate_cost(cost)?;
        }
        let name = match self.name {
            Some(n) => {
                let n = n.trim().to_string();
                if n.is_empty() {
                    return Err(ApiError::Validation("name cannot be empty".into()));
                }
                Some(n)
            }
            None => None,
        };

        if let Some(name) = name {
            sub.name = name;
        }
        if let Some(cost) = self.cost {
            sub.cost = cost;
        }
        if let Some(category) = self.category {
            let category = category.trim().to_string();
            sub.category = if category.is_empty() {
                "General".to_string()
            } else {
                category
            };
        }
        if let Some(cycle) = billing_cycle {
            sub.billing_cycle = cycle;
        }
        if let Some(date) = next_payment {
            sub.next_payment = date;
        }
        if let Some(notes) = self.notes {
            sub.notes = Some(notes);
        }
        Ok(())
    }
}

fn validate_cost(cost: f64) -> Result<(), ApiError> {
    if !cost.is_finite() || cost < 0.0 {
        return Err(ApiError::Validation(
            "cost must be a non-negative number".into(),
        ));
    }
    Ok(())
}

/// Wire form of a subscription, including the derived fields. Field order
/// doubles as the CSV column order.
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub id: i64,
    pub name: String,
    pub cost: f64,
    pub category: String,
    pub billing_cycle: BillingCycle,
    pub next_payment: String,
    pub notes: String,
    pub monthly_cost: f64,
    pub annual_cost: f64,
    pub overdue: bool,
    pub due_within_7: bool,
}

impl SubscriptionResponse {
    pub fn from_record(sub: &Subscription, today: Date) -> Self {
        Self {
            id: sub.id,
            name: sub.name.clone(),
            cost: sub.cost,
            category: sub.category.clone(),
            billing_cycle: sub.billing_cycle,
            next_payment: format_date(sub.next_payment),
            notes: sub.notes.clone().unwrap_or_default(),
            monthly_cost: sub.monthly_cost(),
            annual_cost: sub.annual_cost(),
            overdue: sub.is_overdue(today),
            due_within_7: sub.is_due_within(today, 7),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;
    use time::OffsetDateTime;

    fn create_request(billing_cycle: Option<&str>) -> CreateSubscriptionRequest {
        CreateSubscriptionRequest {
            name: Some("Netflix".into()),
            cost: Some(15.99),
            category: None,
            billing_cycle: billing_cycle.map(String::from),
            next_payment: Some("2024-01-01".into()),
            notes: None,
        }
    }

    #[test]
    fn create_applies_defaults() {
        let new = create_request(None).validate().unwrap();
        assert_eq!(new.category, "General");
        assert_eq!(new.billing_cycle, BillingCycle::Monthly);
        assert_eq!(new.next_payment, date!(2024 - 01 - 01));
    }

    #[test]
    fn create_rejects_missing_name_and_cost() {
        let mut req = create_request(None);
        req.name = None;
        assert!(matches!(req.validate(), Err(ApiError::Validation(_))));

        let mut req = create_request(None);
        req.cost = None;
        assert!(matches!(req.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn create_rejects_negative_cost_and_bad_cycle() {
        let mut req = create_request(None);
        req.cost = Some(-1.0);
        assert!(matches!(req.validate(), Err(ApiError::Validation(_))));

        let req = create_request(Some("weekly"));
        assert!(matches!(req.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn create_rejects_bad_date() {
        let mut req = create_request(None);
        req.next_payment = Some("January 1st".into());
        assert!(matches!(req.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn update_leaves_record_untouched_on_invalid_field() {
        let mut sub = Subscription {
            id: 1,
            user_id: 1,
            name: "Netflix".into(),
            cost: 15.99,
            category: "General".into(),
            billing_cycle: BillingCycle::Monthly,
            next_payment: date!(2024 - 01 - 01),
            notes: None,
            created_at: OffsetDateTime::now_utc(),
        };
        let update = UpdateSubscriptionRequest {
            name: Some("Spotify".into()),
            cost: None,
            category: None,
            billing_cycle: Some("weekly".into()),
            next_payment: None,
            notes: None,
        };
        assert!(update.apply_to(&mut sub).is_err());
        assert_eq!(sub.name, "Netflix");
    }

    #[test]
    fn update_applies_only_present_fields() {
        let mut sub = Subscription {
            id: 1,
            user_id: 1,
            name: "Netflix".into(),
            cost: 15.99,
            category: "General".into(),
            billing_cycle: BillingCycle::Monthly,
            next_payment: date!(2024 - 01 - 01),
            notes: None,
            created_at: OffsetDateTime::now_utc(),
        };
        let update = UpdateSubscriptionRequest {
            name: None,
            cost: Some(17.99),
            category: Some("Streaming".into()),
            billing_cycle: None,
            next_payment: Some("2024-02-01".into()),
            notes: None,
        };
        update.apply_to(&mut sub).unwrap();
        assert_eq!(sub.name, "Netflix");
        assert_eq!(sub.cost, 17.99);
        assert_eq!(sub.category, "Streaming");
        assert_eq!(sub.next_payment, date!(2024 - 02 - 01));
    }

    #[test]
    fn update_normalizes_category_like_create() {
        let mut sub = Subscription {
            id: 1,
            user_id: 1,
            name: "Netflix".into(),
            cost: 15.99,
            category: "Streaming".into(),
            billing_cycle: BillingCycle::Monthly,
            next_payment: date!(2024 - 01 - 01),
            notes: None,
            created_at: OffsetDateTime::now_utc(),
        };
        let update = UpdateSubscriptionRequest {
            name: None,
            cost: None,
            category: Some("  Music  ".into()),
            billing_cycle: None,
            next_payment: None,
            notes: None,
        };
        update.apply_to(&mut sub).unwrap();
        assert_eq!(sub.category, "Music");

        let update = UpdateSubscriptionRequest {
            name: None,
            cost: None,
            category: Some("   ".into()),
            billing_cycle: None,
            next_payment: None,
            notes: None,
        };
        update.apply_to(&mut sub).unwrap();
        assert_eq!(sub.category, "General");
    }

    #[test]
    fn response_fills_absent_notes_with_empty_string() {
        let sub = Subscription {
            id: 1,
            user_id: 1,
            name: "Netflix".into(),
            cost: 15.99,
            category: "General".into(),
            billing_cycle: BillingCycle::Monthly,
            next_payment: date!(2024 - 03 - 31),
            notes: None,
            created_at: OffsetDateTime::now_utc(),
        };
        let resp = SubscriptionResponse::from_record(&sub, date!(2024 - 03 - 30));
        assert_eq!(resp.notes, "");
        assert_eq!(resp.next_payment, "2024-03-31");
        assert!(!resp.overdue);
        assert!(resp.due_within_7);
    }
}
