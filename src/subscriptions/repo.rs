use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, Duration, Month, OffsetDateTime};

use crate::error::ApiError;

pub(crate) static DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

pub fn parse_date(input: &str) -> Result<Date, ApiError> {
    Date::parse(input.trim(), &DATE_FORMAT)
        .map_err(|_| ApiError::Validation(format!("invalid date: {input}")))
}

pub fn format_date(date: Date) -> String {
    date.format(&DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Recurrence period of a subscription's charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

impl FromStr for BillingCycle {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(ApiError::Validation(format!(
                "invalid billing_cycle: {other}"
            ))),
        }
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monthly => f.write_str("monthly"),
            Self::Yearly => f.write_str("yearly"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub cost: f64,
    pub category: String,
    pub billing_cycle: BillingCycle,
    pub next_payment: Date,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
}

impl Subscription {
    pub fn monthly_cost(&self) -> f64 {
        match self.billing_cycle {
            BillingCycle::Monthly => self.cost,
            BillingCycle::Yearly => self.cost / 12.0,
        }
    }

    pub fn annual_cost(&self) -> f64 {
        match self.billing_cycle {
            BillingCycle::Yearly => self.cost,
            BillingCycle::Monthly => self.cost * 12.0,
        }
    }

    pub fn is_overdue(&self, today: Date) -> bool {
        self.next_payment < today
    }

    pub fn is_due_within(&self, today: Date, days: i64) -> bool {
        self.next_payment <= today + Duration::days(days)
    }

    /// The next payment date after one full billing cycle, using calendar
    /// arithmetic: day-of-month is clamped to the target month's length.
    pub fn next_cycle_date(&self) -> Date {
        match self.billing_cycle {
            BillingCycle::Monthly => add_months(self.next_payment, 1),
            BillingCycle::Yearly => add_months(self.next_payment, 12),
        }
    }
}

fn add_months(date: Date, months: i32) -> Date {
    let zero_based = date.year() * 12 + date.month() as i32 - 1 + months;
    let year = zero_based.div_euclid(12);
    let month = Month::try_from((zero_based.rem_euclid(12) + 1) as u8).expect("month in 1..=12");
    let day = date.day().min(month.length(year));
    Date::from_calendar_date(year, month, day).expect("clamped day fits month")
}

/// Validated data for a new subscription.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub name: String,
    pub cost: f64,
    pub category: String,
    pub billing_cycle: BillingCycle,
    pub next_payment: Date,
    pub notes: Option<String>,
}

pub async fn list_for_user(db: &SqlitePool, user_id: i64) -> anyhow::Result<Vec<Subscription>> {
    let rows = sqlx::query_as::<_, Subscription>(
        r#"
        SELECT id, user_id, name, cost, category, billing_cycle, next_payment, notes, created_at
        FROM subscriptions
        WHERE user_id = ?
        ORDER BY next_payment ASC, id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_owned(
    db: &SqlitePool,
    user_id: i64,
    sub_id: i64,
) -> anyhow::Result<Option<Subscription>> {
    let row = sqlx::query_as::<_, Subscription>(
        r#"
        SELECT id, user_id, name, cost, category, billing_cycle, next_payment, notes, created_at
        FROM subscriptions
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(sub_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn insert(
    db: &SqlitePool,
    user_id: i64,
    new: &NewSubscription,
) -> anyhow::Result<Subscription> {
    let row = sqlx::query_as::<_, Subscription>(
        r#"
        INSERT INTO subscriptions
            (user_id, name, cost, category, billing_cycle, next_payment, notes, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id, user_id, name, cost, category, billing_cycle, next_payment, notes, created_at
        "#,
    )
    .bind(user_id)
    .bind(&new.name)
    .bind(new.cost)
    .bind(&new.category)
    .bind(new.billing_cycle)
    .bind(new.next_payment)
    .bind(&new.notes)
    .bind(OffsetDateTime::now_utc())
    .fetch_one(db)
    .await?;
    Ok(row)
}

/// Writes every mutable column of an already-validated record in one
/// statement, so a partial update is all-or-nothing.
pub async fn update(db: &SqlitePool, sub: &Subscription) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE subscriptions
        SET name = ?, cost = ?, category = ?, billing_cycle = ?, next_payment = ?, notes = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(&sub.name)
    .bind(sub.cost)
    .bind(&sub.category)
    .bind(sub.billing_cycle)
    .bind(sub.next_payment)
    .bind(&sub.notes)
    .bind(sub.id)
    .bind(sub.user_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn delete(db: &SqlitePool, user_id: i64, sub_id: i64) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM subscriptions
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(sub_id)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn due_by(
    db: &SqlitePool,
    user_id: i64,
    target: Date,
) -> anyhow::Result<Vec<Subscription>> {
    let rows = sqlx::query_as::<_, Subscription>(
        r#"
        SELECT id, user_id, name, cost, category, billing_cycle, next_payment, notes, created_at
        FROM subscriptions
        WHERE user_id = ? AND next_payment <= ?
        ORDER BY next_payment ASC, id ASC
        "#,
    )
    .bind(user_id)
    .bind(target)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
