//! Rate rule store access
//!
//! Loads the active rule rows into the `RuleSet` snapshot the quote engine
//! computes against, and upserts individual rules. Rows whose category or
//! value type no longer parses are skipped with a warning instead of
//! poisoning the snapshot.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::rates::{RateCategory, RateRule, RuleSet, ValueType};
use crate::error::ApiError;

#[derive(Debug, sqlx::FromRow)]
pub struct RateRuleRow {
    pub id: Uuid,
    pub category: String,
    pub option_key: String,
    pub value: rust_decimal::Decimal,
    pub value_type: String,
    pub time_minutes: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn decimal_to_f64(d: rust_decimal::Decimal) -> f64 {
    use std::str::FromStr;
    f64::from_str(&d.to_string()).unwrap_or(0.0)
}

pub fn decimal_opt_to_f64(d: Option<rust_decimal::Decimal>) -> Option<f64> {
    d.map(decimal_to_f64)
}

pub fn f64_to_decimal(v: f64) -> rust_decimal::Decimal {
    rust_decimal::Decimal::from_f64_retain(v).unwrap_or_default()
}

pub fn f64_opt_to_decimal(v: Option<f64>) -> Option<rust_decimal::Decimal> {
    v.map(f64_to_decimal)
}

impl RateRuleRow {
    fn to_rule(&self) -> Option<RateRule> {
        let category = RateCategory::parse(&self.category)?;
        let value_type = ValueType::parse(&self.value_type)?;
        Some(RateRule {
            category,
            option: self.option_key.clone(),
            value: decimal_to_f64(self.value),
            value_type,
            time_minutes: self.time_minutes.max(0) as u32,
        })
    }
}

/// Load the current active-rule snapshot.
pub async fn load_rule_set(pool: &PgPool) -> Result<RuleSet, ApiError> {
    let rows = sqlx::query_as::<_, RateRuleRow>(
        r#"
        SELECT id, category, option_key, value, value_type, time_minutes, is_active, created_at, updated_at
        FROM rate_rules
        WHERE is_active
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut rules = Vec::with_capacity(rows.len());
    for row in rows {
        match row.to_rule() {
            Some(rule) => rules.push(rule),
            None => {
                tracing::warn!(
                    rule_id = %row.id,
                    category = %row.category,
                    value_type = %row.value_type,
                    "Skipping rate rule with unrecognized category or value type"
                );
            }
        }
    }

    Ok(RuleSet::new(rules))
}

/// Upsert one rule by `(category, option)`. The partial unique index on
/// active rows keeps at most one active rule per pair.
pub async fn upsert_rule(pool: &PgPool, rule: &RateRule) -> Result<RateRuleRow, ApiError> {
    let row = sqlx::query_as::<_, RateRuleRow>(
        r#"
        INSERT INTO rate_rules (category, option_key, value, value_type, time_minutes, is_active)
        VALUES ($1, $2, $3, $4, $5, TRUE)
        ON CONFLICT (category, option_key) WHERE is_active
        DO UPDATE SET value = EXCLUDED.value,
                      value_type = EXCLUDED.value_type,
                      time_minutes = EXCLUDED.time_minutes,
                      updated_at = NOW()
        RETURNING id, category, option_key, value, value_type, time_minutes, is_active, created_at, updated_at
        "#,
    )
    .bind(rule.category.as_str())
    .bind(&rule.option)
    .bind(f64_to_decimal(rule.value))
    .bind(rule.value_type.as_str())
    .bind(rule.time_minutes as i32)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
