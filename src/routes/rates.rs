//! Rate rule configuration routes
//!
//! Operators configure the per-option cost/time rules the quote engine
//! consumes. Rules are stored here, never computed.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::pagination::{Paginated, PaginationParams};
use crate::api::response::DataResponse;
use crate::app::AppState;
use crate::domain::rates::{RateCategory, RateRule, ValueType};
use crate::error::ApiError;
use crate::services::rates::{decimal_to_f64, upsert_rule, RateRuleRow};

#[derive(Debug, Serialize)]
pub struct RateRuleResponse {
    pub id: Uuid,
    pub category: String,
    pub option: String,
    pub value: f64,
    pub value_type: String,
    pub time_minutes: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RateRuleRow> for RateRuleResponse {
    fn from(row: RateRuleRow) -> Self {
        Self {
            id: row.id,
            category: row.category,
            option: row.option_key,
            value: decimal_to_f64(row.value),
            value_type: row.value_type,
            time_minutes: row.time_minutes,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RateQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    pub category: Option<String>,
}

/// GET /rates
///
/// List configured rules, optionally filtered by category.
pub async fn list_rates(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RateQueryParams>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(category) = &query.category {
        if RateCategory::parse(category).is_none() {
            return Err(ApiError::bad_request(format!(
                "Unknown rate category: {category}"
            )));
        }
    }

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM rate_rules
        WHERE is_active AND ($1::text IS NULL OR category = $1)
        "#,
    )
    .bind(&query.category)
    .fetch_one(&state.db)
    .await?;

    let rows = sqlx::query_as::<_, RateRuleRow>(
        r#"
        SELECT id, category, option_key, value, value_type, time_minutes, is_active, created_at, updated_at
        FROM rate_rules
        WHERE is_active AND ($1::text IS NULL OR category = $1)
        ORDER BY category ASC, option_key ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(&query.category)
    .bind(query.pagination.limit() as i64)
    .bind(query.pagination.offset() as i64)
    .fetch_all(&state.db)
    .await?;

    let data: Vec<RateRuleResponse> = rows.into_iter().map(Into::into).collect();
    Ok(Json(Paginated::new(data, &query.pagination, total as u64)))
}

#[derive(Debug, Deserialize)]
pub struct UpsertRateInput {
    pub category: String,
    pub option: String,
    pub value: f64,
    pub value_type: ValueType,
    #[serde(default)]
    pub time_minutes: u32,
}

/// PUT /rates
///
/// Create or replace the active rule for one `(category, option)` pair.
pub async fn put_rate(
    State(state): State<Arc<AppState>>,
    Json(input): Json<UpsertRateInput>,
) -> Result<impl IntoResponse, ApiError> {
    let category = RateCategory::parse(&input.category).ok_or_else(|| {
        ApiError::bad_request(format!("Unknown rate category: {}", input.category))
    })?;

    let rule = RateRule {
        category,
        option: input.option,
        value: input.value,
        value_type: input.value_type,
        time_minutes: input.time_minutes,
    };
    let row = upsert_rule(&state.db, &rule).await?;

    tracing::info!(
        category = %rule.category,
        option = %rule.option,
        value = rule.value,
        value_type = %rule.value_type,
        "Upserted rate rule"
    );

    Ok(Json(DataResponse::new(RateRuleResponse::from(row))))
}
