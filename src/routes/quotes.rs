//! Quote routes
//!
//! Price a prospective booking against the current rule snapshot without
//! persisting anything.

use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::api::response::DataResponse;
use crate::app::AppState;
use crate::domain::quote::{calculate_quote, QuoteInput};
use crate::error::ApiError;
use crate::services::rates::load_rule_set;

/// POST /quotes
///
/// Compute the full price breakdown for a set of booking attributes.
pub async fn create_quote(
    State(state): State<Arc<AppState>>,
    Json(input): Json<QuoteInput>,
) -> Result<impl IntoResponse, ApiError> {
    let rules = load_rule_set(&state.db).await?;
    let result = calculate_quote(&input, &rules);

    tracing::debug!(
        total_cost = result.total_cost,
        estimated_hours = result.estimated_hours,
        first_time = input.is_first_time_customer,
        "Computed quote"
    );

    Ok(Json(DataResponse::new(result)))
}
