//! Booking and cleaner roster routes
//!
//! Booking creation prices the booking through the quote engine and
//! persists the derived totals; the cleaner endpoints drive the roster
//! service, which owns every mutation of assignment rows.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::response::{DataResponse, MessageResponse};
use crate::app::AppState;
use crate::domain::bookings::{
    AddCleanerInput, AssignmentResponse, BookingResponse, BookingStatus, BookingWithQuote,
    CreateBookingInput, SetPrimaryCleanerInput, UpdateCleanerInput,
};
use crate::domain::quote::calculate_quote;
use crate::error::ApiError;
use crate::services::rates::{decimal_opt_to_f64, decimal_to_f64, f64_to_decimal, load_rule_set};
use crate::services::roster::{self, AssignmentRow, BookingRow};

impl From<BookingRow> for BookingResponse {
    fn from(row: BookingRow) -> Self {
        Self {
            id: row.id,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            scheduled_date: row.scheduled_date,
            status: row.status,
            is_first_time: row.is_first_time,
            total_cost: decimal_to_f64(row.total_cost),
            total_hours: decimal_to_f64(row.total_hours),
            cleaner_hourly_rate: decimal_opt_to_f64(row.cleaner_hourly_rate),
            cleaner_percentage_rate: decimal_opt_to_f64(row.cleaner_percentage_rate),
            cleaner_pay: decimal_opt_to_f64(row.cleaner_pay),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<AssignmentRow> for AssignmentResponse {
    fn from(row: AssignmentRow) -> Self {
        Self {
            id: row.id,
            booking_id: row.booking_id,
            cleaner_id: row.cleaner_id,
            is_primary: row.is_primary,
            payment_type: row.payment_type,
            hourly_rate: decimal_opt_to_f64(row.hourly_rate),
            percentage_rate: decimal_opt_to_f64(row.percentage_rate),
            fixed_amount: decimal_opt_to_f64(row.fixed_amount),
            hours_assigned: decimal_opt_to_f64(row.hours_assigned),
            calculated_pay: decimal_to_f64(row.calculated_pay),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// POST /bookings
///
/// Create a booking priced against the current rule snapshot.
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(input): Json<CreateBookingInput>,
) -> Result<impl IntoResponse, ApiError> {
    let rules = load_rule_set(&state.db).await?;
    let quote = calculate_quote(&input.quote, &rules);

    let booking = sqlx::query_as::<_, BookingRow>(
        r#"
        INSERT INTO bookings
            (customer_name, customer_email, scheduled_date, status, is_first_time,
             total_cost, total_hours)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, customer_name, customer_email, scheduled_date, status,
                  is_first_time, total_cost, total_hours, cleaner_hourly_rate,
                  cleaner_percentage_rate, cleaner_pay, created_at, updated_at
        "#,
    )
    .bind(&input.customer_name)
    .bind(&input.customer_email)
    .bind(input.scheduled_date)
    .bind(BookingStatus::Pending.to_string())
    .bind(input.quote.is_first_time_customer)
    .bind(f64_to_decimal(quote.total_cost))
    .bind(f64_to_decimal(quote.estimated_hours))
    .fetch_one(&state.db)
    .await?;

    tracing::info!(
        booking_id = %booking.id,
        customer_name = %input.customer_name,
        total_cost = quote.total_cost,
        estimated_hours = quote.estimated_hours,
        "Created booking"
    );

    let response = BookingWithQuote {
        booking: booking.into(),
        quote,
    };
    Ok((StatusCode::CREATED, Json(DataResponse::new(response))))
}

/// GET /bookings/:booking_id
///
/// Booking financial summary, including the cached primary cleaner pay.
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = sqlx::query_as::<_, BookingRow>(
        r#"
        SELECT id, customer_name, customer_email, scheduled_date, status,
               is_first_time, total_cost, total_hours, cleaner_hourly_rate,
               cleaner_percentage_rate, cleaner_pay, created_at, updated_at
        FROM bookings
        WHERE id = $1
        "#,
    )
    .bind(booking_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("Booking not found"))?;

    Ok(Json(DataResponse::new(BookingResponse::from(booking))))
}

/// GET /bookings/:booking_id/cleaners
///
/// List the booking's cleaner assignments, primary first.
pub async fn list_cleaners(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = roster::list_assignments(&state.db, booking_id).await?;
    let data: Vec<AssignmentResponse> = rows.into_iter().map(Into::into).collect();
    Ok(Json(DataResponse::new(data)))
}

/// PUT /bookings/:booking_id/cleaners/primary
///
/// Upsert the primary cleaner and its booking-level rate config.
pub async fn set_primary_cleaner(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
    Json(input): Json<SetPrimaryCleanerInput>,
) -> Result<impl IntoResponse, ApiError> {
    let assignment = roster::set_primary_cleaner(
        &state.db,
        booking_id,
        &input,
        state.settings.default_cleaner_hourly_rate,
    )
    .await?;
    Ok(Json(DataResponse::new(AssignmentResponse::from(assignment))))
}

/// POST /bookings/:booking_id/cleaners
///
/// Add an additional cleaner; the primary is reconciled in the same
/// transaction.
pub async fn add_cleaner(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
    Json(input): Json<AddCleanerInput>,
) -> Result<impl IntoResponse, ApiError> {
    let assignment = roster::add_cleaner(
        &state.db,
        booking_id,
        &input,
        state.settings.default_cleaner_hourly_rate,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(AssignmentResponse::from(assignment))),
    ))
}

/// PATCH /bookings/:booking_id/cleaners/:assignment_id
///
/// Update an additional cleaner's rates/hours (or apply a manual pay
/// override).
pub async fn update_cleaner(
    State(state): State<Arc<AppState>>,
    Path((booking_id, assignment_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<UpdateCleanerInput>,
) -> Result<impl IntoResponse, ApiError> {
    let assignment = roster::update_cleaner(
        &state.db,
        booking_id,
        assignment_id,
        &input,
        state.settings.default_cleaner_hourly_rate,
    )
    .await?;
    Ok(Json(DataResponse::new(AssignmentResponse::from(assignment))))
}

/// POST /bookings/:booking_id/cleaners/reconcile
///
/// Recompute the primary cleaner's hours and pay from the persisted
/// roster. Mutations already reconcile on their own; this is the repair
/// path for bookings whose totals were edited out of band. A missing
/// booking is a no-op, not an error.
pub async fn reconcile_roster(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = roster::reconcile_roster(
        &state.db,
        booking_id,
        state.settings.default_cleaner_hourly_rate,
    )
    .await?;

    let message = match outcome {
        Some(r) => format!(
            "Primary reconciled: {:.2} hours, pay {:.2}",
            r.primary_hours, r.primary_pay
        ),
        None => "Booking not found; nothing reconciled".to_string(),
    };
    Ok(Json(MessageResponse::new(message)))
}

/// DELETE /bookings/:booking_id/cleaners/:assignment_id
///
/// Remove an additional cleaner and hand its hours back to the primary.
pub async fn remove_cleaner(
    State(state): State<Arc<AppState>>,
    Path((booking_id, assignment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = roster::remove_cleaner(
        &state.db,
        booking_id,
        assignment_id,
        state.settings.default_cleaner_hourly_rate,
    )
    .await?;

    Ok(Json(MessageResponse::new(format!(
        "Assignment removed; primary recalculated to {:.2} hours",
        outcome.primary_hours
    ))))
}
