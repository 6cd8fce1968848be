//! Cleaner roster service
//!
//! The only mutator of booking cleaner assignments. Every mutation runs in
//! one transaction that first takes a row lock on the booking
//! (`SELECT ... FOR UPDATE`), so concurrent roster edits for the same
//! booking serialize instead of racing on a stale sum of assigned hours.
//!
//! The primary assignment is upserted rather than freely created/deleted,
//! and is reconciled as part of any mutation that changes the additional
//! cleaners' hours: its hours are the booking total minus the sum of
//! additional hours (never negative), and its pay follows the booking's
//! rate config (hourly rate, else percentage of total, else the platform
//! default hourly rate).

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::bookings::{AddCleanerInput, SetPrimaryCleanerInput, UpdateCleanerInput};
use crate::domain::payroll::{
    calculate_pay, primary_hours, primary_pay, PaymentType, PrimaryRateConfig, RateFields,
};
use crate::error::ApiError;
use crate::services::rates::{decimal_opt_to_f64, decimal_to_f64, f64_opt_to_decimal, f64_to_decimal};

#[derive(Debug, sqlx::FromRow)]
pub struct BookingRow {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub status: String,
    pub is_first_time: bool,
    pub total_cost: rust_decimal::Decimal,
    pub total_hours: rust_decimal::Decimal,
    pub cleaner_hourly_rate: Option<rust_decimal::Decimal>,
    pub cleaner_percentage_rate: Option<rust_decimal::Decimal>,
    pub cleaner_pay: Option<rust_decimal::Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingRow {
    pub fn primary_rate_config(&self) -> PrimaryRateConfig {
        PrimaryRateConfig {
            hourly_rate: decimal_opt_to_f64(self.cleaner_hourly_rate),
            percentage_rate: decimal_opt_to_f64(self.cleaner_percentage_rate),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct AssignmentRow {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub cleaner_id: Uuid,
    pub is_primary: bool,
    pub payment_type: String,
    pub hourly_rate: Option<rust_decimal::Decimal>,
    pub percentage_rate: Option<rust_decimal::Decimal>,
    pub fixed_amount: Option<rust_decimal::Decimal>,
    pub hours_assigned: Option<rust_decimal::Decimal>,
    pub calculated_pay: rust_decimal::Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssignmentRow {
    fn rate_fields(&self) -> RateFields {
        RateFields {
            hourly_rate: decimal_opt_to_f64(self.hourly_rate),
            percentage_rate: decimal_opt_to_f64(self.percentage_rate),
            fixed_amount: decimal_opt_to_f64(self.fixed_amount),
            hours_assigned: decimal_opt_to_f64(self.hours_assigned),
        }
    }
}

/// Outcome of a primary reconciliation.
#[derive(Debug, Clone, Copy)]
pub struct RosterReconciliation {
    pub primary_hours: f64,
    pub primary_pay: f64,
}

const ASSIGNMENT_COLUMNS: &str = "id, booking_id, cleaner_id, is_primary, payment_type, \
     hourly_rate, percentage_rate, fixed_amount, hours_assigned, calculated_pay, \
     created_at, updated_at";

const BOOKING_COLUMNS: &str = "id, customer_name, customer_email, scheduled_date, status, \
     is_first_time, total_cost, total_hours, cleaner_hourly_rate, cleaner_percentage_rate, \
     cleaner_pay, created_at, updated_at";

/// Lock the booking row for the duration of the transaction. Returns
/// `None` when the booking doesn't exist.
async fn lock_booking(
    tx: &mut Transaction<'_, Postgres>,
    booking_id: Uuid,
) -> Result<Option<BookingRow>, sqlx::Error> {
    sqlx::query_as::<_, BookingRow>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 FOR UPDATE"
    ))
    .bind(booking_id)
    .fetch_optional(&mut **tx)
    .await
}

/// Recompute the primary cleaner's hours and pay from the current roster
/// and persist both the booking-level `cleaner_pay` and the primary's own
/// assignment row when one exists.
async fn reconcile_primary(
    tx: &mut Transaction<'_, Postgres>,
    booking: &BookingRow,
    default_hourly_rate: f64,
) -> Result<RosterReconciliation, sqlx::Error> {
    let additional_hours: rust_decimal::Decimal = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(hours_assigned), 0)
        FROM booking_cleaners
        WHERE booking_id = $1 AND NOT is_primary
        "#,
    )
    .bind(booking.id)
    .fetch_one(&mut **tx)
    .await?;

    let hours = primary_hours(
        decimal_to_f64(booking.total_hours),
        decimal_to_f64(additional_hours),
    );
    let pay = primary_pay(
        booking.primary_rate_config(),
        hours,
        decimal_to_f64(booking.total_cost),
        default_hourly_rate,
    );

    sqlx::query("UPDATE bookings SET cleaner_pay = $2, updated_at = NOW() WHERE id = $1")
        .bind(booking.id)
        .bind(f64_to_decimal(pay))
        .execute(&mut **tx)
        .await?;

    let updated = sqlx::query(
        r#"
        UPDATE booking_cleaners
        SET hours_assigned = $2, calculated_pay = $3, updated_at = NOW()
        WHERE booking_id = $1 AND is_primary
        "#,
    )
    .bind(booking.id)
    .bind(f64_to_decimal(hours))
    .bind(f64_to_decimal(pay))
    .execute(&mut **tx)
    .await?;

    if updated.rows_affected() == 0 {
        tracing::warn!(
            booking_id = %booking.id,
            "No primary assignment to reconcile; booking-level pay updated only"
        );
    }

    tracing::debug!(
        booking_id = %booking.id,
        primary_hours = hours,
        primary_pay = pay,
        "Reconciled primary cleaner"
    );

    Ok(RosterReconciliation {
        primary_hours: hours,
        primary_pay: pay,
    })
}

/// Recompute the primary from the persisted roster without any other
/// mutation. No-ops (with a warning) when the booking is gone, so one
/// broken booking can't abort a batch of unrelated work.
pub async fn reconcile_roster(
    pool: &PgPool,
    booking_id: Uuid,
    default_hourly_rate: f64,
) -> Result<Option<RosterReconciliation>, ApiError> {
    let mut tx = pool.begin().await?;

    let Some(booking) = lock_booking(&mut tx, booking_id).await? else {
        tracing::warn!(booking_id = %booking_id, "Skipping reconciliation for missing booking");
        return Ok(None);
    };

    let outcome = reconcile_primary(&mut tx, &booking, default_hourly_rate).await?;
    tx.commit().await?;
    Ok(Some(outcome))
}

pub async fn list_assignments(
    pool: &PgPool,
    booking_id: Uuid,
) -> Result<Vec<AssignmentRow>, ApiError> {
    let rows = sqlx::query_as::<_, AssignmentRow>(&format!(
        r#"
        SELECT {ASSIGNMENT_COLUMNS}
        FROM booking_cleaners
        WHERE booking_id = $1
        ORDER BY is_primary DESC, created_at ASC
        "#
    ))
    .bind(booking_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Add an additional cleaner and reconcile the primary in one transaction.
pub async fn add_cleaner(
    pool: &PgPool,
    booking_id: Uuid,
    input: &AddCleanerInput,
    default_hourly_rate: f64,
) -> Result<AssignmentRow, ApiError> {
    let mut tx = pool.begin().await?;

    let booking = lock_booking(&mut tx, booking_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Booking not found"))?;

    let pay = calculate_pay(
        Some(input.payment_type),
        decimal_to_f64(booking.total_cost),
        RateFields {
            hourly_rate: input.hourly_rate,
            percentage_rate: input.percentage_rate,
            fixed_amount: input.fixed_amount,
            hours_assigned: input.hours_assigned,
        },
    );

    let assignment = sqlx::query_as::<_, AssignmentRow>(&format!(
        r#"
        INSERT INTO booking_cleaners
            (booking_id, cleaner_id, is_primary, payment_type, hourly_rate,
             percentage_rate, fixed_amount, hours_assigned, calculated_pay)
        VALUES ($1, $2, FALSE, $3, $4, $5, $6, $7, $8)
        RETURNING {ASSIGNMENT_COLUMNS}
        "#
    ))
    .bind(booking_id)
    .bind(input.cleaner_id)
    .bind(input.payment_type.as_str())
    .bind(f64_opt_to_decimal(input.hourly_rate))
    .bind(f64_opt_to_decimal(input.percentage_rate))
    .bind(f64_opt_to_decimal(input.fixed_amount))
    .bind(f64_opt_to_decimal(input.hours_assigned))
    .bind(f64_to_decimal(pay))
    .fetch_one(&mut *tx)
    .await?;

    reconcile_primary(&mut tx, &booking, default_hourly_rate).await?;
    tx.commit().await?;

    tracing::info!(
        booking_id = %booking_id,
        assignment_id = %assignment.id,
        cleaner_id = %input.cleaner_id,
        payment_type = %input.payment_type,
        calculated_pay = pay,
        "Added additional cleaner"
    );

    Ok(assignment)
}

/// Update an additional cleaner's rates/hours. Pay is recomputed from the
/// merged fields unless `manual_pay` is supplied, which is written
/// verbatim. An hours change also reconciles the primary, in the same
/// transaction.
pub async fn update_cleaner(
    pool: &PgPool,
    booking_id: Uuid,
    assignment_id: Uuid,
    input: &UpdateCleanerInput,
    default_hourly_rate: f64,
) -> Result<AssignmentRow, ApiError> {
    let mut tx = pool.begin().await?;

    let booking = lock_booking(&mut tx, booking_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Booking not found"))?;

    let existing = sqlx::query_as::<_, AssignmentRow>(&format!(
        "SELECT {ASSIGNMENT_COLUMNS} FROM booking_cleaners WHERE id = $1 AND booking_id = $2"
    ))
    .bind(assignment_id)
    .bind(booking_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| ApiError::not_found("Assignment not found"))?;

    if existing.is_primary {
        return Err(ApiError::bad_request(
            "The primary assignment is managed via the primary endpoint",
        ));
    }

    let payment_type = input
        .payment_type
        .or_else(|| PaymentType::parse(&existing.payment_type));
    let merged = RateFields {
        hourly_rate: input.hourly_rate.or(existing.rate_fields().hourly_rate),
        percentage_rate: input
            .percentage_rate
            .or(existing.rate_fields().percentage_rate),
        fixed_amount: input.fixed_amount.or(existing.rate_fields().fixed_amount),
        hours_assigned: input
            .hours_assigned
            .or(existing.rate_fields().hours_assigned),
    };

    let pay = match input.manual_pay {
        // Manual override path: written as-is, recalculation bypassed.
        Some(manual) => manual,
        None => calculate_pay(payment_type, decimal_to_f64(booking.total_cost), merged),
    };

    let assignment = sqlx::query_as::<_, AssignmentRow>(&format!(
        r#"
        UPDATE booking_cleaners
        SET payment_type = $3, hourly_rate = $4, percentage_rate = $5,
            fixed_amount = $6, hours_assigned = $7, calculated_pay = $8,
            updated_at = NOW()
        WHERE id = $1 AND booking_id = $2
        RETURNING {ASSIGNMENT_COLUMNS}
        "#
    ))
    .bind(assignment_id)
    .bind(booking_id)
    .bind(
        payment_type
            .map(|t| t.as_str().to_string())
            .unwrap_or_else(|| existing.payment_type.clone()),
    )
    .bind(f64_opt_to_decimal(merged.hourly_rate))
    .bind(f64_opt_to_decimal(merged.percentage_rate))
    .bind(f64_opt_to_decimal(merged.fixed_amount))
    .bind(f64_opt_to_decimal(merged.hours_assigned))
    .bind(f64_to_decimal(pay))
    .fetch_one(&mut *tx)
    .await?;

    // A pure rate edit leaves the primary alone; changed hours shift the
    // split and have to be reconciled before commit.
    if input.hours_assigned.is_some() {
        reconcile_primary(&mut tx, &booking, default_hourly_rate).await?;
    }
    tx.commit().await?;

    tracing::info!(
        booking_id = %booking_id,
        assignment_id = %assignment_id,
        calculated_pay = pay,
        manual_override = input.manual_pay.is_some(),
        "Updated additional cleaner"
    );

    Ok(assignment)
}

/// Remove an additional cleaner and hand its hours back to the primary.
pub async fn remove_cleaner(
    pool: &PgPool,
    booking_id: Uuid,
    assignment_id: Uuid,
    default_hourly_rate: f64,
) -> Result<RosterReconciliation, ApiError> {
    let mut tx = pool.begin().await?;

    let booking = lock_booking(&mut tx, booking_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Booking not found"))?;

    let deleted = sqlx::query(
        "DELETE FROM booking_cleaners WHERE id = $1 AND booking_id = $2 AND NOT is_primary",
    )
    .bind(assignment_id)
    .bind(booking_id)
    .execute(&mut *tx)
    .await?;

    if deleted.rows_affected() == 0 {
        return Err(ApiError::not_found("Assignment not found"));
    }

    let outcome = reconcile_primary(&mut tx, &booking, default_hourly_rate).await?;
    tx.commit().await?;

    tracing::info!(
        booking_id = %booking_id,
        assignment_id = %assignment_id,
        primary_hours = outcome.primary_hours,
        primary_pay = outcome.primary_pay,
        "Removed additional cleaner"
    );

    Ok(outcome)
}

/// Upsert the primary assignment for a booking (update-if-exists, else
/// insert), store the booking-level rate config, and reconcile.
pub async fn set_primary_cleaner(
    pool: &PgPool,
    booking_id: Uuid,
    input: &SetPrimaryCleanerInput,
    default_hourly_rate: f64,
) -> Result<AssignmentRow, ApiError> {
    let mut tx = pool.begin().await?;

    let mut booking = lock_booking(&mut tx, booking_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Booking not found"))?;

    sqlx::query(
        r#"
        UPDATE bookings
        SET cleaner_hourly_rate = $2, cleaner_percentage_rate = $3, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(booking_id)
    .bind(f64_opt_to_decimal(input.hourly_rate))
    .bind(f64_opt_to_decimal(input.percentage_rate))
    .execute(&mut *tx)
    .await?;
    booking.cleaner_hourly_rate = f64_opt_to_decimal(input.hourly_rate);
    booking.cleaner_percentage_rate = f64_opt_to_decimal(input.percentage_rate);

    let payment_type = if input.hourly_rate.is_some() || input.percentage_rate.is_none() {
        PaymentType::Hourly
    } else {
        PaymentType::Percentage
    };

    sqlx::query(
        r#"
        INSERT INTO booking_cleaners
            (booking_id, cleaner_id, is_primary, payment_type, hourly_rate,
             percentage_rate, calculated_pay)
        VALUES ($1, $2, TRUE, $3, $4, $5, 0)
        ON CONFLICT (booking_id) WHERE is_primary
        DO UPDATE SET cleaner_id = EXCLUDED.cleaner_id,
                      payment_type = EXCLUDED.payment_type,
                      hourly_rate = EXCLUDED.hourly_rate,
                      percentage_rate = EXCLUDED.percentage_rate,
                      updated_at = NOW()
        "#,
    )
    .bind(booking_id)
    .bind(input.cleaner_id)
    .bind(payment_type.as_str())
    .bind(f64_opt_to_decimal(input.hourly_rate))
    .bind(f64_opt_to_decimal(input.percentage_rate))
    .execute(&mut *tx)
    .await?;

    reconcile_primary(&mut tx, &booking, default_hourly_rate).await?;

    let assignment = sqlx::query_as::<_, AssignmentRow>(&format!(
        "SELECT {ASSIGNMENT_COLUMNS} FROM booking_cleaners WHERE booking_id = $1 AND is_primary"
    ))
    .bind(booking_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        booking_id = %booking_id,
        cleaner_id = %input.cleaner_id,
        "Upserted primary cleaner"
    );

    Ok(assignment)
}
