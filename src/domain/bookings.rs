//! Booking and cleaner-assignment domain types
//!
//! DTOs for the booking lifecycle and the cleaner roster attached to a
//! booking: one primary cleaner whose hours/pay are derived from the
//! booking totals, plus any number of additional cleaners with
//! independently configured pay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::payroll::PaymentType;
use super::quote::{QuoteInput, QuoteResult};

/// Booking status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::InProgress => write!(f, "in_progress"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Create booking request: customer details plus the full set of quote
/// attributes. The server prices the booking itself; clients never submit
/// a total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingInput {
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub quote: QuoteInput,
}

/// Booking financial summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub status: String,
    pub is_first_time: bool,
    pub total_cost: f64,
    pub total_hours: f64,
    pub cleaner_hourly_rate: Option<f64>,
    pub cleaner_percentage_rate: Option<f64>,
    pub cleaner_pay: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create-booking response: the stored booking plus the quote breakdown it
/// was priced with.
#[derive(Debug, Clone, Serialize)]
pub struct BookingWithQuote {
    #[serde(flatten)]
    pub booking: BookingResponse,
    pub quote: QuoteResult,
}

/// One cleaner attached to a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentResponse {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub cleaner_id: Uuid,
    pub is_primary: bool,
    pub payment_type: String,
    pub hourly_rate: Option<f64>,
    pub percentage_rate: Option<f64>,
    pub fixed_amount: Option<f64>,
    pub hours_assigned: Option<f64>,
    pub calculated_pay: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Add an additional cleaner to a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCleanerInput {
    pub cleaner_id: Uuid,
    pub payment_type: PaymentType,
    pub hourly_rate: Option<f64>,
    pub percentage_rate: Option<f64>,
    pub fixed_amount: Option<f64>,
    pub hours_assigned: Option<f64>,
}

/// Update an additional cleaner's rates/hours. All fields optional; only
/// supplied fields change. `manual_pay` is the override path: when set, it
/// is written verbatim and recalculation is bypassed for this edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCleanerInput {
    pub payment_type: Option<PaymentType>,
    pub hourly_rate: Option<f64>,
    pub percentage_rate: Option<f64>,
    pub fixed_amount: Option<f64>,
    pub hours_assigned: Option<f64>,
    pub manual_pay: Option<f64>,
}

/// Upsert the primary cleaner assignment for a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPrimaryCleanerInput {
    pub cleaner_id: Uuid,
    pub hourly_rate: Option<f64>,
    pub percentage_rate: Option<f64>,
}
