pub mod bookings;
pub mod health;
pub mod quotes;
pub mod rates;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        // Quotes
        .route("/quotes", post(quotes::create_quote))
        // Rate rules
        .route("/rates", get(rates::list_rates))
        .route("/rates", put(rates::put_rate))
        // Bookings
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/:booking_id", get(bookings::get_booking))
        // Cleaner roster (nested under bookings)
        .route(
            "/bookings/:booking_id/cleaners",
            get(bookings::list_cleaners),
        )
        .route(
            "/bookings/:booking_id/cleaners",
            post(bookings::add_cleaner),
        )
        .route(
            "/bookings/:booking_id/cleaners/primary",
            put(bookings::set_primary_cleaner),
        )
        .route(
            "/bookings/:booking_id/cleaners/reconcile",
            post(bookings::reconcile_roster),
        )
        .route(
            "/bookings/:booking_id/cleaners/:assignment_id",
            patch(bookings::update_cleaner),
        )
        .route(
            "/bookings/:booking_id/cleaners/:assignment_id",
            delete(bookings::remove_cleaner),
        )
}
