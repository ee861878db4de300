//! Business metrics for the box office.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `booking.tickets.issued` - Tickets issued
//! - `booking.seats.booked` - Seats moved into the booked set
//! - `booking.revenue.kopecks` - Sum of ticket totals
//! - `booking.rejections{reason}` - Refused inputs by reason code
//!
//! ## Histograms
//! - `booking.ticket.seats` - Seats per ticket

use metrics::{describe_counter, describe_histogram};

use crate::error::BookingError;
use crate::ticket::Ticket;

/// Register all booking metric descriptions.
///
/// Call once at startup, before any metrics are recorded.
pub fn register_booking_metrics() {
    describe_counter!("booking.tickets.issued", "Total number of tickets issued");
    describe_counter!(
        "booking.seats.booked",
        "Total number of seats booked by completed purchases"
    );
    describe_counter!(
        "booking.revenue.kopecks",
        "Sum of ticket totals in kopecks"
    );
    describe_counter!(
        "booking.rejections",
        "Inputs refused by the session, by reason"
    );
    describe_histogram!("booking.ticket.seats", "Number of seats per ticket");

    tracing::info!("Booking metrics registered");
}

/// Record an issued ticket.
pub fn record_ticket_issued(ticket: &Ticket) {
    let seats = ticket.seats.len() as u64;
    metrics::counter!("booking.tickets.issued").increment(1);
    metrics::counter!("booking.seats.booked").increment(seats);
    metrics::counter!("booking.revenue.kopecks").increment(ticket.total.kopecks());
    #[allow(clippy::cast_precision_loss)] // seat counts are small
    let seats_per_ticket = seats as f64;
    metrics::histogram!("booking.ticket.seats").record(seats_per_ticket);
    tracing::debug!(seats, "Recorded ticket_issued metric");
}

/// Record a refused input.
pub fn record_rejection(error: &BookingError) {
    let reason = error.code();
    metrics::counter!("booking.rejections", "reason" => reason).increment(1);
    tracing::debug!(reason, "Recorded rejection metric");
}
