//! Business metrics recorded by the booking session
//!
//! Installs a process-wide recorder, so this file holds a single test.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code

use boxoffice_booking::{BookingEnvironment, BookingSession, Catalog, ShowingId, SessionSettings};
use boxoffice_testing::{CountingRecorder, test_clock};
use std::sync::Arc;

#[tokio::test]
async fn tickets_and_refusals_are_counted_once() {
    let recorder = CountingRecorder::new();
    metrics::set_global_recorder(recorder.clone()).expect("recorder already installed");

    let session = BookingSession::new(BookingEnvironment::new(
        Arc::new(test_clock()),
        Arc::new(Catalog::default()),
        SessionSettings::default(),
    ));

    session.open_showing(ShowingId::new(1)).await.unwrap();
    assert!(session.proceed_to_checkout().await.is_err());

    for seat in [12, 45] {
        session.toggle_seat(seat).await.unwrap();
    }
    session.proceed_to_checkout().await.unwrap();
    session.set_email("guest@example.com").await.unwrap();
    let ticket = session.submit_email().await.unwrap();

    assert_eq!(recorder.counter("booking.rejections"), 1);
    assert_eq!(recorder.counter("booking.tickets.issued"), 1);
    assert_eq!(recorder.counter("booking.seats.booked"), 2);
    assert_eq!(recorder.counter("booking.revenue.kopecks"), ticket.total.kopecks());
}
