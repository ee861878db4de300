//! Box office demo binary
//!
//! Drives one booking session the way a display surface would and prints
//! what it would render.

use anyhow::Context;
use boxoffice_booking::{
    BookingAction, BookingEnvironment, BookingSession, Config, SeatStatus, SessionView, ShowingId,
    metrics::register_booking_metrics,
};
use boxoffice_core::environment::SystemClock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let config = Config::from_env().context("reading configuration")?;
    config.validate().context("validating configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.display.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    register_booking_metrics();
    tracing::info!(
        cinema = %config.cinema.name,
        anchor = %config.cinema.anchor_date,
        days = config.cinema.window_days,
        flow = ?config.checkout.flow,
        "Configuration loaded"
    );

    let environment = BookingEnvironment::new(
        Arc::new(SystemClock),
        Arc::new(config.catalog()),
        config.session_settings()?,
    );
    let session = BookingSession::new(environment);

    // Notices arrive as broadcast actions
    let mut notices = session.subscribe();
    let notice_printer = tokio::spawn(async move {
        loop {
            match notices.recv().await {
                Ok(BookingAction::NoticeRaised { notice }) => println!("  [notice] {notice}"),
                Ok(_) | Err(RecvError::Lagged(_)) => {},
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!("=== {} ===\n", session.catalog().name());
    print_programme(&session.view().await);

    println!("\n>>> Open showing 1 and pick seats 12, 45, 46");
    session.open_showing(ShowingId::new(1)).await?;
    for seat in [12, 45, 46] {
        session.toggle_seat(seat).await?;
    }
    let view = session.view().await;
    print_seat_map(&view);
    println!("Seats: {}  Total: {}", view.selected_seats.len(), view.running_total);

    println!("\n>>> Check out");
    match session.proceed_to_checkout().await? {
        Some(ticket) => println!("Ticket {} issued for seats {}", ticket.number, ticket.seat_list()),
        None => {
            println!(">>> Email: not-an-email");
            session.set_email("not-an-email").await?;
            if let Err(error) = session.submit_email().await {
                println!("Refused: {error}");
            }

            println!(">>> Email: guest@example.com");
            session.set_email("guest@example.com").await?;
            let ticket = session.submit_email().await?;
            println!(
                "Ticket {}: {} on {} at {}, seats {}, total {}",
                ticket.number,
                ticket.movie,
                ticket.date_label,
                ticket.time,
                ticket.seat_list(),
                ticket.total
            );
        },
    }

    println!("\n>>> Close, reopen showing 1 and click seat 12 again");
    session.close_all().await?;
    session.open_showing(ShowingId::new(1)).await?;
    let status = session.toggle_seat(12).await?;
    println!("Seat 12 is {status:?}");

    println!("\n>>> Check out with nothing selected");
    if let Err(error) = session.proceed_to_checkout().await {
        println!("Refused: {error}");
    }

    // Let the notice printer catch up before shutting down
    tokio::time::sleep(Duration::from_millis(50)).await;
    if let Err(error) = session.shutdown(Duration::from_millis(100)).await {
        tracing::debug!(%error, "Pending notices dropped at shutdown");
    }
    notice_printer.abort();

    Ok(())
}

fn print_programme(view: &SessionView) {
    let dates: Vec<String> = view
        .dates
        .iter()
        .map(|option| format!("{} {}", option.weekday, option.label))
        .collect();
    println!("Dates: {}", dates.join(" | "));

    for showing in &view.showings {
        println!(
            "  {:>2}. {:>5}  {}  {}",
            showing.id,
            showing.start_label(),
            showing.title,
            showing.price_for(view.selected_date)
        );
    }
}

fn print_seat_map(view: &SessionView) {
    for row in &view.seat_rows {
        let cells: String = row
            .seats
            .iter()
            .map(|cell| match cell.status {
                SeatStatus::Available => '.',
                SeatStatus::Selected => 'o',
                SeatStatus::Booked => 'x',
            })
            .collect();
        println!("  {:>2} {cells}", row.row);
    }
}
