//! # Box Office Booking
//!
//! Seat booking session for a single-screen cinema: browse the five-day
//! programme, pick seats in a 23 by 20 auditorium, leave a contact address and
//! receive a ticket.
//!
//! The session is written as a reducer over [`BookingState`] and runs inside a
//! [`Store`](boxoffice_runtime::Store). A display surface drives it through
//! [`BookingSession`] and renders [`SessionView`]; notices reach the display
//! as broadcast [`BookingAction::NoticeRaised`] actions.
//!
//! ## Example
//!
//! ```ignore
//! let session = BookingSession::new(environment);
//! session.open_showing(ShowingId::new(1)).await?;
//! session.toggle_seat(12).await?;
//! session.proceed_to_checkout().await?;
//! session.set_email("guest@example.com").await?;
//! let ticket = session.submit_email().await?;
//! assert_eq!(ticket.total, Money::from_rubles(650));
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod metrics;
pub mod seat_map;
pub mod session;
pub mod ticket;
pub mod types;

pub use catalog::{Catalog, DateOption, DateWindow, PriceModel, PricingContext, Showing};
pub use config::Config;
pub use error::{BookingError, ConfigError, SessionError};
pub use seat_map::{SeatNumber, SeatStatus};
pub use session::{
    BookingAction, BookingEnvironment, BookingReducer, BookingSession, BookingState, Notice,
    NoticeId, NoticeKind, SessionSettings, SessionView,
};
pub use ticket::{Ticket, TicketNumber};
pub use types::{CheckoutFlow, Money, Operation, Phase, SeatKey, ShowingId};
