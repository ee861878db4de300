//! Commands and events of the booking session.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::types::{Notice, NoticeId};
use crate::error::BookingError;
use crate::seat_map::SeatNumber;
use crate::ticket::Ticket;
use crate::types::{Operation, ShowingId};

/// Actions for the booking session
///
/// Commands are the inputs the display surface forwards; the reducer checks
/// them and applies the matching event. Events are also what the store
/// broadcasts, so the display surface learns about notices by subscribing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingAction {
    // Commands
    /// Switch the screening date
    SelectDate {
        /// Requested date
        date: NaiveDate,
    },

    /// Open a showing for seat selection
    OpenShowing {
        /// Catalog key
        showing_id: ShowingId,
    },

    /// Add or remove a seat from the selection
    ToggleSeat {
        /// Seat number as clicked; range-checked by the reducer
        seat: u16,
    },

    /// Replace the contact address being typed
    SetEmail {
        /// Raw input
        value: String,
    },

    /// Leave seat selection
    ProceedToCheckout,

    /// Submit the contact address and buy
    SubmitEmail,

    /// Buy the selected seats
    ConfirmPurchase,

    /// Abandon the current flow
    CloseAll,

    // Events
    /// Screening date changed
    DateSelected {
        /// New date
        date: NaiveDate,
    },

    /// Showing opened; selection started afresh
    ShowingOpened {
        /// Catalog key
        showing_id: ShowingId,
    },

    /// Seat added to or removed from the selection
    SeatToggled {
        /// Seat
        seat: SeatNumber,
    },

    /// Contact address edited
    EmailEdited {
        /// Raw input
        value: String,
    },

    /// Seat selection finished; collecting the email
    CheckoutStarted,

    /// Seats booked and ticket issued
    PurchaseConfirmed {
        /// Issued ticket
        ticket: Ticket,
    },

    /// Flow abandoned
    SessionClosed,

    /// Input refused; state unchanged otherwise
    Rejected {
        /// Reason
        error: BookingError,
    },

    /// Notice for the display surface
    NoticeRaised {
        /// Notice
        notice: Notice,
    },

    /// Notice taken down
    NoticeDismissed {
        /// Which notice
        id: NoticeId,
    },
}

impl BookingAction {
    /// Whether this is an input from the display surface
    #[must_use]
    pub const fn is_command(&self) -> bool {
        self.operation().is_some()
    }

    /// Whether this records something that happened
    #[must_use]
    pub const fn is_event(&self) -> bool {
        !self.is_command()
    }

    /// The session operation a command stands for
    #[must_use]
    pub const fn operation(&self) -> Option<Operation> {
        match self {
            Self::SelectDate { .. } => Some(Operation::SelectDate),
            Self::OpenShowing { .. } => Some(Operation::OpenShowing),
            Self::ToggleSeat { .. } => Some(Operation::ToggleSeat),
            Self::SetEmail { .. } => Some(Operation::SetEmail),
            Self::ProceedToCheckout => Some(Operation::ProceedToCheckout),
            Self::SubmitEmail => Some(Operation::SubmitEmail),
            Self::ConfirmPurchase => Some(Operation::ConfirmPurchase),
            Self::CloseAll => Some(Operation::CloseAll),
            _ => None,
        }
    }

    /// Event name for logs
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::DateSelected { .. } => "DateSelected",
            Self::ShowingOpened { .. } => "ShowingOpened",
            Self::SeatToggled { .. } => "SeatToggled",
            Self::EmailEdited { .. } => "EmailEdited",
            Self::CheckoutStarted => "CheckoutStarted",
            Self::PurchaseConfirmed { .. } => "PurchaseConfirmed",
            Self::SessionClosed => "SessionClosed",
            Self::Rejected { .. } => "Rejected",
            Self::NoticeRaised { .. } => "NoticeRaised",
            Self::NoticeDismissed { .. } => "NoticeDismissed",
            _ => "unknown",
        }
    }
}
