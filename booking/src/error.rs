//! Error types for the booking session.

use boxoffice_runtime::StoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Operation, Phase, ShowingId};

/// Why the session refused an input
///
/// Every variant is recoverable: the session state is left exactly as it was
/// before the refused input. `EmptySelection` and `InvalidEmail` are meant for
/// the user; the others flag a display surface sending input it should not.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingError {
    /// No seats chosen when advancing past seat selection
    #[error("Choose at least one seat")]
    EmptySelection,

    /// Contact address is empty or has no `@`
    #[error("Enter a valid email address")]
    InvalidEmail,

    /// Showing is not in the catalog
    #[error("Unknown showing: {showing}")]
    UnknownShowing {
        /// Requested showing
        showing: ShowingId,
    },

    /// Seat number outside the auditorium
    #[error("Seat {seat} is outside the auditorium")]
    SeatOutOfRange {
        /// Requested seat number
        seat: u16,
    },

    /// Date outside the bookable window
    #[error("Date {date} is outside the booking window")]
    DateOutOfWindow {
        /// Requested date
        date: NaiveDate,
    },

    /// Operation not accepted in the current phase
    #[error("Cannot {operation} while {phase}")]
    InvalidPhase {
        /// Refused operation
        operation: Operation,
        /// Phase the session was in
        phase: Phase,
    },
}

impl BookingError {
    /// Whether the display surface should show this to the user as a notice
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(self, Self::EmptySelection | Self::InvalidEmail)
    }

    /// Stable reason code, used as a metric label
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptySelection => "empty_selection",
            Self::InvalidEmail => "invalid_email",
            Self::UnknownShowing { .. } => "unknown_showing",
            Self::SeatOutOfRange { .. } => "seat_out_of_range",
            Self::DateOutOfWindow { .. } => "date_out_of_window",
            Self::InvalidPhase { .. } => "invalid_phase",
        }
    }
}

/// Failure of a [`BookingSession`](crate::BookingSession) call
#[derive(Error, Debug)]
pub enum SessionError {
    /// The session refused the input
    #[error(transparent)]
    Rejected(#[from] BookingError),

    /// The store behind the session failed
    #[error("Session store error: {0}")]
    Store(#[from] StoreError),
}

impl SessionError {
    /// The refusal reason, if the session refused the input
    #[must_use]
    pub const fn rejection(&self) -> Option<&BookingError> {
        match self {
            Self::Rejected(error) => Some(error),
            Self::Store(_) => None,
        }
    }
}

/// Invalid configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("Invalid value for {name}: {value}")]
    InvalidValue {
        /// Environment variable
        name: &'static str,
        /// Value found
        value: String,
    },

    /// The booking window has no days
    #[error("Booking window must contain at least one day")]
    EmptyWindow,

    /// The ticket prefix is empty
    #[error("Ticket prefix must not be empty")]
    EmptyTicketPrefix,

    /// The display locale is not known
    #[error("Unknown display locale: {0}")]
    UnknownLocale(String),
}
