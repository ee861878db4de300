//! Session state and notices.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::catalog::Catalog;
use crate::error::BookingError;
use crate::seat_map::{SeatNumber, SeatStatus};
use crate::ticket::{Ticket, TicketNumber};
use crate::types::{Money, Phase, SeatKey, ShowingId};

// ============================================================================
// Notices
// ============================================================================

/// Identifies a notice so it can be dismissed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoticeId(u64);

impl NoticeId {
    /// Creates a `NoticeId`
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// What a notice reports
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeKind {
    /// Checkout attempted with no seats
    EmptySelection,
    /// Contact address refused
    InvalidEmail,
    /// Ticket issued
    PurchaseConfirmed {
        /// Issued ticket number
        ticket_number: TicketNumber,
        /// Where the ticket was "sent"
        email: Option<String>,
    },
}

/// A transient message for the user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Dismissal handle
    pub id: NoticeId,
    /// Content
    pub kind: NoticeKind,
}

impl Notice {
    /// Notice for a refusal the user should see, if it is one
    #[must_use]
    pub const fn for_rejection(id: NoticeId, error: &BookingError) -> Option<Self> {
        let kind = match error {
            BookingError::EmptySelection => NoticeKind::EmptySelection,
            BookingError::InvalidEmail => NoticeKind::InvalidEmail,
            _ => return None,
        };
        Some(Self { id, kind })
    }

    /// Whether this reports a failure
    #[must_use]
    pub const fn is_error(&self) -> bool {
        !matches!(self.kind, NoticeKind::PurchaseConfirmed { .. })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NoticeKind::EmptySelection => f.write_str("Choose at least one seat"),
            NoticeKind::InvalidEmail => f.write_str("Enter a valid email address"),
            NoticeKind::PurchaseConfirmed {
                ticket_number,
                email: Some(email),
            } => write!(f, "Ticket {ticket_number} sent to {email}"),
            NoticeKind::PurchaseConfirmed {
                ticket_number,
                email: None,
            } => write!(f, "Ticket {ticket_number} issued"),
        }
    }
}

// ============================================================================
// State
// ============================================================================

/// State of one booking session
///
/// Owned by a single store; nothing here is shared between sessions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BookingState {
    /// Where the flow is
    pub phase: Phase,
    /// Screening date in view
    pub selected_date: NaiveDate,
    /// Open showing; `None` while idle
    pub selected_showing: Option<ShowingId>,
    /// Tentatively chosen seats
    pub selected_seats: BTreeSet<SeatNumber>,
    /// Seats sold by purchases completed in this session
    pub booked_seats: HashSet<SeatKey>,
    /// Contact address being typed
    pub pending_email: String,
    /// Tickets issued in this session, oldest first
    pub tickets: Vec<Ticket>,
    /// Why the last command was refused; cleared by the next command
    pub last_rejection: Option<BookingError>,
    /// Notices currently up
    pub notices: Vec<Notice>,
    next_notice: u64,
}

impl BookingState {
    /// Fresh session viewing `first_date`
    #[must_use]
    pub fn new(first_date: NaiveDate) -> Self {
        Self {
            phase: Phase::Idle,
            selected_date: first_date,
            selected_showing: None,
            selected_seats: BTreeSet::new(),
            booked_seats: HashSet::new(),
            pending_email: String::new(),
            tickets: Vec::new(),
            last_rejection: None,
            notices: Vec::new(),
            next_notice: 1,
        }
    }

    /// Booking key of `seat` for the open showing and selected date
    #[must_use]
    pub fn active_key(&self, seat: SeatNumber) -> Option<SeatKey> {
        self.selected_showing
            .map(|showing| SeatKey::new(self.selected_date, showing, seat))
    }

    /// Whether `seat` is sold for the open showing and selected date
    #[must_use]
    pub fn is_booked(&self, seat: SeatNumber) -> bool {
        self.active_key(seat)
            .is_some_and(|key| self.booked_seats.contains(&key))
    }

    /// Whether `seat` is in the current selection
    #[must_use]
    pub fn is_selected(&self, seat: SeatNumber) -> bool {
        self.selected_seats.contains(&seat)
    }

    /// How `seat` renders
    #[must_use]
    pub fn seat_status(&self, seat: SeatNumber) -> SeatStatus {
        if self.is_booked(seat) {
            SeatStatus::Booked
        } else if self.is_selected(seat) {
            SeatStatus::Selected
        } else {
            SeatStatus::Available
        }
    }

    /// Selected seat count times the open showing's price on the selected date
    #[must_use]
    pub fn running_total(&self, catalog: &Catalog) -> Money {
        self.selected_showing
            .and_then(|id| catalog.find(id))
            .map_or(Money::ZERO, |showing| {
                showing
                    .price_for(self.selected_date)
                    .times(self.selected_seats.len())
            })
    }

    /// The most recent ticket
    #[must_use]
    pub fn last_ticket(&self) -> Option<&Ticket> {
        self.tickets.last()
    }

    /// Whether `number` was already issued in this session
    #[must_use]
    pub fn has_issued(&self, number: &TicketNumber) -> bool {
        self.tickets.iter().any(|ticket| &ticket.number == number)
    }

    /// Reserves the next notice id
    pub(crate) fn allocate_notice_id(&mut self) -> NoticeId {
        let id = NoticeId(self.next_notice);
        self.next_notice += 1;
        id
    }
}
