//! Value objects shared across the booking session.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::seat_map::SeatNumber;

// ============================================================================
// Identifiers
// ============================================================================

/// Catalog key of a showing
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShowingId(u32);

impl ShowingId {
    /// Creates a `ShowingId` from its catalog number
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the catalog number
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ShowingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Identity of one booked seat: a seat, for one showing, on one date
///
/// Within a session each key is booked by at most one purchase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeatKey {
    /// Screening date
    pub date: NaiveDate,
    /// Showing on that date
    pub showing: ShowingId,
    /// Seat in the auditorium
    pub seat: SeatNumber,
}

impl SeatKey {
    /// Creates a seat key
    #[must_use]
    pub const fn new(date: NaiveDate, showing: ShowingId, seat: SeatNumber) -> Self {
        Self {
            date,
            showing,
            seat,
        }
    }
}

impl fmt::Display for SeatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.date, self.showing, self.seat)
    }
}

// ============================================================================
// Money
// ============================================================================

/// Amount in kopecks
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// Zero roubles
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from kopecks
    #[must_use]
    pub const fn from_kopecks(kopecks: u64) -> Self {
        Self(kopecks)
    }

    /// Creates a `Money` value from whole roubles, saturating on overflow
    #[must_use]
    pub const fn from_rubles(rubles: u64) -> Self {
        Self(rubles.saturating_mul(100))
    }

    /// Returns the amount in kopecks
    #[must_use]
    pub const fn kopecks(self) -> u64 {
        self.0
    }

    /// Returns the whole roubles (rounded down)
    #[must_use]
    pub const fn rubles(self) -> u64 {
        self.0 / 100
    }

    /// Price of `quantity` items at this unit price, saturating on overflow
    #[must_use]
    pub const fn times(self, quantity: usize) -> Self {
        Self(self.0.saturating_mul(quantity as u64))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 % 100 {
            0 => write!(f, "{} ₽", self.rubles()),
            kopecks => write!(f, "{}.{kopecks:02} ₽", self.rubles()),
        }
    }
}

// ============================================================================
// Flow
// ============================================================================

/// Where the session is in the purchase flow
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Browsing; no showing open
    #[default]
    Idle,
    /// A showing is open and seats are being picked
    SeatSelection,
    /// Seats chosen, collecting the contact email
    EmailEntry,
    /// Ticket issued; the confirmation is on screen
    Confirmed,
}

impl Phase {
    /// Whether seats may still be added or removed
    #[must_use]
    pub const fn accepts_seat_changes(self) -> bool {
        matches!(self, Self::SeatSelection | Self::EmailEntry)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::SeatSelection => "selecting seats",
            Self::EmailEntry => "entering email",
            Self::Confirmed => "confirmed",
        };
        f.write_str(name)
    }
}

/// Checkout variants
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutFlow {
    /// Seats, then email, then ticket
    #[default]
    EmailRequired,
    /// Seats, then ticket; no contact address is collected
    Direct,
}

/// Session operations, used to report which input was refused
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// `selectDate`
    SelectDate,
    /// `openShowing`
    OpenShowing,
    /// `toggleSeat`
    ToggleSeat,
    /// `setEmail`
    SetEmail,
    /// `proceedToCheckout`
    ProceedToCheckout,
    /// `submitEmail`
    SubmitEmail,
    /// `confirmPurchase`
    ConfirmPurchase,
    /// `closeAll`
    CloseAll,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SelectDate => "select date",
            Self::OpenShowing => "open showing",
            Self::ToggleSeat => "toggle seat",
            Self::SetEmail => "set email",
            Self::ProceedToCheckout => "proceed to checkout",
            Self::SubmitEmail => "submit email",
            Self::ConfirmPurchase => "confirm purchase",
            Self::CloseAll => "close",
        };
        f.write_str(name)
    }
}
