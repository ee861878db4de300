//! Auditorium seat grid.
//!
//! The hall is a fixed rectangle of [`ROWS`] rows by [`SEATS_PER_ROW`] seats.
//! Seats are addressed by a single number, counted row by row from the front
//! left: `row * SEATS_PER_ROW + col + 1` with zero-based `row` and `col`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::BookingError;

/// Number of rows in the auditorium
pub const ROWS: u16 = 23;

/// Number of seats in every row
pub const SEATS_PER_ROW: u16 = 20;

/// Total number of seats
pub const CAPACITY: u16 = ROWS * SEATS_PER_ROW;

/// A seat number in `1..=CAPACITY`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct SeatNumber(u16);

impl SeatNumber {
    /// Creates a seat number
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::SeatOutOfRange`] unless `1 <= number <= CAPACITY`.
    pub const fn new(number: u16) -> Result<Self, BookingError> {
        if number >= 1 && number <= CAPACITY {
            Ok(Self(number))
        } else {
            Err(BookingError::SeatOutOfRange { seat: number })
        }
    }

    /// Seat at zero-based `row` and `col`, or `None` outside the grid
    #[must_use]
    pub const fn from_position(row: u16, col: u16) -> Option<Self> {
        if row < ROWS && col < SEATS_PER_ROW {
            Some(Self(row * SEATS_PER_ROW + col + 1))
        } else {
            None
        }
    }

    /// The seat number
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Row label, `1..=ROWS`
    #[must_use]
    pub const fn row(self) -> u16 {
        (self.0 - 1) / SEATS_PER_ROW + 1
    }

    /// Seat label within its row, `1..=SEATS_PER_ROW`
    #[must_use]
    pub const fn seat_in_row(self) -> u16 {
        (self.0 - 1) % SEATS_PER_ROW + 1
    }

    /// Every seat of the auditorium, in number order
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=CAPACITY).map(Self)
    }

    /// Seats of the row labelled `row` (`1..=ROWS`), front left first
    pub fn in_row(row: u16) -> impl Iterator<Item = Self> {
        let cols = if (1..=ROWS).contains(&row) {
            0..SEATS_PER_ROW
        } else {
            0..0
        };
        cols.filter_map(move |col| Self::from_position(row - 1, col))
    }
}

impl TryFrom<u16> for SeatNumber {
    type Error = BookingError;

    fn try_from(number: u16) -> Result<Self, Self::Error> {
        Self::new(number)
    }
}

impl From<SeatNumber> for u16 {
    fn from(seat: SeatNumber) -> Self {
        seat.0
    }
}

impl fmt::Display for SeatNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// How a seat renders for the open showing and date
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeatStatus {
    /// Free to pick
    Available,
    /// In the current selection
    Selected,
    /// Sold earlier in this session; cannot be picked
    Booked,
}
