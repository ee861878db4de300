//! Read model handed to the display surface.

use chrono::{Locale, NaiveDate};
use serde::{Deserialize, Serialize};

use super::types::{BookingState, Notice};
use crate::catalog::{Catalog, DateOption, Showing};
use crate::seat_map::{ROWS, SeatNumber, SeatStatus};
use crate::ticket::Ticket;
use crate::types::{Money, Phase};

/// One seat as rendered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatCell {
    /// Seat
    pub seat: SeatNumber,
    /// Tri-state for highlighting
    pub status: SeatStatus,
}

/// One row of the auditorium as rendered
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatRow {
    /// Row label, front row is 1
    pub row: u16,
    /// Seats left to right
    pub seats: Vec<SeatCell>,
}

/// Everything the display surface renders
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    /// Cinema name
    pub cinema: String,
    /// Where the flow is
    pub phase: Phase,
    /// Bookable dates with labels
    pub dates: Vec<DateOption>,
    /// Date in view
    pub selected_date: NaiveDate,
    /// Programme
    pub showings: Vec<Showing>,
    /// Open showing
    pub selected_showing: Option<Showing>,
    /// Selection in ascending order
    pub selected_seats: Vec<SeatNumber>,
    /// Seat grid; empty while no showing is open
    pub seat_rows: Vec<SeatRow>,
    /// Selected seat count times the seat price
    pub running_total: Money,
    /// Contact address being typed
    pub pending_email: String,
    /// Confirmation snapshot, while the confirmation is on screen
    pub ticket: Option<Ticket>,
    /// Notices currently up
    pub notices: Vec<Notice>,
}

impl SessionView {
    /// Renders `state` against `catalog`
    #[must_use]
    pub fn new(state: &BookingState, catalog: &Catalog, locale: Locale) -> Self {
        let selected_showing = state
            .selected_showing
            .and_then(|id| catalog.find(id))
            .cloned();

        let seat_rows = if selected_showing.is_some() {
            (1..=ROWS)
                .map(|row| SeatRow {
                    row,
                    seats: SeatNumber::in_row(row)
                        .map(|seat| SeatCell {
                            seat,
                            status: state.seat_status(seat),
                        })
                        .collect(),
                })
                .collect()
        } else {
            Vec::new()
        };

        let ticket = if state.phase == Phase::Confirmed {
            state.last_ticket().cloned()
        } else {
            None
        };

        Self {
            cinema: catalog.name().to_string(),
            phase: state.phase,
            dates: catalog.window().options(locale),
            selected_date: state.selected_date,
            showings: catalog.showings().to_vec(),
            selected_showing,
            selected_seats: state.selected_seats.iter().copied().collect(),
            seat_rows,
            running_total: state.running_total(catalog),
            pending_email: state.pending_email.clone(),
            ticket,
            notices: state.notices.clone(),
        }
    }

    /// Status of one seat, `None` while no showing is open
    #[must_use]
    pub fn seat_status(&self, seat: SeatNumber) -> Option<SeatStatus> {
        self.seat_rows
            .get(usize::from(seat.row() - 1))
            .and_then(|row| row.seats.get(usize::from(seat.seat_in_row() - 1)))
            .map(|cell| cell.status)
    }
}
