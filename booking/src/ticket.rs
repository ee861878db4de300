//! Ticket records and ticket numbers.

use boxoffice_core::{DateTime, Utc};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::seat_map::SeatNumber;
use crate::types::{Money, ShowingId};

/// Number of digits after the prefix
pub const SUFFIX_DIGITS: u32 = 8;

const SUFFIX_MODULUS: i64 = 10_i64.pow(SUFFIX_DIGITS);

/// Ticket number: a prefix followed by eight digits, e.g. `GW44800000`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketNumber(String);

impl TicketNumber {
    /// Issues a number derived from `now`
    ///
    /// The suffix is the last eight digits of the Unix time in milliseconds.
    /// While `taken` reports the candidate as already issued, the suffix is
    /// advanced by one (wrapping at 10^8).
    pub fn issue(prefix: &str, now: DateTime<Utc>, taken: impl Fn(&Self) -> bool) -> Self {
        let mut suffix = now.timestamp_millis().rem_euclid(SUFFIX_MODULUS);
        let mut candidate = Self::with_suffix(prefix, suffix);
        // Bounded by the suffix space; a session never issues that many.
        for _ in 0..SUFFIX_MODULUS {
            if !taken(&candidate) {
                break;
            }
            suffix = (suffix + 1) % SUFFIX_MODULUS;
            candidate = Self::with_suffix(prefix, suffix);
        }
        candidate
    }

    fn with_suffix(prefix: &str, suffix: i64) -> Self {
        Self(format!("{prefix}{suffix:08}"))
    }

    /// The ticket number as text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Record of a completed purchase
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique within the session
    pub number: TicketNumber,
    /// Showing the seats were bought for
    pub showing: ShowingId,
    /// Movie title
    pub movie: String,
    /// Screening date
    pub date: NaiveDate,
    /// Screening date as printed, e.g. `8 February 2026`
    pub date_label: String,
    /// Start time as printed, e.g. `9:30`
    pub time: String,
    /// Seats in ascending order
    pub seats: Vec<SeatNumber>,
    /// Contact address; absent in the direct checkout flow
    pub email: Option<String>,
    /// Seat count times the seat price at confirmation
    pub total: Money,
}

impl Ticket {
    /// Seat numbers joined for display, e.g. `12, 45, 46`
    #[must_use]
    pub fn seat_list(&self) -> String {
        self.seats
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    #[test]
    fn suffix_is_last_eight_digits_of_millis() {
        let number = TicketNumber::issue("GW", at(1_770_544_800_000), |_| false);
        assert_eq!(number.as_str(), "GW44800000");
    }

    #[test]
    fn suffix_is_zero_padded() {
        let number = TicketNumber::issue("GW", at(1_700_000_000_042), |_| false);
        assert_eq!(number.as_str(), "GW00000042");
    }

    #[test]
    fn taken_numbers_are_skipped() {
        let issued: HashSet<TicketNumber> = ["GW44800000", "GW44800001"]
            .into_iter()
            .map(|n| TicketNumber(n.to_string()))
            .collect();
        let number = TicketNumber::issue("GW", at(1_770_544_800_000), |n| issued.contains(n));
        assert_eq!(number.as_str(), "GW44800002");
    }

    #[test]
    fn suffix_wraps_around() {
        let number = TicketNumber::issue("X", at(99_999_999), |n| n.as_str() == "X99999999");
        assert_eq!(number.as_str(), "X00000000");
    }

    #[test]
    fn seat_list_joins_numbers() {
        let ticket = Ticket {
            number: TicketNumber("GW1".to_string()),
            showing: ShowingId::new(1),
            movie: "Буратино".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 2, 8).unwrap(),
            date_label: "8 February 2026".to_string(),
            time: "16:00".to_string(),
            seats: [12, 45, 46].map(|n| SeatNumber::new(n).unwrap()).to_vec(),
            email: None,
            total: Money::from_rubles(1350),
        };
        assert_eq!(ticket.seat_list(), "12, 45, 46");
    }
}
