//! Showings and the bookable date window.
//!
//! The catalog is built once at startup and never changes while a session
//! runs. Prices are a capability of the showing ([`Showing::price_for`]), so
//! flat and time-of-day pricing plug in without the session knowing which one
//! is in use.

use chrono::{Locale, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::BookingError;
use crate::types::{Money, ShowingId};

/// Default anchor date of the booking window
pub const DEFAULT_ANCHOR: (i32, u32, u32) = (2026, 2, 8);

/// Default number of bookable days
pub const DEFAULT_WINDOW_DAYS: u32 = 5;

// ============================================================================
// Pricing
// ============================================================================

/// What a price may depend on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PricingContext {
    /// Screening date
    pub date: NaiveDate,
    /// Start time of the showing
    pub start_time: NaiveTime,
}

/// Price per seat
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceModel {
    /// Same price for every screening
    Flat(Money),
    /// Showings starting before `cutoff` cost `before`, the rest cost `after`
    TimeOfDay {
        /// Price of earlier showings
        before: Money,
        /// Price from `cutoff` on
        after: Money,
        /// First start time charged `after`
        cutoff: NaiveTime,
    },
}

impl PriceModel {
    /// Seat price in the given context
    #[must_use]
    pub fn price_for(&self, context: &PricingContext) -> Money {
        match *self {
            Self::Flat(price) => price,
            Self::TimeOfDay {
                before,
                after,
                cutoff,
            } => {
                if context.start_time < cutoff {
                    before
                } else {
                    after
                }
            },
        }
    }
}

// ============================================================================
// Showings
// ============================================================================

/// A scheduled screening
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Showing {
    /// Catalog key
    pub id: ShowingId,
    /// Movie title
    pub title: String,
    /// Local start time
    pub start_time: NaiveTime,
    /// Seat price
    pub price: PriceModel,
}

impl Showing {
    /// Creates a showing
    pub fn new(id: u32, title: impl Into<String>, start_time: NaiveTime, price: PriceModel) -> Self {
        Self {
            id: ShowingId::new(id),
            title: title.into(),
            start_time,
            price,
        }
    }

    /// Seat price on `date`
    #[must_use]
    pub fn price_for(&self, date: NaiveDate) -> Money {
        self.price.price_for(&PricingContext {
            date,
            start_time: self.start_time,
        })
    }

    /// Start time as shown on screen, e.g. `9:30`
    #[must_use]
    pub fn start_label(&self) -> String {
        self.start_time.format("%-H:%M").to_string()
    }
}

// ============================================================================
// Dates
// ============================================================================

/// A bookable date with its display labels
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOption {
    /// Calendar date
    pub date: NaiveDate,
    /// Short label, e.g. `8 Feb`
    pub label: String,
    /// Weekday label, e.g. `Sun`
    pub weekday: String,
}

/// Consecutive bookable days starting at an anchor date
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    anchor: NaiveDate,
    days: u32,
}

impl DateWindow {
    /// Creates a window of `days` days starting at `anchor`
    #[must_use]
    pub const fn new(anchor: NaiveDate, days: u32) -> Self {
        Self { anchor, days }
    }

    /// First bookable date
    #[must_use]
    pub const fn first(&self) -> NaiveDate {
        self.anchor
    }

    /// Number of bookable days
    #[must_use]
    pub const fn days(&self) -> u32 {
        self.days
    }

    /// Whether `date` can be booked
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        let offset = date.signed_duration_since(self.anchor).num_days();
        offset >= 0 && offset < i64::from(self.days)
    }

    /// Bookable dates in order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        self.anchor.iter_days().take(self.days as usize)
    }

    /// Bookable dates with labels rendered in `locale`
    #[must_use]
    pub fn options(&self, locale: Locale) -> Vec<DateOption> {
        self.dates()
            .map(|date| DateOption {
                date,
                label: format_date(date, "%-d %b", locale),
                weekday: format_date(date, "%a", locale),
            })
            .collect()
    }
}

impl Default for DateWindow {
    fn default() -> Self {
        let (year, month, day) = DEFAULT_ANCHOR;
        let anchor = NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default();
        Self::new(anchor, DEFAULT_WINDOW_DAYS)
    }
}

/// Date as printed on a ticket, e.g. `8 February 2026`
#[must_use]
pub fn ticket_date(date: NaiveDate, locale: Locale) -> String {
    format_date(date, "%-d %B %Y", locale)
}

fn format_date(date: NaiveDate, pattern: &str, locale: Locale) -> String {
    date.and_time(NaiveTime::MIN)
        .and_utc()
        .format_localized(pattern, locale)
        .to_string()
}

// ============================================================================
// Catalog
// ============================================================================

/// The cinema's programme
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    name: String,
    showings: Vec<Showing>,
    window: DateWindow,
}

impl Catalog {
    /// Creates a catalog
    pub fn new(name: impl Into<String>, showings: Vec<Showing>, window: DateWindow) -> Self {
        Self {
            name: name.into(),
            showings,
            window,
        }
    }

    /// The Greenwich Cinema programme: eight daily showings at flat prices
    #[must_use]
    pub fn greenwich(window: DateWindow) -> Self {
        let at = |hour, minute| NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
        let flat = |rubles| PriceModel::Flat(Money::from_rubles(rubles));

        Self::new(
            "Greenwich Cinema",
            vec![
                Showing::new(1, "Зверополис 2", at(9, 30), flat(650)),
                Showing::new(2, "Чебурашка 2", at(11, 55), flat(450)),
                Showing::new(3, "Гренландия 2: Миграция", at(14, 5), flat(450)),
                Showing::new(4, "Буратино", at(16, 0), flat(450)),
                Showing::new(5, "Папины дочки: Мама вернулась", at(18, 5), flat(450)),
                Showing::new(6, "Зверополис 2", at(20, 10), flat(650)),
                Showing::new(7, "Возвращение в Сайлент-Хилл", at(22, 15), flat(650)),
                Showing::new(8, "Убежище", at(0, 20), flat(650)),
            ],
            window,
        )
    }

    /// Replaces the cinema name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Cinema name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Showings in programme order
    #[must_use]
    pub fn showings(&self) -> &[Showing] {
        &self.showings
    }

    /// Bookable dates
    #[must_use]
    pub const fn window(&self) -> &DateWindow {
        &self.window
    }

    /// Looks up a showing
    #[must_use]
    pub fn find(&self, id: ShowingId) -> Option<&Showing> {
        self.showings.iter().find(|showing| showing.id == id)
    }

    /// Looks up a showing that must exist
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::UnknownShowing`] if `id` is not in the catalog.
    pub fn require(&self, id: ShowingId) -> Result<&Showing, BookingError> {
        self.find(id)
            .ok_or(BookingError::UnknownShowing { showing: id })
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::greenwich(DateWindow::default())
    }
}
