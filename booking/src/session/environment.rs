//! Dependencies injected into the booking reducer.

use boxoffice_core::environment::Clock;
use chrono::Locale;
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::Catalog;
use crate::types::CheckoutFlow;

/// Checkout behaviour of a session
#[derive(Clone, Debug)]
pub struct SessionSettings {
    /// Whether an email step sits between seat selection and the ticket
    pub flow: CheckoutFlow,
    /// Ticket number prefix
    pub ticket_prefix: String,
    /// How long the purchase notice stays up
    pub notice_duration: Duration,
    /// Locale for printed dates
    pub locale: Locale,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            flow: CheckoutFlow::EmailRequired,
            ticket_prefix: "GW".to_string(),
            notice_duration: Duration::from_secs(5),
            locale: Locale::ru_RU,
        }
    }
}

/// Environment for the booking reducer
#[derive(Clone)]
pub struct BookingEnvironment {
    /// Source of ticket numbers
    pub clock: Arc<dyn Clock>,
    /// Showings and dates
    pub catalog: Arc<Catalog>,
    /// Checkout behaviour
    pub settings: SessionSettings,
}

impl BookingEnvironment {
    /// Creates a new `BookingEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, catalog: Arc<Catalog>, settings: SessionSettings) -> Self {
        Self {
            clock,
            catalog,
            settings,
        }
    }
}
