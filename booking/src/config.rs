//! Configuration management for the box office.
//!
//! Loads configuration from environment variables with sensible defaults.
//! The binary calls `dotenvy::dotenv()` first, so a `.env` file works too.

use chrono::{Locale, NaiveDate};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::catalog::{Catalog, DEFAULT_WINDOW_DAYS, DateWindow};
use crate::error::ConfigError;
use crate::session::SessionSettings;
use crate::types::CheckoutFlow;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Cinema programme settings
    pub cinema: CinemaConfig,
    /// Checkout settings
    pub checkout: CheckoutConfig,
    /// Display settings
    pub display: DisplayConfig,
}

/// Cinema programme configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CinemaConfig {
    /// Cinema name shown in headers
    pub name: String,
    /// First bookable date (`YYYY-MM-DD`)
    pub anchor_date: NaiveDate,
    /// Number of bookable days
    pub window_days: u32,
}

/// Checkout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// `email` (collect an address) or `direct`
    pub flow: CheckoutFlow,
    /// Ticket number prefix
    pub ticket_prefix: String,
    /// How long the purchase notice stays up, in seconds
    pub notice_duration_secs: u64,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Locale for date labels, e.g. `ru_RU`
    pub locale: String,
    /// Log filter (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set to a value
    /// that does not parse. Unset variables fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = DateWindow::default();

        Ok(Self {
            cinema: CinemaConfig {
                name: env::var("CINEMA_NAME").unwrap_or_else(|_| "Greenwich Cinema".to_string()),
                anchor_date: parse_var("CINEMA_ANCHOR_DATE", |s| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
                })?
                .unwrap_or(defaults.first()),
                window_days: parse_var("CINEMA_WINDOW_DAYS", |s| s.parse().ok())?
                    .unwrap_or(DEFAULT_WINDOW_DAYS),
            },
            checkout: CheckoutConfig {
                flow: parse_var("CHECKOUT_FLOW", parse_flow)?.unwrap_or_default(),
                ticket_prefix: env::var("TICKET_PREFIX").unwrap_or_else(|_| "GW".to_string()),
                notice_duration_secs: parse_var("NOTICE_DURATION_SECS", |s| s.parse().ok())?
                    .unwrap_or(5),
            },
            display: DisplayConfig {
                locale: env::var("DISPLAY_LOCALE").unwrap_or_else(|_| "ru_RU".to_string()),
                log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            },
        })
    }

    /// Check the values make a usable session
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an empty window, an empty ticket prefix
    /// or an unknown locale.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cinema.window_days == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        if self.checkout.ticket_prefix.is_empty() {
            return Err(ConfigError::EmptyTicketPrefix);
        }
        self.locale()?;
        Ok(())
    }

    /// Display locale
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownLocale`] if the name is not a known locale.
    pub fn locale(&self) -> Result<Locale, ConfigError> {
        Locale::try_from(self.display.locale.as_str())
            .map_err(|_| ConfigError::UnknownLocale(self.display.locale.clone()))
    }

    /// The programme, with the configured name and window
    #[must_use]
    pub fn catalog(&self) -> Catalog {
        let window = DateWindow::new(self.cinema.anchor_date, self.cinema.window_days);
        Catalog::greenwich(window).with_name(self.cinema.name.clone())
    }

    /// Checkout settings for a session
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownLocale`] if the display locale is unknown.
    pub fn session_settings(&self) -> Result<SessionSettings, ConfigError> {
        Ok(SessionSettings {
            flow: self.checkout.flow,
            ticket_prefix: self.checkout.ticket_prefix.clone(),
            notice_duration: Duration::from_secs(self.checkout.notice_duration_secs),
            locale: self.locale()?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        let window = DateWindow::default();
        Self {
            cinema: CinemaConfig {
                name: "Greenwich Cinema".to_string(),
                anchor_date: window.first(),
                window_days: window.days(),
            },
            checkout: CheckoutConfig {
                flow: CheckoutFlow::default(),
                ticket_prefix: "GW".to_string(),
                notice_duration_secs: 5,
            },
            display: DisplayConfig {
                locale: "ru_RU".to_string(),
                log_level: "info".to_string(),
            },
        }
    }
}

fn parse_flow(value: &str) -> Option<CheckoutFlow> {
    match value.trim().to_ascii_lowercase().as_str() {
        "email" | "email_required" => Some(CheckoutFlow::EmailRequired),
        "direct" => Some(CheckoutFlow::Direct),
        _ => None,
    }
}

/// Reads `name`; `Ok(None)` when unset, an error when set but unparsable
fn parse_var<T>(
    name: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => parse(&value)
            .map(Some)
            .ok_or(ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.catalog().name(), "Greenwich Cinema");
        assert_eq!(config.catalog().window().days(), 5);
    }

    #[test]
    fn zero_day_window_is_rejected() {
        let mut config = Config::default();
        config.cinema.window_days = 0;
        assert_eq!(config.validate(), Err(ConfigError::EmptyWindow));
    }

    #[test]
    fn empty_prefix_is_rejected() {
        let mut config = Config::default();
        config.checkout.ticket_prefix = String::new();
        assert_eq!(config.validate(), Err(ConfigError::EmptyTicketPrefix));
    }

    #[test]
    fn unknown_locale_is_rejected() {
        let mut config = Config::default();
        config.display.locale = "xx_XX".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnknownLocale("xx_XX".to_string()))
        );
    }

    #[test]
    fn flow_names() {
        assert_eq!(parse_flow("email"), Some(CheckoutFlow::EmailRequired));
        assert_eq!(parse_flow(" Direct "), Some(CheckoutFlow::Direct));
        assert_eq!(parse_flow("express"), None);
    }

    #[test]
    fn settings_carry_the_notice_duration() {
        let mut config = Config::default();
        config.checkout.notice_duration_secs = 3;
        let settings = config.session_settings();
        assert!(matches!(
            settings,
            Ok(SessionSettings { notice_duration, .. }) if notice_duration == Duration::from_secs(3)
        ));
    }
}
