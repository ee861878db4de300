//! Typed handle over the booking store.

use boxoffice_runtime::Store;
use chrono::{Locale, NaiveDate};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use super::actions::BookingAction;
use super::environment::BookingEnvironment;
use super::reducer::BookingReducer;
use super::types::BookingState;
use super::view::SessionView;
use crate::catalog::Catalog;
use crate::error::{BookingError, SessionError};
use crate::metrics;
use crate::seat_map::{SeatNumber, SeatStatus};
use crate::ticket::Ticket;
use crate::types::{Operation, Phase, ShowingId};

/// Store running the booking reducer
pub type BookingStore = Store<BookingState, BookingAction, BookingEnvironment, BookingReducer>;

/// One booking session
///
/// Each call sends a command and reports whether the session accepted it.
/// The outcome is read right after the command is reduced, so a session is
/// meant to be driven by one display surface at a time.
#[derive(Clone)]
pub struct BookingSession {
    store: BookingStore,
    catalog: Arc<Catalog>,
    locale: Locale,
}

impl BookingSession {
    /// Starts a session viewing the first bookable date
    #[must_use]
    pub fn new(environment: BookingEnvironment) -> Self {
        let catalog = Arc::clone(&environment.catalog);
        let locale = environment.settings.locale;
        let state = BookingState::new(catalog.window().first());

        Self {
            store: Store::new(state, BookingReducer::new(), environment),
            catalog,
            locale,
        }
    }

    /// The underlying store
    #[must_use]
    pub const fn store(&self) -> &BookingStore {
        &self.store
    }

    /// The programme this session books against
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Switch the screening date
    ///
    /// # Errors
    ///
    /// [`BookingError::DateOutOfWindow`] for a date outside the window.
    pub async fn select_date(&self, date: NaiveDate) -> Result<(), SessionError> {
        self.dispatch(BookingAction::SelectDate { date }, |_| ()).await
    }

    /// Open a showing for seat selection, discarding any previous selection
    ///
    /// # Errors
    ///
    /// [`BookingError::UnknownShowing`] if the showing is not in the catalog.
    pub async fn open_showing(&self, showing_id: ShowingId) -> Result<(), SessionError> {
        self.dispatch(BookingAction::OpenShowing { showing_id }, |_| ())
            .await
    }

    /// Toggle a seat and return how it renders afterwards
    ///
    /// Booked seats are left alone and report [`SeatStatus::Booked`].
    ///
    /// # Errors
    ///
    /// [`BookingError::SeatOutOfRange`] or [`BookingError::InvalidPhase`].
    pub async fn toggle_seat(&self, seat: u16) -> Result<SeatStatus, SessionError> {
        let status = self
            .dispatch(BookingAction::ToggleSeat { seat }, |state| {
                SeatNumber::new(seat).map(|seat| state.seat_status(seat))
            })
            .await?;
        Ok(status?)
    }

    /// Replace the contact address being typed
    ///
    /// # Errors
    ///
    /// [`BookingError::InvalidPhase`] outside the email step.
    pub async fn set_email(&self, value: impl Into<String>) -> Result<(), SessionError> {
        let value = value.into();
        self.dispatch(BookingAction::SetEmail { value }, |_| ())
            .await
    }

    /// Leave seat selection
    ///
    /// Returns the ticket when the direct flow confirms the purchase right
    /// away, `None` when the email step follows.
    ///
    /// # Errors
    ///
    /// [`BookingError::EmptySelection`] with no seats selected.
    pub async fn proceed_to_checkout(&self) -> Result<Option<Ticket>, SessionError> {
        let ticket = self
            .dispatch(BookingAction::ProceedToCheckout, |state| {
                confirmed_ticket(state, Operation::ProceedToCheckout).ok()
            })
            .await?;
        if let Some(ticket) = &ticket {
            metrics::record_ticket_issued(ticket);
        }
        Ok(ticket)
    }

    /// Submit the contact address and buy the selected seats
    ///
    /// # Errors
    ///
    /// [`BookingError::InvalidEmail`] if the address has no `@`.
    pub async fn submit_email(&self) -> Result<Ticket, SessionError> {
        let ticket = self
            .dispatch(BookingAction::SubmitEmail, |state| {
                confirmed_ticket(state, Operation::SubmitEmail)
            })
            .await??;
        metrics::record_ticket_issued(&ticket);
        Ok(ticket)
    }

    /// Buy the selected seats
    ///
    /// # Errors
    ///
    /// [`BookingError::EmptySelection`] with no seats selected, or
    /// [`BookingError::InvalidEmail`] in the email step with a bad address.
    pub async fn confirm_purchase(&self) -> Result<Ticket, SessionError> {
        let ticket = self
            .dispatch(BookingAction::ConfirmPurchase, |state| {
                confirmed_ticket(state, Operation::ConfirmPurchase)
            })
            .await??;
        metrics::record_ticket_issued(&ticket);
        Ok(ticket)
    }

    /// Abandon the current flow; booked seats stay booked
    ///
    /// # Errors
    ///
    /// Fails only if the store is shutting down.
    pub async fn close_all(&self) -> Result<(), SessionError> {
        self.dispatch(BookingAction::CloseAll, |_| ()).await
    }

    /// Everything the display surface renders
    pub async fn view(&self) -> SessionView {
        self.store
            .state(|state| SessionView::new(state, &self.catalog, self.locale))
            .await
    }

    /// Read the session state via a closure
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&BookingState) -> T,
    {
        self.store.state(f).await
    }

    /// Subscribe to effect-produced actions (notices and their dismissal)
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BookingAction> {
        self.store.subscribe_actions()
    }

    /// Stop accepting input and wait for pending notices to finish
    ///
    /// # Errors
    ///
    /// Returns a store error if effects are still running after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), SessionError> {
        Ok(self.store.shutdown(timeout).await?)
    }

    /// Sends `action`, then reads the refusal (if any) and `read` under one lock
    async fn dispatch<T>(
        &self,
        action: BookingAction,
        read: impl FnOnce(&BookingState) -> T,
    ) -> Result<T, SessionError> {
        self.store.send(action).await?;
        let outcome = self
            .store
            .state(|state| match state.last_rejection {
                Some(error) => Err(error),
                None => Ok(read(state)),
            })
            .await;
        outcome.map_err(|error| {
            metrics::record_rejection(&error);
            SessionError::Rejected(error)
        })
    }
}

fn confirmed_ticket(state: &BookingState, operation: Operation) -> Result<Ticket, BookingError> {
    match (state.phase, state.last_ticket()) {
        (Phase::Confirmed, Some(ticket)) => Ok(ticket.clone()),
        (phase, _) => Err(BookingError::InvalidPhase { operation, phase }),
    }
}
