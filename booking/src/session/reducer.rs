//! Reducer for the booking session.
//!
//! Commands are checked against the state and the catalog. An accepted
//! command is turned into its event and applied; a refused one records a
//! `Rejected` event and, for refusals the user should see, raises a notice
//! that comes down again after the configured duration.
//! A purchase applies all of its changes in a single event, so a refused
//! purchase leaves the booked seats untouched.

use boxoffice_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};

use super::actions::BookingAction;
use super::environment::BookingEnvironment;
use super::types::{BookingState, Notice, NoticeKind};
use crate::catalog::ticket_date;
use crate::error::BookingError;
use crate::seat_map::SeatNumber;
use crate::ticket::{Ticket, TicketNumber};
use crate::types::{CheckoutFlow, Operation, Phase, SeatKey};

type Effects = SmallVec<[Effect<BookingAction>; 4]>;

/// Reducer for the booking session
#[derive(Clone, Debug, Default)]
pub struct BookingReducer;

impl BookingReducer {
    /// Creates a new `BookingReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Applies an event to state
    fn apply_event(state: &mut BookingState, action: &BookingAction) {
        match action {
            BookingAction::DateSelected { date } => {
                state.selected_date = *date;
                // Seats sold under the new date cannot stay selected
                let sold: Vec<SeatNumber> = state
                    .selected_seats
                    .iter()
                    .copied()
                    .filter(|seat| state.is_booked(*seat))
                    .collect();
                for seat in sold {
                    state.selected_seats.remove(&seat);
                }
            },
            BookingAction::ShowingOpened { showing_id } => {
                state.selected_showing = Some(*showing_id);
                state.selected_seats.clear();
                state.pending_email.clear();
                state.phase = Phase::SeatSelection;
            },
            BookingAction::SeatToggled { seat } => {
                if !state.selected_seats.remove(seat) {
                    state.selected_seats.insert(*seat);
                }
            },
            BookingAction::EmailEdited { value } => {
                state.pending_email.clone_from(value);
            },
            BookingAction::CheckoutStarted => {
                state.phase = Phase::EmailEntry;
            },
            BookingAction::PurchaseConfirmed { ticket } => {
                state.booked_seats.extend(
                    ticket
                        .seats
                        .iter()
                        .map(|seat| SeatKey::new(ticket.date, ticket.showing, *seat)),
                );
                state.tickets.push(ticket.clone());
                state.selected_seats.clear();
                state.pending_email.clear();
                state.phase = Phase::Confirmed;
            },
            BookingAction::SessionClosed => {
                state.phase = Phase::Idle;
                state.selected_showing = None;
                state.selected_seats.clear();
                state.pending_email.clear();
            },
            BookingAction::Rejected { error } => {
                state.last_rejection = Some(*error);
            },
            BookingAction::NoticeRaised { notice } => {
                state.notices.push(notice.clone());
            },
            BookingAction::NoticeDismissed { id } => {
                state.notices.retain(|notice| notice.id != *id);
            },
            // Commands don't modify state directly
            BookingAction::SelectDate { .. }
            | BookingAction::OpenShowing { .. }
            | BookingAction::ToggleSeat { .. }
            | BookingAction::SetEmail { .. }
            | BookingAction::ProceedToCheckout
            | BookingAction::SubmitEmail
            | BookingAction::ConfirmPurchase
            | BookingAction::CloseAll => {},
        }
    }

    fn require_phase(
        state: &BookingState,
        operation: Operation,
        allowed: impl Fn(Phase) -> bool,
    ) -> Result<(), BookingError> {
        if allowed(state.phase) {
            Ok(())
        } else {
            Err(BookingError::InvalidPhase {
                operation,
                phase: state.phase,
            })
        }
    }

    fn require_selection(state: &BookingState) -> Result<(), BookingError> {
        if state.selected_seats.is_empty() {
            Err(BookingError::EmptySelection)
        } else {
            Ok(())
        }
    }

    /// Weak syntactic check: the address must contain `@`
    fn validate_email(value: &str) -> Result<(), BookingError> {
        if value.contains('@') {
            Ok(())
        } else {
            Err(BookingError::InvalidEmail)
        }
    }

    /// Puts `notice` up and takes it down after the configured duration
    fn raise_notice(notice: Notice, env: &BookingEnvironment) -> Effects {
        let dismiss = BookingAction::NoticeDismissed { id: notice.id };
        smallvec![
            Effect::send(BookingAction::NoticeRaised { notice }),
            Effect::Delay {
                duration: env.settings.notice_duration,
                action: Box::new(dismiss),
            },
        ]
    }

    /// Records a refusal and raises a notice if the user should see it
    fn reject(
        state: &mut BookingState,
        env: &BookingEnvironment,
        operation: Operation,
        error: BookingError,
    ) -> Effects {
        tracing::debug!(%operation, reason = error.code(), phase = %state.phase, "Input rejected");
        Self::apply_event(state, &BookingAction::Rejected { error });

        if !error.is_user_facing() {
            return SmallVec::new();
        }
        let id = state.allocate_notice_id();
        Notice::for_rejection(id, &error)
            .map_or_else(SmallVec::new, |notice| Self::raise_notice(notice, env))
    }

    /// Builds the ticket for the current selection without touching state
    fn issue_ticket(
        state: &BookingState,
        env: &BookingEnvironment,
        operation: Operation,
        email: Option<String>,
    ) -> Result<Ticket, BookingError> {
        Self::require_selection(state)?;
        let showing_id = state.selected_showing.ok_or(BookingError::InvalidPhase {
            operation,
            phase: state.phase,
        })?;
        let showing = env.catalog.require(showing_id)?;

        let seats: Vec<SeatNumber> = state.selected_seats.iter().copied().collect();
        // Price is looked up now, not when the seats were picked
        let total = showing.price_for(state.selected_date).times(seats.len());
        let number = TicketNumber::issue(&env.settings.ticket_prefix, env.clock.now(), |n| {
            state.has_issued(n)
        });

        Ok(Ticket {
            number,
            showing: showing.id,
            movie: showing.title.clone(),
            date: state.selected_date,
            date_label: ticket_date(state.selected_date, env.settings.locale),
            time: showing.start_label(),
            seats,
            email,
            total,
        })
    }

    /// Books the selection, then raises the purchase notice and schedules its dismissal
    fn complete_purchase(
        state: &mut BookingState,
        env: &BookingEnvironment,
        operation: Operation,
        email: Option<String>,
    ) -> Result<Effects, BookingError> {
        let ticket = Self::issue_ticket(state, env, operation, email)?;

        tracing::info!(
            ticket = %ticket.number,
            showing = %ticket.showing,
            date = %ticket.date,
            seats = ticket.seats.len(),
            total = %ticket.total,
            "Ticket issued"
        );

        let notice = Notice {
            id: state.allocate_notice_id(),
            kind: NoticeKind::PurchaseConfirmed {
                ticket_number: ticket.number.clone(),
                email: ticket.email.clone(),
            },
        };
        Self::apply_event(state, &BookingAction::PurchaseConfirmed { ticket });

        Ok(Self::raise_notice(notice, env))
    }

    fn handle_command(
        state: &mut BookingState,
        action: BookingAction,
        env: &BookingEnvironment,
    ) -> Result<Effects, BookingError> {
        match action {
            BookingAction::SelectDate { date } => {
                if !env.catalog.window().contains(date) {
                    return Err(BookingError::DateOutOfWindow { date });
                }
                Self::apply_event(state, &BookingAction::DateSelected { date });
                Ok(SmallVec::new())
            },

            BookingAction::OpenShowing { showing_id } => {
                let showing = env.catalog.require(showing_id)?;
                tracing::debug!(showing = %showing.id, title = %showing.title, "Showing opened");
                Self::apply_event(state, &BookingAction::ShowingOpened { showing_id });
                Ok(SmallVec::new())
            },

            BookingAction::ToggleSeat { seat } => {
                let seat = SeatNumber::new(seat)?;
                Self::require_phase(state, Operation::ToggleSeat, Phase::accepts_seat_changes)?;
                if state.is_booked(seat) {
                    tracing::trace!(%seat, "Booked seat ignored");
                    return Ok(SmallVec::new());
                }
                Self::apply_event(state, &BookingAction::SeatToggled { seat });
                Ok(SmallVec::new())
            },

            BookingAction::SetEmail { value } => {
                Self::require_phase(state, Operation::SetEmail, |phase| {
                    phase == Phase::EmailEntry
                })?;
                Self::apply_event(state, &BookingAction::EmailEdited { value });
                Ok(SmallVec::new())
            },

            BookingAction::ProceedToCheckout => {
                Self::require_phase(state, Operation::ProceedToCheckout, |phase| {
                    phase == Phase::SeatSelection
                })?;
                Self::require_selection(state)?;
                match env.settings.flow {
                    CheckoutFlow::EmailRequired => {
                        Self::apply_event(state, &BookingAction::CheckoutStarted);
                        Ok(SmallVec::new())
                    },
                    CheckoutFlow::Direct => {
                        Self::complete_purchase(state, env, Operation::ProceedToCheckout, None)
                    },
                }
            },

            BookingAction::SubmitEmail => {
                Self::require_phase(state, Operation::SubmitEmail, |phase| {
                    phase == Phase::EmailEntry
                })?;
                Self::validate_email(&state.pending_email)?;
                let email = state.pending_email.clone();
                Self::complete_purchase(state, env, Operation::SubmitEmail, Some(email))
            },

            BookingAction::ConfirmPurchase => {
                Self::require_selection(state)?;
                let email = match (env.settings.flow, state.phase) {
                    (CheckoutFlow::EmailRequired, Phase::EmailEntry) => {
                        Self::validate_email(&state.pending_email)?;
                        Some(state.pending_email.clone())
                    },
                    (CheckoutFlow::Direct, Phase::SeatSelection) => None,
                    (_, phase) => {
                        return Err(BookingError::InvalidPhase {
                            operation: Operation::ConfirmPurchase,
                            phase,
                        });
                    },
                };
                Self::complete_purchase(state, env, Operation::ConfirmPurchase, email)
            },

            BookingAction::CloseAll => {
                Self::apply_event(state, &BookingAction::SessionClosed);
                Ok(SmallVec::new())
            },

            // `reduce` routes events elsewhere
            _ => Ok(SmallVec::new()),
        }
    }
}

impl Reducer for BookingReducer {
    type State = BookingState;
    type Action = BookingAction;
    type Environment = BookingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let Some(operation) = action.operation() else {
            // Only notice events come from outside; every other event is
            // produced here after its command was checked
            match action {
                BookingAction::NoticeRaised { .. } | BookingAction::NoticeDismissed { .. } => {
                    Self::apply_event(state, &action);
                },
                other => {
                    tracing::warn!(event = other.event_type(), "Unsolicited event ignored");
                },
            }
            return SmallVec::new();
        };

        state.last_rejection = None;
        match Self::handle_command(state, action, env) {
            Ok(effects) => effects,
            Err(error) => Self::reject(state, env, operation, error),
        }
    }
}
