//! The booking session: state, actions, reducer and the session handle.
//!
//! ```text
//! Idle ─openShowing─▶ SeatSelection ─proceed─▶ EmailEntry ─submitEmail─▶ Confirmed
//!                          │                                                ▲
//!                          └──────────── proceed (direct flow) ─────────────┘
//! ```
//!
//! `closeAll` returns to `Idle` from anywhere; `openShowing` restarts the flow.

mod actions;
mod environment;
mod reducer;
mod store;
mod types;
mod view;


pub use actions::BookingAction;
pub use environment::{BookingEnvironment, SessionSettings};
pub use reducer::BookingReducer;
pub use store::{BookingSession, BookingStore};
pub use types::{BookingState, Notice, NoticeId, NoticeKind};
pub use view::{SeatCell, SeatRow, SessionView};
