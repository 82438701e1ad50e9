//! Application layer for Parley
//!
//! Pure state machines for the chat panel UI, decoupled from the rendering
//! toolkit and the transport so the same code runs in production and in
//! deterministic tests.
//!
//! # Components
//!
//! - [`App`]: UI state machine (conversation list, transcript view, status)
//! - [`Bridge`]: Protocol bridge (translates App actions to Client events)

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod bridge;
mod event;
mod state;

pub use action::AppAction;
pub use app::App;
pub use bridge::{Bridge, TransportDirective};
pub use event::AppEvent;
pub use state::RoomSummary;
