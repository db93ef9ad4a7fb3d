//! Keyboard navigation for slide decks.
//!
//! [`RepeatTimer`] turns a stream of "key held" samples into press and
//! auto-repeat fires the way an operating system keyboard driver does, and
//! [`Cursor`] combines a forward and a reverse timer into a bounded slide
//! index.

mod constants;
mod cursor;
mod repeat;
mod timing;

pub use constants::*;
pub use cursor::Cursor;
pub use repeat::{RepeatState, RepeatTimer};
pub use timing::RepeatTiming;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CursorError {
    #[error("Invalid repeat timing: {0}")]
    Timing(String),
}

pub type Result<T> = std::result::Result<T, CursorError>;
