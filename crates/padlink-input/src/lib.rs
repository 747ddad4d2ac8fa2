//! Raw input events and the non-blocking source contract.
//!
//! The proxy drains an [`InputSource`] once per tick; sources must never
//! block the caller. [`EvdevSource`] reads a Linux evdev node opened
//! with `O_NONBLOCK`; [`ScriptedSource`] plays back a fixed sequence.

mod error;
mod event;
#[cfg(target_os = "linux")]
mod evdev;
mod source;

pub use error::{Error, Result};
pub use event::{EventKind, RawEvent};
#[cfg(target_os = "linux")]
pub use evdev::EvdevSource;
pub use source::{InputSource, ScriptedSource};
