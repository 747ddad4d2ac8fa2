//! Data model and contract of the emulated-controller backend.
//!
//! A backend impersonates the console's own controller over a wireless
//! link. This crate defines the state packet it transmits, the session
//! lifecycle it exposes and the error taxonomy at that boundary. The
//! actual HID transport lives behind the [`EmulatedController`] trait;
//! [`loopback::LoopbackController`] is an in-process stand-in.

mod controller;
mod error;
pub mod loopback;
mod packet;

pub use controller::{
    AdapterRef, Appearance, CrashReport, EmulatedController, SessionHandle,
    SessionStatus,
};
pub use error::{Error, Result};
pub use packet::{Button, InputPacket, StickAxis, StickPosition, StickSide};
