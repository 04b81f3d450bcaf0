//! Booking lifecycle rules for the practice.
//!
//! Everything in this crate is pure: no I/O, no clock reads except through
//! [`clock::now_ist`]. Server handlers and any other surface that needs a
//! booking's effective status must go through [`status::derive_effective_status`].

pub mod clock;
pub mod invitee_time;
pub mod raw_status;
pub mod status;

pub use clock::{now_ist, to_ist, IST};
pub use invitee_time::{parse_invitee_time, InviteeWindow};
pub use raw_status::{RawBookingStatus, RefundStatus};
pub use status::{derive_effective_status, EffectiveStatus, StatusSignals};
