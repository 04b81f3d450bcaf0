pub mod error;
pub mod handlers;
pub mod hooks;
pub mod models;
pub mod router;
pub mod services;

pub use error::BookingError;
pub use hooks::{BookingEvent, BookingEventHook};
pub use models::{Booking, BookingWithStatus, SessionNote, StatusCounts};
pub use router::{booking_routes, BookingState};
