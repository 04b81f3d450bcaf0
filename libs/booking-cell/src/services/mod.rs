pub mod booking;
pub mod paperform;
pub mod session_notes;

pub use booking::BookingService;
pub use paperform::paperform_link;
pub use session_notes::SessionNoteService;
