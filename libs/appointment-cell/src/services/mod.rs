pub mod booking;
pub mod listing;
pub mod session;

pub use booking::BookingService;
pub use session::BookingSession;
