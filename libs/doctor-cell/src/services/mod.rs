pub mod doctor;
pub mod availability;
pub mod directory;

pub use doctor::DoctorService;
pub use availability::{compute_day_slots, format_slot_time, parse_slot_time, system_clock, Clock};
pub use directory::DoctorDirectory;
