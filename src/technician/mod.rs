// Technician Directory Module
//
// Read-only lookup of the technician assigned to a booking, plus the
// simulated "searching for a technician" step.

pub mod types;
pub mod directory;
pub mod assignment;

pub use types::{Review, Technician};
pub use directory::{StaticTechnicianDirectory, TechnicianDirectory};
pub use assignment::TechnicianAssignment;
