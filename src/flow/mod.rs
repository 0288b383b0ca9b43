// Booking Flow Module
//
// Screen sequence of the booking wizard and the session that carries the
// user's answers from one screen to the next.

pub mod wizard;
pub mod session;

pub use wizard::{WizardEvent, WizardFlow, WizardStep};
pub use session::{BookingDraft, BookingSession, CompletedBooking, FlowError, StepInput};
