// Service Status Module
//
// Post-payment lifecycle of a booking: automatic evaluation, routing into
// remote/on-site/diagnostic-center handling, the extra fee or self-delivery
// choice, and completion.

pub mod types;
pub mod machine;
pub mod tracker;

pub use types::{
    DropOffPoint, PickupChoice, ServiceStatus, Settlement, StateTransitionRecord, StatusDisplay,
    StatusError, StatusEvent, StatusEventKind, StatusPhase, StatusSnapshot, TimelineItem,
    VisitFee, DROP_OFF_ADDRESS, DROP_OFF_TICKET,
};
pub use machine::{ServiceStatusMachine, DEFAULT_MAX_PAYMENT_ATTEMPTS};
pub use tracker::{StatusTracker, StatusTrackerConfig};
