// TuTranquilo Library - Tech-support booking flow
// This exposes the core components for testing and integration

pub mod catalog;
pub mod technician;
pub mod booking;
pub mod payment;
pub mod status;
pub mod rating;
pub mod flow;
pub mod simulation;
pub mod telemetry;
pub mod config;
pub mod shutdown;
pub mod cli;

// Re-export key types for easy access
pub use catalog::{find_service, resolve_service_name, services_for, ServiceOffering, ServiceRoute, UserType};
pub use technician::{Review, StaticTechnicianDirectory, Technician, TechnicianAssignment, TechnicianDirectory};
pub use booking::{BookingError, ContactInfo, ProblemDetails, ServiceRequest, TimeOfDay};
pub use payment::{PaymentError, PaymentGateway, PaymentMethod, PaymentPurpose, PaymentReceipt, SimulatedGateway};
pub use status::{
    ServiceStatus,
    ServiceStatusMachine,
    StatusError,
    StatusEvent,
    StatusSnapshot,
    StatusTracker,
    StatusTrackerConfig,
};
pub use rating::{submit_rating, RatingError, RatingOutcome};
pub use flow::{BookingSession, FlowError, StepInput, WizardStep};
pub use simulation::{BookingSimulation, ExtraFeeChoice, SimulationError, SimulationOptions, SimulationReport};
pub use telemetry::{init_telemetry, shutdown_telemetry, generate_correlation_id, create_flow_span};
pub use config::{TuTranquiloConfig, config, init_config};
pub use shutdown::ShutdownCoordinator;
