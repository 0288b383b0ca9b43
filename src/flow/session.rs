use serde::Serialize;
use statig::prelude::*;
use thiserror::Error;
use tracing::info;

use super::wizard::{WizardEvent, WizardFlow, WizardStep};
use crate::booking::{BookingError, BookingSummary, ContactInfo, ProblemDetails, ServiceRequest};
use crate::catalog::{find_service, UserType};
use crate::payment::{PaymentPurpose, PaymentReceipt};
use crate::rating::RatingOutcome;
use crate::status::ServiceStatus;
use crate::technician::Technician;
use crate::telemetry::generate_correlation_id;

/// Payload a step hands over when the user continues
#[derive(Debug, Clone, PartialEq)]
pub enum StepInput {
    Start,
    UserType(UserType),
    Service(String),
    Problem(ProblemDetails),
    AcknowledgeModality,
    ConfirmSummary,
    BasePaid(PaymentReceipt),
    Contact(ContactInfo),
    TechnicianAssigned(Technician),
    StatusFinished(ServiceStatus),
    Rating(RatingOutcome),
}

impl StepInput {
    pub fn name(&self) -> &'static str {
        match self {
            StepInput::Start => "start",
            StepInput::UserType(_) => "user_type",
            StepInput::Service(_) => "service",
            StepInput::Problem(_) => "problem",
            StepInput::AcknowledgeModality => "acknowledge_modality",
            StepInput::ConfirmSummary => "confirm_summary",
            StepInput::BasePaid(_) => "base_paid",
            StepInput::Contact(_) => "contact",
            StepInput::TechnicianAssigned(_) => "technician_assigned",
            StepInput::StatusFinished(_) => "status_finished",
            StepInput::Rating(_) => "rating",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("Input '{input}' is not accepted on the {step} step")]
    UnexpectedInput { step: WizardStep, input: &'static str },

    #[error("Cannot go back from the {0} step")]
    CannotGoBack(WizardStep),

    #[error("Service '{service_id}' is not offered to {user_type} customers")]
    UnknownService {
        user_type: UserType,
        service_id: String,
    },

    #[error("Expected a {expected:?} receipt, got {actual:?}")]
    WrongPaymentPurpose {
        expected: PaymentPurpose,
        actual: PaymentPurpose,
    },

    #[error("Service status is still {0}, it must be finished first")]
    StatusNotFinished(ServiceStatus),

    #[error("No technician has been assigned")]
    MissingTechnician,

    #[error("Base diagnostic fee has not been paid")]
    MissingBasePayment,

    #[error(transparent)]
    Booking(#[from] BookingError),
}

/// Data collected so far. Each field is filled by exactly one step.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookingDraft {
    pub user_type: Option<UserType>,
    pub service_id: Option<String>,
    pub problem: Option<ProblemDetails>,
    pub base_payment: Option<PaymentReceipt>,
    pub request: Option<ServiceRequest>,
    pub technician: Option<Technician>,
    pub final_status: Option<ServiceStatus>,
}

/// Everything a finished booking produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedBooking {
    pub correlation_id: String,
    pub request: ServiceRequest,
    pub base_payment: PaymentReceipt,
    pub technician: Technician,
    pub final_status: ServiceStatus,
    pub rating: RatingOutcome,
}

/// One user's pass through the wizard.
///
/// Navigation lives in the [`WizardFlow`] state machine; the session
/// validates each step's payload before letting the machine advance, so the
/// draft can never hold data for a step the user has not reached.
pub struct BookingSession {
    wizard: StateMachine<WizardFlow>,
    draft: BookingDraft,
    correlation_id: String,
    last_completed: Option<CompletedBooking>,
}

impl std::fmt::Debug for BookingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingSession")
            .field("step", &self.step())
            .field("correlation_id", &self.correlation_id)
            .field("draft", &self.draft)
            .finish()
    }
}

impl Default for BookingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingSession {
    pub fn new() -> Self {
        Self {
            wizard: WizardFlow::new().state_machine(),
            draft: BookingDraft::default(),
            correlation_id: generate_correlation_id(),
            last_completed: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.wizard.inner().step()
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// The booking closed by the most recent rating step
    pub fn last_completed(&self) -> Option<&CompletedBooking> {
        self.last_completed.as_ref()
    }

    /// Confirmation card for the summary step
    pub fn summary(&self) -> Result<BookingSummary, FlowError> {
        let user_type = self.draft.user_type.ok_or(BookingError::MissingUserType)?;
        let service_id = self
            .draft
            .service_id
            .as_deref()
            .ok_or(BookingError::MissingService)?;
        let problem = self
            .draft
            .problem
            .as_ref()
            .ok_or(BookingError::MissingProblemDetails)?;
        Ok(BookingSummary::new(user_type, service_id, problem))
    }

    /// Validate the current step's payload, store it and move forward
    pub fn continue_with(&mut self, input: StepInput) -> Result<WizardStep, FlowError> {
        match (self.step(), input) {
            (WizardStep::Welcome, StepInput::Start) => {}
            (WizardStep::UserTypeSelection, StepInput::UserType(user_type)) => {
                if self.draft.user_type != Some(user_type) {
                    self.draft.service_id = None;
                }
                self.draft.user_type = Some(user_type);
            }
            (WizardStep::ServiceSelection, StepInput::Service(service_id)) => {
                let user_type = self.draft.user_type.ok_or(BookingError::MissingUserType)?;
                if find_service(user_type, &service_id).is_none() {
                    return Err(FlowError::UnknownService {
                        user_type,
                        service_id,
                    });
                }
                self.draft.service_id = Some(service_id);
            }
            (WizardStep::ProblemDescription, StepInput::Problem(problem)) => {
                problem.validate()?;
                self.draft.problem = Some(problem);
            }
            (WizardStep::ServiceModality, StepInput::AcknowledgeModality) => {}
            (WizardStep::ServiceSummary, StepInput::ConfirmSummary) => {
                self.summary()?;
            }
            (WizardStep::Payment, StepInput::BasePaid(receipt)) => {
                if receipt.purpose != PaymentPurpose::BaseDiagnostic {
                    return Err(FlowError::WrongPaymentPurpose {
                        expected: PaymentPurpose::BaseDiagnostic,
                        actual: receipt.purpose,
                    });
                }
                self.draft.base_payment = Some(receipt);
            }
            (WizardStep::ContactInfo, StepInput::Contact(contact)) => {
                let mut builder = ServiceRequest::builder().contact(contact);
                if let Some(user_type) = self.draft.user_type {
                    builder = builder.user_type(user_type);
                }
                if let Some(service_id) = &self.draft.service_id {
                    builder = builder.service_id(service_id.clone());
                }
                if let Some(problem) = &self.draft.problem {
                    builder = builder.problem(problem.clone());
                }
                self.draft.request = Some(builder.build()?);
            }
            (WizardStep::TechnicianAssignment, StepInput::TechnicianAssigned(technician)) => {
                self.draft.technician = Some(technician);
            }
            (WizardStep::ServiceStatus, StepInput::StatusFinished(status)) => {
                if !status.is_finished() {
                    return Err(FlowError::StatusNotFinished(status));
                }
                self.draft.final_status = Some(status);
            }
            (WizardStep::Rating, StepInput::Rating(rating)) => {
                self.complete(rating)?;
            }
            (step, input) => {
                return Err(FlowError::UnexpectedInput {
                    step,
                    input: input.name(),
                })
            }
        }

        Ok(self.fire(WizardEvent::Continue))
    }

    /// Return to the previous screen. Data already entered is kept.
    pub fn back(&mut self) -> Result<WizardStep, FlowError> {
        let step = self.step();
        if !step.can_go_back() {
            return Err(FlowError::CannotGoBack(step));
        }
        Ok(self.fire(WizardEvent::Back))
    }

    fn fire(&mut self, event: WizardEvent) -> WizardStep {
        let from = self.step();
        self.wizard.handle(&event);
        let to = self.step();
        info!(
            correlation_id = %self.correlation_id,
            from = %from,
            to = %to,
            event = ?event,
            "Booking flow advanced"
        );
        to
    }

    fn complete(&mut self, rating: RatingOutcome) -> Result<(), FlowError> {
        let draft = &self.draft;
        let request = draft.request.clone().ok_or(BookingError::MissingContactInfo)?;
        let base_payment = draft
            .base_payment
            .clone()
            .ok_or(FlowError::MissingBasePayment)?;
        let technician = draft
            .technician
            .clone()
            .ok_or(FlowError::MissingTechnician)?;
        let final_status = draft
            .final_status
            .ok_or(FlowError::StatusNotFinished(ServiceStatus::Evaluating))?;

        let completed = CompletedBooking {
            correlation_id: self.correlation_id.clone(),
            request,
            base_payment,
            technician,
            final_status,
            rating,
        };
        info!(
            correlation_id = %completed.correlation_id,
            service_id = %completed.request.service_id(),
            stars = %completed.rating.stars(),
            settlement = ?completed.final_status.settlement(),
            "Booking completed"
        );

        self.last_completed = Some(completed);
        self.draft = BookingDraft::default();
        self.correlation_id = generate_correlation_id();
        Ok(())
    }
}
