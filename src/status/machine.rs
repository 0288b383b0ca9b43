use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::types::{
    PickupChoice, ServiceStatus, StateTransitionRecord, StatusError, StatusEvent, VisitFee,
};
use crate::payment::PaymentError;

pub const DEFAULT_MAX_PAYMENT_ATTEMPTS: u32 = 3;

/// Service status state machine.
///
/// Pure and synchronous: timers and payment processing live in
/// [`super::StatusTracker`], which feeds their outcomes back in as events.
///
/// Choice policy: the first choice wins. After self-delivery is chosen the
/// extra fee can no longer be requested, after paying self-delivery can no
/// longer be chosen, and neither can start while a payment is processing.
#[derive(Debug, Clone)]
pub struct ServiceStatusMachine {
    status: ServiceStatus,
    payment_attempts: u32,
    max_payment_attempts: u32,
    last_payment_error: Option<PaymentError>,
    created_at: DateTime<Utc>,
    state_history: Vec<StateTransitionRecord>,
}

impl Default for ServiceStatusMachine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAYMENT_ATTEMPTS)
    }
}

impl ServiceStatusMachine {
    pub fn new(max_payment_attempts: u32) -> Self {
        Self {
            status: ServiceStatus::Evaluating,
            payment_attempts: 0,
            max_payment_attempts: max_payment_attempts.max(1),
            last_payment_error: None,
            created_at: Utc::now(),
            state_history: Vec::new(),
        }
    }

    pub fn status(&self) -> ServiceStatus {
        self.status
    }

    pub fn payment_attempts(&self) -> u32 {
        self.payment_attempts
    }

    pub fn max_payment_attempts(&self) -> u32 {
        self.max_payment_attempts
    }

    /// Why the most recent extra fee attempt did not go through
    pub fn last_payment_error(&self) -> Option<&PaymentError> {
        self.last_payment_error.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn state_history(&self) -> &[StateTransitionRecord] {
        &self.state_history
    }

    /// Whether a payment could be started right now
    pub fn can_request_payment(&self) -> bool {
        self.status.action_required() && self.payment_attempts < self.max_payment_attempts
    }

    /// Apply an event. On error the state is left untouched.
    pub fn handle_event(&mut self, event: StatusEvent) -> Result<ServiceStatus, StatusError> {
        let next = match self.next_status(&event) {
            Ok(next) => next,
            Err(e) => {
                warn!(
                    current_state = %self.status,
                    event = ?event.kind(),
                    error = %e,
                    "Rejected service status event"
                );
                return Err(e);
            }
        };

        match &event {
            StatusEvent::RequestPayment => self.payment_attempts += 1,
            StatusEvent::PaymentFailed { error, .. } => {
                self.last_payment_error = Some(error.clone());
            }
            StatusEvent::CancelPayment => self.last_payment_error = Some(PaymentError::Cancelled),
            _ => {}
        }

        self.record_transition(next, &event);
        Ok(next)
    }

    fn next_status(&self, event: &StatusEvent) -> Result<ServiceStatus, StatusError> {
        let invalid = || StatusError::InvalidTransition {
            event: event.kind(),
            state: self.status,
        };

        let next = match (self.status, event) {
            (ServiceStatus::Finished { .. }, _) => return Err(StatusError::AlreadyFinished),

            (current, StatusEvent::Finish) => ServiceStatus::Finished {
                route: current.route(),
                settlement: current.settlement(),
            },

            (ServiceStatus::Evaluating, StatusEvent::EvaluationCompleted { route }) => {
                ServiceStatus::routed(*route)
            }

            // Starting a payment
            (
                ServiceStatus::EnRoute {
                    visit: VisitFee::AwaitingPayment,
                },
                StatusEvent::RequestPayment,
            ) => ServiceStatus::EnRoute {
                visit: VisitFee::ProcessingPayment {
                    attempt: self.next_attempt()?,
                },
            },
            (
                ServiceStatus::InDiagnosticCenter {
                    pickup: PickupChoice::AwaitingChoice,
                },
                StatusEvent::RequestPayment,
            ) => ServiceStatus::InDiagnosticCenter {
                pickup: PickupChoice::ProcessingPayment {
                    attempt: self.next_attempt()?,
                },
            },

            // Payment outcomes; a stale attempt number means the attempt was cancelled
            (
                ServiceStatus::EnRoute {
                    visit: VisitFee::ProcessingPayment { attempt },
                },
                StatusEvent::PaymentSucceeded {
                    attempt: completed,
                    receipt,
                },
            ) if attempt == *completed => ServiceStatus::EnRoute {
                visit: VisitFee::Confirmed {
                    receipt_id: receipt.id,
                },
            },
            (
                ServiceStatus::InDiagnosticCenter {
                    pickup: PickupChoice::ProcessingPayment { attempt },
                },
                StatusEvent::PaymentSucceeded {
                    attempt: completed,
                    receipt,
                },
            ) if attempt == *completed => ServiceStatus::InDiagnosticCenter {
                pickup: PickupChoice::PaidPickup {
                    receipt_id: receipt.id,
                },
            },
            (
                ServiceStatus::EnRoute {
                    visit: VisitFee::ProcessingPayment { attempt },
                },
                StatusEvent::PaymentFailed {
                    attempt: failed, ..
                },
            ) if attempt == *failed => ServiceStatus::EnRoute {
                visit: VisitFee::AwaitingPayment,
            },
            (
                ServiceStatus::InDiagnosticCenter {
                    pickup: PickupChoice::ProcessingPayment { attempt },
                },
                StatusEvent::PaymentFailed {
                    attempt: failed, ..
                },
            ) if attempt == *failed => ServiceStatus::InDiagnosticCenter {
                pickup: PickupChoice::AwaitingChoice,
            },

            // Backing out of the payment sheet
            (
                ServiceStatus::EnRoute {
                    visit: VisitFee::ProcessingPayment { .. },
                },
                StatusEvent::CancelPayment,
            ) => ServiceStatus::EnRoute {
                visit: VisitFee::AwaitingPayment,
            },
            (
                ServiceStatus::InDiagnosticCenter {
                    pickup: PickupChoice::ProcessingPayment { .. },
                },
                StatusEvent::CancelPayment,
            ) => ServiceStatus::InDiagnosticCenter {
                pickup: PickupChoice::AwaitingChoice,
            },

            (
                ServiceStatus::InDiagnosticCenter {
                    pickup: PickupChoice::AwaitingChoice,
                },
                StatusEvent::OptSelfDelivery,
            ) => ServiceStatus::InDiagnosticCenter {
                pickup: PickupChoice::SelfDelivery,
            },

            _ => return Err(invalid()),
        };

        Ok(next)
    }

    fn next_attempt(&self) -> Result<u32, StatusError> {
        if self.payment_attempts >= self.max_payment_attempts {
            return Err(StatusError::PaymentAttemptsExhausted {
                attempts: self.payment_attempts,
            });
        }
        Ok(self.payment_attempts + 1)
    }

    fn record_transition(&mut self, to: ServiceStatus, event: &StatusEvent) {
        let record = StateTransitionRecord {
            from_state: self.status,
            to_state: to,
            event: event.kind(),
            timestamp: Utc::now(),
        };

        info!(
            from_state = %record.from_state,
            to_state = %record.to_state,
            event = ?record.event,
            extra_fee_paid = %to.extra_fee_paid(),
            self_delivery = %to.self_delivery(),
            "Service status transition"
        );

        self.state_history.push(record);
        self.status = to;
    }
}
