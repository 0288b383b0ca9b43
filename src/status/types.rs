// Core types for the service status state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::ServiceRoute;
use crate::payment::{PaymentError, PaymentPurpose, PaymentReceipt};

/// Drop-off point for customers who bring their own equipment
pub const DROP_OFF_ADDRESS: &str = "Calle 123 #45-67, Edificio Tech, Cali.";
pub const DROP_OFF_TICKET: &str = "#ST-9921";

/// Extra fee state for an on-site visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum VisitFee {
    AwaitingPayment,
    ProcessingPayment { attempt: u32 },
    Confirmed { receipt_id: Uuid },
}

/// How the equipment reaches the diagnostic center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PickupChoice {
    AwaitingChoice,
    ProcessingPayment { attempt: u32 },
    PaidPickup { receipt_id: Uuid },
    SelfDelivery,
}

/// How the extra fee question was settled when the flow finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Settlement {
    /// Still evaluating, or routed remotely
    NotRequired,
    /// Finished while the extra fee was still open
    Unsettled,
    ExtraFeePaid,
    SelfDelivery,
}

/// Current state of a service after the booking was paid.
///
/// Each variant carries only the data that is legal in that state, so
/// "paid and self-delivered" cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ServiceStatus {
    Evaluating,
    RemoteSupportActive,
    EnRoute { visit: VisitFee },
    InDiagnosticCenter { pickup: PickupChoice },
    Finished {
        route: Option<ServiceRoute>,
        settlement: Settlement,
    },
}

/// Coarse ordering of states; a service never moves to a lower phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatusPhase {
    Evaluating,
    Routed,
    Finished,
}

impl ServiceStatus {
    /// State a route enters right after evaluation
    pub fn routed(route: ServiceRoute) -> Self {
        match route {
            ServiceRoute::Remote => ServiceStatus::RemoteSupportActive,
            ServiceRoute::OnSite => ServiceStatus::EnRoute {
                visit: VisitFee::AwaitingPayment,
            },
            ServiceRoute::DiagnosticCenter => ServiceStatus::InDiagnosticCenter {
                pickup: PickupChoice::AwaitingChoice,
            },
        }
    }

    pub fn phase(&self) -> StatusPhase {
        match self {
            ServiceStatus::Evaluating => StatusPhase::Evaluating,
            ServiceStatus::Finished { .. } => StatusPhase::Finished,
            _ => StatusPhase::Routed,
        }
    }

    pub fn route(&self) -> Option<ServiceRoute> {
        match self {
            ServiceStatus::Evaluating => None,
            ServiceStatus::RemoteSupportActive => Some(ServiceRoute::Remote),
            ServiceStatus::EnRoute { .. } => Some(ServiceRoute::OnSite),
            ServiceStatus::InDiagnosticCenter { .. } => Some(ServiceRoute::DiagnosticCenter),
            ServiceStatus::Finished { route, .. } => *route,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, ServiceStatus::Finished { .. })
    }

    pub fn extra_fee_paid(&self) -> bool {
        matches!(
            self,
            ServiceStatus::EnRoute {
                visit: VisitFee::Confirmed { .. }
            } | ServiceStatus::InDiagnosticCenter {
                pickup: PickupChoice::PaidPickup { .. }
            } | ServiceStatus::Finished {
                settlement: Settlement::ExtraFeePaid,
                ..
            }
        )
    }

    pub fn self_delivery(&self) -> bool {
        matches!(
            self,
            ServiceStatus::InDiagnosticCenter {
                pickup: PickupChoice::SelfDelivery
            } | ServiceStatus::Finished {
                settlement: Settlement::SelfDelivery,
                ..
            }
        )
    }

    pub fn payment_in_progress(&self) -> Option<u32> {
        match self {
            ServiceStatus::EnRoute {
                visit: VisitFee::ProcessingPayment { attempt },
            }
            | ServiceStatus::InDiagnosticCenter {
                pickup: PickupChoice::ProcessingPayment { attempt },
            } => Some(*attempt),
            _ => None,
        }
    }

    /// The user still has to pay (or pick self-delivery) before work continues
    pub fn action_required(&self) -> bool {
        matches!(
            self,
            ServiceStatus::EnRoute {
                visit: VisitFee::AwaitingPayment
            } | ServiceStatus::InDiagnosticCenter {
                pickup: PickupChoice::AwaitingChoice
            }
        )
    }

    pub fn can_opt_self_delivery(&self) -> bool {
        matches!(
            self,
            ServiceStatus::InDiagnosticCenter {
                pickup: PickupChoice::AwaitingChoice
            }
        )
    }

    /// What the extra fee pays for in the current state
    pub fn extra_fee_purpose(&self) -> Option<PaymentPurpose> {
        match self {
            ServiceStatus::EnRoute { .. } => Some(PaymentPurpose::TechnicianTravel),
            ServiceStatus::InDiagnosticCenter { .. } => Some(PaymentPurpose::EquipmentPickup),
            _ => None,
        }
    }

    pub fn settlement(&self) -> Settlement {
        match self {
            ServiceStatus::Evaluating | ServiceStatus::RemoteSupportActive => Settlement::NotRequired,
            ServiceStatus::Finished { settlement, .. } => *settlement,
            _ if self.extra_fee_paid() => Settlement::ExtraFeePaid,
            _ if self.self_delivery() => Settlement::SelfDelivery,
            _ => Settlement::Unsettled,
        }
    }

    /// Drop-off details, only while the customer is bringing the equipment
    pub fn drop_off_point(&self) -> Option<DropOffPoint> {
        match self {
            ServiceStatus::InDiagnosticCenter {
                pickup: PickupChoice::SelfDelivery,
            } => Some(DropOffPoint::default()),
            _ => None,
        }
    }

    pub fn display(&self) -> StatusDisplay {
        let (title, subtitle) = match self {
            ServiceStatus::Evaluating => ("Evaluating your case", "Analyzing your fault..."),
            ServiceStatus::RemoteSupportActive => (
                "Remote Solution",
                "Your technician will call you shortly to start the remote session at the requested time.",
            ),
            ServiceStatus::EnRoute { visit } => match visit {
                VisitFee::AwaitingPayment => (
                    "On-site Service",
                    "Visit required: the technician must travel to your location.",
                ),
                VisitFee::ProcessingPayment { .. } => {
                    ("On-site Service", "Verifying secure payment...")
                }
                VisitFee::Confirmed { .. } => (
                    "Visit Confirmed",
                    "The technician will call you in minutes to confirm the appointment.",
                ),
            },
            ServiceStatus::InDiagnosticCenter { pickup } => match pickup {
                PickupChoice::AwaitingChoice => (
                    "Diagnostic Center",
                    "Lab required: your equipment needs tools from our specialized center.",
                ),
                PickupChoice::ProcessingPayment { .. } => {
                    ("Diagnostic Center", "Verifying secure payment...")
                }
                PickupChoice::PaidPickup { .. } => (
                    "Lab work in progress",
                    "Pickup scheduled: the expert will come by for your equipment soon.",
                ),
                PickupChoice::SelfDelivery => (
                    "Lab work in progress",
                    "Bring your equipment to the drop-off point.",
                ),
            },
            ServiceStatus::Finished { .. } => ("Service finished", "Rate your technician."),
        };

        let timeline = self.timeline();
        let done = timeline.iter().filter(|item| item.done).count();

        StatusDisplay {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            progress: done as f32 / timeline.len() as f32,
        }
    }

    /// The three process milestones shown under the status card
    pub fn timeline(&self) -> [TimelineItem; 3] {
        let evaluated = self.route().is_some();
        let executing = matches!(self.route(), Some(ServiceRoute::Remote))
            || self.extra_fee_paid()
            || self.self_delivery();

        [
            TimelineItem::new("Base payment received", true),
            TimelineItem::new("Technical evaluation", evaluated),
            TimelineItem::new("Service execution", executing),
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServiceStatus::Evaluating => "evaluating",
            ServiceStatus::RemoteSupportActive => "remote_support_active",
            ServiceStatus::EnRoute { .. } => "en_route",
            ServiceStatus::InDiagnosticCenter { .. } => "in_diagnostic_center",
            ServiceStatus::Finished { .. } => "finished",
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceStatus::EnRoute { visit } => write!(f, "en_route({visit:?})"),
            ServiceStatus::InDiagnosticCenter { pickup } => {
                write!(f, "in_diagnostic_center({pickup:?})")
            }
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Presentational fields derived from the state. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusDisplay {
    pub title: String,
    pub subtitle: String,
    /// Share of timeline milestones completed, in [0, 1]
    pub progress: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineItem {
    pub label: &'static str,
    pub done: bool,
}

impl TimelineItem {
    fn new(label: &'static str, done: bool) -> Self {
        Self { label, done }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropOffPoint {
    pub address: &'static str,
    pub ticket: &'static str,
}

impl Default for DropOffPoint {
    fn default() -> Self {
        Self {
            address: DROP_OFF_ADDRESS,
            ticket: DROP_OFF_TICKET,
        }
    }
}

/// Inputs to the status state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// Fired once by the evaluation timer
    EvaluationCompleted { route: ServiceRoute },
    RequestPayment,
    PaymentSucceeded { attempt: u32, receipt: PaymentReceipt },
    PaymentFailed { attempt: u32, error: PaymentError },
    CancelPayment,
    OptSelfDelivery,
    Finish,
}

impl StatusEvent {
    pub fn kind(&self) -> StatusEventKind {
        match self {
            StatusEvent::EvaluationCompleted { .. } => StatusEventKind::EvaluationCompleted,
            StatusEvent::RequestPayment => StatusEventKind::RequestPayment,
            StatusEvent::PaymentSucceeded { .. } => StatusEventKind::PaymentSucceeded,
            StatusEvent::PaymentFailed { .. } => StatusEventKind::PaymentFailed,
            StatusEvent::CancelPayment => StatusEventKind::CancelPayment,
            StatusEvent::OptSelfDelivery => StatusEventKind::OptSelfDelivery,
            StatusEvent::Finish => StatusEventKind::Finish,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusEventKind {
    EvaluationCompleted,
    RequestPayment,
    PaymentSucceeded,
    PaymentFailed,
    CancelPayment,
    OptSelfDelivery,
    Finish,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatusError {
    #[error("Invalid transition: {event:?} not allowed while {state}")]
    InvalidTransition {
        event: StatusEventKind,
        state: ServiceStatus,
    },

    #[error("Payment attempts exhausted after {attempts} tries")]
    PaymentAttemptsExhausted { attempts: u32 },

    #[error("Service already finished")]
    AlreadyFinished,

    #[error("Status tracker has been shut down")]
    TrackerClosed,
}

/// Audit entry for every applied transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransitionRecord {
    pub from_state: ServiceStatus,
    pub to_state: ServiceStatus,
    pub event: StatusEventKind,
    pub timestamp: DateTime<Utc>,
}

/// Everything a status screen renders, computed in one read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub status: ServiceStatus,
    pub display: StatusDisplay,
    pub timeline: [TimelineItem; 3],
    pub action_required: bool,
    pub extra_fee_paid: bool,
    pub self_delivery: bool,
    pub drop_off: Option<DropOffPoint>,
}

impl From<ServiceStatus> for StatusSnapshot {
    fn from(status: ServiceStatus) -> Self {
        Self {
            status,
            display: status.display(),
            timeline: status.timeline(),
            action_required: status.action_required(),
            extra_fee_paid: status.extra_fee_paid(),
            self_delivery: status.self_delivery(),
            drop_off: status.drop_off_point(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routed_entry_states() {
        assert_eq!(
            ServiceStatus::routed(ServiceRoute::DiagnosticCenter),
            ServiceStatus::InDiagnosticCenter {
                pickup: PickupChoice::AwaitingChoice
            }
        );
        assert_eq!(
            ServiceStatus::routed(ServiceRoute::Remote),
            ServiceStatus::RemoteSupportActive
        );
    }

    #[test]
    fn test_flags_are_derived_from_variant() {
        let paid = ServiceStatus::InDiagnosticCenter {
            pickup: PickupChoice::PaidPickup {
                receipt_id: Uuid::new_v4(),
            },
        };
        assert!(paid.extra_fee_paid());
        assert!(!paid.self_delivery());
        assert!(!paid.action_required());

        let self_delivered = ServiceStatus::InDiagnosticCenter {
            pickup: PickupChoice::SelfDelivery,
        };
        assert!(self_delivered.self_delivery());
        assert!(!self_delivered.extra_fee_paid());
        assert!(self_delivered.drop_off_point().is_some());
    }

    #[test]
    fn test_progress_follows_timeline() {
        assert!((ServiceStatus::Evaluating.display().progress - 1.0 / 3.0).abs() < f32::EPSILON);

        let awaiting = ServiceStatus::routed(ServiceRoute::OnSite);
        assert!((awaiting.display().progress - 2.0 / 3.0).abs() < f32::EPSILON);

        assert_eq!(ServiceStatus::RemoteSupportActive.display().progress, 1.0);
    }

    #[test]
    fn test_display_titles() {
        assert_eq!(ServiceStatus::Evaluating.display().title, "Evaluating your case");
        let confirmed = ServiceStatus::EnRoute {
            visit: VisitFee::Confirmed {
                receipt_id: Uuid::new_v4(),
            },
        };
        assert_eq!(confirmed.display().title, "Visit Confirmed");
        assert_eq!(confirmed.settlement(), Settlement::ExtraFeePaid);
    }

    #[test]
    fn test_phase_ordering() {
        assert!(StatusPhase::Evaluating < StatusPhase::Routed);
        assert!(StatusPhase::Routed < StatusPhase::Finished);
        assert_eq!(ServiceStatus::RemoteSupportActive.phase(), StatusPhase::Routed);
    }

    #[test]
    fn test_snapshot_serializes_with_status_tag() {
        let snapshot = StatusSnapshot::from(ServiceStatus::routed(ServiceRoute::DiagnosticCenter));
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["status"]["status"], "in_diagnostic_center");
        assert_eq!(json["status"]["pickup"]["state"], "awaiting_choice");
        assert_eq!(json["action_required"], true);
    }
}
