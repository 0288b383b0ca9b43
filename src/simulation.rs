//! End-to-end booking simulation.
//!
//! Drives a [`BookingSession`] through every wizard step against the
//! simulated payment processor, technician search and status tracker,
//! making the choices a real user would make on each screen.

use chrono::Weekday;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn, Instrument};

use crate::booking::{ContactInfo, ProblemDetails};
use crate::catalog::{services_for, ServiceRoute, UserType};
use crate::config::TuTranquiloConfig;
use crate::flow::{BookingSession, CompletedBooking, FlowError, StepInput};
use crate::payment::{
    PaymentError, PaymentGateway, PaymentMethod, PaymentPurpose, PaymentReceipt, PaymentRequest,
};
use crate::rating::{skip_rating, submit_rating, RatingError};
use crate::status::{
    ServiceStatus, StateTransitionRecord, StatusError, StatusPhase, StatusSnapshot, StatusTracker,
    StatusTrackerConfig,
};
use crate::technician::{StaticTechnicianDirectory, TechnicianAssignment, TechnicianDirectory};
use crate::telemetry::create_flow_span;

/// What the user does when the extra fee card shows up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraFeeChoice {
    Pay,
    SelfDelivery,
}

impl FromStr for ExtraFeeChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "pay" => Ok(ExtraFeeChoice::Pay),
            "self-delivery" | "self" => Ok(ExtraFeeChoice::SelfDelivery),
            other => Err(format!("Unknown choice '{other}' (expected 'pay' or 'self-delivery')")),
        }
    }
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Booking flow error: {0}")]
    Flow(#[from] FlowError),
    #[error("Service status error: {0}")]
    Status(#[from] StatusError),
    #[error("Base diagnostic payment failed after {attempts} attempts: {last_error}")]
    BasePaymentFailed { attempts: u32, last_error: PaymentError },
    #[error("Rating error: {0}")]
    Rating(#[from] RatingError),
    #[error("Time scale must be a finite, non-negative number that keeps delays representable, got {0}")]
    InvalidTimeScale(f64),
}

/// Multiply a simulated delay by the time scale.
///
/// Rejects scales that are negative, not finite, or large enough to
/// overflow a `Duration`.
pub fn scale_delay(delay: Duration, scale: f64) -> Result<Duration, SimulationError> {
    if !scale.is_finite() || scale < 0.0 {
        return Err(SimulationError::InvalidTimeScale(scale));
    }
    Duration::try_from_secs_f64(delay.as_secs_f64() * scale)
        .map_err(|_| SimulationError::InvalidTimeScale(scale))
}

#[derive(Debug, Clone)]
pub struct SimulationOptions {
    pub user_type: UserType,
    /// Defaults to the first service offered to `user_type`
    pub service_id: Option<String>,
    pub description: String,
    pub location: String,
    pub preferred_day: Option<Weekday>,
    pub preferred_time: Option<String>,
    pub contact_name: String,
    pub contact_phone: String,
    pub method: PaymentMethod,
    /// Overrides the configured evaluation route
    pub route: Option<ServiceRoute>,
    pub choice: ExtraFeeChoice,
    /// `None` skips the rating
    pub stars: Option<u8>,
    pub comment: String,
    /// Multiplier for the evaluation and technician search delays
    pub time_scale: f64,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            user_type: UserType::Home,
            service_id: None,
            description: "The laptop turns off by itself".to_string(),
            location: "Calle 5 #38-20, Cali".to_string(),
            preferred_day: None,
            preferred_time: None,
            contact_name: "Ana Gómez".to_string(),
            contact_phone: "3001234567".to_string(),
            method: PaymentMethod::default(),
            route: None,
            choice: ExtraFeeChoice::Pay,
            stars: Some(5),
            comment: String::new(),
            time_scale: 1.0,
        }
    }
}

/// Result of a full run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub booking: CompletedBooking,
    pub final_snapshot: StatusSnapshot,
    pub status_history: Vec<StateTransitionRecord>,
    pub extra_fee_attempts: u32,
}

#[derive(Debug, Clone, Copy)]
struct ScaledDelays {
    search: Duration,
    evaluation: Duration,
}

pub struct BookingSimulation {
    gateway: Arc<dyn PaymentGateway>,
    directory: Arc<dyn TechnicianDirectory>,
    tracker_config: StatusTrackerConfig,
    search_delay: Duration,
}

impl std::fmt::Debug for BookingSimulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingSimulation")
            .field("tracker_config", &self.tracker_config)
            .field("search_delay", &self.search_delay)
            .finish()
    }
}

impl BookingSimulation {
    pub fn new(config: &TuTranquiloConfig) -> Self {
        Self {
            gateway: Arc::new(config.payment.gateway()),
            directory: Arc::new(StaticTechnicianDirectory::new()),
            tracker_config: config.status.tracker_config(),
            search_delay: config.assignment.search_delay(),
        }
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.gateway = gateway;
        self
    }

    pub fn with_directory(mut self, directory: Arc<dyn TechnicianDirectory>) -> Self {
        self.directory = directory;
        self
    }

    pub async fn run(&self, options: &SimulationOptions) -> Result<SimulationReport, SimulationError> {
        let search_delay = scale_delay(self.search_delay, options.time_scale)?;
        let evaluation_delay =
            scale_delay(self.tracker_config.evaluation_delay, options.time_scale)?;

        let mut session = BookingSession::new();
        let route = options.route.unwrap_or(self.tracker_config.evaluation_route);
        let span = create_flow_span(
            "simulate",
            Some(session.correlation_id()),
            Some(route.title()),
        );

        let delays = ScaledDelays {
            search: search_delay,
            evaluation: evaluation_delay,
        };
        self.run_session(&mut session, route, delays, options)
            .instrument(span)
            .await
    }

    async fn run_session(
        &self,
        session: &mut BookingSession,
        route: ServiceRoute,
        delays: ScaledDelays,
        options: &SimulationOptions,
    ) -> Result<SimulationReport, SimulationError> {
        session.continue_with(StepInput::Start)?;
        session.continue_with(StepInput::UserType(options.user_type))?;

        let service_id = match &options.service_id {
            Some(id) => id.clone(),
            None => services_for(options.user_type)
                .first()
                .map(|s| s.id.to_string())
                .unwrap_or_default(),
        };
        session.continue_with(StepInput::Service(service_id))?;

        let mut problem = ProblemDetails::new(&options.description, &options.location);
        if let Some(day) = options.preferred_day {
            problem = problem.with_preferred_day(day);
        }
        if let Some(time) = &options.preferred_time {
            problem = problem.with_preferred_time(time.clone());
        }
        session.continue_with(StepInput::Problem(problem))?;
        session.continue_with(StepInput::AcknowledgeModality)?;
        session.continue_with(StepInput::ConfirmSummary)?;

        let receipt = self.pay_base_fee(options.method).await?;
        session.continue_with(StepInput::BasePaid(receipt))?;

        session.continue_with(StepInput::Contact(ContactInfo::new(
            &options.contact_name,
            &options.contact_phone,
        )))?;

        let assignment = TechnicianAssignment::new(
            Arc::clone(&self.directory),
            delays.search,
        );
        let technician = assignment.assign().await;
        session.continue_with(StepInput::TechnicianAssigned(technician))?;

        let config = StatusTrackerConfig {
            evaluation_delay: delays.evaluation,
            evaluation_route: route,
            ..self.tracker_config.clone()
        };
        let tracker = StatusTracker::start(config, Arc::clone(&self.gateway));
        let (final_status, extra_fee_attempts) = self.settle_status(&tracker, options).await?;
        let status_history = tracker.state_history().await;
        drop(tracker);

        session.continue_with(StepInput::StatusFinished(final_status))?;

        let rating = match options.stars {
            Some(stars) => submit_rating(stars, &options.comment)?,
            None => skip_rating(),
        };
        session.continue_with(StepInput::Rating(rating))?;

        let booking = session
            .last_completed()
            .cloned()
            .ok_or(FlowError::MissingTechnician)?;
        info!(
            correlation_id = %booking.correlation_id,
            settlement = ?final_status.settlement(),
            "Simulation finished"
        );

        Ok(SimulationReport {
            booking,
            final_snapshot: StatusSnapshot::from(final_status),
            status_history,
            extra_fee_attempts,
        })
    }

    async fn pay_base_fee(
        &self,
        method: PaymentMethod,
    ) -> Result<PaymentReceipt, SimulationError> {
        let attempts = self.tracker_config.max_payment_attempts.max(1);
        let timeout = self.tracker_config.payment_timeout;

        let mut attempt = 1;
        loop {
            let request =
                PaymentRequest::new(PaymentPurpose::BaseDiagnostic, method).with_attempt(attempt);
            let outcome = match tokio::time::timeout(timeout, self.gateway.charge(&request)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(PaymentError::TimedOut {
                    timeout_ms: timeout.as_millis() as u64,
                }),
            };
            match outcome {
                Ok(receipt) => return Ok(receipt),
                Err(e) if attempt >= attempts => {
                    warn!(attempt = %attempt, error = %e, "Base diagnostic payment failed");
                    return Err(SimulationError::BasePaymentFailed {
                        attempts,
                        last_error: e,
                    });
                }
                Err(e) => {
                    warn!(attempt = %attempt, error = %e, "Base diagnostic payment failed, retrying");
                    attempt += 1;
                }
            }
        }
    }

    /// Wait for the evaluation, act on the extra fee card, then finish.
    async fn settle_status(
        &self,
        tracker: &StatusTracker,
        options: &SimulationOptions,
    ) -> Result<(ServiceStatus, u32), SimulationError> {
        let routed = tracker
            .wait_for(|s| s.phase() != StatusPhase::Evaluating)
            .await?;
        let mut attempts = 0;

        if routed.action_required() {
            match options.choice {
                ExtraFeeChoice::SelfDelivery if routed.can_opt_self_delivery() => {
                    tracker.opt_self_delivery().await?;
                }
                ExtraFeeChoice::SelfDelivery => {
                    warn!(status = %routed, "Self-delivery not available, paying the extra fee");
                    attempts = self.pay_extra_fee(tracker, options.method).await?;
                }
                ExtraFeeChoice::Pay => {
                    attempts = self.pay_extra_fee(tracker, options.method).await?;
                }
            }
        }

        Ok((tracker.finish().await?, attempts))
    }

    /// Retry the extra fee until it is paid or attempts run out
    async fn pay_extra_fee(
        &self,
        tracker: &StatusTracker,
        method: PaymentMethod,
    ) -> Result<u32, SimulationError> {
        let mut attempts = 0;
        loop {
            match tracker.request_payment(method).await {
                Ok(attempt) => attempts = attempt,
                Err(StatusError::PaymentAttemptsExhausted { attempts }) => {
                    warn!(attempts = %attempts, "Extra fee left unpaid");
                    return Ok(attempts);
                }
                Err(e) => return Err(e.into()),
            }

            let status = tracker
                .wait_for(|s| s.payment_in_progress().is_none())
                .await?;
            if status.extra_fee_paid() {
                return Ok(attempts);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::mocks::MockPaymentGateway;
    use crate::status::Settlement;

    fn simulation(gateway: MockPaymentGateway) -> BookingSimulation {
        BookingSimulation::new(&TuTranquiloConfig::default()).with_gateway(Arc::new(gateway))
    }

    #[tokio::test(start_paused = true)]
    async fn test_diagnostic_center_self_delivery() {
        let gateway = MockPaymentGateway::new(Duration::from_millis(2500));
        let options = SimulationOptions {
            route: Some(ServiceRoute::DiagnosticCenter),
            choice: ExtraFeeChoice::SelfDelivery,
            ..Default::default()
        };

        let report = simulation(gateway.clone()).run(&options).await.unwrap();

        assert_eq!(report.final_snapshot.status.settlement(), Settlement::SelfDelivery);
        assert!(report.final_snapshot.self_delivery);
        assert!(!report.final_snapshot.extra_fee_paid);
        assert_eq!(report.extra_fee_attempts, 0);
        // Only the base diagnostic fee was charged
        assert_eq!(gateway.get_requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_site_pays_after_a_decline() {
        let gateway = MockPaymentGateway::new(Duration::from_millis(100));
        gateway.push_outcome(Ok(()));
        gateway.push_outcome(Err(PaymentError::Declined {
            reason: "insufficient funds".into(),
        }));
        let options = SimulationOptions {
            route: Some(ServiceRoute::OnSite),
            ..Default::default()
        };

        let report = simulation(gateway.clone()).run(&options).await.unwrap();

        assert_eq!(report.final_snapshot.status.settlement(), Settlement::ExtraFeePaid);
        assert_eq!(report.extra_fee_attempts, 2);
        let purposes: Vec<_> = gateway.get_requests().iter().map(|r| r.purpose).collect();
        assert_eq!(
            purposes,
            vec![
                PaymentPurpose::BaseDiagnostic,
                PaymentPurpose::TechnicianTravel,
                PaymentPurpose::TechnicianTravel
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_route_needs_no_extra_fee() {
        let gateway = MockPaymentGateway::new(Duration::from_millis(100));
        let options = SimulationOptions {
            route: Some(ServiceRoute::Remote),
            stars: None,
            ..Default::default()
        };

        let report = simulation(gateway).run(&options).await.unwrap();

        assert_eq!(report.final_snapshot.status.settlement(), Settlement::NotRequired);
        assert!(report.booking.rating.is_skipped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_base_payment_failure_stops_the_flow() {
        let gateway = MockPaymentGateway::new(Duration::from_millis(100));
        for _ in 0..3 {
            gateway.push_outcome(Err(PaymentError::Declined {
                reason: "card blocked".into(),
            }));
        }

        let result = simulation(gateway).run(&SimulationOptions::default()).await;
        assert!(matches!(
            result,
            Err(SimulationError::BasePaymentFailed { attempts: 3, .. })
        ));
    }

    #[tokio::test]
    async fn test_negative_time_scale_is_rejected() {
        let options = SimulationOptions {
            time_scale: -1.0,
            ..Default::default()
        };
        let result = simulation(MockPaymentGateway::default()).run(&options).await;
        assert!(matches!(result, Err(SimulationError::InvalidTimeScale(_))));
    }

    #[tokio::test]
    async fn test_overflowing_time_scales_are_rejected() {
        for time_scale in [1e300, f64::INFINITY, f64::NAN] {
            let options = SimulationOptions {
                time_scale,
                ..Default::default()
            };
            let result = simulation(MockPaymentGateway::default()).run(&options).await;
            assert!(matches!(result, Err(SimulationError::InvalidTimeScale(_))));
        }
    }

    #[test]
    fn test_scale_delay() {
        let delay = Duration::from_secs(5);
        assert_eq!(scale_delay(delay, 0.5).unwrap(), Duration::from_millis(2500));
        assert_eq!(scale_delay(delay, 0.0).unwrap(), Duration::ZERO);
        assert!(scale_delay(delay, -0.1).is_err());
        assert!(scale_delay(delay, 1e300).is_err());
        assert!(scale_delay(delay, f64::INFINITY).is_err());
    }

    #[test]
    fn test_choice_parsing() {
        assert_eq!("self-delivery".parse::<ExtraFeeChoice>(), Ok(ExtraFeeChoice::SelfDelivery));
        assert_eq!("PAY".parse::<ExtraFeeChoice>(), Ok(ExtraFeeChoice::Pay));
        assert!("later".parse::<ExtraFeeChoice>().is_err());
    }
}
