use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::machine::{ServiceStatusMachine, DEFAULT_MAX_PAYMENT_ATTEMPTS};
use super::types::{
    ServiceStatus, StateTransitionRecord, StatusError, StatusEvent, StatusEventKind,
    StatusSnapshot,
};
use crate::catalog::ServiceRoute;
use crate::payment::{PaymentError, PaymentGateway, PaymentMethod, PaymentRequest};

/// Timing and policy knobs for a tracker
#[derive(Debug, Clone)]
pub struct StatusTrackerConfig {
    /// Wait before the automatic evaluation transition
    pub evaluation_delay: Duration,
    /// Route the evaluation resolves to
    pub evaluation_route: ServiceRoute,
    /// Upper bound for a single payment attempt
    pub payment_timeout: Duration,
    pub max_payment_attempts: u32,
}

impl Default for StatusTrackerConfig {
    fn default() -> Self {
        Self {
            evaluation_delay: Duration::from_secs(5),
            evaluation_route: ServiceRoute::DiagnosticCenter,
            payment_timeout: Duration::from_secs(30),
            max_payment_attempts: DEFAULT_MAX_PAYMENT_ATTEMPTS,
        }
    }
}

/// State shared between the tracker and its timer tasks.
///
/// Tasks only hold a `Weak` to it, so once the tracker is gone a late
/// timer finds nothing to mutate.
struct Shared {
    machine: RwLock<ServiceStatusMachine>,
    updates: watch::Sender<ServiceStatus>,
}

impl Shared {
    async fn apply(&self, event: StatusEvent) -> Result<ServiceStatus, StatusError> {
        let mut machine = self.machine.write().await;
        let status = machine.handle_event(event)?;
        self.updates.send_replace(status);
        Ok(status)
    }
}

/// Runs a [`ServiceStatusMachine`] on the tokio runtime.
///
/// Owns the automatic evaluation timer and any in-flight payment. Both are
/// aborted on [`StatusTracker::finish`] and when the tracker is dropped.
pub struct StatusTracker {
    shared: Arc<Shared>,
    gateway: Arc<dyn PaymentGateway>,
    config: StatusTrackerConfig,
    evaluation_task: Mutex<Option<JoinHandle<()>>>,
    payment_task: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for StatusTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusTracker")
            .field("status", &*self.shared.updates.borrow())
            .field("config", &self.config)
            .finish()
    }
}

impl StatusTracker {
    /// Create the tracker in `Evaluating` and schedule the evaluation.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: StatusTrackerConfig, gateway: Arc<dyn PaymentGateway>) -> Self {
        let machine = ServiceStatusMachine::new(config.max_payment_attempts);
        let (updates, _) = watch::channel(machine.status());
        let shared = Arc::new(Shared {
            machine: RwLock::new(machine),
            updates,
        });

        let evaluation_task = spawn_evaluation(
            Arc::downgrade(&shared),
            config.evaluation_delay,
            config.evaluation_route,
        );

        info!(
            evaluation_delay_ms = %config.evaluation_delay.as_millis(),
            evaluation_route = ?config.evaluation_route,
            "Service status tracking started"
        );

        Self {
            shared,
            gateway,
            config,
            evaluation_task: Mutex::new(Some(evaluation_task)),
            payment_task: Mutex::new(None),
        }
    }

    pub async fn status(&self) -> ServiceStatus {
        self.shared.machine.read().await.status()
    }

    pub async fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot::from(self.status().await)
    }

    pub async fn state_history(&self) -> Vec<StateTransitionRecord> {
        self.shared.machine.read().await.state_history().to_vec()
    }

    pub async fn last_payment_error(&self) -> Option<PaymentError> {
        self.shared.machine.read().await.last_payment_error().cloned()
    }

    /// Receiver that sees every new state
    pub fn subscribe(&self) -> watch::Receiver<ServiceStatus> {
        self.shared.updates.subscribe()
    }

    /// Wait until the state satisfies `predicate`, returning that state
    pub async fn wait_for<F>(&self, mut predicate: F) -> Result<ServiceStatus, StatusError>
    where
        F: FnMut(&ServiceStatus) -> bool,
    {
        let mut updates = self.subscribe();
        let status = updates
            .wait_for(|status| predicate(status))
            .await
            .map_err(|_| StatusError::TrackerClosed)?;
        Ok(*status)
    }

    /// Start paying the extra fee. Returns the attempt number.
    ///
    /// The charge runs in the background; its outcome arrives as a
    /// `PaymentSucceeded` or `PaymentFailed` event.
    pub async fn request_payment(&self, method: PaymentMethod) -> Result<u32, StatusError> {
        let status = self.shared.apply(StatusEvent::RequestPayment).await?;

        let (Some(attempt), Some(purpose)) =
            (status.payment_in_progress(), status.extra_fee_purpose())
        else {
            return Err(StatusError::InvalidTransition {
                event: StatusEventKind::RequestPayment,
                state: status,
            });
        };

        let request = PaymentRequest::new(purpose, method).with_attempt(attempt);
        let handle = spawn_payment(
            Arc::downgrade(&self.shared),
            Arc::clone(&self.gateway),
            request,
            self.config.payment_timeout,
        );

        if let Some(previous) = self.lock_payment_task().replace(handle) {
            previous.abort();
        }
        Ok(attempt)
    }

    /// Close the payment sheet, abandoning the attempt in flight
    pub async fn cancel_payment(&self) -> Result<ServiceStatus, StatusError> {
        if let Some(task) = self.lock_payment_task().take() {
            task.abort();
        }
        self.shared.apply(StatusEvent::CancelPayment).await
    }

    pub async fn opt_self_delivery(&self) -> Result<ServiceStatus, StatusError> {
        self.shared.apply(StatusEvent::OptSelfDelivery).await
    }

    /// End the flow. Pending timers are cancelled before the transition.
    pub async fn finish(&self) -> Result<ServiceStatus, StatusError> {
        self.abort_tasks();
        let status = self.shared.apply(StatusEvent::Finish).await?;
        info!(settlement = ?status.settlement(), "Service status tracking finished");
        Ok(status)
    }

    fn abort_tasks(&self) {
        if let Some(task) = self.lock_evaluation_task().take() {
            task.abort();
        }
        if let Some(task) = self.lock_payment_task().take() {
            task.abort();
        }
    }

    fn lock_evaluation_task(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.evaluation_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_payment_task(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.payment_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for StatusTracker {
    fn drop(&mut self) {
        self.abort_tasks();
        debug!("Service status tracker dropped, pending timers cancelled");
    }
}

fn spawn_evaluation(
    shared: Weak<Shared>,
    delay: Duration,
    route: ServiceRoute,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        let Some(shared) = shared.upgrade() else {
            debug!("Evaluation timer fired after tracker teardown, ignoring");
            return;
        };
        if let Err(e) = shared.apply(StatusEvent::EvaluationCompleted { route }).await {
            warn!(error = %e, "Automatic evaluation transition rejected");
        }
    })
}

fn spawn_payment(
    shared: Weak<Shared>,
    gateway: Arc<dyn PaymentGateway>,
    request: PaymentRequest,
    timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let attempt = request.attempt;
        let event = match tokio::time::timeout(timeout, gateway.charge(&request)).await {
            Ok(Ok(receipt)) => StatusEvent::PaymentSucceeded { attempt, receipt },
            Ok(Err(error)) => StatusEvent::PaymentFailed { attempt, error },
            Err(_) => StatusEvent::PaymentFailed {
                attempt,
                error: PaymentError::TimedOut {
                    timeout_ms: timeout.as_millis() as u64,
                },
            },
        };

        if let StatusEvent::PaymentFailed { error, .. } = &event {
            warn!(attempt = %attempt, error = %error, "Extra fee payment failed");
        }

        let Some(shared) = shared.upgrade() else {
            debug!(attempt = %attempt, "Payment finished after tracker teardown, ignoring");
            return;
        };
        if let Err(e) = shared.apply(event).await {
            warn!(attempt = %attempt, error = %e, "Payment outcome rejected");
        }
    })
}
