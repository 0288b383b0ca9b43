use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::{info, warn};

use super::types::{PaymentError, PaymentReceipt, PaymentRequest};

/// Payment processor interface
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge the request. Resolves once the bank answers.
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError>;
}

/// Gateway that waits a fixed processing delay and then approves.
///
/// A non-zero `decline_rate` makes a share of charges fail so the
/// failure path can be exercised end to end.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    processing_delay: Duration,
    decline_rate: f64,
}

impl SimulatedGateway {
    pub fn new(processing_delay: Duration) -> Self {
        Self {
            processing_delay,
            decline_rate: 0.0,
        }
    }

    pub fn with_decline_rate(mut self, decline_rate: f64) -> Self {
        self.decline_rate = decline_rate.clamp(0.0, 1.0);
        self
    }

    pub fn processing_delay(&self) -> Duration {
        self.processing_delay
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(Duration::from_millis(2500))
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        info!(
            purpose = ?request.purpose,
            method = ?request.method,
            amount_cop = %request.amount_cop,
            attempt = %request.attempt,
            "Verifying secure payment"
        );
        tokio::time::sleep(self.processing_delay).await;

        let declined = self.decline_rate > 0.0 && rand::rng().random_bool(self.decline_rate);
        if declined {
            warn!(purpose = ?request.purpose, attempt = %request.attempt, "Simulated payment declined");
            return Err(PaymentError::Declined {
                reason: "insufficient funds".to_string(),
            });
        }

        let receipt = PaymentReceipt::for_request(request);
        info!(receipt_id = %receipt.id, purpose = ?receipt.purpose, "Payment approved");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::types::{PaymentMethod, PaymentPurpose};

    #[tokio::test(start_paused = true)]
    async fn test_simulated_gateway_approves_after_delay() {
        let gateway = SimulatedGateway::default();
        let request = PaymentRequest::new(PaymentPurpose::BaseDiagnostic, PaymentMethod::PseCardsWompi);

        let started = tokio::time::Instant::now();
        let receipt = gateway.charge(&request).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(2500));
        assert_eq!(receipt.amount_cop, 35_000);
        assert_eq!(receipt.method, PaymentMethod::PseCardsWompi);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_decline_rate_always_declines() {
        let gateway = SimulatedGateway::new(Duration::from_millis(10)).with_decline_rate(1.0);
        let request = PaymentRequest::new(PaymentPurpose::EquipmentPickup, PaymentMethod::default());

        let result = gateway.charge(&request).await;
        assert!(matches!(result, Err(PaymentError::Declined { .. })));
    }

    #[test]
    fn test_instant_gateway_tags_attempt() {
        tokio_test::block_on(async {
            let gateway = SimulatedGateway::new(Duration::ZERO);
            let request = PaymentRequest::new(PaymentPurpose::BaseDiagnostic, PaymentMethod::default())
                .with_attempt(2);

            let receipt = gateway.charge(&request).await.unwrap();
            assert_eq!(receipt.purpose, PaymentPurpose::BaseDiagnostic);
        });
    }

    #[test]
    fn test_decline_rate_is_clamped() {
        let gateway = SimulatedGateway::default().with_decline_rate(7.0);
        assert_eq!(gateway.decline_rate, 1.0);
        assert_eq!(gateway.processing_delay(), Duration::from_millis(2500));
    }
}
