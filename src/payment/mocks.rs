// Mock payment gateway for unit tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::gateway::PaymentGateway;
use super::types::{PaymentError, PaymentReceipt, PaymentRequest};

/// Gateway that replays scripted outcomes in order and records every request.
/// Once the script runs out it approves.
#[derive(Debug, Clone, Default)]
pub struct MockPaymentGateway {
    delay: Duration,
    outcomes: Arc<Mutex<VecDeque<Result<(), PaymentError>>>>,
    requests: Arc<Mutex<Vec<PaymentRequest>>>,
}

impl MockPaymentGateway {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub fn push_outcome(&self, outcome: Result<(), PaymentError>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn get_requests(&self) -> Vec<PaymentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        self.requests.lock().unwrap().push(request.clone());
        tokio::time::sleep(self.delay).await;

        let outcome = self.outcomes.lock().unwrap().pop_front().unwrap_or(Ok(()));
        outcome.map(|_| PaymentReceipt::for_request(request))
    }
}
