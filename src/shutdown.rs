use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// Graceful shutdown coordinator for simulations.
///
/// Races running work against ctrl-c and bounds how long teardown may take.
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
    grace_period: Duration,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl ShutdownCoordinator {
    pub fn new(grace_period: Duration) -> Self {
        Self { grace_period }
    }

    /// Run `work` to completion unless a shutdown signal arrives first.
    ///
    /// Returns `None` when interrupted; `work` is dropped at that point.
    pub async fn run_until_signal<F>(&self, work: F) -> Option<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            output = work => Some(output),
            _ = shutdown_signal() => {
                info!("Shutdown signal received, stopping simulation");
                None
            }
        }
    }

    /// Run teardown within the grace period
    pub async fn teardown<F, T>(&self, cleanup: F) -> Result<T>
    where
        F: Future<Output = T>,
    {
        let output = timeout(self.grace_period, cleanup)
            .await
            .map_err(|_| anyhow::anyhow!("Timeout after {:?} waiting for teardown", self.grace_period))?;
        info!("Graceful shutdown completed successfully");
        Ok(output)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
