use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::directory::TechnicianDirectory;
use super::types::Technician;

/// Simulated technician search.
///
/// Resolves the directory's primary technician after `search_delay`.
/// Dropping the returned future abandons the search.
pub struct TechnicianAssignment {
    directory: Arc<dyn TechnicianDirectory>,
    search_delay: Duration,
}

impl TechnicianAssignment {
    pub fn new(directory: Arc<dyn TechnicianDirectory>, search_delay: Duration) -> Self {
        Self {
            directory,
            search_delay,
        }
    }

    pub fn search_delay(&self) -> Duration {
        self.search_delay
    }

    pub async fn assign(&self) -> Technician {
        info!(search_delay_ms = %self.search_delay.as_millis(), "Searching for a technician");
        tokio::time::sleep(self.search_delay).await;

        let technician = self.directory.primary_technician();
        info!(
            technician_id = %technician.id,
            average_rating = %technician.average_rating(),
            "Technician assigned"
        );
        technician
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::technician::directory::MockTechnicianDirectory;
    use crate::technician::StaticTechnicianDirectory;

    #[tokio::test(start_paused = true)]
    async fn test_assignment_waits_for_search_delay() {
        let assignment = TechnicianAssignment::new(
            Arc::new(StaticTechnicianDirectory),
            Duration::from_secs(3),
        );

        let started = tokio::time::Instant::now();
        let technician = assignment.assign().await;

        assert!(started.elapsed() >= Duration::from_secs(3));
        assert_eq!(technician.id, "camilo-murcia");
    }

    #[tokio::test(start_paused = true)]
    async fn test_assignment_consults_directory_once() {
        let mut directory = MockTechnicianDirectory::new();
        directory
            .expect_primary_technician()
            .times(1)
            .returning(|| StaticTechnicianDirectory.primary_technician());

        let assignment = TechnicianAssignment::new(Arc::new(directory), Duration::from_millis(10));
        let technician = assignment.assign().await;

        assert_eq!(technician.name, "Camilo Andrés Murcia Romero");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_search_never_resolves() {
        let assignment = TechnicianAssignment::new(
            Arc::new(StaticTechnicianDirectory),
            Duration::from_secs(3),
        );

        let result = tokio::time::timeout(Duration::from_secs(1), assignment.assign()).await;
        assert!(result.is_err());
    }
}
