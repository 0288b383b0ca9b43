use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::catalog::ServiceRoute;
use crate::payment::{PaymentMethod, SimulatedGateway};
use crate::status::StatusTrackerConfig;

/// Main configuration structure for TuTranquilo
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TuTranquiloConfig {
    /// Logging settings
    pub observability: ObservabilityConfig,
    /// Service status timers and payment policy
    pub status: StatusConfig,
    /// Simulated payment processor
    pub payment: PaymentConfig,
    /// Technician search
    pub assignment: AssignmentConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Default log level when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON lines instead of human-readable logs
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusConfig {
    pub evaluation_delay_ms: u64,
    /// Route the automatic evaluation resolves to
    pub evaluation_route: ServiceRoute,
    pub payment_timeout_ms: u64,
    pub max_payment_attempts: u32,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            evaluation_delay_ms: 5_000,
            evaluation_route: ServiceRoute::DiagnosticCenter,
            payment_timeout_ms: 30_000,
            max_payment_attempts: 3,
        }
    }
}

impl StatusConfig {
    pub fn tracker_config(&self) -> StatusTrackerConfig {
        StatusTrackerConfig {
            evaluation_delay: Duration::from_millis(self.evaluation_delay_ms),
            evaluation_route: self.evaluation_route,
            payment_timeout: Duration::from_millis(self.payment_timeout_ms),
            max_payment_attempts: self.max_payment_attempts,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentConfig {
    pub processing_delay_ms: u64,
    /// Share of charges the simulated processor declines, 0.0 to 1.0
    pub decline_rate: f64,
    pub default_method: PaymentMethod,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            processing_delay_ms: 2_500,
            decline_rate: 0.0,
            default_method: PaymentMethod::default(),
        }
    }
}

impl PaymentConfig {
    pub fn gateway(&self) -> SimulatedGateway {
        SimulatedGateway::new(Duration::from_millis(self.processing_delay_ms))
            .with_decline_rate(self.decline_rate)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssignmentConfig {
    pub search_delay_ms: u64,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            search_delay_ms: 3_000,
        }
    }
}

impl AssignmentConfig {
    pub fn search_delay(&self) -> Duration {
        Duration::from_millis(self.search_delay_ms)
    }
}

impl TuTranquiloConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (tutranquilo.toml)
    /// 3. Environment variables (TUTRANQUILO_SECTION__FIELD)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("tutranquilo.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        // Field names contain underscores, so sections are split on "__"
        builder = builder.add_source(
            Environment::with_prefix("TUTRANQUILO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<TuTranquiloConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = TuTranquiloConfig::load_env_file();
        TuTranquiloConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static TuTranquiloConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_simulated_timings() {
        let config = TuTranquiloConfig::default();
        let tracker = config.status.tracker_config();
        assert_eq!(tracker.evaluation_delay, Duration::from_secs(5));
        assert_eq!(tracker.max_payment_attempts, 3);
        assert_eq!(config.payment.gateway().processing_delay(), Duration::from_millis(2500));
        assert_eq!(config.assignment.search_delay(), Duration::from_secs(3));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tutranquilo.toml");
        std::fs::write(
            &path,
            "[status]\nevaluation_route = \"on_site\"\nmax_payment_attempts = 5\n",
        )
        .unwrap();

        let config = TuTranquiloConfig::load_from(&path).unwrap();
        assert_eq!(config.status.evaluation_route, ServiceRoute::OnSite);
        assert_eq!(config.status.max_payment_attempts, 5);
        assert_eq!(config.status.evaluation_delay_ms, 5_000);
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tutranquilo.toml");

        let mut config = TuTranquiloConfig::default();
        config.payment.default_method = PaymentMethod::PseCardsWompi;
        config.save_to_file(&path).unwrap();

        let reloaded = TuTranquiloConfig::load_from(&path).unwrap();
        assert_eq!(reloaded.payment.default_method, PaymentMethod::PseCardsWompi);
    }
}
