use anyhow::Result;
use clap::Parser;

use tutranquilo::cli::commands::{
    show_welcome, CatalogCommand, CheckContactCommand, CheckHoursCommand, Command,
    SimulateCommand, TechnicianCommand,
};
use tutranquilo::cli::{Cli, Commands};
use tutranquilo::{init_config, init_telemetry, shutdown_telemetry};
use tutranquilo::{ShutdownCoordinator, SimulationOptions, TuTranquiloConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            TuTranquiloConfig::load_env_file()?;
            TuTranquiloConfig::load_from(path)?
        }
        None => tutranquilo::config()?.clone(),
    };
    init_telemetry(&config.observability)?;
    if cli.config.is_none() {
        init_config()?;
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(async {
        match cli.command {
            None => show_welcome().await,
            Some(Commands::Catalog { user_type, json }) => {
                CatalogCommand::new(user_type).with_json(json).execute().await
            }
            Some(Commands::Technician { json }) => {
                TechnicianCommand::new().with_json(json).execute().await
            }
            Some(Commands::CheckContact { name, phone }) => {
                CheckContactCommand::new(name, phone).execute().await
            }
            Some(Commands::CheckHours { day, time }) => {
                CheckHoursCommand::new(day, time).execute().await
            }
            Some(Commands::Simulate {
                user_type,
                service,
                route,
                choice,
                method,
                stars,
                comment,
                time_scale,
                json,
            }) => {
                let options = SimulationOptions {
                    user_type,
                    service_id: service,
                    route,
                    choice,
                    method: method.unwrap_or(config.payment.default_method),
                    stars,
                    comment,
                    time_scale,
                    ..Default::default()
                };
                SimulateCommand::new(options, config.clone())
                    .with_json(json)
                    .execute()
                    .await
            }
        }
    });

    runtime.block_on(ShutdownCoordinator::default().teardown(async { shutdown_telemetry() }))?;
    result
}
