use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use super::{print_json, Command};
use crate::config::TuTranquiloConfig;
use crate::payment::{format_cop, SimulatedGateway, EXTRA_FEE_COP};
use crate::shutdown::ShutdownCoordinator;
use crate::simulation::{scale_delay, BookingSimulation, SimulationOptions, SimulationReport};
use crate::status::Settlement;

pub struct SimulateCommand {
    pub options: SimulationOptions,
    pub config: TuTranquiloConfig,
    pub json: bool,
}

impl SimulateCommand {
    pub fn new(options: SimulationOptions, config: TuTranquiloConfig) -> Self {
        Self {
            options,
            config,
            json: false,
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    fn simulation(&self) -> Result<BookingSimulation> {
        let processing_delay = scale_delay(
            Duration::from_millis(self.config.payment.processing_delay_ms),
            self.options.time_scale,
        )?;
        let gateway = SimulatedGateway::new(processing_delay)
            .with_decline_rate(self.config.payment.decline_rate);
        Ok(BookingSimulation::new(&self.config).with_gateway(Arc::new(gateway)))
    }

    fn print_report(&self, report: &SimulationReport) {
        let booking = &report.booking;
        let summary = booking.request.summary();

        println!("🧾 {} for {}", summary.service_name, summary.user_type_label);
        println!("   📍 {}", summary.location);
        println!("   📝 {}", summary.description);
        println!(
            "   💳 Base diagnostic fee {} paid ({})",
            format_cop(booking.base_payment.amount_cop),
            booking.base_payment.method.title()
        );
        println!(
            "   👷 {} - {}",
            booking.technician.name,
            booking.technician.rating_headline()
        );
        println!();

        println!("🔄 Service status:");
        for record in &report.status_history {
            println!(
                "   {} → {} ({:?})",
                record.from_state.name(),
                record.to_state.name(),
                record.event
            );
        }

        let snapshot = &report.final_snapshot;
        println!();
        println!("🏁 {}: {}", snapshot.display.title, snapshot.display.subtitle);
        match snapshot.status.settlement() {
            Settlement::ExtraFeePaid => println!(
                "   ✅ Extra fee {} paid after {} attempt(s)",
                format_cop(EXTRA_FEE_COP),
                report.extra_fee_attempts
            ),
            Settlement::SelfDelivery => {
                if let Some(drop_off) = &snapshot.drop_off {
                    println!("   📦 Bring your equipment to {} (ticket {})", drop_off.address, drop_off.ticket);
                }
            }
            Settlement::Unsettled => println!("   ⚠️  Extra fee left unpaid"),
            Settlement::NotRequired => println!("   ✅ No extra fee required"),
        }

        if booking.rating.is_skipped() {
            println!("   ⭐ Rating skipped");
        } else {
            println!("   ⭐ Rated {}/5", booking.rating.stars());
        }
        println!("   🔗 Correlation id: {}", booking.correlation_id);
    }
}

impl Command for SimulateCommand {
    async fn execute(&self) -> Result<()> {
        let simulation = self.simulation()?;
        if !self.json {
            println!("🚀 Simulating a booking (time scale {})...", self.options.time_scale);
            println!();
        }

        let coordinator = ShutdownCoordinator::default();
        let Some(result) = coordinator
            .run_until_signal(simulation.run(&self.options))
            .await
        else {
            println!("🛑 Simulation interrupted, pending timers cancelled");
            return Ok(());
        };

        let report = result?;
        if self.json {
            print_json(&report)
        } else {
            self.print_report(&report);
            Ok(())
        }
    }
}
