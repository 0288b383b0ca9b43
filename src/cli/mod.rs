use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::catalog::{ServiceRoute, UserType};
use crate::payment::PaymentMethod;
use crate::simulation::ExtraFeeChoice;

pub mod commands;

#[derive(Parser)]
#[command(name = "tutranquilo")]
#[command(about = "Tech-support booking: service catalog, form checks and status simulation")]
#[command(long_about = "TuTranquilo walks a customer from picking a support service to rating the \
                       technician. Use 'tutranquilo simulate' to run the whole booking flow with \
                       simulated payments and timers.")]
pub struct Cli {
    /// Configuration file (defaults to ./tutranquilo.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the services offered to business and home customers
    Catalog {
        /// Only show services for this user type (empresa or hogar)
        #[arg(long)]
        user_type: Option<UserType>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show the assigned technician's profile and reviews
    Technician {
        #[arg(long)]
        json: bool,
    },
    /// Validate contact details the way the contact step does
    CheckContact {
        #[arg(long)]
        name: String,
        /// Phone as typed; non-digits are dropped
        #[arg(long)]
        phone: String,
    },
    /// Check a suggested visit time against business hours
    CheckHours {
        /// Day of the week (lunes, tuesday, sat, ...)
        #[arg(long)]
        day: String,
        /// Time as HH:MM or HHMM
        #[arg(long)]
        time: String,
    },
    /// Run the whole booking flow end to end
    Simulate {
        #[arg(long, default_value = "hogar")]
        user_type: UserType,
        /// Service id, defaults to the first one offered
        #[arg(long)]
        service: Option<String>,
        /// Route the evaluation resolves to (remote, on-site, diagnostic-center)
        #[arg(long)]
        route: Option<ServiceRoute>,
        /// What to do about the extra fee (pay or self-delivery)
        #[arg(long, default_value = "pay")]
        choice: ExtraFeeChoice,
        /// Payment method (qr or wompi), defaults to the configured one
        #[arg(long)]
        method: Option<PaymentMethod>,
        /// Stars for the rating step; omit to skip rating
        #[arg(long)]
        stars: Option<u8>,
        #[arg(long, default_value = "")]
        comment: String,
        /// Multiplier for every simulated delay (0 runs instantly)
        #[arg(long, default_value_t = 1.0)]
        time_scale: f64,
        /// Print the final report as JSON
        #[arg(long)]
        json: bool,
    },
}
