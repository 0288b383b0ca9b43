use anyhow::Result;

pub mod catalog;
pub mod check_contact;
pub mod check_hours;
pub mod simulate;
pub mod technician;

pub use catalog::CatalogCommand;
pub use check_contact::CheckContactCommand;
pub use check_hours::CheckHoursCommand;
pub use simulate::SimulateCommand;
pub use technician::TechnicianCommand;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Print `value` as pretty JSON on stdout
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn show_welcome() -> Result<()> {
    println!("🛠️  TuTranquilo - Tech support at home or at your business");
    println!();
    println!("To get started:");
    println!("  📋 tutranquilo catalog          # Browse the services");
    println!("  👷 tutranquilo technician       # Meet your technician");
    println!("  🚀 tutranquilo simulate         # Run a full booking");
    println!();
    println!("Form checks:");
    println!("  📞 tutranquilo check-contact --name Ana --phone 3001234567");
    println!("  🕐 tutranquilo check-hours --day sabado --time 10:30");
    println!();
    println!("💡 Try 'tutranquilo simulate --route on-site --time-scale 0.1'");
    Ok(())
}
