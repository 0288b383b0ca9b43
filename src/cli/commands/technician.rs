use anyhow::Result;

use super::{print_json, Command};
use crate::technician::{StaticTechnicianDirectory, TechnicianDirectory};

pub struct TechnicianCommand {
    pub json: bool,
}

impl TechnicianCommand {
    pub fn new() -> Self {
        Self { json: false }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

impl Default for TechnicianCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for TechnicianCommand {
    async fn execute(&self) -> Result<()> {
        let technician = StaticTechnicianDirectory::new().primary_technician();
        if self.json {
            return print_json(&technician);
        }

        println!("👷 {}", technician.name);
        println!("   🎓 {}", technician.title);
        println!("   🛠️  {}", technician.experience);
        println!("   ⭐ {}", technician.rating_headline());
        println!("   {}", technician.bio);
        println!();
        println!("💬 Reviews:");
        for review in &technician.reviews {
            println!(
                "   {} {} ({}): {}",
                "★".repeat(usize::from(review.rating)),
                review.user_name,
                review.date,
                review.comment
            );
        }
        Ok(())
    }
}
