use anyhow::{anyhow, Result};

use super::Command;
use crate::booking::{is_within_service_hours, parse_time_of_day, parse_weekday};

pub struct CheckHoursCommand {
    pub day: String,
    pub time: String,
}

impl CheckHoursCommand {
    pub fn new(day: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            day: day.into(),
            time: time.into(),
        }
    }
}

impl Command for CheckHoursCommand {
    async fn execute(&self) -> Result<()> {
        let day = parse_weekday(&self.day).ok_or_else(|| anyhow!("Unknown day '{}'", self.day))?;
        let time = parse_time_of_day(&self.time)
            .ok_or_else(|| anyhow!("'{}' is not a valid time (use HH:MM)", self.time))?;

        if is_within_service_hours(day, time) {
            println!("✅ {} {} is within business hours", day, time);
            return Ok(());
        }

        println!("❌ {} {} is outside business hours", day, time);
        println!("   🕐 Monday to Friday: 08:00 - 19:00 (closed 13:00 - 14:00)");
        println!("   🕐 Saturday: 08:00 - 11:00");
        println!("   💡 Sundays and holidays need direct confirmation with the technician");
        Err(anyhow!("{} {} is outside business hours", day, time))
    }
}
