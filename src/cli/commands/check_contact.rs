use anyhow::Result;

use super::Command;
use crate::booking::{apply_phone_input, ContactInfo, MAX_PHONE_DIGITS, MIN_CONTACT_NAME_CHARS};

pub struct CheckContactCommand {
    pub name: String,
    pub phone: String,
}

impl CheckContactCommand {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }
}

impl Command for CheckContactCommand {
    async fn execute(&self) -> Result<()> {
        // Replay the input one keystroke at a time, as the phone field sees it
        let phone = self.phone.chars().fold(String::new(), |current, c| {
            apply_phone_input(&current, &format!("{current}{c}"))
        });
        if phone != self.phone {
            println!("✂️  Phone input kept as '{}'", phone);
        }

        let contact = ContactInfo::new(self.name.clone(), phone);
        match contact.validate() {
            Ok(()) => {
                println!("✅ Contact details are valid");
                Ok(())
            }
            Err(e) => {
                println!("❌ {}", e);
                println!(
                    "   💡 Names need {} or more characters, phones exactly {} digits",
                    MIN_CONTACT_NAME_CHARS, MAX_PHONE_DIGITS
                );
                Err(e.into())
            }
        }
    }
}
