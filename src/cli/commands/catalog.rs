use anyhow::Result;
use serde::Serialize;

use super::{print_json, Command};
use crate::catalog::{services_for, ServiceOffering, ServiceRoute, UserType, EXTRA_FEE_NOTE};

pub struct CatalogCommand {
    pub user_type: Option<UserType>,
    pub json: bool,
}

#[derive(Serialize)]
struct CatalogSection {
    user_type: UserType,
    services: &'static [ServiceOffering],
}

impl CatalogCommand {
    pub fn new(user_type: Option<UserType>) -> Self {
        Self {
            user_type,
            json: false,
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    fn user_types(&self) -> Vec<UserType> {
        match self.user_type {
            Some(user_type) => vec![user_type],
            None => vec![UserType::Business, UserType::Home],
        }
    }
}

impl Command for CatalogCommand {
    async fn execute(&self) -> Result<()> {
        if self.json {
            let sections: Vec<CatalogSection> = self
                .user_types()
                .into_iter()
                .map(|user_type| CatalogSection {
                    user_type,
                    services: services_for(user_type),
                })
                .collect();
            return print_json(&sections);
        }

        for user_type in self.user_types() {
            println!("📋 {} ({}): {}", user_type.label(), user_type.slug(), user_type.description());
            for service in services_for(user_type) {
                println!("   • {} [{}]", service.name, service.id);
                println!("     {}", service.description);
                println!("     Modality: {}", service.modality);
            }
            println!();
        }

        println!("🧭 How your case gets resolved:");
        for route in ServiceRoute::ALL {
            println!("   • {}: {}", route.title(), route.description());
        }
        println!("   💲 {}", EXTRA_FEE_NOTE);
        Ok(())
    }
}
