//! Service Catalog Module
//!
//! Static data behind the first wizard steps: who is asking for support,
//! which services they can pick, and the three ways a case gets resolved.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Extra fee note shown with the modality explainer.
pub const EXTRA_FEE_NOTE: &str =
    "Technician travel or equipment pickup carries an extra fee of $30.000, paid at the status step.";

/// Who the support request is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserType {
    #[serde(rename = "empresa")]
    Business,
    #[serde(rename = "hogar")]
    Home,
}

impl UserType {
    /// Slug used when the user type travels between steps
    pub fn slug(&self) -> &'static str {
        match self {
            UserType::Business => "empresa",
            UserType::Home => "hogar",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserType::Business => "Business",
            UserType::Home => "Home",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            UserType::Business => "Technical support for offices and corporate equipment",
            UserType::Home => "Repair of personal computers and laptops",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown user type '{0}' (expected 'empresa' or 'hogar')")]
pub struct UnknownUserType(pub String);

impl FromStr for UserType {
    type Err = UnknownUserType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "empresa" | "business" => Ok(UserType::Business),
            "hogar" | "home" => Ok(UserType::Home),
            other => Err(UnknownUserType(other.to_string())),
        }
    }
}

/// How a case is resolved once the technician has evaluated it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceRoute {
    /// Secure remote session, no extra fee
    Remote,
    /// Technician travels to the service location
    OnSite,
    /// Equipment goes to the lab
    DiagnosticCenter,
}

impl ServiceRoute {
    pub const ALL: [ServiceRoute; 3] = [
        ServiceRoute::Remote,
        ServiceRoute::OnSite,
        ServiceRoute::DiagnosticCenter,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ServiceRoute::Remote => "Remote Support",
            ServiceRoute::OnSite => "On-site Service",
            ServiceRoute::DiagnosticCenter => "Diagnostic Center",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ServiceRoute::Remote => {
                "Secure internet connection for software faults, viruses or configuration. The fastest option."
            }
            ServiceRoute::OnSite => {
                "The technician travels to your location for physical repairs or when the internet is down."
            }
            ServiceRoute::DiagnosticCenter => {
                "For highly complex cases that need lab tools and micro-soldering."
            }
        }
    }

    /// Whether this route carries the extra travel/pickup fee
    pub fn has_extra_fee(&self) -> bool {
        !matches!(self, ServiceRoute::Remote)
    }
}

impl FromStr for ServiceRoute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "remote" => Ok(ServiceRoute::Remote),
            "on_site" | "onsite" => Ok(ServiceRoute::OnSite),
            "diagnostic_center" | "diagnostic" => Ok(ServiceRoute::DiagnosticCenter),
            other => Err(format!("Unknown service route '{other}'")),
        }
    }
}

/// A service the user can pick in the selection step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceOffering {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Human-readable list of the routes the service usually takes
    pub modality: &'static str,
}

const BUSINESS_SERVICES: [ServiceOffering; 5] = [
    ServiceOffering {
        id: "soporte-computadores",
        name: "Technical support",
        description: "Fixing software and hardware faults on business equipment.",
        modality: "Remote or on site",
    },
    ServiceOffering {
        id: "mantenimiento-preventivo",
        name: "Business maintenance",
        description: "Scheduled review to prevent faults on corporate equipment.",
        modality: "On site or Center",
    },
    ServiceOffering {
        id: "diagnostico-tecnico",
        name: "Business diagnostics",
        description: "Professional assessment with a report and technical recommendations.",
        modality: "Remote or on site",
    },
    ServiceOffering {
        id: "soporte-m365",
        name: "Microsoft 365 support",
        description: "Setup and administration of corporate mail and users.",
        modality: "Remote or on site",
    },
    ServiceOffering {
        id: "seguridad",
        name: "IT security",
        description: "Antivirus installation and business data protection.",
        modality: "Remote or on site",
    },
];

const HOME_SERVICES: [ServiceOffering; 3] = [
    ServiceOffering {
        id: "mantenimiento-preventivo-hogar",
        name: "Computer maintenance",
        description: "Review and cleaning to improve your PC's performance.",
        modality: "On site or Center",
    },
    ServiceOffering {
        id: "mantenimiento-correctivo-hogar",
        name: "Computer repair",
        description: "Find and fix malfunctions in your equipment.",
        modality: "On site or Center",
    },
    ServiceOffering {
        id: "diagnostico-tecnico-hogar",
        name: "Technical diagnostics",
        description: "Assessment to find the cause of faults or poor performance.",
        modality: "On site or Center",
    },
];

/// Services offered to the given user type, in display order
pub fn services_for(user_type: UserType) -> &'static [ServiceOffering] {
    match user_type {
        UserType::Business => &BUSINESS_SERVICES,
        UserType::Home => &HOME_SERVICES,
    }
}

pub fn find_service(user_type: UserType, service_id: &str) -> Option<&'static ServiceOffering> {
    services_for(user_type).iter().find(|s| s.id == service_id)
}

const SERVICE_NAMES: [(&str, &str); 5] = [
    ("soporte-computadores", "Computer technical support"),
    ("diagnostico-tecnico-empresarial", "Business technical diagnostics"),
    ("mantenimiento-preventivo-empresarial", "Business preventive maintenance"),
    ("soporte-m365", "Microsoft 365 support"),
    ("seguridad-informatica", "IT security"),
];

/// Resolve a service id into the name shown on the summary step.
///
/// Ids outside the lookup table are humanized: dashes become spaces and the
/// first character is upper-cased.
pub fn resolve_service_name(service_id: &str) -> String {
    if let Some((_, name)) = SERVICE_NAMES.iter().find(|(id, _)| *id == service_id) {
        return (*name).to_string();
    }

    let spaced = service_id.replace('-', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
