// Core types for payments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Base diagnostic fee in Colombian pesos
pub const BASE_DIAGNOSTIC_FEE_COP: u64 = 35_000;
/// Extra fee for technician travel or equipment pickup, in Colombian pesos
pub const EXTRA_FEE_COP: u64 = 30_000;

/// Format whole pesos the Colombian way, e.g. 35000 -> "$35.000"
pub fn format_cop(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("${grouped}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// QR code for Bancolombia or Nequi
    #[default]
    QrBancolombiaNequi,
    /// PSE bank transfer or card through Wompi
    PseCardsWompi,
}

impl PaymentMethod {
    pub fn title(&self) -> &'static str {
        match self {
            PaymentMethod::QrBancolombiaNequi => "QR Bancolombia / Nequi",
            PaymentMethod::PseCardsWompi => "PSE / Cards (Wompi)",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            PaymentMethod::QrBancolombiaNequi => "Quick payment from your phone",
            PaymentMethod::PseCardsWompi => "Secure bank payment",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "qr" | "nequi" | "bancolombia" => Ok(PaymentMethod::QrBancolombiaNequi),
            "wompi" | "pse" | "card" => Ok(PaymentMethod::PseCardsWompi),
            other => Err(format!("Unknown payment method '{other}' (expected 'qr' or 'wompi')")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentPurpose {
    BaseDiagnostic,
    TechnicianTravel,
    EquipmentPickup,
}

impl PaymentPurpose {
    pub fn amount_cop(&self) -> u64 {
        match self {
            PaymentPurpose::BaseDiagnostic => BASE_DIAGNOSTIC_FEE_COP,
            PaymentPurpose::TechnicianTravel | PaymentPurpose::EquipmentPickup => EXTRA_FEE_COP,
        }
    }

    pub fn concept(&self) -> &'static str {
        match self {
            PaymentPurpose::BaseDiagnostic => "Base technical diagnostic",
            PaymentPurpose::TechnicianTravel => "Specialized technician travel",
            PaymentPurpose::EquipmentPickup => "Equipment pickup",
        }
    }
}

impl fmt::Display for PaymentPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.concept())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub purpose: PaymentPurpose,
    pub method: PaymentMethod,
    pub amount_cop: u64,
    /// 1-based attempt number for this purpose
    pub attempt: u32,
}

impl PaymentRequest {
    pub fn new(purpose: PaymentPurpose, method: PaymentMethod) -> Self {
        Self {
            purpose,
            method,
            amount_cop: purpose.amount_cop(),
            attempt: 1,
        }
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub id: Uuid,
    pub purpose: PaymentPurpose,
    pub method: PaymentMethod,
    pub amount_cop: u64,
    pub paid_at: DateTime<Utc>,
}

impl PaymentReceipt {
    pub fn for_request(request: &PaymentRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            purpose: request.purpose,
            method: request.method,
            amount_cop: request.amount_cop,
            paid_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentError {
    #[error("Payment declined by the bank: {reason}")]
    Declined { reason: String },
    #[error("Payment timed out after {timeout_ms}ms")]
    TimedOut { timeout_ms: u64 },
    /// The user closed the payment sheet before the charge settled
    #[error("Payment cancelled by the user")]
    Cancelled,
    /// Processor-side failure. The simulated processor never returns it;
    /// a real gateway maps its transport and API errors here.
    #[error("Payment gateway error: {0}")]
    Gateway(String),
}
