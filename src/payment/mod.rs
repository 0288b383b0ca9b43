// Payment Module
//
// Simulated payments for the base diagnostic fee and the extra
// travel/pickup fee. Payment completion is fallible so callers must
// handle declines, timeouts and cancellations.

pub mod types;
pub mod gateway;

#[cfg(test)]
pub mod mocks;

pub use types::{
    format_cop, PaymentError, PaymentMethod, PaymentPurpose, PaymentReceipt, PaymentRequest,
    BASE_DIAGNOSTIC_FEE_COP, EXTRA_FEE_COP,
};
pub use gateway::{PaymentGateway, SimulatedGateway};
