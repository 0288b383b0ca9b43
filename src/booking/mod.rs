// Booking Form Data Module
//
// Validation predicates for the wizard's input steps and the immutable
// service request they produce.

pub mod validation;
pub mod request;

pub use validation::{
    apply_phone_input, is_valid_contact_name, is_valid_phone, is_within_service_hours,
    parse_time_of_day, parse_weekday, TimeOfDay, MAX_PHONE_DIGITS, MIN_CONTACT_NAME_CHARS,
};
pub use request::{
    BookingError, BookingSummary, ContactInfo, PhotoRef, ProblemDetails, ServiceRequest,
    ServiceRequestBuilder, MAX_PHOTOS, NEXT_STEPS,
};
