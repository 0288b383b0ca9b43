use chrono::{Utc, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::validation::{
    is_valid_contact_name, is_valid_phone, is_within_service_hours, parse_time_of_day, TimeOfDay,
};
use crate::catalog::{resolve_service_name, UserType};

pub const MAX_PHOTOS: usize = 3;

/// Steps shown on the summary card, in order
pub const NEXT_STEPS: [&str; 4] = [
    "1. Pay the base diagnostic fee",
    "2. Enter contact details",
    "3. Technician assignment",
    "4. Evaluation and execution of the service",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("A user type must be selected")]
    MissingUserType,
    #[error("A service must be selected")]
    MissingService,
    #[error("Problem details are missing")]
    MissingProblemDetails,
    #[error("Contact details are missing")]
    MissingContactInfo,
    #[error("Problem description must not be blank")]
    BlankDescription,
    #[error("Service location must not be blank")]
    BlankLocation,
    #[error("Suggested time '{0}' is not a valid time of day")]
    UnparseableTime(String),
    #[error("Suggested time {time} on {day} is outside business hours")]
    TimeOutsideWindow { day: Weekday, time: TimeOfDay },
    #[error("At most {max} photos can be attached")]
    TooManyPhotos { max: usize },
    #[error("Contact name must have at least 3 characters")]
    InvalidContactName,
    #[error("Phone number must have exactly 10 digits")]
    InvalidPhone,
}

/// Opaque reference to an attached photo
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhotoRef(pub String);

impl PhotoRef {
    /// Reference for a photo captured right now
    pub fn capture() -> Self {
        Self(format!("photo_{}", Utc::now().timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// What the problem description step produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetails {
    pub description: String,
    pub location: String,
    pub preferred_day: Option<Weekday>,
    pub preferred_time: Option<String>,
    photos: Vec<PhotoRef>,
}

impl ProblemDetails {
    pub fn new(description: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            location: location.into(),
            preferred_day: None,
            preferred_time: None,
            photos: Vec::new(),
        }
    }

    pub fn with_preferred_day(mut self, day: Weekday) -> Self {
        self.preferred_day = Some(day);
        self
    }

    pub fn with_preferred_time(mut self, time: impl Into<String>) -> Self {
        let time = time.into();
        self.preferred_time = if time.trim().is_empty() { None } else { Some(time) };
        self
    }

    /// Attach a photo; the fourth one is refused and the list is left as is
    pub fn attach_photo(&mut self, photo: PhotoRef) -> Result<usize, BookingError> {
        if self.photos.len() >= MAX_PHOTOS {
            return Err(BookingError::TooManyPhotos { max: MAX_PHOTOS });
        }
        self.photos.push(photo);
        Ok(self.photos.len())
    }

    pub fn photos(&self) -> &[PhotoRef] {
        &self.photos
    }

    /// Label for the attach button, e.g. "Photos attached (2/3)"
    pub fn photo_label(&self) -> String {
        if self.photos.is_empty() {
            "Attach photos or evidence".to_string()
        } else {
            format!("Photos attached ({}/{})", self.photos.len(), MAX_PHOTOS)
        }
    }

    /// Parsed suggested time, if one was typed
    pub fn preferred_time_of_day(&self) -> Result<Option<TimeOfDay>, BookingError> {
        match &self.preferred_time {
            None => Ok(None),
            Some(raw) => parse_time_of_day(raw)
                .map(Some)
                .ok_or_else(|| BookingError::UnparseableTime(raw.clone())),
        }
    }

    pub fn validate(&self) -> Result<(), BookingError> {
        if self.description.trim().is_empty() {
            return Err(BookingError::BlankDescription);
        }
        if self.location.trim().is_empty() {
            return Err(BookingError::BlankLocation);
        }
        if self.photos.len() > MAX_PHOTOS {
            return Err(BookingError::TooManyPhotos { max: MAX_PHOTOS });
        }
        if let Some(time) = self.preferred_time_of_day()? {
            // The day picker starts on Monday
            let day = self.preferred_day.unwrap_or(Weekday::Mon);
            if !is_within_service_hours(day, time) {
                return Err(BookingError::TimeOutsideWindow { day, time });
            }
        }
        Ok(())
    }
}

/// What the contact step produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub phone: String,
}

impl ContactInfo {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }

    pub fn validate(&self) -> Result<(), BookingError> {
        if !is_valid_contact_name(&self.name) {
            return Err(BookingError::InvalidContactName);
        }
        if !is_valid_phone(&self.phone) {
            return Err(BookingError::InvalidPhone);
        }
        Ok(())
    }
}

/// A submitted support request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRequest {
    user_type: UserType,
    service_id: String,
    problem: ProblemDetails,
    contact: ContactInfo,
}

impl ServiceRequest {
    pub fn builder() -> ServiceRequestBuilder {
        ServiceRequestBuilder::default()
    }

    pub fn user_type(&self) -> UserType {
        self.user_type
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    pub fn service_name(&self) -> String {
        resolve_service_name(&self.service_id)
    }

    pub fn problem(&self) -> &ProblemDetails {
        &self.problem
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn summary(&self) -> BookingSummary {
        BookingSummary::new(self.user_type, &self.service_id, &self.problem)
    }
}

/// Confirmation card shown before the base payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingSummary {
    pub service_name: String,
    pub user_type_label: String,
    pub description: String,
    pub location: String,
    pub next_steps: Vec<String>,
}

impl BookingSummary {
    /// Summary for the confirmation step, before contact details exist
    pub fn new(user_type: UserType, service_id: &str, problem: &ProblemDetails) -> Self {
        Self {
            service_name: resolve_service_name(service_id),
            user_type_label: user_type.label().to_string(),
            description: problem.description.clone(),
            location: problem.location.clone(),
            next_steps: NEXT_STEPS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServiceRequestBuilder {
    user_type: Option<UserType>,
    service_id: Option<String>,
    problem: Option<ProblemDetails>,
    contact: Option<ContactInfo>,
}

impl ServiceRequestBuilder {
    pub fn user_type(mut self, user_type: UserType) -> Self {
        self.user_type = Some(user_type);
        self
    }

    pub fn service_id(mut self, service_id: impl Into<String>) -> Self {
        self.service_id = Some(service_id.into());
        self
    }

    pub fn problem(mut self, problem: ProblemDetails) -> Self {
        self.problem = Some(problem);
        self
    }

    pub fn contact(mut self, contact: ContactInfo) -> Self {
        self.contact = Some(contact);
        self
    }

    /// Validate every field and freeze the request.
    ///
    /// Returns the first rule that fails, in step order.
    pub fn build(self) -> Result<ServiceRequest, BookingError> {
        let user_type = self.user_type.ok_or(BookingError::MissingUserType)?;
        let service_id = self
            .service_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(BookingError::MissingService)?;
        let problem = self.problem.ok_or(BookingError::MissingProblemDetails)?;
        problem.validate()?;
        let contact = self.contact.ok_or(BookingError::MissingContactInfo)?;
        contact.validate()?;

        Ok(ServiceRequest {
            user_type,
            service_id,
            problem,
            contact: ContactInfo {
                name: contact.name.trim().to_string(),
                phone: contact.phone,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_problem() -> ProblemDetails {
        ProblemDetails::new("The laptop does not turn on", "Calle 10 #20-30, Cali")
    }

    fn valid_builder() -> ServiceRequestBuilder {
        ServiceRequest::builder()
            .user_type(UserType::Home)
            .service_id("mantenimiento-correctivo-hogar")
            .problem(valid_problem())
            .contact(ContactInfo::new(" Ana ", "3001234567"))
    }

    #[test]
    fn test_build_valid_request() {
        let request = valid_builder().build().unwrap();
        assert_eq!(request.user_type(), UserType::Home);
        assert_eq!(request.contact().name, "Ana");
        assert_eq!(request.service_name(), "Mantenimiento correctivo hogar");
    }

    #[test]
    fn test_blank_fields_are_rejected() {
        let err = valid_builder()
            .problem(ProblemDetails::new("   ", "somewhere"))
            .build()
            .unwrap_err();
        assert_eq!(err, BookingError::BlankDescription);

        let err = valid_builder()
            .problem(ProblemDetails::new("broken", ""))
            .build()
            .unwrap_err();
        assert_eq!(err, BookingError::BlankLocation);
    }

    #[test]
    fn test_missing_pieces_are_reported_in_step_order() {
        let err = ServiceRequest::builder().build().unwrap_err();
        assert_eq!(err, BookingError::MissingUserType);

        let err = ServiceRequest::builder()
            .user_type(UserType::Business)
            .build()
            .unwrap_err();
        assert_eq!(err, BookingError::MissingService);
    }

    #[test]
    fn test_contact_rules() {
        let err = valid_builder()
            .contact(ContactInfo::new("Al", "3001234567"))
            .build()
            .unwrap_err();
        assert_eq!(err, BookingError::InvalidContactName);

        let err = valid_builder()
            .contact(ContactInfo::new("Ana", "300123456"))
            .build()
            .unwrap_err();
        assert_eq!(err, BookingError::InvalidPhone);
    }

    #[test]
    fn test_photo_limit() {
        let mut problem = valid_problem();
        assert_eq!(problem.photo_label(), "Attach photos or evidence");
        for i in 0..MAX_PHOTOS {
            problem.attach_photo(PhotoRef(format!("photo_{i}"))).unwrap();
        }
        assert_eq!(problem.photo_label(), "Photos attached (3/3)");

        let err = problem.attach_photo(PhotoRef("photo_extra".into())).unwrap_err();
        assert_eq!(err, BookingError::TooManyPhotos { max: 3 });
        assert_eq!(problem.photos().len(), 3);
        assert_eq!(problem.photos()[0].as_str(), "photo_0");
    }

    #[test]
    fn test_suggested_time_window() {
        let ok = valid_problem()
            .with_preferred_day(Weekday::Sat)
            .with_preferred_time("10:30");
        assert!(ok.validate().is_ok());

        let late = valid_problem()
            .with_preferred_day(Weekday::Sat)
            .with_preferred_time("15:00");
        assert!(matches!(
            late.validate(),
            Err(BookingError::TimeOutsideWindow { day: Weekday::Sat, .. })
        ));

        let garbage = valid_problem().with_preferred_time("later");
        assert_eq!(
            garbage.validate(),
            Err(BookingError::UnparseableTime("later".to_string()))
        );
    }

    #[test]
    fn test_time_without_day_uses_monday_window() {
        let lunch = valid_problem().with_preferred_time("13:30");
        assert!(matches!(
            lunch.validate(),
            Err(BookingError::TimeOutsideWindow { day: Weekday::Mon, .. })
        ));
        let blank = valid_problem().with_preferred_time("  ");
        assert_eq!(blank.preferred_time, None);
    }

    #[test]
    fn test_summary_lists_next_steps() {
        let summary = valid_builder()
            .service_id("soporte-m365")
            .build()
            .unwrap()
            .summary();
        assert_eq!(summary.service_name, "Microsoft 365 support");
        assert_eq!(summary.user_type_label, "Home");
        assert_eq!(summary.next_steps.len(), 4);
    }
}
