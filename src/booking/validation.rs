//! Input validation for the booking steps.
//!
//! These are plain predicates: the caller disables its "continue" action
//! while one of them returns false. Nothing here logs or propagates.

use chrono::Weekday;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

pub const MIN_CONTACT_NAME_CHARS: usize = 3;
pub const MAX_PHONE_DIGITS: usize = 10;

// Weekday window, with a lunch break strictly between 13:00 and 14:00
const WEEKDAY_OPEN: u32 = 800;
const WEEKDAY_CLOSE: u32 = 1900;
const LUNCH_START: u32 = 1300;
const LUNCH_END: u32 = 1400;
const SATURDAY_OPEN: u32 = 800;
const SATURDAY_CLOSE: u32 = 1100;

static TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):?(\d{2})$").expect("time pattern is valid"));

/// Name must have at least three characters once trimmed
pub fn is_valid_contact_name(name: &str) -> bool {
    name.trim().chars().count() >= MIN_CONTACT_NAME_CHARS
}

/// Phone must be exactly ten ASCII digits
pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == MAX_PHONE_DIGITS && phone.chars().all(|c| c.is_ascii_digit())
}

/// Input policy for the phone field.
///
/// A proposed value longer than ten characters is ignored and the current
/// value is kept; otherwise every non-digit is dropped.
pub fn apply_phone_input(current: &str, proposed: &str) -> String {
    if proposed.chars().count() > MAX_PHONE_DIGITS {
        return current.to_string();
    }
    proposed.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Wall-clock time as typed by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    /// Time encoded as HHMM, e.g. 09:30 -> 930
    pub fn as_hhmm(&self) -> u32 {
        self.hour * 100 + self.minute
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Parse `HH:MM`, `H:MM`, `HHMM` or `HMM`
pub fn parse_time_of_day(input: &str) -> Option<TimeOfDay> {
    let captures = TIME_PATTERN.captures(input.trim())?;
    let hour: u32 = captures.get(1)?.as_str().parse().ok()?;
    let minute: u32 = captures.get(2)?.as_str().parse().ok()?;

    if hour > 23 || minute > 59 {
        return None;
    }
    Some(TimeOfDay { hour, minute })
}

/// Parse a weekday name in English or Spanish
pub fn parse_weekday(input: &str) -> Option<Weekday> {
    let normalized = input.trim().to_lowercase();
    let spanish = match normalized.as_str() {
        "lunes" => Some(Weekday::Mon),
        "martes" => Some(Weekday::Tue),
        "miércoles" | "miercoles" => Some(Weekday::Wed),
        "jueves" => Some(Weekday::Thu),
        "viernes" => Some(Weekday::Fri),
        "sábado" | "sabado" => Some(Weekday::Sat),
        "domingo" => Some(Weekday::Sun),
        _ => None,
    };
    spanish.or_else(|| normalized.parse::<Weekday>().ok())
}

/// Whether a suggested visit time falls inside business hours.
///
/// Weekdays run 08:00 to 19:00 (both inclusive) with no visits strictly
/// between 13:00 and 14:00; Saturdays run 08:00 to 11:00. Sundays and
/// holidays are never inside the window; they need direct confirmation
/// from the technician.
pub fn is_within_service_hours(day: Weekday, time: TimeOfDay) -> bool {
    let hhmm = time.as_hhmm();
    match day {
        Weekday::Sat => (SATURDAY_OPEN..=SATURDAY_CLOSE).contains(&hhmm),
        Weekday::Sun => false,
        _ => {
            (WEEKDAY_OPEN..=WEEKDAY_CLOSE).contains(&hhmm)
                && (hhmm <= LUNCH_START || hhmm >= LUNCH_END)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(input: &str) -> TimeOfDay {
        parse_time_of_day(input).unwrap()
    }

    #[test]
    fn test_phone_requires_exactly_ten_digits() {
        assert!(is_valid_phone("3001234567"));
        assert!(!is_valid_phone("300123456"));
        assert!(!is_valid_phone("30012345678"));
        assert!(!is_valid_phone("300123456a"));
        assert!(!is_valid_phone(""));
    }

    #[test]
    fn test_phone_input_policy() {
        assert_eq!(apply_phone_input("", "300 123"), "300123");
        assert_eq!(apply_phone_input("3001234567", "30012345678"), "3001234567");
        assert_eq!(apply_phone_input("300", "300-1"), "3001");
    }

    #[test]
    fn test_name_length_is_checked_after_trimming() {
        assert!(!is_valid_contact_name("Al"));
        assert!(is_valid_contact_name("Ana"));
        assert!(!is_valid_contact_name("  Al  "));
        assert!(is_valid_contact_name("  Ana "));
        assert!(!is_valid_contact_name(""));
    }

    #[test]
    fn test_time_parsing_formats() {
        assert_eq!(at("09:30"), TimeOfDay { hour: 9, minute: 30 });
        assert_eq!(at("9:30"), TimeOfDay { hour: 9, minute: 30 });
        assert_eq!(at("930"), TimeOfDay { hour: 9, minute: 30 });
        assert_eq!(at("1500"), TimeOfDay { hour: 15, minute: 0 });
        assert!(parse_time_of_day("25:00").is_none());
        assert!(parse_time_of_day("10:75").is_none());
        assert!(parse_time_of_day("noon").is_none());
    }

    #[test]
    fn test_weekday_window_with_lunch_break() {
        assert!(is_within_service_hours(Weekday::Mon, at("08:00")));
        assert!(is_within_service_hours(Weekday::Tue, at("13:00")));
        assert!(!is_within_service_hours(Weekday::Wed, at("13:30")));
        assert!(is_within_service_hours(Weekday::Thu, at("14:00")));
        assert!(is_within_service_hours(Weekday::Fri, at("19:00")));
        assert!(!is_within_service_hours(Weekday::Fri, at("19:01")));
        assert!(!is_within_service_hours(Weekday::Mon, at("07:59")));
    }

    #[test]
    fn test_saturday_and_sunday_windows() {
        assert!(is_within_service_hours(Weekday::Sat, at("08:00")));
        assert!(is_within_service_hours(Weekday::Sat, at("11:00")));
        assert!(!is_within_service_hours(Weekday::Sat, at("11:30")));
        assert!(!is_within_service_hours(Weekday::Sun, at("10:00")));
    }

    #[test]
    fn test_weekday_names() {
        assert_eq!(parse_weekday("Lunes"), Some(Weekday::Mon));
        assert_eq!(parse_weekday("sábado"), Some(Weekday::Sat));
        assert_eq!(parse_weekday("Friday"), Some(Weekday::Fri));
        assert_eq!(parse_weekday("someday"), None);
    }
}
