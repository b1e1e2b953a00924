use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::DialogueError;

pub const PHONE_PATTERN: &str = "a 10 digit number starting with 98 or 97 (^(98|97)\\d{8}$)";
pub const DATE_PATTERN: &str = "a calendar date in the format YYYY-MM-DD";
pub const EMAIL_PATTERN: &str = "a valid email address such as name@example.com";
pub const NAME_PATTERN: &str = "a non-empty name";

static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(98|97)[0-9]{8}$").expect("phone regex is valid"));

static DATE_SHAPE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date regex is valid"));

static EMAIL_LOCAL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*$")
        .expect("email local-part regex is valid")
});

static EMAIL_LABEL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?$")
        .expect("email label regex is valid")
});

pub fn validate_phone(value: &str) -> Result<String, DialogueError> {
    if PHONE_REGEX.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(invalid("phone number", PHONE_PATTERN, value))
    }
}

/// Strict `YYYY-MM-DD`: four-two-two ASCII digits naming a real day.
pub fn validate_date(value: &str) -> Result<NaiveDate, DialogueError> {
    if !DATE_SHAPE_REGEX.is_match(value) {
        return Err(invalid("date", DATE_PATTERN, value));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid("date", DATE_PATTERN, value))
}

/// Returns the address trimmed, with the domain lowercased.
pub fn validate_email(value: &str) -> Result<String, DialogueError> {
    let trimmed = value.trim();
    let err = || invalid("email", EMAIL_PATTERN, value);

    if trimmed.len() > 254 {
        return Err(err());
    }
    let (local, domain) = trimmed.rsplit_once('@').ok_or_else(err)?;
    if local.is_empty() || local.len() > 64 || !EMAIL_LOCAL_REGEX.is_match(local) {
        return Err(err());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || !labels.iter().all(|l| EMAIL_LABEL_REGEX.is_match(l)) {
        return Err(err());
    }
    // top-level domain may not be all digits
    if labels
        .last()
        .map(|tld| tld.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(true)
    {
        return Err(err());
    }

    Ok(format!("{local}@{}", domain.to_ascii_lowercase()))
}

pub fn validate_name(value: &str) -> Result<String, DialogueError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid("name", NAME_PATTERN, value));
    }
    Ok(trimmed.to_string())
}

fn invalid(field: &'static str, expected: &'static str, value: &str) -> DialogueError {
    DialogueError::InvalidFormat {
        field,
        expected,
        value: value.to_string(),
    }
}
