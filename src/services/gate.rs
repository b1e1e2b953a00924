use crate::models::{ProfileField, UserProfile};

pub const READY_MESSAGE: &str = "The user has entered all the required information. Thank them and tell them they can make appointments now.";

#[derive(Debug, Clone, PartialEq)]
pub struct Readiness {
    pub missing: Vec<ProfileField>,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn message(&self) -> String {
        if self.is_ready() {
            READY_MESSAGE.to_string()
        } else {
            missing_fields_message(&self.missing)
        }
    }
}

pub fn check_completeness(profile: &UserProfile) -> Readiness {
    let missing = ProfileField::ALL
        .into_iter()
        .filter(|f| profile.get(*f).map(str::is_empty).unwrap_or(true))
        .collect();
    Readiness { missing }
}

pub fn missing_fields_message(missing: &[ProfileField]) -> String {
    let labels: Vec<&str> = missing.iter().map(ProfileField::label).collect();
    format!(
        "The user is missing the following information: {}.",
        labels.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_profile() -> UserProfile {
        UserProfile {
            name: Some("Sita Sharma".to_string()),
            phone: Some("9812345678".to_string()),
            email: Some("sita@example.com".to_string()),
        }
    }

    #[test]
    fn test_empty_profile_not_ready() {
        let readiness = check_completeness(&UserProfile::default());
        assert!(!readiness.is_ready());
        assert_eq!(
            readiness.message(),
            "The user is missing the following information: Name, Phone Number, Email."
        );
    }

    #[test]
    fn test_complete_profile_ready() {
        let readiness = check_completeness(&complete_profile());
        assert!(readiness.is_ready());
        assert_eq!(readiness.message(), READY_MESSAGE);
    }

    #[test]
    fn test_lists_only_missing_fields() {
        let profile = UserProfile {
            email: None,
            ..complete_profile()
        };
        let readiness = check_completeness(&profile);
        assert_eq!(readiness.missing, vec![ProfileField::Email]);
        assert!(readiness.message().ends_with("information: Email."));
    }

    #[test]
    fn test_empty_string_counts_as_missing() {
        let profile = UserProfile {
            name: Some(String::new()),
            ..complete_profile()
        };
        assert_eq!(check_completeness(&profile).missing, vec![ProfileField::Name]);
    }
}
