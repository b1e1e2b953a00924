use crate::errors::DialogueError;
use crate::models::{ProfileUpdate, Session};
use crate::services::{gate, validation};

/// Validates every supplied field before writing any of them, then returns
/// the completeness message for the updated profile.
pub fn update_profile(session: &mut Session, update: &ProfileUpdate) -> Result<String, DialogueError> {
    let name = update
        .name
        .as_deref()
        .map(validation::validate_name)
        .transpose()?;
    let phone = update
        .phone_no
        .as_deref()
        .map(validation::validate_phone)
        .transpose()?;
    let email = update
        .email
        .as_deref()
        .map(validation::validate_email)
        .transpose()?;

    let profile = &mut session.profile;
    if name.is_some() {
        profile.name = name;
    }
    if phone.is_some() {
        profile.phone = phone;
    }
    if email.is_some() {
        profile.email = email;
    }

    tracing::debug!(session = %session.id, "profile updated");
    Ok(gate::check_completeness(&session.profile).message())
}
