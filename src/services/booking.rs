use chrono::NaiveDate;

use crate::errors::DialogueError;
use crate::models::Session;
use crate::services::dates::format_date;
use crate::services::gate;

#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    Booked(NaiveDate),
    AlreadyBooked(NaiveDate),
}

impl std::fmt::Display for BookingOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingOutcome::Booked(date) => {
                write!(f, "The day {} has been booked.", format_date(*date))
            }
            BookingOutcome::AlreadyBooked(_) => write!(f, "The day is already booked."),
        }
    }
}

/// Books `date` once the profile is complete. Neither a rejected nor a
/// duplicate request touches the appointment.
pub fn book_date(session: &mut Session, date: NaiveDate) -> Result<BookingOutcome, DialogueError> {
    let readiness = gate::check_completeness(&session.profile);
    if !readiness.is_ready() {
        return Err(DialogueError::MissingProfileFields(readiness.missing));
    }

    if session.appointment.insert(date) {
        tracing::info!(session = %session.id, date = %format_date(date), "date booked");
        Ok(BookingOutcome::Booked(date))
    } else {
        Ok(BookingOutcome::AlreadyBooked(date))
    }
}
