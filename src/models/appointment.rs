use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::errors::DialogueError;
use crate::services::validation;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Appointment {
    booked_dates: BTreeSet<NaiveDate>,
}

impl Appointment {
    /// Builds an appointment from raw date strings, rejecting the first one
    /// that is not a strict `YYYY-MM-DD` calendar date.
    pub fn from_dates<S: AsRef<str>>(dates: &[S]) -> Result<Self, DialogueError> {
        let booked_dates = dates
            .iter()
            .map(|d| validation::validate_date(d.as_ref()))
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { booked_dates })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.booked_dates.contains(&date)
    }

    /// Returns false when the date was already booked.
    pub fn insert(&mut self, date: NaiveDate) -> bool {
        self.booked_dates.insert(date)
    }

    pub fn len(&self) -> usize {
        self.booked_dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.booked_dates.is_empty()
    }

    pub fn booked_dates(&self) -> Vec<String> {
        self.booked_dates
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect()
    }
}
