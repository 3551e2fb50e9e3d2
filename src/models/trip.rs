use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub start_city: String,
    pub destination: String,
    pub date: String,
    pub budget: f64,
    pub activities: Vec<String>,
}

impl Trip {
    pub fn new(
        start_city: impl Into<String>,
        destination: impl Into<String>,
        date: impl Into<String>,
        budget: f64,
        activities: Vec<String>,
    ) -> Self {
        Self {
            start_city: start_city.into(),
            destination: destination.into(),
            date: date.into(),
            budget,
            activities,
        }
    }

    /// Builds a trip from user input, rejecting a non-ISO date or a budget that is not positive.
    pub fn validated(
        start_city: impl Into<String>,
        destination: impl Into<String>,
        date: impl Into<String>,
        budget: f64,
        activities: Vec<String>,
    ) -> Result<Self, AppError> {
        let date = date.into();
        if !validate(&date, budget) {
            return Err(AppError::Validation(format!(
                "date {date:?} must be YYYY-MM-DD and budget {budget} must be positive"
            )));
        }
        Ok(Self::new(start_city, destination, date, budget, activities))
    }

    pub fn covers(&self, price: f64) -> bool {
        self.budget - price >= 0.0
    }

    pub fn activities_display(&self) -> String {
        self.activities.join(", ")
    }
}

/// True when `date` is a real `YYYY-MM-DD` calendar date and `budget > 0`.
pub fn validate(date: &str, budget: f64) -> bool {
    is_iso_date(date) && budget > 0.0
}

fn is_iso_date(date: &str) -> bool {
    // chrono accepts unpadded fields for %m/%d, the strict shape is checked here.
    let bytes = date.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    shape_ok && NaiveDate::parse_from_str(date, DATE_FORMAT).is_ok()
}
