use std::str::FromStr;

use crate::{error::AppError, models::trip::Trip};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey {
    Date,
    Budget,
    Destination,
}

impl FromStr for FilterKey {
    type Err = AppError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_lowercase().as_str() {
            "1" | "date" => Ok(FilterKey::Date),
            "2" | "budget" => Ok(FilterKey::Budget),
            "3" | "destination" => Ok(FilterKey::Destination),
            other => Err(AppError::InvalidSelector(format!("filter key {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Budget,
    Date,
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_lowercase().as_str() {
            "1" | "budget" => Ok(SortKey::Budget),
            "2" | "date" => Ok(SortKey::Date),
            other => Err(AppError::InvalidSelector(format!("sort key {other:?}"))),
        }
    }
}

/// Exact-match filter. Budget values are compared numerically.
pub fn filter_trips(trips: &[Trip], key: FilterKey, value: &str) -> Result<Vec<Trip>, AppError> {
    let matches: Vec<Trip> = match key {
        FilterKey::Date => trips.iter().filter(|t| t.date == value).cloned().collect(),
        FilterKey::Destination => trips
            .iter()
            .filter(|t| t.destination == value)
            .cloned()
            .collect(),
        FilterKey::Budget => {
            let budget: f64 = value
                .trim()
                .parse()
                .map_err(|_| AppError::Validation(format!("budget {value:?} is not a number")))?;
            trips.iter().filter(|t| t.budget == budget).cloned().collect()
        }
    };
    Ok(matches)
}

/// Stable ascending sort. Dates compare as strings, which matches
/// chronological order only for ISO dates.
pub fn sort_trips(trips: &[Trip], key: SortKey) -> Vec<Trip> {
    let mut sorted = trips.to_vec();
    match key {
        SortKey::Budget => sorted.sort_by(|a, b| a.budget.total_cmp(&b.budget)),
        SortKey::Date => sorted.sort_by(|a, b| a.date.cmp(&b.date)),
    }
    sorted
}
