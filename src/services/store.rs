use tracing::{debug, warn};

use crate::{error::AppError, models::trip::Trip};

/// Session-local, insertion-ordered trip collection. Duplicates are allowed.
#[derive(Debug, Clone, Default)]
pub struct TripStore {
    trips: Vec<Trip>,
}

impl TripStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_trips(trips: Vec<Trip>) -> Self {
        Self { trips }
    }

    pub fn add(&mut self, trip: Trip) {
        debug!(destination = %trip.destination, "trip added");
        self.trips.push(trip);
    }

    /// Removes the trip at the 0-based `index`. Negative or out-of-range
    /// indices leave the store untouched.
    pub fn remove(&mut self, index: i64) -> Result<Trip, AppError> {
        let len = self.trips.len();
        match usize::try_from(index) {
            Ok(position) if position < len => Ok(self.trips.remove(position)),
            _ => {
                warn!(index, len, "invalid trip index");
                Err(AppError::InvalidIndex { index, len })
            }
        }
    }

    pub fn list(&self) -> &[Trip] {
        &self.trips
    }

    pub fn replace_all(&mut self, trips: Vec<Trip>) {
        self.trips = trips;
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(destination: &str) -> Trip {
        Trip::new("Sofia", destination, "2024-10-15", 1000.0, vec!["shopping".into()])
    }

    #[test]
    fn keeps_insertion_order_and_duplicates() {
        let mut store = TripStore::new();
        store.add(trip("Madrid"));
        store.add(trip("Paris"));
        store.add(trip("Madrid"));
        let names: Vec<_> = store.list().iter().map(|t| t.destination.as_str()).collect();
        assert_eq!(names, ["Madrid", "Paris", "Madrid"]);
    }

    #[test]
    fn remove_valid_index() {
        let mut store = TripStore::from_trips(vec![trip("Sofia"), trip("Burgas")]);
        let removed = store.remove(0).expect("remove");
        assert_eq!(removed.destination, "Sofia");
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].destination, "Burgas");
    }

    #[test]
    fn remove_out_of_range_leaves_store_unchanged() {
        let mut store = TripStore::from_trips(vec![trip("Sofia")]);
        for index in [-1, -3, 1, 7] {
            let err = store.remove(index).unwrap_err();
            assert!(matches!(err, AppError::InvalidIndex { len: 1, .. }));
        }
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_from_empty_store() {
        let mut store = TripStore::new();
        assert!(store.remove(0).is_err());
        assert!(store.is_empty());
    }
}
