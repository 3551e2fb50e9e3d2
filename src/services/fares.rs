use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::AppConfig,
    error::AppError,
    models::{ticket::Ticket, trip::Trip},
    services::city_codes::CityCodeTable,
};

pub const CURRENCY: &str = "eur";

/// Anything that can price a one-way ticket between two named cities.
#[async_trait]
pub trait FareSource: Send + Sync {
    async fn ticket_info(&self, origin: &str, destination: &str, depart_date: &str)
        -> Option<Ticket>;
}

pub struct FareClient {
    client: reqwest::Client,
    base_url: Url,
    token: String,
    cities: CityCodeTable,
}

impl FareClient {
    pub fn new(
        base_url: Url,
        token: impl Into<String>,
        timeout: Duration,
        cities: CityCodeTable,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            token: token.into(),
            cities,
        })
    }

    pub fn from_config(config: &AppConfig, cities: CityCodeTable) -> Result<Self, AppError> {
        Self::new(
            config.fare_api_url.clone(),
            config.fare_api_token.clone(),
            config.fare_timeout,
            cities,
        )
    }

    /// Resolves both cities and asks the pricing service for the cheapest offer.
    pub async fn lookup(
        &self,
        origin: &str,
        destination: &str,
        depart_date: &str,
    ) -> Result<Ticket, AppError> {
        let origin_code = self
            .cities
            .resolve(origin)
            .ok_or_else(|| AppError::UnknownCity(origin.to_string()))?;
        let destination_code = self
            .cities
            .resolve(destination)
            .ok_or_else(|| AppError::UnknownCity(destination.to_string()))?;

        debug!(origin = origin_code, destination = destination_code, depart_date, "fare request");
        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[
                ("origin", origin_code),
                ("destination", destination_code),
                ("depart_date", depart_date),
                ("currency", CURRENCY),
                ("token", self.token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AppError::NoFareData(format!("pricing service answered {status}")));
        }

        let payload: Value = response.json().await?;
        cheapest_offer(&payload, destination_code).ok_or_else(|| {
            AppError::NoFareData(format!("no offer for {destination_code} in response"))
        })
    }
}

#[async_trait]
impl FareSource for FareClient {
    async fn ticket_info(
        &self,
        origin: &str,
        destination: &str,
        depart_date: &str,
    ) -> Option<Ticket> {
        match self.lookup(origin, destination, depart_date).await {
            Ok(ticket) => Some(ticket),
            Err(err) => {
                warn!(%origin, %destination, %depart_date, error = %err, "fare lookup failed");
                None
            }
        }
    }
}

/// Picks `data.<code>."0"` out of a pricing payload.
pub fn cheapest_offer(payload: &Value, destination_code: &str) -> Option<Ticket> {
    let slot = payload.get("data")?.get(destination_code)?.get("0")?;
    Ticket::from_slot(slot)
}

/// Result of pricing one trip from the list.
#[derive(Debug, Clone, PartialEq)]
pub enum CostEstimate {
    NoSuchTrip,
    NoFare,
    Priced { price: f64, within_budget: bool },
}

impl CostEstimate {
    /// Round-trip price, `0.0` when nothing was priced.
    pub fn price(&self) -> f64 {
        match self {
            CostEstimate::Priced { price, .. } => *price,
            CostEstimate::NoSuchTrip | CostEstimate::NoFare => 0.0,
        }
    }
}

/// Prices the trip at 1-based `trip_index` and reports a budget shortfall.
pub async fn assess_trip_cost<F>(trip_index: usize, trips: &[Trip], fares: &F) -> CostEstimate
where
    F: FareSource + ?Sized,
{
    if trip_index > trips.len() {
        warn!(trip_index, len = trips.len(), "trip index out of range");
        return CostEstimate::NoSuchTrip;
    }
    let Some(trip) = trip_index.checked_sub(1).and_then(|i| trips.get(i)) else {
        warn!(trip_index, "there is no such trip");
        return CostEstimate::NoSuchTrip;
    };

    let Some(ticket) = fares
        .ticket_info(&trip.start_city, &trip.destination, &trip.date)
        .await
    else {
        warn!(trip_index, "failed to retrieve ticket price information");
        return CostEstimate::NoFare;
    };

    let price = ticket.round_trip_price();
    let within_budget = trip.covers(price);
    if within_budget {
        info!(trip_index, price, "trip cost estimated");
    } else {
        warn!(trip_index, budget = trip.budget, price, "budget is not enough for this trip");
    }
    CostEstimate::Priced {
        price,
        within_budget,
    }
}

/// Round-trip price for the trip at 1-based `trip_index`, or `0.0` when the
/// trip does not exist or no fare was found.
pub async fn estimate_trip_cost<F>(trip_index: usize, trips: &[Trip], fares: &F) -> f64
where
    F: FareSource + ?Sized,
{
    assess_trip_cost(trip_index, trips, fares).await.price()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    struct StubFares {
        price: Option<f64>,
        calls: Mutex<Vec<(String, String, String)>>,
    }

    impl StubFares {
        fn new(price: Option<f64>) -> Self {
            Self {
                price,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl FareSource for StubFares {
        async fn ticket_info(
            &self,
            origin: &str,
            destination: &str,
            depart_date: &str,
        ) -> Option<Ticket> {
            self.calls.lock().unwrap().push((
                origin.to_string(),
                destination.to_string(),
                depart_date.to_string(),
            ));
            self.price.map(|price| Ticket {
                price,
                airline: Some("FR".into()),
                flight_number: Some(1234),
                departure_at: None,
                return_at: None,
                expires_at: None,
            })
        }
    }

    fn trips() -> Vec<Trip> {
        vec![
            Trip::new("Madrid", "London", "2024-03-30", 1000.0, Vec::new()),
            Trip::new("Sofia", "Paris", "2024-04-02", 50.0, Vec::new()),
        ]
    }

    #[test]
    fn extracts_offer_from_destination_slot() {
        let payload = json!({
            "success": true,
            "data": {"LON": {"0": {
                "price": 35, "airline": "FR", "flight_number": 7071,
                "departure_at": "2024-03-30T06:25:00Z",
                "return_at": "2024-04-06T20:10:00Z",
                "expires_at": "2024-03-20T10:00:00Z"
            }}}
        });
        let ticket = cheapest_offer(&payload, "LON").expect("ticket");
        assert_eq!(ticket.price, 35.0);
        assert_eq!(ticket.airline_text(), "FR");
        assert_eq!(ticket.flight_number, Some(7071));
    }

    #[test]
    fn missing_structure_yields_nothing() {
        assert!(cheapest_offer(&json!({}), "LON").is_none());
        assert!(cheapest_offer(&json!({"data": {}}), "LON").is_none());
        assert!(cheapest_offer(&json!({"data": {"LON": {"1": {"price": 3}}}}), "LON").is_none());
        assert!(cheapest_offer(&json!({"data": {"LON": {"0": {"airline": "FR"}}}}), "LON").is_none());
    }

    #[test]
    fn odd_optional_fields_do_not_hide_the_offer() {
        for slot in [
            json!({"price": 35, "flight_number": "7071"}),
            json!({"price": 35, "flight_number": 5_000_000_000u64}),
            json!({"price": 35, "airline": 7}),
        ] {
            let payload = json!({"data": {"LON": {"0": slot}}});
            let ticket = cheapest_offer(&payload, "LON").expect("ticket");
            assert_eq!(ticket.price, 35.0);
        }
    }

    #[tokio::test]
    async fn index_past_the_end_returns_zero_without_lookup() {
        let fares = StubFares::new(Some(40.0));
        assert_eq!(estimate_trip_cost(3, &trips(), &fares).await, 0.0);
        assert_eq!(estimate_trip_cost(1, &[], &fares).await, 0.0);
        assert!(fares.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn index_zero_is_not_a_trip() {
        let fares = StubFares::new(Some(40.0));
        assert_eq!(estimate_trip_cost(0, &trips(), &fares).await, 0.0);
    }

    #[tokio::test]
    async fn doubles_the_offer_price() {
        let fares = StubFares::new(Some(40.0));
        assert_eq!(estimate_trip_cost(1, &trips(), &fares).await, 80.0);
        let calls = fares.calls.lock().unwrap();
        assert_eq!(
            calls[0],
            ("Madrid".to_string(), "London".to_string(), "2024-03-30".to_string())
        );
    }

    #[tokio::test]
    async fn over_budget_still_returns_price() {
        let fares = StubFares::new(Some(40.0));
        assert_eq!(estimate_trip_cost(2, &trips(), &fares).await, 80.0);
        assert_eq!(
            assess_trip_cost(2, &trips(), &fares).await,
            CostEstimate::Priced {
                price: 80.0,
                within_budget: false
            }
        );
        assert_eq!(
            assess_trip_cost(1, &trips(), &fares).await,
            CostEstimate::Priced {
                price: 80.0,
                within_budget: true
            }
        );
    }

    #[tokio::test]
    async fn assessment_tells_missing_trip_from_missing_fare() {
        let priced = StubFares::new(Some(40.0));
        assert_eq!(assess_trip_cost(0, &trips(), &priced).await, CostEstimate::NoSuchTrip);
        assert_eq!(assess_trip_cost(9, &trips(), &priced).await, CostEstimate::NoSuchTrip);
        let empty = StubFares::new(None);
        assert_eq!(assess_trip_cost(1, &trips(), &empty).await, CostEstimate::NoFare);
    }

    #[tokio::test]
    async fn missing_fare_returns_zero() {
        let fares = StubFares::new(None);
        assert_eq!(estimate_trip_cost(1, &trips(), &fares).await, 0.0);
    }

    #[tokio::test]
    async fn unknown_city_fails_before_any_request() {
        let cities = CityCodeTable::from_reader("MAD,Madrid/Madrid\n".as_bytes()).unwrap();
        // Port 9 on localhost; never contacted because the lookup stops first.
        let client = FareClient::new(
            Url::parse("http://127.0.0.1:9/prices").unwrap(),
            "token",
            Duration::from_secs(1),
            cities,
        )
        .unwrap();
        let err = client.lookup("Madrid", "Atlantis", "2024-03-30").await.unwrap_err();
        assert!(matches!(err, AppError::UnknownCity(city) if city == "Atlantis"));
    }
}
