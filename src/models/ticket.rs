use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// Cheapest offer returned by the pricing service for one destination slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub price: f64,
    #[serde(default)]
    pub airline: Option<String>,
    #[serde(default)]
    pub flight_number: Option<u32>,
    #[serde(default)]
    pub departure_at: Option<String>,
    #[serde(default)]
    pub return_at: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

impl Ticket {
    /// Reads one pricing slot. Only a numeric `price` is required; any other
    /// field that is missing or has an unexpected shape is left empty.
    pub fn from_slot(slot: &Value) -> Option<Self> {
        let price = slot.get("price")?.as_f64()?;
        Some(Self {
            price,
            airline: lenient(slot, "airline"),
            flight_number: lenient(slot, "flight_number"),
            departure_at: lenient(slot, "departure_at"),
            return_at: lenient(slot, "return_at"),
            expires_at: lenient(slot, "expires_at"),
        })
    }

    pub fn airline_text(&self) -> &str {
        self.airline.as_deref().unwrap_or("n/a")
    }

    /// Outbound plus return leg at the one-way price.
    pub fn round_trip_price(&self) -> f64 {
        self.price * 2.0
    }
}

fn lenient<T: DeserializeOwned>(slot: &Value, key: &str) -> Option<T> {
    slot.get(key)
        .and_then(|value| serde_json::from_value(value.clone()).ok())
}
