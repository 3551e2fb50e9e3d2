use std::{env, path::PathBuf, time::Duration};

use url::Url;

use crate::error::AppError;

pub const DEFAULT_FARE_API_URL: &str = "https://api.travelpayouts.com/v1/prices/cheap";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub trips_file: PathBuf,
    /// Overrides the bundled city table when set.
    pub city_codes_file: Option<PathBuf>,
    pub fare_api_url: Url,
    pub fare_api_token: String,
    pub fare_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let trips_file = env::var("TRIPS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("trips_data.json"));

        let city_codes_file = env::var("CITY_CODES_FILE").ok().map(PathBuf::from);

        let fare_api_url = env::var("FARE_API_URL")
            .unwrap_or_else(|_| DEFAULT_FARE_API_URL.to_string());
        let fare_api_url = Url::parse(&fare_api_url)
            .map_err(|err| AppError::Config(format!("invalid FARE_API_URL: {err}")))?;

        let fare_api_token = env::var("FARE_API_TOKEN").unwrap_or_default();

        let fare_timeout =
            parse_timeout(&env::var("FARE_TIMEOUT_SECS").unwrap_or_else(|_| "10".to_string()))?;

        Ok(Self {
            trips_file,
            city_codes_file,
            fare_api_url,
            fare_api_token,
            fare_timeout,
        })
    }
}

/// Whole seconds, at least one.
pub fn parse_timeout(raw: &str) -> Result<Duration, AppError> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|err| AppError::Config(format!("invalid FARE_TIMEOUT_SECS: {err}")))?;
    if secs == 0 {
        return Err(AppError::Config(
            "invalid FARE_TIMEOUT_SECS: must be at least 1".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}
