//! Weather lookup through the open-meteo geocoding and forecast APIs.

use std::fmt::Write as _;

use async_trait::async_trait;
use itinera_common::Result;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::debug;

use crate::config::ToolsConfig;
use crate::{Tool, failure_text, parse_args, schema_of, tool_error};

const FORECAST_DAYS: u32 = 14;
const SHOWN_DAYS: usize = 7;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WeatherQuery {
    /// City or location name
    pub location: String,
    /// Start date in YYYY-MM-DD format (optional)
    #[serde(default)]
    pub start_date: Option<String>,
    /// End date in YYYY-MM-DD format (optional)
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Option<Vec<Place>>,
}

#[derive(Deserialize)]
struct Place {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    current: Option<Current>,
    #[serde(default)]
    daily: Option<Daily>,
}

#[derive(Deserialize)]
struct Current {
    temperature_2m: Option<f64>,
    weather_code: Option<i64>,
    wind_speed_10m: Option<f64>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Daily {
    time: Vec<String>,
    weather_code: Vec<Option<i64>>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_sum: Vec<Option<f64>>,
}

pub struct WeatherInfoTool {
    geocoding_url: String,
    forecast_url: String,
    http: reqwest::Client,
}

impl WeatherInfoTool {
    pub fn new(geocoding_url: impl Into<String>, forecast_url: impl Into<String>) -> Self {
        Self {
            geocoding_url: geocoding_url.into(),
            forecast_url: forecast_url.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ToolsConfig) -> Self {
        Self::new(config.geocoding_url.clone(), config.forecast_url.clone())
    }

    async fn geocode(&self, location: &str) -> Result<Option<Place>> {
        let response: GeocodeResponse = self
            .http
            .get(&self.geocoding_url)
            .query(&[("name", location), ("count", "1")])
            .send()
            .await
            .map_err(tool_error)?
            .json()
            .await
            .map_err(tool_error)?;

        Ok(response.results.and_then(|r| r.into_iter().next()))
    }

    async fn forecast(&self, place: &Place) -> Result<ForecastResponse> {
        let latitude = place.latitude.to_string();
        let longitude = place.longitude.to_string();
        let days = FORECAST_DAYS.to_string();
        self.http
            .get(&self.forecast_url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current", "temperature_2m,weather_code,wind_speed_10m"),
                (
                    "daily",
                    "weather_code,temperature_2m_max,temperature_2m_min,precipitation_sum",
                ),
                ("timezone", "auto"),
                ("forecast_days", days.as_str()),
            ])
            .send()
            .await
            .map_err(tool_error)?
            .json()
            .await
            .map_err(tool_error)
    }

    async fn lookup(&self, query: &WeatherQuery) -> Result<String> {
        let Some(place) = self.geocode(&query.location).await? else {
            return Ok(format!("Could not find location: {}", query.location));
        };
        let forecast = self.forecast(&place).await?;
        Ok(render(&place, query, &forecast))
    }
}

#[async_trait]
impl Tool for WeatherInfoTool {
    fn name(&self) -> &str {
        "weather_info"
    }

    fn description(&self) -> &str {
        "Get weather information for a specific location and date range"
    }

    fn parameters(&self) -> serde_json::Value {
        schema_of::<WeatherQuery>()
    }

    async fn call(&self, arguments: serde_json::Value) -> String {
        let args: WeatherQuery = match parse_args(self.name(), arguments) {
            Ok(args) => args,
            Err(message) => return message,
        };

        debug!(location = %args.location, "Weather lookup");
        match self.lookup(&args).await {
            Ok(text) => text,
            Err(e) => failure_text("Error retrieving weather information", &e),
        }
    }
}

fn render(place: &Place, query: &WeatherQuery, forecast: &ForecastResponse) -> String {
    let mut out = format!(
        "Weather information for {}, {}:\n\n",
        place.name,
        place.country.as_deref().unwrap_or("")
    );

    match (query.start_date.as_deref(), query.end_date.as_deref()) {
        (Some(start), Some(end)) => {
            let _ = write!(out, "Requested dates: {start} to {end}\n\n");
        }
        (Some(date), None) | (None, Some(date)) => {
            let _ = write!(out, "Requested date: {date}\n\n");
        }
        (None, None) => {}
    }

    if let Some(current) = &forecast.current {
        let _ = write!(
            out,
            "Current conditions: {}, {}°C, Wind: {} km/h\n\n",
            describe_weather_code(current.weather_code.unwrap_or(0)),
            or_na(current.temperature_2m),
            or_na(current.wind_speed_10m),
        );
    }

    if let Some(daily) = &forecast.daily {
        out.push_str("Daily forecast:\n");
        for (i, date) in daily.time.iter().take(SHOWN_DAYS).enumerate() {
            let code = daily.weather_code.get(i).copied().flatten();
            let _ = writeln!(
                out,
                "{date}: {}, {}°C to {}°C, Precipitation: {} mm",
                code.map(describe_weather_code).unwrap_or("Unknown"),
                or_na(daily.temperature_2m_min.get(i).copied().flatten()),
                or_na(daily.temperature_2m_max.get(i).copied().flatten()),
                or_na(daily.precipitation_sum.get(i).copied().flatten()),
            );
        }
    }

    out
}

fn or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

/// Human-readable label for a WMO weather interpretation code.
pub fn describe_weather_code(code: i64) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}
