//! Planning requests submitted through the form or the JSON API.

use chrono::NaiveDate;
use itinera_common::{ItineraError, Result, TripPreferences};
use itinera_orchestrator::PlannerConfig;
use serde::Deserialize;

/// Interest tags offered by the form.
pub const INTEREST_OPTIONS: [&str; 10] = [
    "Nature",
    "Culture",
    "Food",
    "Adventure",
    "History",
    "Art",
    "Shopping",
    "Relaxation",
    "Nightlife",
    "Family-friendly",
];

pub const DEFAULT_INTERESTS: [&str; 2] = ["Culture", "Food"];

pub const MAX_TRAVELERS: u32 = 10;

/// Raw request fields. Enum values are parsed leniently from labels or tokens.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanRequest {
    #[serde(default)]
    pub destination: Option<String>,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub travelers: Option<u32>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub accommodation: Option<String>,
    #[serde(default)]
    pub transportation: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub exa_api_key: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl PlanRequest {
    /// Collect url-encoded form pairs. `interests` may repeat.
    pub fn from_form(pairs: Vec<(String, String)>) -> Result<Self> {
        let mut request = PlanRequest::default();
        for (key, value) in pairs {
            match key.as_str() {
                "destination" => request.destination = Some(value),
                "start_date" => request.start_date = value,
                "end_date" => request.end_date = value,
                "travelers" if value.trim().is_empty() => {}
                "travelers" => {
                    let travelers = value.trim().parse::<u32>().map_err(|_| {
                        ItineraError::InvalidPreferences(format!(
                            "traveler count '{value}' is not a number"
                        ))
                    })?;
                    request.travelers = Some(travelers);
                }
                "budget" => request.budget = Some(value),
                "interests" => request.interests.push(value),
                "accommodation" => request.accommodation = Some(value),
                "transportation" => request.transportation = Some(value),
                "notes" => request.notes = Some(value),
                "openai_api_key" => request.openai_api_key = Some(value),
                "exa_api_key" => request.exa_api_key = Some(value),
                _ => {}
            }
        }
        Ok(request)
    }

    pub fn preferences(&self) -> Result<TripPreferences> {
        let start = parse_date("start date", &self.start_date)?;
        let end = parse_date("end date", &self.end_date)?;
        let mut builder = TripPreferences::builder(start, end).interests(self.interests.iter().map(|i| i.trim()).filter(|i| !i.is_empty()));

        if let Some(travelers) = self.travelers {
            if travelers > MAX_TRAVELERS {
                return Err(ItineraError::InvalidPreferences(format!(
                    "at most {MAX_TRAVELERS} travelers are supported"
                )));
            }
            builder = builder.travelers(travelers);
        }
        if let Some(destination) = non_blank(&self.destination) {
            builder = builder.destination(destination);
        }
        if let Some(budget) = non_blank(&self.budget) {
            builder = builder.budget(budget.parse()?);
        }
        if let Some(accommodation) = non_blank(&self.accommodation) {
            builder = builder.accommodation(accommodation.parse()?);
        }
        if let Some(transportation) = non_blank(&self.transportation) {
            builder = builder.transportation(transportation.parse()?);
        }
        if let Some(notes) = non_blank(&self.notes) {
            builder = builder.notes(notes);
        }

        builder.build()
    }

    /// Copy of `base` with any keys supplied in the request layered on top.
    pub fn config_for(&self, base: &PlannerConfig) -> PlannerConfig {
        let mut config = base.clone();
        if let Some(key) = non_blank(&self.openai_api_key) {
            config.provider.api_key = Some(key.to_string());
        }
        if let Some(key) = non_blank(&self.exa_api_key) {
            config.tools.exa_api_key = Some(key.to_string());
        }
        config
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ItineraError::InvalidPreferences(format!("{field} '{value}' is not a YYYY-MM-DD date"))
    })
}
