//! Traveler preferences collected by the presentation layer.
//!
//! A [`TripPreferences`] value is validated once when it is built and is
//! immutable afterwards. It is consumed by the task templates (which
//! interpolate it into instructions) and by the itinerary document header.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{ItineraError, Result};

/// Lowercase and strip everything but ASCII alphanumerics so that
/// "Mid-range", "mid_range" and "MID RANGE" compare equal.
fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Budget tier for the whole trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetTier {
    Budget,
    #[default]
    MidRange,
    Luxury,
    NoPreference,
}

impl BudgetTier {
    pub const ALL: [BudgetTier; 4] = [
        BudgetTier::Budget,
        BudgetTier::MidRange,
        BudgetTier::Luxury,
        BudgetTier::NoPreference,
    ];

    /// Human-readable label, as shown in the form.
    pub fn label(&self) -> &'static str {
        match self {
            BudgetTier::Budget => "Budget",
            BudgetTier::MidRange => "Mid-range",
            BudgetTier::Luxury => "Luxury",
            BudgetTier::NoPreference => "No preference",
        }
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BudgetTier {
    type Err = ItineraError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "budget" | "low" | "cheap" => Ok(BudgetTier::Budget),
            "midrange" | "medium" | "mid" | "moderate" => Ok(BudgetTier::MidRange),
            "luxury" | "high" => Ok(BudgetTier::Luxury),
            "nopreference" | "any" | "none" => Ok(BudgetTier::NoPreference),
            _ => Err(ItineraError::InvalidPreferences(format!(
                "unknown budget tier '{s}'"
            ))),
        }
    }
}

/// Preferred type of accommodation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccommodationPreference {
    #[default]
    Hotel,
    Hostel,
    Resort,
    Apartment,
    NoPreference,
}

impl AccommodationPreference {
    pub const ALL: [AccommodationPreference; 5] = [
        AccommodationPreference::Hotel,
        AccommodationPreference::Hostel,
        AccommodationPreference::Resort,
        AccommodationPreference::Apartment,
        AccommodationPreference::NoPreference,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AccommodationPreference::Hotel => "Hotel",
            AccommodationPreference::Hostel => "Hostel",
            AccommodationPreference::Resort => "Resort",
            AccommodationPreference::Apartment => "Apartment/Airbnb",
            AccommodationPreference::NoPreference => "No preference",
        }
    }
}

impl fmt::Display for AccommodationPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AccommodationPreference {
    type Err = ItineraError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "hotel" => Ok(AccommodationPreference::Hotel),
            "hostel" => Ok(AccommodationPreference::Hostel),
            "resort" => Ok(AccommodationPreference::Resort),
            "apartment" | "airbnb" | "apartmentairbnb" => Ok(AccommodationPreference::Apartment),
            "nopreference" | "any" | "none" => Ok(AccommodationPreference::NoPreference),
            _ => Err(ItineraError::InvalidPreferences(format!(
                "unknown accommodation preference '{s}'"
            ))),
        }
    }
}

/// Preferred way of getting around.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportationPreference {
    #[default]
    PublicTransit,
    RentalCar,
    WalkingBiking,
    TaxisRideshares,
    NoPreference,
}

impl TransportationPreference {
    pub const ALL: [TransportationPreference; 5] = [
        TransportationPreference::PublicTransit,
        TransportationPreference::RentalCar,
        TransportationPreference::WalkingBiking,
        TransportationPreference::TaxisRideshares,
        TransportationPreference::NoPreference,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TransportationPreference::PublicTransit => "Public Transit",
            TransportationPreference::RentalCar => "Rental Car",
            TransportationPreference::WalkingBiking => "Walking/Biking",
            TransportationPreference::TaxisRideshares => "Taxis/Rideshares",
            TransportationPreference::NoPreference => "No preference",
        }
    }
}

impl fmt::Display for TransportationPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TransportationPreference {
    type Err = ItineraError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "publictransit" | "transit" | "public" => Ok(TransportationPreference::PublicTransit),
            "rentalcar" | "car" => Ok(TransportationPreference::RentalCar),
            "walkingbiking" | "walking" | "biking" => Ok(TransportationPreference::WalkingBiking),
            "taxisrideshares" | "taxi" | "taxis" | "rideshare" => {
                Ok(TransportationPreference::TaxisRideshares)
            }
            "nopreference" | "any" | "none" => Ok(TransportationPreference::NoPreference),
            _ => Err(ItineraError::InvalidPreferences(format!(
                "unknown transportation preference '{s}'"
            ))),
        }
    }
}

/// Validated traveler preferences for one planning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripPreferences {
    destination: Option<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    travelers: u32,
    budget: BudgetTier,
    interests: BTreeSet<String>,
    accommodation: AccommodationPreference,
    transportation: TransportationPreference,
    notes: Option<String>,
}

impl TripPreferences {
    /// Start building preferences for the given date range.
    pub fn builder(start_date: NaiveDate, end_date: NaiveDate) -> TripPreferencesBuilder {
        TripPreferencesBuilder {
            destination: None,
            start_date,
            end_date,
            travelers: 1,
            budget: BudgetTier::default(),
            interests: BTreeSet::new(),
            accommodation: AccommodationPreference::default(),
            transportation: TransportationPreference::default(),
            notes: None,
        }
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn travelers(&self) -> u32 {
        self.travelers
    }

    pub fn budget(&self) -> BudgetTier {
        self.budget
    }

    pub fn interests(&self) -> &BTreeSet<String> {
        &self.interests
    }

    pub fn accommodation(&self) -> AccommodationPreference {
        self.accommodation
    }

    pub fn transportation(&self) -> TransportationPreference {
        self.transportation
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Number of calendar days covered, counting both ends.
    pub fn trip_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Interests joined with ", ".
    pub fn interests_label(&self) -> String {
        if self.interests.is_empty() {
            "None specified".to_string()
        } else {
            self.interests
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        }
    }

    pub fn budget_prompt(&self) -> String {
        format!(
            "{} (please provide specific recommendations within this range)",
            self.budget
        )
    }

    pub fn accommodation_prompt(&self) -> String {
        format!(
            "{}, with consideration for location and amenities",
            self.accommodation
        )
    }

    pub fn transportation_prompt(&self) -> String {
        format!("{}, optimized for convenience and cost", self.transportation)
    }

    pub fn travelers_prompt(&self) -> String {
        if self.travelers == 1 {
            "1 person".to_string()
        } else {
            format!("{} people", self.travelers)
        }
    }

    /// Interests plus any free-text notes, the way the instructions carry them.
    pub fn interests_prompt(&self) -> String {
        match &self.notes {
            Some(notes) => format!("{}. Additional preferences: {}", self.interests_label(), notes),
            None => self.interests_label(),
        }
    }

    /// Every preference as a `(key, value)` pair, in display order.
    pub fn header_entries(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "destination",
                self.destination
                    .clone()
                    .unwrap_or_else(|| "Not specified (to be recommended)".to_string()),
            ),
            ("start_date", self.start_date.format("%Y-%m-%d").to_string()),
            ("end_date", self.end_date.format("%Y-%m-%d").to_string()),
            ("travelers", self.travelers.to_string()),
            ("budget", self.budget.label().to_string()),
            ("interests", self.interests_label()),
            ("accommodation", self.accommodation.label().to_string()),
            ("transportation", self.transportation.label().to_string()),
            (
                "additional_notes",
                self.notes.clone().unwrap_or_else(|| "None".to_string()),
            ),
        ]
    }
}

/// Builder for [`TripPreferences`]; validation happens in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct TripPreferencesBuilder {
    destination: Option<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    travelers: u32,
    budget: BudgetTier,
    interests: BTreeSet<String>,
    accommodation: AccommodationPreference,
    transportation: TransportationPreference,
    notes: Option<String>,
}

impl TripPreferencesBuilder {
    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        let destination = destination.into();
        let trimmed = destination.trim();
        self.destination = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn travelers(mut self, travelers: u32) -> Self {
        self.travelers = travelers;
        self
    }

    pub fn budget(mut self, budget: BudgetTier) -> Self {
        self.budget = budget;
        self
    }

    pub fn interest(mut self, interest: impl Into<String>) -> Self {
        let interest = interest.into();
        let trimmed = interest.trim();
        if !trimmed.is_empty() {
            self.interests.insert(trimmed.to_string());
        }
        self
    }

    pub fn interests<I, S>(self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        interests.into_iter().fold(self, |b, i| b.interest(i))
    }

    pub fn accommodation(mut self, accommodation: AccommodationPreference) -> Self {
        self.accommodation = accommodation;
        self
    }

    pub fn transportation(mut self, transportation: TransportationPreference) -> Self {
        self.transportation = transportation;
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        let trimmed = notes.trim();
        self.notes = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn build(self) -> Result<TripPreferences> {
        if self.end_date < self.start_date {
            return Err(ItineraError::InvalidPreferences(format!(
                "end date {} is before start date {}",
                self.end_date, self.start_date
            )));
        }
        if self.travelers == 0 {
            return Err(ItineraError::InvalidPreferences(
                "traveler count must be at least 1".to_string(),
            ));
        }

        Ok(TripPreferences {
            destination: self.destination,
            start_date: self.start_date,
            end_date: self.end_date,
            travelers: self.travelers,
            budget: self.budget,
            interests: self.interests,
            accommodation: self.accommodation,
            transportation: self.transportation,
            notes: self.notes,
        })
    }
}
