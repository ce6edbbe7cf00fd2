use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use itinera_common::{
    AccommodationPreference, BudgetTier, Result, TransportationPreference, TripPreferences,
};

/// Plan trips with a team of research agents
#[derive(Debug, Parser)]
#[command(name = "itinera", version, about)]
pub struct Args {
    /// Path to a TOML configuration file
    #[arg(long, short = 'c', global = true, env = "ITINERA_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the planner once and save the itinerary
    Plan(PlanArgs),
    /// Start the web UI
    Serve(ServeArgs),
}

#[derive(Debug, clap::Args)]
pub struct PlanArgs {
    /// Where to go. Omit to get three recommended destinations.
    #[arg(long, short = 'd')]
    pub destination: Option<String>,

    /// First day of the trip (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub start_date: NaiveDate,

    /// Last day of the trip (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub end_date: NaiveDate,

    #[arg(long, short = 't', default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub travelers: u32,

    /// Budget, Mid-range, Luxury or "No preference"
    #[arg(long, short = 'b', default_value = "mid-range")]
    pub budget: BudgetTier,

    /// Interests, repeated or comma separated
    #[arg(long, short = 'i', value_delimiter = ',')]
    pub interests: Vec<String>,

    /// Hotel, Hostel, Resort, Apartment/Airbnb or "No preference"
    #[arg(long, default_value = "hotel")]
    pub accommodation: AccommodationPreference,

    /// "Public Transit", "Rental Car", Walking/Biking, Taxis/Rideshares or "No preference"
    #[arg(long, default_value = "public-transit")]
    pub transportation: TransportationPreference,

    /// Free-form notes passed to every stage
    #[arg(long)]
    pub notes: Option<String>,

    /// Directory for the saved itinerary (overrides the config file)
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,
}

impl PlanArgs {
    pub fn preferences(&self) -> Result<TripPreferences> {
        let mut builder = TripPreferences::builder(self.start_date, self.end_date)
            .travelers(self.travelers)
            .budget(self.budget)
            .interests(
                self.interests
                    .iter()
                    .map(|i| i.trim())
                    .filter(|i| !i.is_empty()),
            )
            .accommodation(self.accommodation)
            .transportation(self.transportation);

        if let Some(destination) = self.destination.as_deref().map(str::trim)
            && !destination.is_empty()
        {
            builder = builder.destination(destination);
        }
        if let Some(notes) = &self.notes {
            builder = builder.notes(notes.clone());
        }
        builder.build()
    }
}

#[derive(Debug, clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, short = 'p', default_value_t = 8080)]
    pub port: u16,

    /// Bind address
    #[arg(long, env = "ITINERA_BIND_ADDR", default_value = "127.0.0.1")]
    pub bind: String,

    /// Allowed CORS origins, comma separated (default: any)
    #[arg(long, env = "ITINERA_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,
}

fn parse_date(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("'{value}' is not a YYYY-MM-DD date"))
}
