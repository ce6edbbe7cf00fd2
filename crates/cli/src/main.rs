//! Itinera command-line entry point.
//!
//! Usage:
//!   itinera plan --destination "Tokyo, Japan" --start-date 2025-06-15 --end-date 2025-06-22
//!   itinera plan --start-date 2025-06-15 --end-date 2025-06-22 --interests Nature,Food
//!   itinera serve --port 8080
//!
//! # Environment Variables
//!
//! - `OPENAI_API_KEY` - model credential (required for the OpenAI provider)
//! - `EXA_API_KEY` - enables Exa search; DuckDuckGo is used otherwise
//! - `ITINERA_CONFIG` - path to a TOML configuration file
//! - `ITINERA_BIND_ADDR` - web server bind address (default: 127.0.0.1)
//! - `ITINERA_CORS_ORIGINS` - CORS allowed origins (comma-separated)
//!
//! A `.env` file in the working directory is loaded first.

mod args;
mod progress;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use itinera_orchestrator::{PlannerConfig, TravelPlanner};
use itinera_web::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::{Args, Commands, PlanArgs, ServeArgs};
use crate::progress::StageProgress;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,itinera=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = PlannerConfig::load(args.config.as_deref())?;

    match args.command {
        Commands::Plan(plan) => run_plan(config, plan).await,
        Commands::Serve(serve) => run_server(config, serve).await,
    }
}

async fn run_plan(mut config: PlannerConfig, args: PlanArgs) -> anyhow::Result<()> {
    let prefs = args.preferences()?;
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }

    let planner = TravelPlanner::from_config(&config)
        .context("Could not start the planner")?
        .with_observer(Arc::new(StageProgress::default()));

    eprintln!(
        "Planning a {}-day trip to {}...",
        prefs.trip_days(),
        prefs.destination().unwrap_or("a recommended destination")
    );

    let outcome = planner.run(&prefs).await.context("Planning failed")?;

    println!("{}", outcome.itinerary.trim_end());
    eprintln!();
    eprintln!("Itinerary saved to {}", outcome.path.display());
    Ok(())
}

async fn run_server(config: PlannerConfig, args: ServeArgs) -> anyhow::Result<()> {
    if args.bind == "0.0.0.0" {
        tracing::warn!(
            "Server binding to 0.0.0.0 exposes the planner to all network interfaces. \
             Anyone who can reach it can spend the configured API credits."
        );
    }
    if !config.provider.has_api_key() && config.provider.requires_api_key() {
        tracing::info!("No server-side model key configured; the form will ask for one");
    }

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", args.bind, args.port))?;

    itinera_web::serve(Arc::new(AppState::new(config)), addr, args.cors_origins).await
}
