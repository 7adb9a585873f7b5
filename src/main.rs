use anyhow::Context;
use clap::{Parser, Subcommand};
use rental_scout::config::Config;
use rental_scout::fleet::{FleetClient, LandingPageContent};
use rental_scout::search::view::CarCard;
use rental_scout::search::{
    Action, AvailabilityMode, FetchOrchestrator, HttpSearchBackend, Layout, View,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rental-scout", version, about = "Vehicle rental search and fleet admin client")]
struct Cli {
    /// Override RENTAL_API_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search vehicles from a page query string, e.g. "location=Phoenix%2C+AZ&carType=suv"
    Search {
        #[arg(default_value = "")]
        query: String,
        /// Show the map layout instead of the list
        #[arg(long)]
        map: bool,
        /// all, available or partial
        #[arg(long, default_value = "all")]
        availability: String,
        /// Write the result set as JSON
        #[arg(long, default_value = "search_results.json")]
        output: PathBuf,
    },
    /// Fleet admin actions (needs FLEET_API_KEY or --key)
    Fleet {
        #[arg(long)]
        key: Option<String>,
        #[command(subcommand)]
        action: FleetAction,
    },
}

#[derive(Subcommand)]
enum FleetAction {
    Charge {
        host_id: String,
        amount: f64,
        #[arg(long)]
        reason: String,
    },
    Hold {
        host_id: String,
        amount: f64,
        #[arg(long)]
        reason: String,
    },
    Release {
        host_id: String,
    },
    Payout {
        host_id: String,
    },
    ApproveInsurance {
        provider_id: String,
    },
    /// Save a partner landing page from a JSON file
    LandingPage {
        partner_id: String,
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.api_base_url = base_url.trim_end_matches('/').to_string();
    }

    match cli.command {
        Command::Search {
            query,
            map,
            availability,
            output,
        } => run_search(&config, &query, map, &availability, output).await,
        Command::Fleet { key, action } => {
            if key.is_some() {
                config.fleet_key = key;
            }
            run_fleet(&config, action).await
        }
    }
}

async fn run_search(
    config: &Config,
    query: &str,
    map: bool,
    availability: &str,
    output: PathBuf,
) -> anyhow::Result<()> {
    info!("🚗 Rental Scout - vehicle search");
    info!("Searching {} with {:?}", config.api_base_url, query);

    let backend = HttpSearchBackend::new(config)?;
    let mut orchestrator = FetchOrchestrator::new(Arc::new(backend));
    orchestrator.hydrate(query, None).await;
    orchestrator.dispatch(Action::SetAvailability(AvailabilityMode::parse(availability)));
    if map {
        orchestrator.dispatch(Action::ToggleMapView);
    }

    print_view(&orchestrator.view());

    let state = orchestrator.state();
    info!("URL: ?{}", state.url);

    let json = serde_json::to_string_pretty(&state.results)?;
    tokio::fs::write(&output, json)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("💾 Saved results to {}", output.display());

    Ok(())
}

fn print_view(view: &View) {
    if let Some(days) = view.rental_days {
        println!("Trip: {} day(s)", days);
    }
    if let Some(notice) = &view.notice {
        println!("⚠️  {}", notice.message());
        if let Some(action) = notice.action() {
            println!("   [{}]", action);
        }
    }

    match &view.layout {
        Layout::List(list) => {
            let city = list.searched_city.as_deref().unwrap_or("your area");
            if !list.in_city.is_empty() {
                println!("\nCars in {} ({})", city, list.in_city.len());
                print_cards(&list.in_city);
            }
            if !list.nearby.is_empty() {
                println!("\nNearby ({})", list.nearby.len());
                print_cards(&list.nearby);
            }
        }
        Layout::Map(map) => {
            println!(
                "\nMap centered on {:.4}, {:.4} with {} markers",
                map.center.0,
                map.center.1,
                map.markers.len()
            );
            for marker in &map.markers {
                let note = if marker.approximate { " (approx.)" } else { "" };
                println!(
                    "   {} @ {:.4}, {:.4} {}{}",
                    marker.car_id, marker.latitude, marker.longitude, marker.price_label, note
                );
            }
            print_cards(&map.sidebar);
        }
    }

    println!("\nTotal: {}", view.total_count);
}

fn print_cards(cards: &[CarCard]) {
    for (i, card) in cards.iter().enumerate() {
        println!("{}. {} (${:.2}/day)", i + 1, card.title, card.daily_rate);
        if let Some(total) = card.trip_total {
            println!("   Trip total: ${:.2}", total);
        }
        if let Some(rating) = card.rating {
            println!("   Rating: {:.1}", rating);
        }
        if card.instant_book {
            println!("   Instant Book");
        }
        println!("   ID: {}", card.id);
    }
}

async fn run_fleet(config: &Config, action: FleetAction) -> anyhow::Result<()> {
    let client = FleetClient::new(config)?;

    let outcome = match action {
        FleetAction::Charge {
            host_id,
            amount,
            reason,
        } => client.charge_host(&host_id, amount, &reason).await?,
        FleetAction::Hold {
            host_id,
            amount,
            reason,
        } => client.hold_funds(&host_id, amount, &reason).await?,
        FleetAction::Release { host_id } => client.release_hold(&host_id).await?,
        FleetAction::Payout { host_id } => client.force_payout(&host_id).await?,
        FleetAction::ApproveInsurance { provider_id } => {
            client.approve_insurance(&provider_id).await?
        }
        FleetAction::LandingPage { partner_id, file } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let content: LandingPageContent =
                serde_json::from_str(&raw).context("Landing page file is not valid JSON")?;
            client.save_landing_page(&partner_id, &content).await?
        }
    };

    println!(
        "✅ {}",
        outcome.message.as_deref().unwrap_or("Request accepted")
    );
    Ok(())
}
