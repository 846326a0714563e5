use anyhow::Context;
use clap::{Parser, Subcommand};
use lead_discovery::{
    top_counts, Availability, ClientConfig, DiscoverySessionController, HttpBackend, LeadFilter,
    PollConfig, ScoreBand, API_URL_ENV,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lead-discovery", about = "Configure and monitor business discovery runs")]
struct Cli {
    /// Backend base URL; `/api` is appended when missing
    #[arg(long, env = API_URL_ENV)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the current job status
    Status,
    /// List supported countries
    Countries,
    /// List categories grouped by taxonomy
    Categories {
        #[arg(long, default_value = "")]
        search: String,
    },
    /// List cities of a country by tier
    Cities {
        #[arg(long)]
        country: String,
    },
    /// Start a discovery run; without --category every category is scanned
    Start {
        #[arg(long)]
        country: String,
        #[arg(long)]
        city: String,
        #[arg(long = "category")]
        categories: Vec<String>,
    },
    /// Stop the running job
    Stop,
    /// Show lead statistics
    Stats,
    /// Follow the job until interrupted
    Watch {
        #[arg(long)]
        min_score: Option<f64>,
        #[arg(long, default_value = "")]
        search: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(api_url) = cli.api_url {
        config = config.with_base_url(api_url);
    }

    let backend = HttpBackend::new(&config).context("Failed to create backend client")?;
    info!("Using discovery backend at {}", backend.base_url());

    let mut session = DiscoverySessionController::new(Arc::new(backend), PollConfig::default());

    match cli.command {
        Command::Status => {
            let mut updates = session.subscribe();
            session.start_observing().await;
            updates.changed().await.context("Poller stopped before reporting")?;
            let snapshot = updates.borrow().clone();
            session.stop_observing().await;

            match snapshot.last_error {
                Some(e) => error!("Status unavailable: {}", e),
                None => print_status(&snapshot.status),
            }
        }
        Command::Countries => {
            session.load_reference_data().await;
            print_list("countries", session.countries());
        }
        Command::Categories { search } => {
            session.load_reference_data().await;
            if let Availability::Unavailable { reason } = session.categories() {
                println!("Categories unavailable: {}", reason);
                return Ok(());
            }
            let taxonomy = session.taxonomy();
            for (group_id, _) in session.classified().groups() {
                let visible = session.classified().filtered(group_id, &search);
                if visible.is_empty() {
                    continue;
                }
                println!("{} ({})", taxonomy.label(group_id).unwrap_or(group_id), visible.len());
                for category in visible {
                    println!("  {}", category);
                }
            }
        }
        Command::Cities { country } => match session.cities(&country).await {
            Availability::Available(tiers) => {
                for (tier, cities) in tiers.tiers() {
                    println!("{}: {}", tier, cities.join(", "));
                }
            }
            Availability::Unavailable { reason } => println!("Cities unavailable: {}", reason),
            Availability::Loading => {}
        },
        Command::Start { country, city, categories } => {
            session.load_reference_data().await;
            if !categories.is_empty() {
                if let Err(e) = session.select_categories(&categories) {
                    anyhow::bail!("Cannot start discovery: {}", e.operator_message());
                }
            }
            println!("Scanning {}", session.selection().summary());
            match session.start_with_selection(&country, &city).await {
                Ok(response) => println!(
                    "{}",
                    response.message.unwrap_or_else(|| "Discovery started".to_string())
                ),
                Err(e) => {
                    error!("Failed to start discovery: {}", e);
                    anyhow::bail!(e.operator_message());
                }
            }
        }
        Command::Stop => {
            if let Err(e) = session.stop().await {
                error!("Failed to stop discovery: {}", e);
                anyhow::bail!(e.operator_message());
            }
            println!("Discovery stopped");
        }
        Command::Stats => {
            let stats = session.stats().await.context("Failed to fetch statistics")?;
            println!("Total leads: {}", stats.total_leads);
            println!("Average score: {:.2}", stats.avg_score);
            println!("Top categories:");
            for (category, count) in top_counts(&stats.by_category, 5) {
                println!("  {}: {}", category, count);
            }
            println!("Top countries:");
            for (country, count) in top_counts(&stats.by_country, 5) {
                println!("  {}: {}", country, count);
            }
        }
        Command::Watch { min_score, search } => {
            let mut filter = LeadFilter::new().with_search(search);
            if let Some(min_score) = min_score {
                filter = filter.with_min_score(min_score);
            }

            let mut updates = session.subscribe();
            session.start_observing().await;
            loop {
                tokio::select! {
                    changed = updates.changed() => {
                        if changed.is_err() {
                            warn!("Poller went away");
                            break;
                        }
                        let snapshot = updates.borrow_and_update().clone();
                        if let Some(e) = &snapshot.last_error {
                            warn!("Last poll failed: {}", e);
                        }
                        print_status(&snapshot.status);
                        let shown = filter.apply(&snapshot.leads);
                        println!("Leads: {} of {}", shown.len(), snapshot.leads.len());
                        for lead in shown.iter().take(5) {
                            println!(
                                "  [{:>5.1} {}] {} ({}, {})",
                                lead.lead_score,
                                ScoreBand::from_score(lead.lead_score).label(),
                                lead.business_name,
                                lead.category,
                                lead.city
                            );
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info!("Interrupted");
                        break;
                    }
                }
            }
            session.stop_observing().await;
        }
    }

    Ok(())
}

fn print_status(status: &lead_discovery::DiscoveryStatus) {
    if status.is_running {
        println!(
            "Running (run {}) - {} / {} / {}",
            status.run_id.as_deref().unwrap_or("?"),
            status.current_country.as_deref().unwrap_or("-"),
            status.current_city.as_deref().unwrap_or("-"),
            status.current_category.as_deref().unwrap_or("-")
        );
    } else {
        println!("Idle");
    }
}

fn print_list(what: &str, list: &Availability<Vec<String>>) {
    match list {
        Availability::Available(items) => {
            for item in items {
                println!("{}", item);
            }
        }
        Availability::Unavailable { reason } => println!("{} unavailable: {}", what, reason),
        Availability::Loading => {}
    }
}
