// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Load the config file and apply flag overrides
// 3. Open the link store and dispatch to the subcommand handler
// 4. Exit with proper code (0 = success, 1 = links not online, 2 = error)
// =============================================================================

mod cli;           // src/cli.rs - command-line parsing

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use uuid::Uuid;

use cli::{Cli, Commands, CompanyCommand, LinkCommand, OutputArgs};
use link_sentinel::checker::HttpProber;
use link_sentinel::config::MonitorConfig;
use link_sentinel::link::{
    format_duration, format_url_for_display, Company, CompanyEdit, Link, LinkEdit, LinkStatus, NewLink,
};
use link_sentinel::logging;
use link_sentinel::monitor::{Monitor, MonitorEvent, MonitorSettings, NotificationKind};
use link_sentinel::stats::DashboardStats;
use link_sentinel::store::{JsonFileStore, LinkStore};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    let mut config = MonitorConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(path) = cli.store {
        config.store_path = path;
    }
    if let Some(user) = cli.user {
        config.user_id = user;
    }

    logging::init(&config.log_level);

    let store = Arc::new(
        JsonFileStore::open(&config.store_path)
            .await
            .with_context(|| format!("Failed to open store '{}'", config.store_path.display()))?,
    );

    match cli.command {
        Commands::Company(CompanyCommand::Add { name, description }) => {
            let company = store.create_company(&config.user_id, &name, description).await?;
            println!("✅ Company '{}' created: {}", company.name, company.id);
            Ok(0)
        }
        Commands::Company(CompanyCommand::Edit {
            company_id,
            name,
            description,
        }) => {
            let company = store
                .update_company(&config.user_id, company_id, CompanyEdit { name, description })
                .await?;
            println!("✏️  Company '{}' updated", company.name);
            Ok(0)
        }
        Commands::Company(CompanyCommand::Remove { company_id }) => {
            let removed = store.delete_company(&config.user_id, company_id).await?;
            println!("🗑️  Company {} removed along with {} link(s)", company_id, removed);
            Ok(0)
        }
        Commands::Company(CompanyCommand::List(output)) => {
            let companies = store.list_companies(&config.user_id).await?;
            print_companies(&companies, output)?;
            Ok(0)
        }
        Commands::Link(LinkCommand::Add {
            company_id,
            name,
            url,
            description,
        }) => {
            let link = store
                .create_link(NewLink {
                    user_id: config.user_id.clone(),
                    company_id,
                    name,
                    url,
                    description,
                })
                .await?;
            println!("✅ Link '{}' ({}) created: {}", link.name, link.url, link.id);
            Ok(0)
        }
        Commands::Link(LinkCommand::Edit {
            link_id,
            name,
            url,
            description,
            company,
        }) => {
            let link = store
                .update_link(
                    &config.user_id,
                    link_id,
                    LinkEdit {
                        name,
                        url,
                        description,
                        company_id: company,
                    },
                )
                .await?;
            println!("✏️  Link '{}' ({}) updated", link.name, link.url);
            Ok(0)
        }
        Commands::Link(LinkCommand::Remove { link_id }) => {
            store.delete_link(&config.user_id, link_id).await?;
            println!("🗑️  Link {} removed", link_id);
            Ok(0)
        }
        Commands::List { company, output } => {
            let links = match company {
                Some(company_id) => store.list_links_by_company(&config.user_id, company_id).await?,
                None => store.list_links(&config.user_id).await?,
            };
            print_links(&links, output)?;
            Ok(0)
        }
        Commands::Check {
            link_id: Some(link_id),
            output,
        } => handle_check_one(store, &config, link_id, output).await,
        Commands::Check { link_id: None, output } => handle_check(store, &config, output).await,
        Commands::Watch { interval } => {
            handle_watch(store, &config, interval.unwrap_or(config.interval_minutes)).await
        }
        Commands::Stats(output) => handle_stats(&store, &config.user_id, output).await,
    }
}

fn build_monitor(
    store: Arc<JsonFileStore>,
    config: &MonitorConfig,
) -> Result<Monitor<JsonFileStore, HttpProber>> {
    let prober = HttpProber::new(config.probe_timeout()).context("Failed to create HTTP client")?;
    Ok(Monitor::new(
        store,
        Arc::new(prober),
        MonitorSettings {
            user_id: config.user_id.clone(),
            link_delay: config.link_delay(),
        },
    ))
}

// Handles the 'check' subcommand: one pass, then the table
async fn handle_check(store: Arc<JsonFileStore>, config: &MonitorConfig, output: OutputArgs) -> Result<i32> {
    let monitor = build_monitor(Arc::clone(&store), config)?;
    let mut events = monitor.subscribe();

    if !output.json {
        println!("🔍 Checking links for user '{}'...\n", config.user_id);
    }
    let summary = monitor.check_all_links().await?;

    while let Ok(event) = events.try_recv() {
        if !output.json {
            print_event(&event);
        }
    }

    let links = store.list_links(&config.user_id).await?;
    print_links(&links, output)?;

    if summary.write_failures > 0 {
        warn!(failures = summary.write_failures, "Some results could not be saved");
    }

    let all_online = links.iter().all(|l| l.status == LinkStatus::Online);
    Ok(if all_online { 0 } else { 1 })
}

// Handles 'check <LINK_ID>': one link, right now
async fn handle_check_one(
    store: Arc<JsonFileStore>,
    config: &MonitorConfig,
    link_id: Uuid,
    output: OutputArgs,
) -> Result<i32> {
    let monitor = build_monitor(store, config)?;
    let mut events = monitor.subscribe();

    let link = monitor.check_link(link_id).await?;

    while let Ok(event) = events.try_recv() {
        if !output.json {
            print_event(&event);
        }
    }
    print_links(std::slice::from_ref(&link), output)?;

    Ok(if link.status == LinkStatus::Online { 0 } else { 1 })
}

// Handles the 'watch' subcommand: recurring passes until Ctrl-C
async fn handle_watch(store: Arc<JsonFileStore>, config: &MonitorConfig, interval_minutes: u32) -> Result<i32> {
    let monitor = build_monitor(store, config)?;
    let mut events = monitor.subscribe();

    let interval = monitor.start_monitoring(interval_minutes);
    println!(
        "👀 Watching links for user '{}' every {} (Ctrl-C to stop)",
        config.user_id,
        format_duration(interval.as_millis() as u64)
    );

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(missed)) => warn!(missed, "Dropped notifications"),
                Err(RecvError::Closed) => break,
            },
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                break;
            }
        }
    }

    if monitor.is_monitoring() {
        monitor.stop_monitoring();
    }

    // main() exits the process right after we return, which would cut a
    // running pass off halfway through. A second Ctrl-C skips the wait.
    println!("\n⏳ Letting the current check finish (Ctrl-C again to quit now)...");
    let finished = monitor.wait_for_scheduled_pass();
    tokio::pin!(finished);
    loop {
        tokio::select! {
            _ = &mut finished => break,
            event = events.recv() => match event {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(missed)) => warn!(missed, "Dropped notifications"),
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                warn!("Quitting before the current check finished");
                break;
            }
        }
    }
    while let Ok(event) = events.try_recv() {
        print_event(&event);
    }
    info!("Watch ended");
    println!("⏸️  Monitoring paused");
    Ok(0)
}

// Handles the 'stats' subcommand
async fn handle_stats(store: &JsonFileStore, user_id: &str, output: OutputArgs) -> Result<i32> {
    let companies = store.list_companies(user_id).await?;
    let links = store.list_links(user_id).await?;
    let stats = DashboardStats::compute(&companies, &links);

    if output.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(0);
    }

    println!("📊 Dashboard");
    println!("   🏢 Companies: {}", stats.total_companies);
    println!("   📋 Links: {}", stats.total_links);
    println!("   ✅ Online: {}", stats.online_links);
    println!("   ❌ Offline: {}", stats.offline_links);
    println!("   ⚠️  Error: {}", stats.error_links);
    println!("   ⏳ Pending: {}", stats.pending_links);
    println!("   ⏱️  Average response: {}ms", stats.average_response_time);
    println!("   📈 Uptime: {:.0}%", stats.uptime_ratio * 100.0);
    Ok(0)
}

fn print_event(event: &MonitorEvent) {
    match event {
        MonitorEvent::Notification(n) => match n.kind {
            NotificationKind::Offline => println!("🔴 Link offline: {} ({})", n.link_name, n.link_url),
            NotificationKind::Recovered => println!("🟢 Link back online: {} ({})", n.link_name, n.link_url),
        },
        MonitorEvent::PassFailed { reason } => println!("⚠️  Could not check links: {}", reason),
    }
}

fn print_companies(companies: &[Company], output: OutputArgs) -> Result<()> {
    if output.json {
        println!("{}", serde_json::to_string_pretty(companies)?);
        return Ok(());
    }
    if companies.is_empty() {
        println!("No companies yet. Add one with `link-sentinel company add`.");
        return Ok(());
    }

    println!("{:<38} {:<24} {:<40}", "ID", "NAME", "DESCRIPTION");
    println!("{}", "=".repeat(102));
    for company in companies {
        println!(
            "{:<38} {:<24} {:<40}",
            company.id,
            company.name,
            company.description.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

fn print_links(links: &[Link], output: OutputArgs) -> Result<()> {
    if output.json {
        println!("{}", serde_json::to_string_pretty(links)?);
    } else {
        print_table(links);
    }
    Ok(())
}

// Prints links as a human-readable table in the terminal
fn print_table(links: &[Link]) {
    if links.is_empty() {
        println!("No links yet. Add one with `link-sentinel link add`.");
        return;
    }

    println!("{:<24} {:<45} {:<12} {:<10} {:<20}", "NAME", "URL", "STATUS", "RESPONSE", "LAST CHECKED");
    println!("{}", "=".repeat(111));

    let now = Utc::now();
    for link in links {
        let url = format_url_for_display(&link.url);
        let url_display = if url.chars().count() > 42 {
            format!("{}...", url.chars().take(42).collect::<String>())
        } else {
            url
        };
        let response = link
            .response_time
            .map(|ms| format!("{}ms", ms))
            .unwrap_or_else(|| "-".to_string());
        let last_checked = link
            .last_checked
            .map(|at| {
                let ago = (now - at).num_milliseconds().max(0) as u64;
                format!("{} ago", format_duration(ago))
            })
            .unwrap_or_else(|| "never".to_string());

        println!(
            "{:<24} {:<45} {:<12} {:<10} {:<20}",
            link.name,
            url_display,
            format_status(link.status),
            response,
            last_checked
        );
    }

    println!();
    let stats = DashboardStats::compute(&[], links);
    println!("📊 Summary:");
    println!("   ✅ Online: {}", stats.online_links);
    println!("   ❌ Offline: {}", stats.offline_links);
    println!("   ⚠️  Error: {}", stats.error_links);
    println!("   📋 Total: {}", stats.total_links);
}

fn format_status(status: LinkStatus) -> String {
    match status {
        LinkStatus::Online => "✅ ONLINE".to_string(),
        LinkStatus::Offline => "❌ OFFLINE".to_string(),
        LinkStatus::Error => "⚠️  ERROR".to_string(),
        LinkStatus::Pending => "⏳ PENDING".to_string(),
    }
}
