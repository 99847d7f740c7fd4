//! Command-line front end for link-analytics.
//!
//! Manages links, records visits and prints per-link analytics directly
//! against the configured PostgreSQL database.
//!
//! # Usage
//!
//! ```bash
//! # Create a link
//! cargo run -- link create abc123 https://example.com
//!
//! # Record a visit (honours RECORDING_MODE)
//! cargo run -- visit abc123 --ip 203.0.113.7 --user-agent "Mozilla/5.0"
//!
//! # Show analytics, second page of 20 details, as JSON
//! cargo run -- analytics 1 --page 2 --limit 20 --json
//!
//! # Check database connection
//! cargo run -- db check
//! ```
//!
//! # Environment Variables
//!
//! See [`link_analytics::config`].

use link_analytics::AppError;
use link_analytics::config::load_from_env;
use link_analytics::domain::entities::{Link, LinkPatch};
use link_analytics::domain::pagination::{DEFAULT_LIMIT, DEFAULT_PAGE};
use link_analytics::runtime::Runtime;
use link_analytics::state::AppState;
use link_analytics::telemetry::init_tracing;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use serde::Serialize;
use sqlx::PgPool;

/// Visit recording and analytics for short links.
#[derive(Parser)]
#[command(name = "link-analytics")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Print results and errors as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Resolve a short code and record one visit
    Visit {
        short_code: String,

        /// Visitor address
        #[arg(long, default_value = "127.0.0.1")]
        ip: String,

        /// Visitor user agent
        #[arg(long, default_value = "link-analytics-cli")]
        user_agent: String,
    },

    /// Show analytics for a link
    Analytics {
        link_id: i64,

        #[arg(short, long, default_value_t = DEFAULT_PAGE)]
        page: i64,

        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: i64,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link management subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Create a link
    Create {
        short_code: String,
        original_url: String,
    },

    /// Show a link by id, or by short code with --code
    Show {
        id_or_code: String,

        #[arg(long)]
        code: bool,
    },

    /// List links, newest first
    List {
        #[arg(short, long, default_value_t = DEFAULT_PAGE)]
        page: i64,

        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: i64,
    },

    /// Change a link's target URL
    Update {
        id: i64,

        #[arg(long)]
        url: String,
    },

    /// Delete a link and its visits
    Delete { id: i64 },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = load_from_env()?;
    init_tracing(&config)?;
    config.print_summary();

    let runtime = Runtime::init(&config).await?;

    let outcome = tokio::select! {
        result = run(cli.command, runtime.state(), runtime.pool(), cli.json) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, shutting down");
            Ok(())
        }
    };

    runtime.shutdown().await;

    if let Err(e) = outcome {
        report_error(&e, cli.json);
        std::process::exit(1);
    }

    Ok(())
}

/// Dispatches a parsed command.
async fn run(command: Commands, state: &AppState, pool: &PgPool, json: bool) -> Result<()> {
    match command {
        Commands::Link { action } => handle_link_action(action, state, json).await,
        Commands::Visit {
            short_code,
            ip,
            user_agent,
        } => {
            let url = state
                .redirects
                .resolve(&short_code, &ip, &user_agent)
                .await?;

            if json {
                print_json(&serde_json::json!({
                    "short_code": short_code,
                    "original_url": url,
                    "recording_mode": state.redirects.mode().to_string(),
                }))?;
            } else {
                println!("{} {}", "➡️ ".bright_blue(), url.bright_white().bold());
            }
            Ok(())
        }
        Commands::Analytics {
            link_id,
            page,
            limit,
        } => {
            let analytics = state.analytics.get_analytics(link_id, page, limit).await?;

            if json {
                return print_json(&analytics);
            }

            println!("{}", "📊 Link Analytics".bright_blue().bold());
            println!();
            print_link(&analytics.link);
            println!();
            println!(
                "  Total visits:    {}",
                analytics.summary.total_visits.to_string().bright_green().bold()
            );
            println!(
                "  Unique visitors: {}",
                analytics.summary.unique_visitors.to_string().bright_green().bold()
            );
            println!();

            if !analytics.summary.visits_by_date.is_empty() {
                println!("{}", "  Visits by date".bright_white().bold());
                for bucket in &analytics.summary.visits_by_date {
                    println!("  {:<12} {}", bucket.date.cyan(), bucket.count);
                }
                println!();
            }

            let p = &analytics.pagination;
            println!(
                "{}",
                format!(
                    "  Visits (page {}/{}, {} total)",
                    p.page, p.total_pages, p.total
                )
                .bright_white()
                .bold()
            );
            println!(
                "  {:<20} {:<40} {}",
                "Visited".bright_white().bold(),
                "IP".bright_white().bold(),
                "User agent".bright_white().bold()
            );
            println!("  {}", "─".repeat(75).bright_black());
            for visit in &analytics.details {
                println!(
                    "  {:<20} {:<40} {}",
                    visit
                        .visited_at
                        .format("%Y-%m-%d %H:%M:%S")
                        .to_string()
                        .bright_black(),
                    visit.ip.cyan(),
                    visit.user_agent
                );
            }
            println!();
            Ok(())
        }
        Commands::Db { action } => handle_db_action(action, pool).await,
    }
}

/// Dispatches link management commands.
async fn handle_link_action(action: LinkAction, state: &AppState, json: bool) -> Result<()> {
    let links = &state.links;

    match action {
        LinkAction::Create {
            short_code,
            original_url,
        } => {
            let link = links.create(short_code, original_url).await?;
            if json {
                return print_json(&link);
            }
            println!("{}", "✅ Link created".green().bold());
            print_link(&link);
        }
        LinkAction::Show { id_or_code, code } => {
            let link = if code {
                links.get_by_short_code(&id_or_code).await?
            } else {
                let id = id_or_code.parse::<i64>().map_err(|_| {
                    AppError::bad_request(
                        "Link id must be an integer (use --code for short codes)",
                        serde_json::json!({ "id": id_or_code }),
                    )
                })?;
                links.get(id).await?
            };
            if json {
                return print_json(&link);
            }
            print_link(&link);
        }
        LinkAction::List { page, limit } => {
            let (items, pagination) = links.list(page, limit).await?;
            if json {
                return print_json(&serde_json::json!({
                    "items": items,
                    "pagination": pagination,
                }));
            }

            println!("{}", "📋 Links".bright_blue().bold());
            println!();

            if items.is_empty() {
                println!("{}", "  No links found".yellow());
                return Ok(());
            }

            println!(
                "  {:<6} {:<16} {:<8} {}",
                "ID".bright_white().bold(),
                "Code".bright_white().bold(),
                "Visits".bright_white().bold(),
                "URL".bright_white().bold()
            );
            println!("  {}", "─".repeat(75).bright_black());
            for link in &items {
                println!(
                    "  {:<6} {:<16} {:<8} {}",
                    link.id.to_string().bright_black(),
                    link.short_code.cyan(),
                    link.visits_counter,
                    link.original_url
                );
            }
            println!();
            println!(
                "  Page {}/{}, total: {}",
                pagination.page,
                pagination.total_pages,
                pagination.total.to_string().bright_white().bold()
            );
        }
        LinkAction::Update { id, url } => {
            let patch = LinkPatch {
                original_url: Some(url),
            };
            let link = links.update(id, patch).await?;
            if json {
                return print_json(&link);
            }
            println!("{}", "✅ Link updated".green().bold());
            print_link(&link);
        }
        LinkAction::Delete { id } => {
            links.delete(id).await?;
            if json {
                return print_json(&serde_json::json!({ "deleted": id }));
            }
            println!("{}", "🗑️  Link deleted".green().bold());
        }
    }

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
                .fetch_one(pool)
                .await?;
            let visits: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM visits")
                .fetch_one(pool)
                .await?;

            println!("{}", "✅ Database connection OK".green().bold());
            println!("  Links:  {}", links.to_string().bright_green().bold());
            println!("  Visits: {}", visits.to_string().bright_green().bold());
        }
    }

    Ok(())
}

fn print_link(link: &Link) {
    println!("  ID:      {}", link.id.to_string().bright_black());
    println!("  Code:    {}", link.short_code.cyan());
    println!("  URL:     {}", link.original_url.bright_white());
    println!("  Visits:  {}", link.visits_counter.to_string().bright_green());
    println!(
        "  Created: {}",
        link.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black()
    );
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints an error, using the structured body for application errors.
fn report_error(e: &anyhow::Error, json: bool) {
    match e.downcast_ref::<AppError>() {
        Some(app_error) if json => {
            let body = serde_json::json!({ "error": app_error.to_error_info() });
            eprintln!("{body}");
        }
        Some(app_error) => {
            eprintln!(
                "{} {} ({})",
                "❌".red(),
                app_error.to_string().red().bold(),
                app_error.code().bright_black()
            );
            let details = app_error.details();
            if !details.is_null() && details.as_object().is_none_or(|o| !o.is_empty()) {
                eprintln!("   {}", details.to_string().bright_black());
            }
        }
        None => eprintln!("{} {:#}", "❌".red(), e),
    }
}
