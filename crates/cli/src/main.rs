//! Bread Made Easy CLI - lead, booking, auction and checkout tools.
//!
//! # Usage
//!
//! ```bash
//! # Sign in once; the identity is cached for later runs
//! bme --email owner@breadmadeeasy.com --password ... auth login
//!
//! # Admin dashboards
//! bme leads list
//! bme bookings export -o bookings.csv
//!
//! # Watch an auction close
//! bme auctions watch 9a8b7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d
//! ```
//!
//! # Environment Variables
//!
//! - `SUPABASE_URL`, `SUPABASE_ANON_KEY` - remote project (required)
//! - `BREAD_EMAIL`, `BREAD_PASSWORD` - sign in before running the command
//! - `BREAD_LOG_JSON` - emit JSON logs
//! - `RUST_LOG` - log filter (default: `bread_cli=info,bread_client=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use bread_client::AppContext;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "bme")]
#[command(author, version, about = "Bread Made Easy CLI")]
struct Cli {
    /// Account email; signs in before the command runs
    #[arg(long, env = "BREAD_EMAIL", global = true)]
    email: Option<String>,

    /// Account password
    #[arg(long, env = "BREAD_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in, sign up, sign out
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Captured leads
    Leads {
        #[command(subcommand)]
        action: commands::leads::LeadAction,
    },
    /// Strategy call bookings
    Bookings {
        #[command(subcommand)]
        action: commands::bookings::BookingAction,
    },
    /// Marketing funnels
    Funnels {
        #[command(subcommand)]
        action: commands::funnels::FunnelAction,
    },
    /// Auctions and countdowns
    Auctions {
        #[command(subcommand)]
        action: commands::auctions::AuctionAction,
    },
    /// Payment functions
    Pay {
        #[command(subcommand)]
        action: commands::payments::PayAction,
    },
    /// Recorded purchases
    Purchases {
        #[command(subcommand)]
        action: commands::purchases::PurchaseAction,
    },
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bread_cli=info,bread_client=info".into());

    let json = std::env::var("BREAD_LOG_JSON").is_ok();
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    let ctx = AppContext::from_env()?;
    ctx.start();

    let result = dispatch(&ctx, cli).await;

    ctx.shutdown();
    result
}

async fn dispatch(ctx: &AppContext, cli: Cli) -> Result<(), CommandError> {
    let Cli {
        email,
        password,
        command,
    } = cli;
    let credentials = email.as_deref().zip(password.as_deref());

    let command = match command {
        Commands::Auth { action } => {
            return commands::auth::run(ctx, action, credentials).await;
        }
        other => other,
    };

    if let Some((email, password)) = credentials {
        commands::auth::sign_in(ctx, email, password).await?;
    }

    match command {
        Commands::Auth { .. } => Ok(()),
        Commands::Leads { action } => commands::leads::run(ctx, action).await,
        Commands::Bookings { action } => commands::bookings::run(ctx, action).await,
        Commands::Funnels { action } => commands::funnels::run(ctx, action).await,
        Commands::Auctions { action } => commands::auctions::run(ctx, action).await,
        Commands::Pay { action } => commands::payments::run(ctx, action).await,
        Commands::Purchases { action } => commands::purchases::run(ctx, action).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_credentials_after_subcommand() {
        let cli = Cli::try_parse_from([
            "bme",
            "leads",
            "list",
            "--email",
            "owner@bread.io",
            "--password",
            "pw",
        ])
        .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(cli.email.as_deref(), Some("owner@bread.io"));
        assert!(matches!(cli.command, Commands::Leads { .. }));
    }
}
