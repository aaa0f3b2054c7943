//! Auction listings and the live countdown.

use std::io::Write;

use bread_client::AppContext;
use bread_client::countdown::{Countdown, CountdownState};
use bread_core::{Auction, AuctionId};
use chrono::Utc;
use clap::Subcommand;

use super::CommandError;

#[derive(Subcommand)]
pub enum AuctionAction {
    /// List auctions
    List {
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,
        /// Only auctions still taking bids, closing soonest first
        #[arg(long, conflicts_with = "category")]
        active: bool,
    },
    /// Show one auction
    Show { id: AuctionId },
    /// Count down to an auction's close
    Watch { id: AuctionId },
}

pub async fn run(ctx: &AppContext, action: AuctionAction) -> Result<(), CommandError> {
    let auctions = ctx.auctions();

    match action {
        AuctionAction::List { category, active } => {
            let listed = match (category, active) {
                (_, true) => auctions.list_active().await,
                (Some(category), false) => auctions.list_by_category(&category).await,
                (None, false) => auctions.list().await,
            };
            let now = Utc::now();
            for auction in &listed {
                println!(
                    "{}  {:<32} {:<12} {:>10}  {}",
                    auction.id,
                    auction.title,
                    auction.category,
                    auction.checkout_price(),
                    bread_client::countdown::evaluate(auction.ends_at, now),
                );
            }
            println!("{} auction(s)", listed.len());
        }
        AuctionAction::Show { id } => {
            let auction = fetch(ctx, id).await?;
            print_auction(&auction);
        }
        AuctionAction::Watch { id } => {
            let auction = fetch(ctx, id).await?;
            println!("{}", auction.title);
            watch(&auction).await;
        }
    }
    Ok(())
}

async fn fetch(ctx: &AppContext, id: AuctionId) -> Result<Auction, CommandError> {
    ctx.auctions()
        .get_by_id(id)
        .await
        .ok_or_else(|| CommandError::NotFound(format!("Auction {id}")))
}

fn print_auction(auction: &Auction) {
    println!("{}", auction.title);
    if let Some(description) = &auction.description {
        println!("{description}");
    }
    println!("Category:    {}", auction.category);
    println!("Status:      {}", auction.status);
    println!("Current bid: {}", auction.current_bid);
    if let Some(buy_now) = auction.buy_now_price {
        println!("Buy now:     {buy_now}");
    }
    println!("Checkout:    {}", auction.checkout_price());
    println!("Ends:        {}", auction.ends_at.to_rfc3339());
    println!(
        "Time left:   {}",
        bread_client::countdown::evaluate(auction.ends_at, Utc::now())
    );
}

/// Redraw the countdown in place until it expires or Ctrl-C is pressed.
async fn watch(auction: &Auction) {
    let handle = Countdown::new(auction.ends_at)
        .on_expire(|| tracing::info!("Auction closed"))
        .start();
    let mut updates = handle.subscribe();
    let mut stdout = std::io::stdout();

    loop {
        let state = *updates.borrow_and_update();
        let line = state.to_string();
        print!("\r{line:<24}");
        let _ = stdout.flush();

        if state == CountdownState::Expired {
            println!();
            break;
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    println!();
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }

    handle.stop();
}
