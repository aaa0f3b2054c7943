use bread_client::AppContext;
use bread_core::{AuctionId, NewPurchase, Purchase};
use clap::Subcommand;

use super::CommandError;

#[derive(Subcommand)]
pub enum PurchaseAction {
    /// List the signed-in user's purchases (every purchase for admins)
    List,
    /// Record a purchase for a confirmed payment intent
    Record {
        auction_id: AuctionId,
        #[arg(long)]
        payment_intent: String,
    },
}

pub async fn run(ctx: &AppContext, action: PurchaseAction) -> Result<(), CommandError> {
    let user = ctx.auth().current_user().ok_or(CommandError::NotSignedIn)?;
    let purchases = ctx.purchases();

    match action {
        PurchaseAction::List => {
            let listed = if user.is_admin() {
                purchases.list().await
            } else {
                purchases.list_for_user(user.id).await
            };
            for purchase in &listed {
                print_purchase(purchase);
            }
            println!("{} purchase(s)", listed.len());
        }
        PurchaseAction::Record {
            auction_id,
            payment_intent,
        } => {
            if let Some(existing) = purchases.get_by_payment_intent(&payment_intent).await {
                println!("Already recorded as purchase {}", existing.id);
                return Ok(());
            }

            let auction = ctx
                .auctions()
                .get_by_id(auction_id)
                .await
                .ok_or_else(|| CommandError::NotFound(format!("Auction {auction_id}")))?;
            let price = auction.checkout_price();

            let purchase = purchases
                .create(&NewPurchase {
                    auction_id,
                    user_id: user.id,
                    payment_intent_id: payment_intent,
                    amount: price.amount,
                    currency: price.currency_code,
                })
                .await?;
            print_purchase(&purchase);
        }
    }
    Ok(())
}

fn print_purchase(purchase: &Purchase) {
    println!(
        "{}  auction {}  {} {}  {}  {}",
        purchase.id,
        purchase.auction_id,
        purchase.amount,
        purchase.currency.as_str().to_uppercase(),
        purchase.payment_intent_id,
        purchase.created_at.format("%Y-%m-%d %H:%M"),
    );
}
