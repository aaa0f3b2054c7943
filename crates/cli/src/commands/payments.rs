//! Checkout via the payment functions.
//!
//! Responses are printed as JSON so the client secrets can be piped into
//! the payment form.

use bread_client::AppContext;
use bread_client::services::payments::{
    PaymentIntentRequest, PaymentResponse, SavePaymentMethodRequest, SetupIntentRequest,
};
use bread_core::AuctionId;
use clap::Subcommand;
use serde::Serialize;

use super::CommandError;

#[derive(Subcommand)]
pub enum PayAction {
    /// Start saving a card for the signed-in user
    SetupIntent,
    /// Attach a confirmed payment method
    SaveMethod {
        #[arg(long)]
        customer: String,
        #[arg(long)]
        payment_method: String,
    },
    /// Create a charge for an auction at its checkout price
    Intent {
        auction_id: AuctionId,
        #[arg(long)]
        customer: Option<String>,
        #[arg(long)]
        payment_method: Option<String>,
    },
}

pub async fn run(ctx: &AppContext, action: PayAction) -> Result<(), CommandError> {
    let payments = ctx.payments();

    match action {
        PayAction::SetupIntent => {
            let user = ctx.auth().current_user().ok_or(CommandError::NotSignedIn)?;
            let response = payments
                .create_setup_intent(&SetupIntentRequest {
                    email: user.email,
                    name: Some(user.name),
                    user_id: Some(user.id),
                })
                .await;
            report(&response)
        }
        PayAction::SaveMethod {
            customer,
            payment_method,
        } => {
            let response = payments
                .save_payment_method(&SavePaymentMethodRequest {
                    customer_id: customer,
                    payment_method_id: payment_method,
                    user_id: ctx.auth().current_user().map(|u| u.id),
                })
                .await;
            report(&response)
        }
        PayAction::Intent {
            auction_id,
            customer,
            payment_method,
        } => {
            let auction = ctx
                .auctions()
                .get_by_id(auction_id)
                .await
                .ok_or_else(|| CommandError::NotFound(format!("Auction {auction_id}")))?;
            let mut request = PaymentIntentRequest::for_auction(&auction).ok_or_else(|| {
                CommandError::Payment(format!(
                    "Checkout price {} is out of range",
                    auction.checkout_price()
                ))
            })?;
            request.customer_id = customer;
            request.payment_method_id = payment_method;
            tracing::info!(%auction_id, charge = %request.charge(), "Creating payment intent");

            let response = payments.create_payment_intent(&request).await;
            report(&response)
        }
    }
}

fn report<T: Serialize>(response: &PaymentResponse<T>) -> Result<(), CommandError> {
    if !response.success {
        return Err(CommandError::Payment(
            response.error.clone().unwrap_or_default(),
        ));
    }
    match serde_json::to_string_pretty(&response.payload) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::warn!(error = %e, "Could not render payment response"),
    }
    Ok(())
}
