//! Calls to the three payment functions.
//!
//! The functions wrap the payment processor; this side only forwards the
//! request and reports the outcome. Every call returns a [`PaymentResponse`]
//! and never an error: any transport, status or decoding failure becomes
//! `success: false` with a fixed message for that operation, and the detail
//! goes to the log.

use bread_core::{Auction, AuctionId, CurrencyCode, Email, Price, UserId};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};
use url::Url;

use crate::config::ClientConfig;
use crate::supabase::{SupabaseClient, SupabaseError};

const CREATE_SETUP_INTENT: &str = "create-setup-intent";
const SAVE_PAYMENT_METHOD: &str = "save-payment-method";
const CREATE_PAYMENT_INTENT: &str = "create-payment-intent";

const SETUP_INTENT_FAILED: &str = "Failed to create setup intent";
const SAVE_PAYMENT_METHOD_FAILED: &str = "Failed to save payment method";
const PAYMENT_INTENT_FAILED: &str = "Failed to create payment intent";

/// Outcome of a payment call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
}

impl<T> PaymentResponse<T> {
    fn ok(payload: T) -> Self {
        Self {
            success: true,
            error: None,
            payload: Some(payload),
        }
    }

    fn failed(message: &str) -> Self {
        Self {
            success: false,
            error: Some(message.to_string()),
            payload: None,
        }
    }

    /// Convert into a `Result`, using the error message on failure.
    ///
    /// # Errors
    ///
    /// Returns the failure message when the call did not succeed.
    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.payload) {
            (true, Some(payload)) => Ok(payload),
            _ => Err(self.error.unwrap_or_else(|| "Payment call failed".to_string())),
        }
    }
}

/// Body of `create-setup-intent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupIntentRequest {
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

/// A setup intent ready to be confirmed by the payment form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupIntent {
    pub client_secret: String,
    pub customer_id: String,
    #[serde(default)]
    pub setup_intent_id: Option<String>,
}

/// Body of `save-payment-method`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePaymentMethodRequest {
    pub customer_id: String,
    pub payment_method_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

/// A card stored against the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPaymentMethod {
    pub payment_method_id: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub last4: Option<String>,
}

/// Body of `create-payment-intent`. The amount is in minor units.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    pub amount: i64,
    pub currency: CurrencyCode,
    pub auction_id: AuctionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_id: Option<String>,
}

impl PaymentIntentRequest {
    /// Charge the auction's current checkout price.
    ///
    /// Returns `None` if the price does not fit in minor units.
    #[must_use]
    pub fn for_auction(auction: &Auction) -> Option<Self> {
        let price = auction.checkout_price();
        Some(Self {
            amount: price.minor_units()?,
            currency: price.currency_code,
            auction_id: auction.id,
            customer_id: None,
            payment_method_id: None,
        })
    }

    /// The amount this request charges, back in standard units.
    #[must_use]
    pub fn charge(&self) -> Price {
        Price::from_minor_units(self.amount, self.currency)
    }
}

/// A pending charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub client_secret: String,
    pub payment_intent_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Client for the payment functions.
#[derive(Clone)]
pub struct PaymentService {
    client: reqwest::Client,
    functions_url: Url,
    anon_key: SecretString,
}

impl std::fmt::Debug for PaymentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentService")
            .field("functions_url", &self.functions_url.as_str())
            .finish_non_exhaustive()
    }
}

impl PaymentService {
    /// Create the service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, SupabaseError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            functions_url: config.functions_url.clone(),
            anon_key: config.anon_key.clone(),
        })
    }

    /// Start saving a card for later charges.
    #[instrument(skip(self, request))]
    pub async fn create_setup_intent(
        &self,
        request: &SetupIntentRequest,
    ) -> PaymentResponse<SetupIntent> {
        self.call(CREATE_SETUP_INTENT, request, SETUP_INTENT_FAILED)
            .await
    }

    /// Attach a confirmed payment method to the customer.
    #[instrument(skip(self, request))]
    pub async fn save_payment_method(
        &self,
        request: &SavePaymentMethodRequest,
    ) -> PaymentResponse<SavedPaymentMethod> {
        self.call(SAVE_PAYMENT_METHOD, request, SAVE_PAYMENT_METHOD_FAILED)
            .await
    }

    /// Create a charge for an auction checkout.
    #[instrument(skip(self, request), fields(auction_id = %request.auction_id))]
    pub async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> PaymentResponse<PaymentIntent> {
        self.call(CREATE_PAYMENT_INTENT, request, PAYMENT_INTENT_FAILED)
            .await
    }

    async fn call<B, T>(&self, function: &str, body: &B, failure: &str) -> PaymentResponse<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        match self.invoke(function, body).await {
            Ok(payload) => PaymentResponse::ok(payload),
            Err(e) => {
                error!(function, error = %e, "Payment function call failed");
                PaymentResponse::failed(failure)
            }
        }
    }

    async fn invoke<B, T>(&self, function: &str, body: &B) -> Result<T, SupabaseError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.functions_url.join(function)?;
        let response = self
            .client
            .post(url)
            .bearer_auth(self.anon_key.expose_secret())
            .json(body)
            .send()
            .await?;
        SupabaseClient::handle_response(response).await
    }
}
