/// Checkout gateway: the single point of entry for payment-provider calls.
///
/// Payment is optional. When no access token is configured the service runs
/// in test mode and no gateway is constructed at all; handlers receive
/// `Option<Arc<dyn CheckoutGateway>>` and never read the environment.
///
/// Each checkout session is attempted exactly once. There is no retry loop:
/// a failed call surfaces as `PaymentError` to the submitting user.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

const MERCADO_PAGO_API_URL: &str = "https://api.mercadopago.com";
const PREFERENCES_PATH: &str = "/checkout/preferences";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Line item sold by the service.
pub const ITEM_TITLE: &str = "Criação de Currículo Profissional - Info Center";
pub const CURRENCY_ID: &str = "BRL";
pub const UNIT_PRICE: f64 = 15.00;
const AUTO_RETURN: &str = "approved";

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Payment API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Payment API response had no checkout URL")]
    MissingInitPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutItem {
    pub title: String,
    pub quantity: u32,
    pub currency_id: String,
    pub unit_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

/// Body of a checkout-preference request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
    pub back_urls: BackUrls,
    pub auto_return: String,
    /// Correlates the provider's records with our logs.
    pub external_reference: String,
}

impl CheckoutRequest {
    /// The fixed single-item purchase for one résumé. The provider sends the
    /// buyer to `download_url` on approval and to `return_url` otherwise.
    pub fn for_artifact(download_url: String, return_url: &str) -> Self {
        CheckoutRequest {
            items: vec![CheckoutItem {
                title: ITEM_TITLE.to_string(),
                quantity: 1,
                currency_id: CURRENCY_ID.to_string(),
                unit_price: UNIT_PRICE,
            }],
            back_urls: BackUrls {
                success: download_url,
                failure: return_url.to_string(),
                pending: return_url.to_string(),
            },
            auto_return: AUTO_RETURN.to_string(),
            external_reference: Uuid::new_v4().to_string(),
        }
    }
}

/// A created checkout session: where to send the buyer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CheckoutSession {
    pub id: Option<String>,
    pub init_point: String,
}

#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn create_session(&self, request: &CheckoutRequest)
        -> Result<CheckoutSession, PaymentError>;
}

#[derive(Debug, Deserialize)]
struct PreferenceResponse {
    id: Option<String>,
    init_point: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Mercado Pago preferences API client.
#[derive(Clone)]
pub struct MercadoPagoClient {
    client: Client,
    access_token: String,
    api_url: String,
}

impl MercadoPagoClient {
    pub fn new(access_token: String) -> Result<Self, PaymentError> {
        Self::with_api_url(access_token, MERCADO_PAGO_API_URL)
    }

    /// Points the client at a different API host (sandbox or local stub).
    pub fn with_api_url(access_token: String, api_url: &str) -> Result<Self, PaymentError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            access_token,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CheckoutGateway for MercadoPagoClient {
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let response = self
            .client
            .post(format!("{}{PREFERENCES_PATH}", self.api_url))
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Payment API returned {}: {}", status, body);
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let preference: PreferenceResponse = response.json().await?;
        let init_point = preference
            .init_point
            .filter(|url| !url.is_empty())
            .ok_or(PaymentError::MissingInitPoint)?;

        debug!(
            preference_id = preference.id.as_deref().unwrap_or("-"),
            reference = %request.external_reference,
            "Checkout preference created"
        );

        Ok(CheckoutSession {
            id: preference.id,
            init_point,
        })
    }
}
