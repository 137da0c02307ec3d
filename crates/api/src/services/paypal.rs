//! PayPal orders-API gateway.
//!
//! Authenticates with client-credentials OAuth and caches the access token
//! until shortly before expiry. `create_session` creates an order with the
//! approve link, `capture` captures it and requires status COMPLETED.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use domain::services::{
    CaptureOutcome, GatewayError, PaymentGateway, ProviderSession, SessionRequest,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::stripe::parse_amount;
use crate::config::PayPalConfig;

/// Seconds subtracted from the advertised token lifetime before refreshing.
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;

pub struct PayPalGateway {
    client: Client,
    config: PayPalConfig,
    /// Cached OAuth2 access token with expiry tracking.
    token_cache: RwLock<Option<CachedToken>>,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

impl PayPalGateway {
    pub fn new(config: PayPalConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            config,
            token_cache: RwLock::new(None),
        }
    }

    /// Get a valid access token, refreshing via client-credentials if the
    /// cached one is missing or about to expire.
    async fn access_token(&self) -> Result<String, GatewayError> {
        {
            let cache = self.token_cache.read().expect("token cache poisoned");
            if let Some(token) = cache.as_ref() {
                if token.expires_at > Instant::now() {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let response = self
            .client
            .post(format!("{}/v1/oauth2/token", self.config.api_base()))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(GatewayError::Auth(
                "PayPal rejected client credentials".to_string(),
            ));
        }
        if !response.status().is_success() {
            return Err(GatewayError::Api(format!(
                "PayPal token endpoint returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|_| GatewayError::MalformedResponse("access_token"))?;

        let lifetime = token.expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS);
        let cached = CachedToken {
            access_token: token.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        };
        *self.token_cache.write().expect("token cache poisoned") = Some(cached);

        Ok(token.access_token)
    }

    async fn parse_response(response: reqwest::Response) -> Result<Value, GatewayError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(GatewayError::Auth(format!("PayPal returned {}", status)));
        }
        if !status.is_success() {
            return Err(GatewayError::Api(format!(
                "PayPal returned {}: {}",
                status, body
            )));
        }

        serde_json::from_str(&body)
            .map_err(|_| GatewayError::MalformedResponse("body is not valid JSON"))
    }
}

#[async_trait]
impl PaymentGateway for PayPalGateway {
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<ProviderSession, GatewayError> {
        let token = self.access_token().await?;
        let currency = request.currency.to_uppercase();
        let total = shared::money::from_minor_units(request.total_minor, &currency);

        let items: Vec<Value> = request
            .line_items
            .iter()
            .map(|item| {
                let unit = shared::money::from_minor_units(item.unit_amount_minor, &currency);
                json!({
                    "name": item.name,
                    "quantity": item.quantity.to_string(),
                    "unit_amount": {
                        "currency_code": currency,
                        "value": unit.to_string(),
                    },
                })
            })
            .collect();

        let body = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "reference_id": request.cart_id.to_string(),
                "amount": {
                    "currency_code": currency,
                    "value": total.to_string(),
                    "breakdown": {
                        "item_total": {
                            "currency_code": currency,
                            "value": total.to_string(),
                        },
                    },
                },
                "items": items,
            }],
            "application_context": {
                "return_url": request.return_url,
                "cancel_url": request.cancel_url,
            },
        });

        let response = self
            .client
            .post(format!("{}/v2/checkout/orders", self.config.api_base()))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let order = Self::parse_response(response).await?;

        let payment_id = order
            .get("id")
            .and_then(Value::as_str)
            .ok_or(GatewayError::MalformedResponse("id"))?
            .to_string();

        let approval_url = order
            .get("links")
            .and_then(Value::as_array)
            .and_then(|links| {
                links.iter().find(|link| {
                    link.get("rel").and_then(Value::as_str) == Some("approve")
                })
            })
            .and_then(|link| link.get("href"))
            .and_then(Value::as_str)
            .ok_or(GatewayError::MalformedResponse("approve link"))?
            .to_string();

        Ok(ProviderSession {
            payment_id,
            approval_url,
        })
    }

    async fn capture(
        &self,
        payment_id: &str,
        _payer_id: Option<&str>,
    ) -> Result<CaptureOutcome, GatewayError> {
        let token = self.access_token().await?;

        let response = self
            .client
            .post(format!(
                "{}/v2/checkout/orders/{}/capture",
                self.config.api_base(),
                payment_id
            ))
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body("{}")
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let order = Self::parse_response(response).await?;

        let status = order
            .get("status")
            .and_then(Value::as_str)
            .ok_or(GatewayError::MalformedResponse("status"))?;

        if status != "COMPLETED" {
            return Err(GatewayError::Incomplete {
                status: status.to_string(),
            });
        }

        let capture = order
            .pointer("/purchase_units/0/payments/captures/0")
            .ok_or(GatewayError::MalformedResponse("captures"))?;

        let amount = capture
            .pointer("/amount/value")
            .and_then(Value::as_str)
            .ok_or(GatewayError::MalformedResponse("amount.value"))
            .and_then(parse_amount)?;
        let currency = capture
            .pointer("/amount/currency_code")
            .and_then(Value::as_str)
            .ok_or(GatewayError::MalformedResponse("amount.currency_code"))?
            .to_string();

        let fee = capture
            .pointer("/seller_receivable_breakdown/paypal_fee/value")
            .and_then(Value::as_str)
            .and_then(|v| parse_amount(v).ok());

        let payer_name = order.pointer("/payer/name").map(|name| {
            let given = name.pointer("/given_name").and_then(Value::as_str).unwrap_or("");
            let surname = name.pointer("/surname").and_then(Value::as_str).unwrap_or("");
            format!("{} {}", given, surname).trim().to_string()
        });
        let payer_name = payer_name.filter(|n| !n.is_empty());
        let payer_email = order
            .pointer("/payer/email_address")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(CaptureOutcome {
            amount,
            currency,
            fee,
            payer_name,
            payer_email,
            raw_response: order,
        })
    }
}
