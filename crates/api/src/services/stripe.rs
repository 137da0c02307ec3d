//! Stripe hosted-checkout gateway.
//!
//! Uses the Checkout Sessions API: `create_session` creates a hosted session
//! with one line item per cart line, `capture` retrieves the session and
//! requires `payment_status == "paid"`. Stripe captures server-side on its
//! own, so "capture" here is verification plus fee lookup.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use domain::services::{
    CaptureOutcome, GatewayError, PaymentGateway, ProviderSession, SessionRequest,
};
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::config::StripeConfig;

pub struct StripeGateway {
    client: Client,
    config: StripeConfig,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, config }
    }

    async fn post_form(&self, path: &str, form: &[(String, String)]) -> Result<Value, GatewayError> {
        let response = self
            .client
            .post(format!("{}{}", self.config.api_base, path))
            .bearer_auth(&self.config.secret_key)
            .form(form)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Self::parse_response(response).await
    }

    async fn get(&self, path: &str) -> Result<Value, GatewayError> {
        let response = self
            .client
            .get(format!("{}{}", self.config.api_base, path))
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Self::parse_response(response).await
    }

    async fn parse_response(response: reqwest::Response) -> Result<Value, GatewayError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(GatewayError::Auth(format!("Stripe returned {}", status)));
        }
        if !status.is_success() {
            return Err(GatewayError::Api(format!(
                "Stripe returned {}: {}",
                status, body
            )));
        }

        serde_json::from_str(&body)
            .map_err(|_| GatewayError::MalformedResponse("body is not valid JSON"))
    }

    /// Fee in minor units from the payment intent's balance transaction, when
    /// Stripe has settled enough to expose it.
    async fn lookup_fee(&self, session: &Value) -> Option<i64> {
        let intent_id = session.get("payment_intent")?.as_str()?;
        let intent = self
            .get(&format!(
                "/v1/payment_intents/{}?expand[]=latest_charge.balance_transaction",
                intent_id
            ))
            .await
            .ok()?;
        intent
            .pointer("/latest_charge/balance_transaction/fee")?
            .as_i64()
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<ProviderSession, GatewayError> {
        let currency = request.currency.to_lowercase();
        let mut form: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), request.return_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
            (
                "metadata[cart_id]".to_string(),
                request.cart_id.to_string(),
            ),
        ];

        for (i, item) in request.line_items.iter().enumerate() {
            form.push((
                format!("line_items[{i}][price_data][currency]"),
                currency.clone(),
            ));
            form.push((
                format!("line_items[{i}][price_data][product_data][name]"),
                item.name.clone(),
            ));
            form.push((
                format!("line_items[{i}][price_data][unit_amount]"),
                item.unit_amount_minor.to_string(),
            ));
            form.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        }

        let session = self.post_form("/v1/checkout/sessions", &form).await?;

        let payment_id = session
            .get("id")
            .and_then(Value::as_str)
            .ok_or(GatewayError::MalformedResponse("id"))?
            .to_string();
        let approval_url = session
            .get("url")
            .and_then(Value::as_str)
            .ok_or(GatewayError::MalformedResponse("url"))?
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
        let session = self
            .get(&format!("/v1/checkout/sessions/{}", payment_id))
            .await?;

        let payment_status = session
            .get("payment_status")
            .and_then(Value::as_str)
            .ok_or(GatewayError::MalformedResponse("payment_status"))?;

        if payment_status != "paid" {
            return Err(GatewayError::Incomplete {
                status: payment_status.to_string(),
            });
        }

        let amount_minor = session
            .get("amount_total")
            .and_then(Value::as_i64)
            .ok_or(GatewayError::MalformedResponse("amount_total"))?;
        let currency = session
            .get("currency")
            .and_then(Value::as_str)
            .ok_or(GatewayError::MalformedResponse("currency"))?
            .to_uppercase();

        let amount = shared::money::from_minor_units(amount_minor, &currency);
        let fee = self
            .lookup_fee(&session)
            .await
            .map(|f| shared::money::from_minor_units(f, &currency));

        let payer_name = session
            .pointer("/customer_details/name")
            .and_then(Value::as_str)
            .map(str::to_string);
        let payer_email = session
            .pointer("/customer_details/email")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(CaptureOutcome {
            amount,
            currency,
            fee,
            payer_name,
            payer_email,
            raw_response: session,
        })
    }
}

/// Parses a provider decimal amount string (PayPal carries amounts this way).
pub(crate) fn parse_amount(value: &str) -> Result<Decimal, GatewayError> {
    Decimal::from_str(value).map_err(|_| GatewayError::MalformedResponse("amount"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1000.00").unwrap(), Decimal::new(100000, 2));
        assert!(parse_amount("one thousand").is_err());
    }
}
