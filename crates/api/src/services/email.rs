//! Email delivery service.
//!
//! Two providers: `console` logs the message (development default) and
//! `sendgrid` posts to the SendGrid v3 API. Marketing templates are plain
//! format strings keyed by `MarketingEmailType`.

use domain::models::MarketingEmailType;
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::json;

use crate::config::EmailConfig;

/// Error type for email operations.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Email API error: {0}")]
    Api(String),

    #[error("Unknown email provider: {0}")]
    UnknownProvider(String),
}

/// Email sending service with pluggable provider.
pub struct EmailService {
    client: Client,
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Send a plain-text email. A disabled service silently succeeds so
    /// callers need no special casing in development.
    pub async fn send(&self, to: &str, subject: &str, body_text: &str) -> Result<(), EmailError> {
        if !self.config.enabled {
            tracing::debug!(to = %to, subject = %subject, "Email disabled, skipping send");
            return Ok(());
        }

        match self.config.provider.as_str() {
            "console" => {
                tracing::info!(
                    to = %to,
                    subject = %subject,
                    body = %body_text,
                    "Email (console provider)"
                );
                Ok(())
            }
            "sendgrid" => self.send_via_sendgrid(to, subject, body_text).await,
            other => Err(EmailError::UnknownProvider(other.to_string())),
        }
    }

    async fn send_via_sendgrid(
        &self,
        to: &str,
        subject: &str,
        body_text: &str,
    ) -> Result<(), EmailError> {
        let body = json!({
            "personalizations": [{"to": [{"email": to}]}],
            "from": {
                "email": self.config.sender_email,
                "name": self.config.sender_name,
            },
            "subject": subject,
            "content": [{"type": "text/plain", "value": body_text}],
        });

        let response = self
            .client
            .post("https://api.sendgrid.com/v3/mail/send")
            .bearer_auth(&self.config.sendgrid_api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(EmailError::Api(format!(
                "SendGrid returned {}: {}",
                status, text
            )));
        }

        Ok(())
    }

    /// Renders a marketing template for a recipient.
    pub fn render_marketing(
        &self,
        email_type: MarketingEmailType,
        display_name: Option<&str>,
    ) -> (String, String) {
        let name = display_name.unwrap_or("there");
        let subject = email_type.subject().to_string();
        let body = match email_type {
            MarketingEmailType::Announcement => format!(
                "Hi {name},\n\nWe have news for you: gift registries now support \
                 multiple wedding lists and per-gift quantities. Log in to take a look.\n\n\
                 The {sender} team",
                name = name,
                sender = self.config.sender_name
            ),
            MarketingEmailType::FeatureHighlight => format!(
                "Hi {name},\n\nDid you know guests can now RSVP with a secret code? \
                 Share the code from your invitee list and watch the confirmations roll in.\n\n\
                 The {sender} team",
                name = name,
                sender = self.config.sender_name
            ),
            MarketingEmailType::SeasonalPromo => format!(
                "Hi {name},\n\nWedding season is here. Freshen up your registry so \
                 your guests always find something they love.\n\n\
                 The {sender} team",
                name = name,
                sender = self.config.sender_name
            ),
            MarketingEmailType::Reengagement => format!(
                "Hi {name},\n\nIt has been a while since you updated your registry. \
                 Your guests are waiting; add a gift or two today.\n\n\
                 The {sender} team",
                name = name,
                sender = self.config.sender_name
            ),
            MarketingEmailType::InactiveWarning => format!(
                "Hi {name},\n\nYour registry has been inactive for a long time and is \
                 scheduled to be archived. Log in within 30 days to keep it.\n\n\
                 The {sender} team",
                name = name,
                sender = self.config.sender_name
            ),
        };
        (subject, body)
    }

    /// Sends a marketing template to one recipient.
    pub async fn send_marketing(
        &self,
        to: &str,
        display_name: Option<&str>,
        email_type: MarketingEmailType,
    ) -> Result<(), EmailError> {
        let (subject, body) = self.render_marketing(email_type, display_name);
        self.send(to, &subject, &body).await
    }

    /// Sends the post-capture purchase confirmation to the guest.
    pub async fn send_purchase_confirmation(
        &self,
        to: &str,
        guest_name: Option<&str>,
        amount: Decimal,
        currency: &str,
        item_names: &[String],
    ) -> Result<(), EmailError> {
        let name = guest_name.unwrap_or("there");
        let items = if item_names.is_empty() {
            "your selected gifts".to_string()
        } else {
            item_names.join(", ")
        };
        let subject = "Thank you for your gift".to_string();
        let body = format!(
            "Hi {name},\n\nYour payment of {amount} {currency} for {items} was received. \
             The couple has been notified.\n\n\
             The {sender} team",
            name = name,
            amount = amount,
            currency = currency,
            items = items,
            sender = self.config.sender_name
        );
        self.send(to, &subject, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> EmailService {
        EmailService::new(EmailConfig {
            enabled: false,
            provider: "console".to_string(),
            sendgrid_api_key: String::new(),
            sender_email: "test@example.com".to_string(),
            sender_name: "Gift Registry".to_string(),
        })
    }

    #[tokio::test]
    async fn test_disabled_send_succeeds() {
        let result = service().send("guest@example.com", "Hello", "Body").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_console_send_succeeds() {
        let mut svc = service();
        svc.config.enabled = true;
        let result = svc.send("guest@example.com", "Hello", "Body").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_provider_errors() {
        let mut svc = service();
        svc.config.enabled = true;
        svc.config.provider = "pigeon".to_string();
        let result = svc.send("guest@example.com", "Hello", "Body").await;
        assert!(matches!(result, Err(EmailError::UnknownProvider(_))));
    }

    #[test]
    fn test_render_marketing_uses_display_name() {
        let svc = service();
        let (subject, body) = svc.render_marketing(
            MarketingEmailType::Reengagement,
            Some("Anna"),
        );
        assert_eq!(subject, MarketingEmailType::Reengagement.subject());
        assert!(body.contains("Hi Anna"));
    }

    #[test]
    fn test_render_marketing_falls_back_without_name() {
        let svc = service();
        let (_, body) = svc.render_marketing(MarketingEmailType::Announcement, None);
        assert!(body.contains("Hi there"));
    }

    #[test]
    fn test_every_template_renders() {
        let svc = service();
        for ty in [
            MarketingEmailType::Announcement,
            MarketingEmailType::FeatureHighlight,
            MarketingEmailType::SeasonalPromo,
            MarketingEmailType::Reengagement,
            MarketingEmailType::InactiveWarning,
        ] {
            let (subject, body) = svc.render_marketing(ty, Some("Anna"));
            assert!(!subject.is_empty());
            assert!(!body.is_empty());
        }
    }
}
