//! Marketing email domain models.

use serde::de::{self, Deserializer, Unexpected};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Identifier for a prewritten marketing email template.
///
/// The wire format accepts either the numeric identifiers 1-4 or the string
/// `"inactive_warning"`, matching what existing admin tooling sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketingEmailType {
    Announcement,
    FeatureHighlight,
    SeasonalPromo,
    Reengagement,
    InactiveWarning,
}

impl MarketingEmailType {
    /// Numeric wire identifier, if the template has one.
    pub fn numeric_id(&self) -> Option<u8> {
        match self {
            MarketingEmailType::Announcement => Some(1),
            MarketingEmailType::FeatureHighlight => Some(2),
            MarketingEmailType::SeasonalPromo => Some(3),
            MarketingEmailType::Reengagement => Some(4),
            MarketingEmailType::InactiveWarning => None,
        }
    }

    pub fn from_numeric_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(MarketingEmailType::Announcement),
            2 => Some(MarketingEmailType::FeatureHighlight),
            3 => Some(MarketingEmailType::SeasonalPromo),
            4 => Some(MarketingEmailType::Reengagement),
            _ => None,
        }
    }

    /// Subject line for this template.
    pub fn subject(&self) -> &'static str {
        match self {
            MarketingEmailType::Announcement => "News from your gift registry",
            MarketingEmailType::FeatureHighlight => "Have you tried this yet?",
            MarketingEmailType::SeasonalPromo => "Make this season special",
            MarketingEmailType::Reengagement => "Your registry misses you",
            MarketingEmailType::InactiveWarning => "Your registry will be archived soon",
        }
    }
}

impl<'de> Deserialize<'de> for MarketingEmailType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Number(u64),
            Text(String),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Number(n) => u8::try_from(n)
                .ok()
                .and_then(MarketingEmailType::from_numeric_id)
                .ok_or_else(|| {
                    de::Error::invalid_value(
                        Unexpected::Unsigned(n),
                        &"a marketing email type between 1 and 4",
                    )
                }),
            Wire::Text(s) => match s.as_str() {
                "announcement" => Ok(MarketingEmailType::Announcement),
                "feature_highlight" => Ok(MarketingEmailType::FeatureHighlight),
                "seasonal_promo" => Ok(MarketingEmailType::SeasonalPromo),
                "reengagement" => Ok(MarketingEmailType::Reengagement),
                "inactive_warning" => Ok(MarketingEmailType::InactiveWarning),
                other => Err(de::Error::invalid_value(
                    Unexpected::Str(other),
                    &"a known marketing email type",
                )),
            },
        }
    }
}

/// Request to send a marketing email to selected users.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct SendMarketingEmailRequest {
    pub email_type: MarketingEmailType,

    #[validate(length(min = 1, max = 1000, message = "Provide 1-1000 user ids"))]
    pub user_ids: Vec<Uuid>,
}

/// Outcome of a marketing send: per-recipient success count plus failures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SendMarketingEmailResponse {
    pub sent: u32,
    pub failed: Vec<MarketingSendError>,
}

/// One recipient the send failed for.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MarketingSendError {
    pub user_id: Uuid,
    pub error: String,
}

/// Query for previewing a rendered marketing email.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PreviewEmailQuery {
    pub email_type: MarketingEmailType,
    pub user_id: Uuid,
}

/// Rendered email preview.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EmailPreview {
    pub to: String,
    pub subject: String,
    pub body_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_numeric_ids() {
        for (n, expected) in [
            (1, MarketingEmailType::Announcement),
            (2, MarketingEmailType::FeatureHighlight),
            (3, MarketingEmailType::SeasonalPromo),
            (4, MarketingEmailType::Reengagement),
        ] {
            let parsed: MarketingEmailType = serde_json::from_str(&n.to_string()).unwrap();
            assert_eq!(parsed, expected);
        }
    }

    #[test]
    fn test_deserialize_inactive_warning_string() {
        let parsed: MarketingEmailType = serde_json::from_str("\"inactive_warning\"").unwrap();
        assert_eq!(parsed, MarketingEmailType::InactiveWarning);
    }

    #[test]
    fn test_deserialize_rejects_unknown() {
        assert!(serde_json::from_str::<MarketingEmailType>("5").is_err());
        assert!(serde_json::from_str::<MarketingEmailType>("0").is_err());
        assert!(serde_json::from_str::<MarketingEmailType>("\"spam\"").is_err());
    }

    #[test]
    fn test_numeric_id_roundtrip() {
        for n in 1..=4u8 {
            let ty = MarketingEmailType::from_numeric_id(n).unwrap();
            assert_eq!(ty.numeric_id(), Some(n));
        }
        assert_eq!(MarketingEmailType::InactiveWarning.numeric_id(), None);
    }

    #[test]
    fn test_every_template_has_a_subject() {
        let all = [
            MarketingEmailType::Announcement,
            MarketingEmailType::FeatureHighlight,
            MarketingEmailType::SeasonalPromo,
            MarketingEmailType::Reengagement,
            MarketingEmailType::InactiveWarning,
        ];
        for ty in all {
            assert!(!ty.subject().is_empty());
        }
    }
}
