//! Wedding list domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::gift::GiftSummary;

lazy_static::lazy_static! {
    static ref SLUG_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

/// A couple's wedding list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct WeddingList {
    pub id: Uuid,
    pub couple_id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a wedding list.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateWeddingListRequest {
    #[validate(length(min = 1, max = 120, message = "Title must be 1-120 characters"))]
    pub title: String,

    /// URL-friendly identifier used for the public registry page.
    #[validate(regex(
        path = *SLUG_REGEX,
        message = "Slug must be lowercase letters, digits and dashes"
    ))]
    #[validate(length(min = 3, max = 64, message = "Slug must be 3-64 characters"))]
    pub slug: String,

    #[validate(length(max = 2000, message = "Description too long"))]
    pub description: Option<String>,

    pub event_date: Option<NaiveDate>,
}

/// Request to update a wedding list. All fields optional.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateWeddingListRequest {
    #[validate(length(min = 1, max = 120, message = "Title must be 1-120 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 2000, message = "Description too long"))]
    pub description: Option<String>,

    pub event_date: Option<NaiveDate>,
}

/// Public registry page: list info plus its gifts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PublicRegistry {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub gifts: Vec<GiftSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateWeddingListRequest {
        CreateWeddingListRequest {
            title: "Anna & Tom".to_string(),
            slug: "anna-and-tom".to_string(),
            description: None,
            event_date: None,
        }
    }

    #[test]
    fn test_create_request_valid() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_bad_slug() {
        let mut req = valid_request();
        req.slug = "Anna And Tom".to_string();
        assert!(req.validate().is_err());

        req.slug = "a".to_string();
        assert!(req.validate().is_err());

        req.slug = "-leading-dash".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_request_rejects_empty_title() {
        let mut req = valid_request();
        req.title = String::new();
        assert!(req.validate().is_err());
    }
}
