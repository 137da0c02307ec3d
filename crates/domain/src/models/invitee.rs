//! Invitee (RSVP) domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// RSVP status of an invitee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InviteeStatus {
    Pending,
    Confirmed,
    Rejected,
}

impl std::fmt::Display for InviteeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InviteeStatus::Pending => write!(f, "PENDING"),
            InviteeStatus::Confirmed => write!(f, "CONFIRMED"),
            InviteeStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

impl std::str::FromStr for InviteeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(InviteeStatus::Pending),
            "CONFIRMED" => Ok(InviteeStatus::Confirmed),
            "REJECTED" => Ok(InviteeStatus::Rejected),
            other => Err(format!("Unknown invitee status: {}", other)),
        }
    }
}

lazy_static::lazy_static! {
    static ref SECRET_CODE_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Z0-9]{4}-[A-Z0-9]{4}$").unwrap();
}

/// Generate a random secret code in XXXX-XXXX format.
///
/// The alphabet omits 0/O and 1/I so codes survive being read over the phone.
pub fn generate_secret_code() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let chars: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

    let mut segment = || -> String {
        (0..4)
            .map(|_| {
                let idx = rng.gen_range(0..chars.len());
                chars[idx] as char
            })
            .collect()
    };

    format!("{}-{}", segment(), segment())
}

/// Whether a string looks like a secret code.
pub fn is_valid_secret_code(code: &str) -> bool {
    SECRET_CODE_REGEX.is_match(code)
}

/// Full invitee record for the couple's dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InviteeView {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub secret_code: String,
    pub status: InviteeStatus,
    pub tickets: i32,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Request to create one invitee. Also `Serialize`: rows appear as error
/// params when a bulk submission fails list-level validation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateInviteeRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: Option<String>,

    /// Tickets reserved for this invitee (default: 1).
    #[validate(range(min = 1, max = 20, message = "Tickets must be between 1 and 20"))]
    pub tickets: Option<i32>,
}

/// Request to update an invitee. All fields optional.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateInviteeRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: Option<String>,

    #[validate(range(min = 1, max = 20, message = "Tickets must be between 1 and 20"))]
    pub tickets: Option<i32>,

    pub status: Option<InviteeStatus>,
}

/// Bulk create request: up to 500 invitees at once.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct BulkCreateInviteesRequest {
    #[validate(length(min = 1, max = 500, message = "Provide 1-500 invitees"))]
    #[validate(nested)]
    pub invitees: Vec<CreateInviteeRequest>,
}

/// Per-row failure in a bulk create.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BulkInviteeError {
    /// 1-based position in the submitted list.
    pub row: usize,
    pub name: String,
    pub error: String,
}

/// Outcome of a bulk create.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BulkCreateInviteesResponse {
    pub created: Vec<InviteeView>,
    pub errors: Vec<BulkInviteeError>,
}

/// Bulk delete request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct BulkDeleteInviteesRequest {
    #[validate(length(min = 1, max = 500, message = "Provide 1-500 ids"))]
    pub ids: Vec<Uuid>,
}

/// Bulk status update request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct BulkUpdateInviteeStatusRequest {
    #[validate(length(min = 1, max = 500, message = "Provide 1-500 ids"))]
    pub ids: Vec<Uuid>,
    pub status: InviteeStatus,
}

/// Row-count response for bulk operations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BulkCountResponse {
    pub count: u64,
}

/// Public invitee info returned for a secret-code lookup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PublicInviteeInfo {
    pub name: String,
    pub status: InviteeStatus,
    pub tickets: i32,
}

/// Public RSVP response submitted against a secret code.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RsvpRequest {
    pub status: InviteeStatus,

    #[validate(range(min = 1, max = 20, message = "Tickets must be between 1 and 20"))]
    pub tickets: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_generate_secret_code_format() {
        let code = generate_secret_code();
        assert_eq!(code.len(), 9);
        assert_eq!(&code[4..5], "-");
        assert!(is_valid_secret_code(&code));

        for (i, c) in code.chars().enumerate() {
            if i == 4 {
                assert_eq!(c, '-');
            } else {
                assert!(c.is_ascii_uppercase() || c.is_ascii_digit());
                assert!(c != 'O' && c != 'I' && c != '0' && c != '1');
            }
        }
    }

    #[test]
    fn test_generate_secret_code_uniqueness() {
        let codes: Vec<String> = (0..100).map(|_| generate_secret_code()).collect();
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert!(unique.len() >= 99);
    }

    #[test]
    fn test_is_valid_secret_code() {
        assert!(is_valid_secret_code("AB2D-XY9Z"));
        assert!(!is_valid_secret_code("ab2d-xy9z"));
        assert!(!is_valid_secret_code("ABCD-EFG"));
        assert!(!is_valid_secret_code("ABCDEFGH"));
    }

    #[test]
    fn test_status_roundtrip() {
        for s in ["PENDING", "CONFIRMED", "REJECTED"] {
            assert_eq!(InviteeStatus::from_str(s).unwrap().to_string(), s);
        }
        assert!(InviteeStatus::from_str("MAYBE").is_err());
    }

    #[test]
    fn test_bulk_create_validates_rows() {
        let req = BulkCreateInviteesRequest {
            invitees: vec![CreateInviteeRequest {
                name: String::new(),
                email: None,
                phone: None,
                tickets: None,
            }],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_bulk_create_rejects_empty() {
        let req = BulkCreateInviteesRequest { invitees: vec![] };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_bulk_create_rejects_oversized_list() {
        let row = CreateInviteeRequest {
            name: "Guest".to_string(),
            email: None,
            phone: None,
            tickets: None,
        };
        let req = BulkCreateInviteesRequest {
            invitees: vec![row; 501],
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.errors().contains_key("invitees"));
    }
}
