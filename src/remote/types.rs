//! Wire protocol types for the pronoun service.
//!
//! Field names on these types are the service's JSON schema; renames are
//! breaking changes. The service wraps application status inside a 200 HTTP
//! response, so status handling happens on the parsed body, not the HTTP
//! layer.

use serde::{Deserialize, Serialize};

/// Application status used when a publish response carries no `statusCode`.
pub const STATUS_UNKNOWN: u16 = 430;

/// Bulk lookup request body.
#[derive(Debug, Serialize)]
pub struct LookupRequest<'a> {
    /// The caller's own hashed id, for server-side rate limiting
    #[serde(rename = "senderUsername")]
    pub sender_username: &'a str,
    /// Hashed ids to resolve
    pub usernames: &'a [String],
}

/// One record in a lookup response or in the snapshot feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub pronoun: Option<String>,
}

/// Bulk lookup response body.
#[derive(Debug, Default, Deserialize)]
pub struct LookupResponse {
    #[serde(default)]
    pub body: Vec<LookupRecord>,
}

impl LookupResponse {
    /// Find the record matching a requested id. Linear scan with
    /// case-insensitive id comparison, per the service contract.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&LookupRecord> {
        self.body.iter().find(|r| r.id.eq_ignore_ascii_case(id))
    }
}

/// Publish request body.
#[derive(Debug, Serialize)]
pub struct PublishRequest<'a> {
    pub username: &'a str,
    pub pronoun: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apikey: Option<&'a str>,
}

/// Publish response body.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishResponse {
    #[serde(rename = "statusCode", default)]
    status_code: Option<u16>,
    /// Human-readable server message
    #[serde(default)]
    pub body: Option<String>,
    /// Freshly issued authorization token, when the service granted one
    #[serde(default)]
    pub apikey: Option<String>,
}

impl PublishResponse {
    #[must_use]
    pub fn with_status(status_code: u16) -> Self {
        Self {
            status_code: Some(status_code),
            body: None,
            apikey: None,
        }
    }

    #[must_use]
    pub fn with_message(status_code: u16, message: &str) -> Self {
        Self {
            status_code: Some(status_code),
            body: Some(message.to_string()),
            apikey: None,
        }
    }

    /// Application status; a missing field reads as [`STATUS_UNKNOWN`].
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status_code.unwrap_or(STATUS_UNKNOWN)
    }

    /// Server message, empty when absent.
    #[must_use]
    pub fn message(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }

    /// Classify the response for the write reconciler.
    #[must_use]
    pub fn disposition(&self) -> PublishDisposition {
        match self.status_code() {
            200 => PublishDisposition::Accepted,
            429 => PublishDisposition::RateLimited,
            _ => PublishDisposition::Rejected,
        }
    }
}

/// What a publish response means for the local write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishDisposition {
    /// Stored by the service; no rollback
    Accepted,
    /// Rate limited; roll back and retry later
    RateLimited,
    /// Invalid authorization or unknown error; roll back
    Rejected,
}

impl std::fmt::Display for PublishDisposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accepted => write!(f, "accepted"),
            Self::RateLimited => write!(f, "rate_limited"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_request_wire_shape() {
        let usernames = vec!["aa11".to_string(), "bb22".to_string()];
        let request = LookupRequest {
            sender_username: "me00",
            usernames: &usernames,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["senderUsername"], "me00");
        assert_eq!(json["usernames"][1], "bb22");
    }

    #[test]
    fn test_lookup_response_find_is_case_insensitive() {
        let response: LookupResponse = serde_json::from_str(
            r#"{"body": [{"id": "AB12cd", "pronoun": "She/Her"}]}"#,
        )
        .unwrap();
        let record = response.find("ab12CD").expect("match");
        assert_eq!(record.pronoun.as_deref(), Some("She/Her"));
        assert!(response.find("zz99").is_none());
    }

    #[test]
    fn test_lookup_response_tolerates_missing_body() {
        let response: LookupResponse = serde_json::from_str("{}").unwrap();
        assert!(response.body.is_empty());
    }

    #[test]
    fn test_publish_request_omits_absent_apikey() {
        let request = PublishRequest {
            username: "me00",
            pronoun: "They/Them",
            apikey: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("apikey"));

        let with_key = PublishRequest {
            apikey: Some("tok"),
            ..request
        };
        let json = serde_json::to_string(&with_key).unwrap();
        assert!(json.contains(r#""apikey":"tok""#));
    }

    #[test]
    fn test_publish_response_missing_status_reads_as_unknown() {
        let response: PublishResponse = serde_json::from_str(r#"{"body": "??"}"#).unwrap();
        assert_eq!(response.status_code(), STATUS_UNKNOWN);
        assert_eq!(response.disposition(), PublishDisposition::Rejected);
    }

    #[test]
    fn test_publish_response_dispositions() {
        assert_eq!(
            PublishResponse::with_status(200).disposition(),
            PublishDisposition::Accepted
        );
        assert_eq!(
            PublishResponse::with_status(429).disposition(),
            PublishDisposition::RateLimited
        );
        assert_eq!(
            PublishResponse::with_status(403).disposition(),
            PublishDisposition::Rejected
        );
        assert_eq!(
            PublishResponse::with_status(500).disposition(),
            PublishDisposition::Rejected
        );
    }

    #[test]
    fn test_publish_response_parses_apikey() {
        let response: PublishResponse =
            serde_json::from_str(r#"{"statusCode": 200, "body": "Stored!", "apikey": "k-123"}"#)
                .unwrap();
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.message(), "Stored!");
        assert_eq!(response.apikey.as_deref(), Some("k-123"));
    }

    #[test]
    fn test_disposition_display() {
        assert_eq!(PublishDisposition::Accepted.to_string(), "accepted");
        assert_eq!(PublishDisposition::RateLimited.to_string(), "rate_limited");
        assert_eq!(PublishDisposition::Rejected.to_string(), "rejected");
    }
}
