//! Request and response bodies.

use serde::{Deserialize, Serialize};
use tala_core::Record;

/// Pagination parameters for `GET /forms/{sector}/{form}`. Report filters are
/// appended as additional query parameters by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRecordsQuery {
    pub page: u64,
    pub limit: u64,
}

/// Response of `GET /forms/{sector}/{form}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRecordsResponse {
    /// One page of records.
    pub models: Vec<Record>,
    /// Full unpaginated result count for the current filter.
    pub total: u64,
}

/// Body of `POST /forms/{sector}/{form}/batch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveManyRequest {
    pub records: Vec<Record>,
}

/// Response of `POST /forms/{sector}/{form}/batch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSaveResponse {
    /// Number of records written.
    #[serde(default)]
    pub inserted: u64,
    /// Number of records the backend rejected.
    #[serde(default)]
    pub failed: u64,
}

// ============================================================================
// AUTH
// ============================================================================

/// Bearer/refresh token pair. Field names follow the backend's camelCase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Body of `POST /auth/refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tala_core::FieldValue;

    #[test]
    fn list_response_parses_backend_shape() {
        let json = r#"{"models":[{"_id":"a1","calendar_year":2024,"province":"Marinduque"}],"total":37}"#;
        let response: ListRecordsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.total, 37);
        assert_eq!(response.models.len(), 1);
        assert_eq!(
            response.models[0].get("calendar_year"),
            Some(&FieldValue::Number(2024.0))
        );
    }

    #[test]
    fn token_pair_uses_camel_case() {
        let pair = TokenPair {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
        };
        let json = serde_json::to_string(&pair).unwrap();
        assert_eq!(json, r#"{"accessToken":"a","refreshToken":"r"}"#);
    }

    #[test]
    fn save_many_wraps_records() {
        let request = SaveManyRequest {
            records: vec![Record::new().with("area", FieldValue::Number(1.5))],
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"records":[{"area":1.5}]}"#);
    }
}
