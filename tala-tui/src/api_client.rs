//! REST gateway to the forms backend.
//!
//! One request per call; no retry, no caching. Records are validated against
//! the form schema before create/update requests leave the client, so the
//! backend only ever sees declared fields.

use crate::config::TuiConfig;
use crate::session::SharedSession;
use std::time::Duration;
use tala_api::{
    ApiError, BatchSaveResponse, ListRecordsQuery, ListRecordsResponse, RefreshRequest,
    SaveManyRequest, TokenPair,
};
use tala_core::{
    check_record, check_unknown_fields, form_schema, CellError, FormKind, Page, Record,
    RecordFilter,
};

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Structured backend error, including 422 validation detail.
    #[error("{error}")]
    Api { status: u16, error: ApiError },
    /// Record rejected before the request left the gateway.
    #[error("Record failed validation: {}", summarize(.0))]
    InvalidRecord(Vec<CellError>),
    #[error("Record has no id; it has not been created yet")]
    MissingId,
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl ApiClientError {
    /// The 422-equivalent detail, from either side of the wire.
    pub fn validation_errors(&self) -> Option<&[CellError]> {
        match self {
            ApiClientError::Api { error, .. } if error.is_validation() => Some(&error.errors),
            ApiClientError::InvalidRecord(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ApiClientError::Api { error, .. } => Some(error),
            _ => None,
        }
    }
}

fn summarize(errors: &[CellError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Clone)]
pub struct FormsClient {
    client: reqwest::Client,
    base_url: String,
    session: SharedSession,
}

impl FormsClient {
    pub fn new(config: &TuiConfig, session: SharedSession) -> Result<Self, ApiClientError> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// `GET /forms/{sector}/{form}?page&limit&<filters>`
    pub async fn list(
        &self,
        form: FormKind,
        page: u64,
        limit: u64,
        filters: &RecordFilter,
    ) -> Result<Page, ApiClientError> {
        let url = self.form_url(form, None);
        let mut request = self
            .client
            .get(url)
            .query(&ListRecordsQuery { page, limit });
        if !filters.is_empty() {
            request = request.query(filters.as_pairs());
        }
        let response = request.headers(self.auth_headers()).send().await?;
        let body: ListRecordsResponse = self.parse_response(response).await?;
        tracing::debug!(form = form.slug(), page, limit, total = body.total, "list");
        Ok(Page {
            records: body.models,
            total: body.total,
            page,
            limit,
        })
    }

    /// `POST /forms/{sector}/{form}`
    pub async fn create(&self, form: FormKind, record: &Record) -> Result<Record, ApiClientError> {
        self.check_boundary(form, record, true)?;
        let url = self.form_url(form, None);
        let response = self
            .client
            .post(url)
            .headers(self.auth_headers())
            .json(record)
            .send()
            .await?;
        self.parse_response(response).await
    }

    /// `PUT /forms/{sector}/{form}/{id}` - full-row replace.
    pub async fn update(&self, form: FormKind, record: &Record) -> Result<Record, ApiClientError> {
        let id = record.id.as_deref().ok_or(ApiClientError::MissingId)?;
        // Updates keep backend-owned attributes, so only declared fields are
        // checked for conformance.
        self.check_boundary(form, record, false)?;
        let url = self.form_url(form, Some(id));
        let response = self
            .client
            .put(url)
            .headers(self.auth_headers())
            .json(record)
            .send()
            .await?;
        self.parse_response(response).await
    }

    /// `DELETE /forms/{sector}/{form}/{id}`
    pub async fn delete(&self, form: FormKind, id: &str) -> Result<(), ApiClientError> {
        let url = self.form_url(form, Some(id));
        let response = self
            .client
            .delete(url)
            .headers(self.auth_headers())
            .send()
            .await?;
        self.expect_success(response).await
    }

    /// `POST /forms/{sector}/{form}/batch` - single request for the whole batch.
    pub async fn save_many(
        &self,
        form: FormKind,
        records: Vec<Record>,
    ) -> Result<BatchSaveResponse, ApiClientError> {
        let url = format!("{}/batch", self.form_url(form, None));
        let body = SaveManyRequest { records };
        let response = self
            .client
            .post(url)
            .headers(self.auth_headers())
            .json(&body)
            .send()
            .await?;
        self.parse_response(response).await
    }

    /// `POST /auth/refresh` - no bearer header; the refresh token is the proof.
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair, ApiClientError> {
        let url = format!("{}/auth/refresh", self.base_url);
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let response = self.client.post(url).json(&body).send().await?;
        self.parse_response(response).await
    }

    fn form_url(&self, form: FormKind, id: Option<&str>) -> String {
        match id {
            Some(id) => format!(
                "{}/forms/{}/{}/{}",
                self.base_url,
                form.sector().slug(),
                form.slug(),
                id
            ),
            None => format!(
                "{}/forms/{}/{}",
                self.base_url,
                form.sector().slug(),
                form.slug()
            ),
        }
    }

    fn check_boundary(
        &self,
        form: FormKind,
        record: &Record,
        new_record: bool,
    ) -> Result<(), ApiClientError> {
        let schema = form_schema(form);
        let mut errors = check_record(schema, record);
        if new_record {
            errors.extend(check_unknown_fields(schema, record));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiClientError::InvalidRecord(errors))
        }
    }

    fn auth_headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();
        let token = self
            .session
            .read()
            .ok()
            .and_then(|session| session.access_token());
        if let Some(token) = token {
            let value = format!("Bearer {token}");
            if let Ok(value) = reqwest::header::HeaderValue::from_str(&value) {
                headers.insert(reqwest::header::AUTHORIZATION, value);
            }
        }
        headers
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            Err(self.translate_failure(status.as_u16(), response.text().await?))
        }
    }

    async fn expect_success(&self, response: reqwest::Response) -> Result<(), ApiClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.translate_failure(status.as_u16(), response.text().await?))
        }
    }

    fn translate_failure(&self, status: u16, body: String) -> ApiClientError {
        match serde_json::from_str::<ApiError>(&body) {
            Ok(error) => {
                tracing::warn!(status, code = %error.code, "backend error: {}", error.msg);
                ApiClientError::Api { status, error }
            }
            Err(_) => {
                tracing::warn!(status, "unstructured backend error");
                ApiClientError::InvalidResponse(format!("HTTP {status}: {body}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tala_api::ErrorCode;

    #[test]
    fn validation_errors_visible_from_both_sides() {
        let wire = ApiClientError::Api {
            status: 422,
            error: ApiError {
                code: ErrorCode::ValidationFailed,
                msg: "Validation failed".to_string(),
                errors: vec![CellError {
                    row: 0,
                    field: "area".to_string(),
                    message: "required".to_string(),
                }],
            },
        };
        assert_eq!(wire.validation_errors().map(<[CellError]>::len), Some(1));

        let local = ApiClientError::InvalidRecord(vec![CellError {
            row: 0,
            field: "calendar_year".to_string(),
            message: "required".to_string(),
        }]);
        assert_eq!(local.validation_errors().map(<[CellError]>::len), Some(1));

        let transport = ApiClientError::InvalidResponse("HTTP 500".to_string());
        assert!(transport.validation_errors().is_none());
    }
}
