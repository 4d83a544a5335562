use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{PipelineError, StoreError};
use crate::logic::NameLookup;
use crate::model::{parse_path_id, positive_param, Id};

/// Shared handler state: the store and the name lookup client.
pub struct AppState<S> {
    pub store: Arc<S>,
    pub lookup: Arc<dyn NameLookup>,
}

impl<S> AppState<S> {
    pub fn new(store: Arc<S>, lookup: Arc<dyn NameLookup>) -> Self {
        Self { store, lookup }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            lookup: self.lookup.clone(),
        }
    }
}

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn bad_request(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}

pub fn store_error(err: StoreError) -> ApiError {
    let status = match &err {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::ConstraintViolation(_) | StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        log::error!("Store failure: {}", err);
    } else {
        log::warn!("{}", err);
    }
    (status, Json(ErrorResponse::new(&err.to_string())))
}

pub fn pipeline_error(err: PipelineError) -> ApiError {
    match err {
        PipelineError::MissingName => bad_request("name is required"),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(&other.to_string())),
        ),
    }
}

pub fn json_rejection(rejection: JsonRejection) -> ApiError {
    log::warn!("Failed to bind JSON: {}", rejection.body_text());
    bad_request(&format!("Invalid request: {}", rejection.body_text()))
}

pub fn path_id(raw: &str) -> Result<Id, ApiError> {
    parse_path_id(raw).map_err(|message| {
        log::warn!("Invalid ID format: {}", raw);
        bad_request(&message)
    })
}

/// Query parameters as raw strings; malformed numbers are ignored rather
/// than rejected.
pub type RawQuery = HashMap<String, String>;

pub fn query_int(params: &RawQuery, keys: &[&str]) -> Option<i64> {
    keys.iter()
        .find_map(|key| positive_param(params.get(*key).map(String::as_str)))
}

pub fn query_text(params: &RawQuery, key: &str) -> Option<String> {
    params
        .get(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        assert_eq!(store_error(StoreError::not_found("gender", 3)).0, StatusCode::NOT_FOUND);
        let (status, Json(body)) = store_error(StoreError::ConstraintViolation("gender 'male' already exists".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "constraint violation: gender 'male' already exists");
        assert_eq!(
            store_error(StoreError::Database(sqlx::Error::PoolTimedOut)).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn query_ints_fall_back_across_aliases() {
        let mut params = RawQuery::new();
        params.insert("Page".to_string(), "3".to_string());
        params.insert("limit".to_string(), "abc".to_string());
        assert_eq!(query_int(&params, &["page", "Page"]), Some(3));
        assert_eq!(query_int(&params, &["limit", "Limit"]), None);
        assert_eq!(query_text(&params, "name"), None);
    }
}
