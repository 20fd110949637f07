//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use cadastro_core::cep::ResolveError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("CEP lookup failure: {0}")]
  Upstream(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a storage-backend error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

// Every core rule/validation failure is the client's fault.
impl From<cadastro_core::Error> for ApiError {
  fn from(e: cadastro_core::Error) -> Self {
    Self::BadRequest(e.to_string())
  }
}

impl From<ResolveError> for ApiError {
  fn from(e: ResolveError) -> Self {
    match e {
      ResolveError::Invalid(inner) => Self::BadRequest(inner.to_string()),
      ResolveError::NotFound(cep) => {
        Self::BadRequest(format!("CEP not found: {cep}"))
      }
      ResolveError::Upstream(msg) => Self::Upstream(msg),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Upstream(m) => (StatusCode::BAD_GATEWAY, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
