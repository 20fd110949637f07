//! JSON REST API for the cadastro registry.
//!
//! Exposes an axum [`Router`] backed by any [`RegistryStore`] and
//! [`CepResolver`]. TLS and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! axum::serve(listener, cadastro_api::api_router(state)).await?;
//! ```

pub mod cep;
pub mod companies;
pub mod error;
pub mod pagination;
pub mod suppliers;

use std::sync::Arc;

use axum::{Router, routing::get};
use cadastro_core::{cep::CepResolver, store::RegistryStore};
use chrono::{NaiveDate, Utc};

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S, C> {
  pub store: Arc<S>,
  pub cep:   Arc<C>,
}

// Manual impl — a derive would demand `S: Clone` and `C: Clone`.
impl<S, C> Clone for AppState<S, C> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      cep:   Arc::clone(&self.cep),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, C>(state: AppState<S, C>) -> Router<()>
where
  S: RegistryStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  C: CepResolver + 'static,
{
  Router::new()
    // Companies
    .route(
      "/companies",
      get(companies::list::<S, C>).post(companies::create::<S, C>),
    )
    .route("/companies/search", get(companies::search::<S, C>))
    .route(
      "/companies/{id}",
      get(companies::get_one::<S, C>)
        .put(companies::update::<S, C>)
        .delete(companies::delete::<S, C>),
    )
    // Suppliers
    .route(
      "/suppliers",
      get(suppliers::list::<S, C>).post(suppliers::create::<S, C>),
    )
    .route("/suppliers/search", get(suppliers::search::<S, C>))
    .route(
      "/suppliers/{id}",
      get(suppliers::get_one::<S, C>)
        .put(suppliers::update::<S, C>)
        .delete(suppliers::delete::<S, C>),
    )
    // CEP lookup proxy
    .route("/cep/{cep}", get(cep::lookup::<S, C>))
    .with_state(state)
}

/// The date the age rule is evaluated against.
pub(crate) fn today() -> NaiveDate {
  Utc::now().date_naive()
}

#[cfg(test)]
mod tests;
