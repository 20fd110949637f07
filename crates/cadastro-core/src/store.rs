//! The `RegistryStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `cadastro-store-sqlite`). The HTTP layer depends on this abstraction, not
//! on any concrete backend.
//!
//! Creates take the fully-built entity (ids are caller-assigned v4 UUIDs)
//! plus the association id set, and must write both in one atomic unit — the
//! Paraná rule gate runs before the call and assumes a failed write leaves
//! no partial association behind.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  company::{Company, CompanyPatch},
  supplier::{Supplier, SupplierPatch},
};

// ─── Pagination ──────────────────────────────────────────────────────────────

/// A zero-based page request.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
  pub page: usize,
  pub size: usize,
}

impl PageRequest {
  pub const DEFAULT_SIZE: usize = 5;

  pub fn new(page: usize, size: usize) -> Self {
    Self {
      page,
      size: size.max(1),
    }
  }

  pub fn offset(&self) -> usize {
    self.page * self.size
  }
}

impl Default for PageRequest {
  fn default() -> Self {
    Self {
      page: 0,
      size: Self::DEFAULT_SIZE,
    }
  }
}

/// One page of results plus the total matching element count.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub page:  usize,
  pub size:  usize,
  pub total: u64,
}

impl<T> Page<T> {
  pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
    Page {
      items: self.items.into_iter().map(f).collect(),
      page:  self.page,
      size:  self.size,
      total: self.total,
    }
  }
}

// ─── Search ──────────────────────────────────────────────────────────────────

/// Which columns a search query matches against.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
  /// Name (case-insensitive) or document substring.
  #[default]
  General,
  Name,
  Document,
}

/// Parameters for the paginated entity searches. A `None` or blank `text`
/// lists everything.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
  pub text:  Option<String>,
  pub field: SearchField,
}

impl SearchQuery {
  /// The trimmed filter text, if there is one.
  pub fn filter(&self) -> Option<&str> {
    self
      .text
      .as_deref()
      .map(str::trim)
      .filter(|t| !t.is_empty())
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a registry storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RegistryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Companies ─────────────────────────────────────────────────────────

  /// Persist `company` and its association rows in one atomic write.
  /// `supplier_ids` must reference existing suppliers.
  fn create_company(
    &self,
    company: Company,
    supplier_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_company(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Company>, Self::Error>> + Send + '_;

  /// Paginated search ordered by name; a query with no filter lists all.
  fn search_companies<'a>(
    &'a self,
    query: &'a SearchQuery,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<Company>, Self::Error>> + Send + 'a;

  /// Apply `patch` atomically and return the updated row.
  fn update_company(
    &self,
    id: Uuid,
    patch: CompanyPatch,
  ) -> impl Future<Output = Result<Company, Self::Error>> + Send + '_;

  /// Delete the company and (via cascade) its association rows.
  fn delete_company(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn company_exists_by_cnpj<'a>(
    &'a self,
    cnpj: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Fetch the subset of `ids` that exist, in no particular order.
  fn companies_by_ids<'a>(
    &'a self,
    ids: &'a [Uuid],
  ) -> impl Future<Output = Result<Vec<Company>, Self::Error>> + Send + 'a;

  fn company_supplier_ids(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  fn company_suppliers(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<Supplier>, Self::Error>> + Send + '_;

  // ── Suppliers ─────────────────────────────────────────────────────────

  /// Persist `supplier` and its association rows in one atomic write.
  /// `company_ids` must reference existing companies.
  fn create_supplier(
    &self,
    supplier: Supplier,
    company_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_supplier(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Supplier>, Self::Error>> + Send + '_;

  /// Paginated search ordered by name; a query with no filter lists all.
  fn search_suppliers<'a>(
    &'a self,
    query: &'a SearchQuery,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<Supplier>, Self::Error>> + Send + 'a;

  /// Apply `patch` atomically and return the updated row.
  fn update_supplier(
    &self,
    id: Uuid,
    patch: SupplierPatch,
  ) -> impl Future<Output = Result<Supplier, Self::Error>> + Send + '_;

  /// Delete the supplier and (via cascade) its association rows.
  fn delete_supplier(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn supplier_exists_by_document<'a>(
    &'a self,
    cpf_cnpj: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Fetch the subset of `ids` that exist, in no particular order.
  fn suppliers_by_ids<'a>(
    &'a self,
    ids: &'a [Uuid],
  ) -> impl Future<Output = Result<Vec<Supplier>, Self::Error>> + Send + 'a;

  fn supplier_company_ids(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  fn supplier_companies(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<Company>, Self::Error>> + Send + '_;
}
