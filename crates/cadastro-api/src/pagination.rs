//! Query-string parameter types shared by the entity endpoints.

use cadastro_core::store::{PageRequest, SearchField, SearchQuery};
use serde::Deserialize;

/// `?page=&size=` — zero-based, defaulting to the first page of five.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
  pub page: Option<usize>,
  pub size: Option<usize>,
}

impl From<PageParams> for PageRequest {
  fn from(p: PageParams) -> Self {
    PageRequest::new(
      p.page.unwrap_or(0),
      p.size.unwrap_or(PageRequest::DEFAULT_SIZE),
    )
  }
}

/// `?query=&field=&page=&size=` — a blank or absent `query` lists all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
  pub query: Option<String>,
  #[serde(default)]
  pub field: SearchField,
  pub page:  Option<usize>,
  pub size:  Option<usize>,
}

impl SearchParams {
  pub fn query(&self) -> SearchQuery {
    SearchQuery {
      text:  self.query.clone(),
      field: self.field,
    }
  }

  pub fn page_request(&self) -> PageRequest {
    PageRequest::new(
      self.page.unwrap_or(0),
      self.size.unwrap_or(PageRequest::DEFAULT_SIZE),
    )
  }
}
