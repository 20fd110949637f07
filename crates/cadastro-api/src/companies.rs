//! Handlers for `/companies` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/companies` | Paginated list |
//! | `GET`    | `/companies/search` | `?query=&field=general\|name\|document` |
//! | `GET`    | `/companies/:id` | Details with embedded supplier summaries |
//! | `POST`   | `/companies` | Validates CNPJ, resolves UF, runs the PR gate |
//! | `PUT`    | `/companies/:id` | Partial update; a supplier id set replaces |
//! | `DELETE` | `/companies/:id` | 204; association rows cascade |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use cadastro_core::{
  cep::CepResolver,
  company::{Company, CompanyPatch},
  document::{Document, validate_document},
  rule::check_supplier_link,
  store::{Page, RegistryStore, SearchQuery},
  uf::FederativeUnit,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  AppState, error::ApiError, pagination::{PageParams, SearchParams},
  suppliers::SupplierSummary, today,
};

// ─── DTOs ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateCompanyBody {
  pub name:         String,
  pub cnpj:         String,
  pub cep:          String,
  #[serde(default)]
  pub supplier_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCompanyBody {
  pub name:         Option<String>,
  pub cep:          Option<String>,
  pub supplier_ids: Option<Vec<Uuid>>,
}

/// The list/search projection — associations as bare ids.
#[derive(Debug, Serialize)]
pub struct CompanyResponse {
  pub id:           Uuid,
  pub name:         String,
  pub cnpj:         String,
  pub cep:          String,
  pub uf:           FederativeUnit,
  pub supplier_ids: Vec<Uuid>,
}

/// The single-entity projection — associations embedded as summaries.
#[derive(Debug, Serialize)]
pub struct CompanyDetails {
  pub id:        Uuid,
  pub name:      String,
  pub cnpj:      String,
  pub cep:       String,
  pub uf:        FederativeUnit,
  pub suppliers: Vec<SupplierSummary>,
}

/// The projection embedded in supplier details.
#[derive(Debug, Serialize)]
pub struct CompanySummary {
  pub name: String,
  pub cnpj: String,
  pub cep:  String,
  pub uf:   FederativeUnit,
}

impl From<Company> for CompanySummary {
  fn from(c: Company) -> Self {
    Self {
      name: c.name,
      cnpj: c.cnpj,
      cep:  c.cep,
      uf:   c.uf,
    }
  }
}

// ─── Projection helpers ──────────────────────────────────────────────────────

async fn to_response<S>(
  store: &S,
  company: Company,
) -> Result<CompanyResponse, ApiError>
where
  S: RegistryStore,
{
  let supplier_ids = store
    .company_supplier_ids(company.id)
    .await
    .map_err(ApiError::store)?;
  Ok(CompanyResponse {
    id: company.id,
    name: company.name,
    cnpj: company.cnpj,
    cep: company.cep,
    uf: company.uf,
    supplier_ids,
  })
}

async fn to_details<S>(
  store: &S,
  company: Company,
) -> Result<CompanyDetails, ApiError>
where
  S: RegistryStore,
{
  let suppliers = store
    .company_suppliers(company.id)
    .await
    .map_err(ApiError::store)?;
  Ok(CompanyDetails {
    id:        company.id,
    name:      company.name,
    cnpj:      company.cnpj,
    cep:       company.cep,
    uf:        company.uf,
    suppliers: suppliers.into_iter().map(SupplierSummary::from).collect(),
  })
}

async fn page_of_responses<S>(
  store: &S,
  page: Page<Company>,
) -> Result<Page<CompanyResponse>, ApiError>
where
  S: RegistryStore,
{
  let mut items = Vec::with_capacity(page.items.len());
  for company in page.items {
    items.push(to_response(store, company).await?);
  }
  Ok(Page {
    items,
    page: page.page,
    size: page.size,
    total: page.total,
  })
}

// ─── List & search ───────────────────────────────────────────────────────────

/// `GET /companies[?page=&size=]`
pub async fn list<S, C>(
  State(state): State<AppState<S, C>>,
  Query(params): Query<PageParams>,
) -> Result<Json<Page<CompanyResponse>>, ApiError>
where
  S: RegistryStore,
  C: CepResolver,
{
  let page = state
    .store
    .search_companies(&SearchQuery::default(), params.into())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(page_of_responses(state.store.as_ref(), page).await?))
}

/// `GET /companies/search[?query=...][&field=...][&page=&size=]`
pub async fn search<S, C>(
  State(state): State<AppState<S, C>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Page<CompanyResponse>>, ApiError>
where
  S: RegistryStore,
  C: CepResolver,
{
  let page = state
    .store
    .search_companies(&params.query(), params.page_request())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(page_of_responses(state.store.as_ref(), page).await?))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /companies/:id`
pub async fn get_one<S, C>(
  State(state): State<AppState<S, C>>,
  Path(id): Path<Uuid>,
) -> Result<Json<CompanyDetails>, ApiError>
where
  S: RegistryStore,
  C: CepResolver,
{
  let company = state
    .store
    .get_company(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("company {id} not found")))?;
  Ok(Json(to_details(state.store.as_ref(), company).await?))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /companies`
///
/// Validation order matters: document and duplicate checks fail before the
/// CEP lookup is attempted, and the PR gate runs before anything is written.
pub async fn create<S, C>(
  State(state): State<AppState<S, C>>,
  Json(body): Json<CreateCompanyBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistryStore,
  C: CepResolver,
{
  let name = body.name.trim().to_owned();
  if name.is_empty() {
    return Err(ApiError::BadRequest("name is required".into()));
  }

  let document = validate_document(&body.cnpj)?;
  let Document::Cnpj(cnpj) = document else {
    return Err(ApiError::BadRequest(
      "company document must be a 14-digit CNPJ".into(),
    ));
  };

  if state
    .store
    .company_exists_by_cnpj(&cnpj)
    .await
    .map_err(ApiError::store)?
  {
    return Err(ApiError::BadRequest(
      "a company with this CNPJ already exists".into(),
    ));
  }

  let info = state.cep.resolve(&body.cep).await?;

  let suppliers = if body.supplier_ids.is_empty() {
    Vec::new()
  } else {
    state
      .store
      .suppliers_by_ids(&body.supplier_ids)
      .await
      .map_err(ApiError::store)?
  };
  check_supplier_link(info.uf, &suppliers, today())?;

  let company = Company {
    id: Uuid::new_v4(),
    name,
    cnpj,
    cep: info.cep,
    uf: info.uf,
  };
  state
    .store
    .create_company(
      company.clone(),
      suppliers.iter().map(|s| s.id).collect(),
    )
    .await
    .map_err(ApiError::store)?;

  let details = to_details(state.store.as_ref(), company).await?;
  Ok((StatusCode::CREATED, Json(details)))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /companies/:id` — only provided fields change; a new CEP re-derives
/// the UF, and the gate re-runs against whichever UF will be persisted.
pub async fn update<S, C>(
  State(state): State<AppState<S, C>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateCompanyBody>,
) -> Result<Json<CompanyDetails>, ApiError>
where
  S: RegistryStore,
  C: CepResolver,
{
  let company = state
    .store
    .get_company(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("company {id} not found")))?;

  let mut patch = CompanyPatch::default();

  if let Some(name) = body.name {
    let name = name.trim().to_owned();
    if name.is_empty() {
      return Err(ApiError::BadRequest("name must not be blank".into()));
    }
    patch.name = Some(name);
  }

  let mut uf = company.uf;
  if let Some(cep) = &body.cep {
    let info = state.cep.resolve(cep).await?;
    uf = info.uf;
    patch.cep_uf = Some((info.cep, info.uf));
  }

  if let Some(ids) = &body.supplier_ids
    && !ids.is_empty()
  {
    let suppliers = state
      .store
      .suppliers_by_ids(ids)
      .await
      .map_err(ApiError::store)?;
    check_supplier_link(uf, &suppliers, today())?;
    patch.supplier_ids = Some(suppliers.iter().map(|s| s.id).collect());
  }

  let updated = state
    .store
    .update_company(id, patch)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(to_details(state.store.as_ref(), updated).await?))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /companies/:id`
pub async fn delete<S, C>(
  State(state): State<AppState<S, C>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RegistryStore,
  C: CepResolver,
{
  state
    .store
    .get_company(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("company {id} not found")))?;

  state
    .store
    .delete_company(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
