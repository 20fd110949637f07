//! Handlers for `/suppliers` endpoints.
//!
//! The age rule is symmetric: linking an underage individual to a PR company
//! is rejected no matter which side of the association initiates it, so the
//! create/update paths here gate the candidate against every linked
//! company's own UF.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use cadastro_core::{
  cep::CepResolver,
  document::{Document, validate_document},
  rule::check_supplier_link,
  store::{Page, RegistryStore, SearchQuery},
  supplier::{Supplier, SupplierKind, SupplierPatch},
  uf::FederativeUnit,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  AppState, companies::CompanySummary, error::ApiError,
  pagination::{PageParams, SearchParams}, today,
};

// ─── DTOs ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateSupplierBody {
  pub name:        String,
  pub kind:        SupplierKind,
  pub cpf_cnpj:    String,
  pub rg:          Option<String>,
  pub birthdate:   Option<NaiveDate>,
  pub email:       Option<String>,
  pub cep:         String,
  #[serde(default)]
  pub company_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSupplierBody {
  pub name:        Option<String>,
  pub rg:          Option<String>,
  pub birthdate:   Option<NaiveDate>,
  pub email:       Option<String>,
  pub cep:         Option<String>,
  pub company_ids: Option<Vec<Uuid>>,
}

/// The list/search projection — associations as bare ids.
#[derive(Debug, Serialize)]
pub struct SupplierResponse {
  pub id:          Uuid,
  pub name:        String,
  pub kind:        SupplierKind,
  pub cpf_cnpj:    String,
  pub rg:          Option<String>,
  pub birthdate:   Option<NaiveDate>,
  pub email:       Option<String>,
  pub cep:         String,
  pub uf:          FederativeUnit,
  pub company_ids: Vec<Uuid>,
}

/// The single-entity projection — associations embedded as summaries.
#[derive(Debug, Serialize)]
pub struct SupplierDetails {
  pub id:        Uuid,
  pub name:      String,
  pub kind:      SupplierKind,
  pub cpf_cnpj:  String,
  pub rg:        Option<String>,
  pub birthdate: Option<NaiveDate>,
  pub email:     Option<String>,
  pub cep:       String,
  pub uf:        FederativeUnit,
  pub companies: Vec<CompanySummary>,
}

/// The projection embedded in company details.
#[derive(Debug, Serialize)]
pub struct SupplierSummary {
  pub name:      String,
  pub kind:      SupplierKind,
  pub cpf_cnpj:  String,
  pub rg:        Option<String>,
  pub birthdate: Option<NaiveDate>,
  pub email:     Option<String>,
  pub cep:       String,
  pub uf:        FederativeUnit,
}

impl From<Supplier> for SupplierSummary {
  fn from(s: Supplier) -> Self {
    Self {
      name:      s.name,
      kind:      s.kind,
      cpf_cnpj:  s.cpf_cnpj,
      rg:        s.rg,
      birthdate: s.birthdate,
      email:     s.email,
      cep:       s.cep,
      uf:        s.uf,
    }
  }
}

// ─── Projection helpers ──────────────────────────────────────────────────────

async fn to_response<S>(
  store: &S,
  supplier: Supplier,
) -> Result<SupplierResponse, ApiError>
where
  S: RegistryStore,
{
  let company_ids = store
    .supplier_company_ids(supplier.id)
    .await
    .map_err(ApiError::store)?;
  Ok(SupplierResponse {
    id: supplier.id,
    name: supplier.name,
    kind: supplier.kind,
    cpf_cnpj: supplier.cpf_cnpj,
    rg: supplier.rg,
    birthdate: supplier.birthdate,
    email: supplier.email,
    cep: supplier.cep,
    uf: supplier.uf,
    company_ids,
  })
}

async fn to_details<S>(
  store: &S,
  supplier: Supplier,
) -> Result<SupplierDetails, ApiError>
where
  S: RegistryStore,
{
  let companies = store
    .supplier_companies(supplier.id)
    .await
    .map_err(ApiError::store)?;
  Ok(SupplierDetails {
    id:        supplier.id,
    name:      supplier.name,
    kind:      supplier.kind,
    cpf_cnpj:  supplier.cpf_cnpj,
    rg:        supplier.rg,
    birthdate: supplier.birthdate,
    email:     supplier.email,
    cep:       supplier.cep,
    uf:        supplier.uf,
    companies: companies.into_iter().map(CompanySummary::from).collect(),
  })
}

async fn page_of_responses<S>(
  store: &S,
  page: Page<Supplier>,
) -> Result<Page<SupplierResponse>, ApiError>
where
  S: RegistryStore,
{
  let mut items = Vec::with_capacity(page.items.len());
  for supplier in page.items {
    items.push(to_response(store, supplier).await?);
  }
  Ok(Page {
    items,
    page: page.page,
    size: page.size,
    total: page.total,
  })
}

// ─── Field rules ─────────────────────────────────────────────────────────────

/// Individuals carry a CPF plus identity fields; organizations carry a CNPJ.
fn check_kind_rules(
  kind: SupplierKind,
  document: &Document,
  rg: &Option<String>,
  birthdate: &Option<NaiveDate>,
) -> Result<(), ApiError> {
  match (kind, document) {
    (SupplierKind::Individual, Document::Cnpj(_)) => {
      return Err(ApiError::BadRequest(
        "individual suppliers must use an 11-digit CPF".into(),
      ));
    }
    (SupplierKind::Organization, Document::Cpf(_)) => {
      return Err(ApiError::BadRequest(
        "organization suppliers must use a 14-digit CNPJ".into(),
      ));
    }
    _ => {}
  }

  if kind == SupplierKind::Individual && (rg.is_none() || birthdate.is_none())
  {
    return Err(ApiError::BadRequest(
      "individual suppliers must have both rg and birthdate".into(),
    ));
  }

  Ok(())
}

// ─── List & search ───────────────────────────────────────────────────────────

/// `GET /suppliers[?page=&size=]`
pub async fn list<S, C>(
  State(state): State<AppState<S, C>>,
  Query(params): Query<PageParams>,
) -> Result<Json<Page<SupplierResponse>>, ApiError>
where
  S: RegistryStore,
  C: CepResolver,
{
  let page = state
    .store
    .search_suppliers(&SearchQuery::default(), params.into())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(page_of_responses(state.store.as_ref(), page).await?))
}

/// `GET /suppliers/search[?query=...][&field=...][&page=&size=]`
pub async fn search<S, C>(
  State(state): State<AppState<S, C>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Page<SupplierResponse>>, ApiError>
where
  S: RegistryStore,
  C: CepResolver,
{
  let page = state
    .store
    .search_suppliers(&params.query(), params.page_request())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(page_of_responses(state.store.as_ref(), page).await?))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /suppliers/:id`
pub async fn get_one<S, C>(
  State(state): State<AppState<S, C>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SupplierDetails>, ApiError>
where
  S: RegistryStore,
  C: CepResolver,
{
  let supplier = state
    .store
    .get_supplier(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("supplier {id} not found")))?;
  Ok(Json(to_details(state.store.as_ref(), supplier).await?))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /suppliers`
pub async fn create<S, C>(
  State(state): State<AppState<S, C>>,
  Json(body): Json<CreateSupplierBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistryStore,
  C: CepResolver,
{
  let name = body.name.trim().to_owned();
  if name.is_empty() {
    return Err(ApiError::BadRequest("name is required".into()));
  }

  let document = validate_document(&body.cpf_cnpj)?;
  check_kind_rules(body.kind, &document, &body.rg, &body.birthdate)?;

  if state
    .store
    .supplier_exists_by_document(document.digits())
    .await
    .map_err(ApiError::store)?
  {
    return Err(ApiError::BadRequest(
      "a supplier with this CPF/CNPJ already exists".into(),
    ));
  }

  let info = state.cep.resolve(&body.cep).await?;

  let supplier = Supplier {
    id:        Uuid::new_v4(),
    name,
    kind:      body.kind,
    cpf_cnpj:  document.digits().to_owned(),
    rg:        body.rg,
    birthdate: body.birthdate,
    email:     body.email,
    cep:       info.cep,
    uf:        info.uf,
  };

  let companies = if body.company_ids.is_empty() {
    Vec::new()
  } else {
    state
      .store
      .companies_by_ids(&body.company_ids)
      .await
      .map_err(ApiError::store)?
  };
  for company in &companies {
    check_supplier_link(
      company.uf,
      std::slice::from_ref(&supplier),
      today(),
    )?;
  }

  state
    .store
    .create_supplier(
      supplier.clone(),
      companies.iter().map(|c| c.id).collect(),
    )
    .await
    .map_err(ApiError::store)?;

  let details = to_details(state.store.as_ref(), supplier).await?;
  Ok((StatusCode::CREATED, Json(details)))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /suppliers/:id` — only provided fields change. The gate sees the
/// supplier as it *will* be persisted, not as it currently is.
pub async fn update<S, C>(
  State(state): State<AppState<S, C>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateSupplierBody>,
) -> Result<Json<SupplierDetails>, ApiError>
where
  S: RegistryStore,
  C: CepResolver,
{
  let mut supplier = state
    .store
    .get_supplier(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("supplier {id} not found")))?;

  let mut patch = SupplierPatch::default();

  if let Some(name) = body.name {
    let name = name.trim().to_owned();
    if name.is_empty() {
      return Err(ApiError::BadRequest("name must not be blank".into()));
    }
    supplier.name = name.clone();
    patch.name = Some(name);
  }
  if let Some(rg) = body.rg {
    supplier.rg = Some(rg.clone());
    patch.rg = Some(rg);
  }
  if let Some(birthdate) = body.birthdate {
    supplier.birthdate = Some(birthdate);
    patch.birthdate = Some(birthdate);
  }
  if let Some(email) = body.email {
    supplier.email = Some(email.clone());
    patch.email = Some(email);
  }
  if let Some(cep) = &body.cep {
    let info = state.cep.resolve(cep).await?;
    supplier.cep = info.cep.clone();
    supplier.uf = info.uf;
    patch.cep_uf = Some((info.cep, info.uf));
  }

  if let Some(ids) = &body.company_ids
    && !ids.is_empty()
  {
    let companies = state
      .store
      .companies_by_ids(ids)
      .await
      .map_err(ApiError::store)?;
    for company in &companies {
      check_supplier_link(
        company.uf,
        std::slice::from_ref(&supplier),
        today(),
      )?;
    }
    patch.company_ids = Some(companies.iter().map(|c| c.id).collect());
  }

  let updated = state
    .store
    .update_supplier(id, patch)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(to_details(state.store.as_ref(), updated).await?))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /suppliers/:id`
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
    .get_supplier(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("supplier {id} not found")))?;

  state
    .store
    .delete_supplier(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
