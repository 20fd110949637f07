//! Request-level tests for the API router, backed by an in-memory store and
//! a canned CEP resolver.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use cadastro_core::{
  cep::{CepInfo, CepResolver, ResolveError, normalize_cep},
  uf::FederativeUnit,
};
use cadastro_store_sqlite::SqliteStore;
use chrono::{Months, Utc};
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{AppState, api_router};

// ─── Harness ─────────────────────────────────────────────────────────────────

/// Resolves a handful of fixed CEPs without any network.
struct StubResolver;

impl CepResolver for StubResolver {
  async fn resolve(&self, cep: &str) -> Result<CepInfo, ResolveError> {
    let cep = normalize_cep(cep)?;
    let uf = match cep.as_str() {
      "80010000" => FederativeUnit::PR,
      "35604000" => FederativeUnit::MG,
      "01001000" => FederativeUnit::SP,
      _ => return Err(ResolveError::NotFound(cep)),
    };
    Ok(CepInfo {
      cep,
      street: None,
      district: None,
      city: None,
      uf,
    })
  }
}

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  api_router(AppState {
    store: Arc::new(store),
    cep:   Arc::new(StubResolver),
  })
}

async fn send(
  app: &Router,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let request = match body {
    Some(v) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(v.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let response = app.clone().oneshot(request).await.unwrap();
  let status = response.status();
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

/// A birthdate ten years back — underage under any truncation.
fn minor_birthdate() -> String {
  (Utc::now().date_naive() - Months::new(120)).to_string()
}

fn adult_supplier(cpf: &str, name: &str) -> Value {
  json!({
    "name": name,
    "kind": "individual",
    "cpf_cnpj": cpf,
    "rg": format!("rg-{name}"),
    "birthdate": "1990-04-12",
    "cep": "01001-000",
  })
}

fn minor_supplier(cpf: &str, name: &str) -> Value {
  json!({
    "name": name,
    "kind": "individual",
    "cpf_cnpj": cpf,
    "rg": format!("rg-{name}"),
    "birthdate": minor_birthdate(),
    "cep": "01001-000",
  })
}

// ─── Companies ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_company_derives_uf_from_cep() {
  let app = app().await;

  let (status, body) = send(
    &app,
    "POST",
    "/companies",
    Some(json!({
      "name": "Acme Ltda",
      "cnpj": "11.222.333/0001-81",
      "cep": "35604-000",
    })),
  )
  .await;

  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["cnpj"], "11222333000181");
  assert_eq!(body["cep"], "35604000");
  assert_eq!(body["uf"], "MG");
  assert_eq!(body["suppliers"], json!([]));
}

#[tokio::test]
async fn create_company_rejects_bad_checksum() {
  let app = app().await;

  let (status, body) = send(
    &app,
    "POST",
    "/companies",
    Some(json!({
      "name": "Acme Ltda",
      "cnpj": "11222333000180",
      "cep": "35604-000",
    })),
  )
  .await;

  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("CNPJ"));
}

#[tokio::test]
async fn create_company_rejects_a_cpf_document() {
  let app = app().await;

  let (status, body) = send(
    &app,
    "POST",
    "/companies",
    Some(json!({
      "name": "Acme Ltda",
      "cnpj": "52998224725",
      "cep": "35604-000",
    })),
  )
  .await;

  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("CNPJ"));
}

#[tokio::test]
async fn create_company_rejects_duplicate_cnpj() {
  let app = app().await;
  let payload = json!({
    "name": "Acme Ltda",
    "cnpj": "11222333000181",
    "cep": "35604-000",
  });

  let (status, _) = send(&app, "POST", "/companies", Some(payload.clone())).await;
  assert_eq!(status, StatusCode::CREATED);

  let mut again = payload;
  again["name"] = json!("Acme Filial");
  let (status, body) = send(&app, "POST", "/companies", Some(again)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn create_company_rejects_unknown_cep() {
  let app = app().await;

  let (status, body) = send(
    &app,
    "POST",
    "/companies",
    Some(json!({
      "name": "Acme Ltda",
      "cnpj": "11222333000181",
      "cep": "99999-999",
    })),
  )
  .await;

  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("CEP not found"));
}

#[tokio::test]
async fn pr_company_rejects_underage_supplier_on_create() {
  let app = app().await;

  let (status, minor) = send(
    &app,
    "POST",
    "/suppliers",
    Some(minor_supplier("52998224725", "minor")),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let minor_id = minor["id"].as_str().unwrap().to_owned();

  // PR company: the association must be refused atomically.
  let (status, body) = send(
    &app,
    "POST",
    "/companies",
    Some(json!({
      "name": "Paranaense SA",
      "cnpj": "11222333000181",
      "cep": "80010-000",
      "supplier_ids": [minor_id],
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let error = body["error"].as_str().unwrap();
  assert!(error.contains("underage"));
  assert!(error.contains("minor"));

  // Same candidate set is fine outside PR.
  let (status, _) = send(
    &app,
    "POST",
    "/companies",
    Some(json!({
      "name": "Mineira SA",
      "cnpj": "53162442000109",
      "cep": "35604-000",
      "supplier_ids": [minor["id"]],
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn update_gate_follows_the_persisted_uf() {
  let app = app().await;

  let (_, company) = send(
    &app,
    "POST",
    "/companies",
    Some(json!({
      "name": "Paranaense SA",
      "cnpj": "11222333000181",
      "cep": "80010-000",
    })),
  )
  .await;
  let company_id = company["id"].as_str().unwrap().to_owned();

  let (_, minor) = send(
    &app,
    "POST",
    "/suppliers",
    Some(minor_supplier("11144477735", "minor")),
  )
  .await;
  let minor_id = minor["id"].as_str().unwrap().to_owned();

  // PR company cannot take the minor…
  let (status, _) = send(
    &app,
    "PUT",
    &format!("/companies/{company_id}"),
    Some(json!({ "supplier_ids": [minor_id] })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  // …until it moves out of PR.
  let (status, moved) = send(
    &app,
    "PUT",
    &format!("/companies/{company_id}"),
    Some(json!({ "cep": "35604-000" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(moved["uf"], "MG");

  let (status, updated) = send(
    &app,
    "PUT",
    &format!("/companies/{company_id}"),
    Some(json!({ "supplier_ids": [minor_id] })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["suppliers"][0]["name"], "minor");
}

#[tokio::test]
async fn get_missing_company_is_404() {
  let app = app().await;
  let (status, _) = send(
    &app,
    "GET",
    "/companies/00000000-0000-0000-0000-000000000000",
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_company_then_404() {
  let app = app().await;

  let (_, company) = send(
    &app,
    "POST",
    "/companies",
    Some(json!({
      "name": "Acme Ltda",
      "cnpj": "11222333000181",
      "cep": "35604-000",
    })),
  )
  .await;
  let id = company["id"].as_str().unwrap().to_owned();

  let (status, _) = send(&app, "DELETE", &format!("/companies/{id}"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) = send(&app, "GET", &format!("/companies/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = send(&app, "DELETE", &format!("/companies/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_companies_paginates() {
  let app = app().await;
  for (name, cnpj) in
    [("Acme Ltda", "11222333000181"), ("Borealis SA", "53162442000109")]
  {
    let (status, _) = send(
      &app,
      "POST",
      "/companies",
      Some(json!({ "name": name, "cnpj": cnpj, "cep": "35604-000" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
  }

  let (status, body) = send(&app, "GET", "/companies?size=1", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["items"].as_array().unwrap().len(), 1);
  assert_eq!(body["total"], 2);

  let (status, body) = send(
    &app,
    "GET",
    "/companies/search?query=borealis&field=name",
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["items"][0]["name"], "Borealis SA");
  assert_eq!(body["total"], 1);
}

// ─── Suppliers ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn supplier_create_is_gated_by_each_linked_company() {
  let app = app().await;

  let (_, company) = send(
    &app,
    "POST",
    "/companies",
    Some(json!({
      "name": "Paranaense SA",
      "cnpj": "11222333000181",
      "cep": "80010-000",
    })),
  )
  .await;
  let company_id = company["id"].as_str().unwrap().to_owned();

  // A minor individual cannot attach itself to the PR company.
  let mut minor = minor_supplier("52998224725", "minor");
  minor["company_ids"] = json!([company_id]);
  let (status, body) = send(&app, "POST", "/suppliers", Some(minor)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("underage"));

  // An organization attaches regardless of any age-like data.
  let (status, org) = send(
    &app,
    "POST",
    "/suppliers",
    Some(json!({
      "name": "Fornecedora SA",
      "kind": "organization",
      "cpf_cnpj": "53.162.442/0001-09",
      "cep": "80010-000",
      "company_ids": [company_id],
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(org["companies"][0]["name"], "Paranaense SA");

  // An adult individual attaches too.
  let mut adult = adult_supplier("11144477735", "adult");
  adult["company_ids"] = json!([company_id]);
  let (status, _) = send(&app, "POST", "/suppliers", Some(adult)).await;
  assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn individual_supplier_requires_rg_and_birthdate() {
  let app = app().await;

  let (status, body) = send(
    &app,
    "POST",
    "/suppliers",
    Some(json!({
      "name": "incomplete",
      "kind": "individual",
      "cpf_cnpj": "52998224725",
      "cep": "01001-000",
    })),
  )
  .await;

  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("birthdate"));
}

#[tokio::test]
async fn supplier_kind_must_agree_with_document_form() {
  let app = app().await;

  let (status, _) = send(
    &app,
    "POST",
    "/suppliers",
    Some(json!({
      "name": "mismatched",
      "kind": "individual",
      "cpf_cnpj": "11222333000181",
      "rg": "123",
      "birthdate": "1990-04-12",
      "cep": "01001-000",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send(
    &app,
    "POST",
    "/suppliers",
    Some(json!({
      "name": "mismatched-org",
      "kind": "organization",
      "cpf_cnpj": "52998224725",
      "cep": "01001-000",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn supplier_update_revalidates_age_against_linked_pr_company() {
  let app = app().await;

  let (_, company) = send(
    &app,
    "POST",
    "/companies",
    Some(json!({
      "name": "Paranaense SA",
      "cnpj": "11222333000181",
      "cep": "80010-000",
    })),
  )
  .await;
  let company_id = company["id"].as_str().unwrap().to_owned();

  let (_, adult) = send(
    &app,
    "POST",
    "/suppliers",
    Some(adult_supplier("52998224725", "adult")),
  )
  .await;
  let adult_id = adult["id"].as_str().unwrap().to_owned();

  // Linking the adult is fine…
  let (status, _) = send(
    &app,
    "PUT",
    &format!("/suppliers/{adult_id}"),
    Some(json!({ "company_ids": [company_id] })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  // …but a birthdate change that makes them a minor is caught by the gate
  // when the link is re-asserted.
  let (status, body) = send(
    &app,
    "PUT",
    &format!("/suppliers/{adult_id}"),
    Some(json!({
      "birthdate": minor_birthdate(),
      "company_ids": [company_id],
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("underage"));
}

// ─── CEP proxy ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn cep_lookup_round_trips() {
  let app = app().await;

  let (status, body) = send(&app, "GET", "/cep/80010-000", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["cep"], "80010000");
  assert_eq!(body["uf"], "PR");

  let (status, _) = send(&app, "GET", "/cep/99999999", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send(&app, "GET", "/cep/123", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}
