//! ViaCEP client — resolves an 8-digit CEP to address data.
//!
//! <https://viacep.com.br> is a free public lookup with no authentication.
//! Implements [`CepResolver`] so the HTTP layer never depends on this crate
//! directly; tests substitute a canned resolver instead.

use std::time::Duration;

use serde::Deserialize;

use cadastro_core::cep::{CepInfo, CepResolver, ResolveError, normalize_cep};

pub const DEFAULT_BASE_URL: &str = "https://viacep.com.br/ws";

/// Async HTTP client for the ViaCEP lookup service.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ViaCepClient {
  http:     reqwest::Client,
  base_url: String,
}

impl ViaCepClient {
  /// Build a client against `base_url` (see [`DEFAULT_BASE_URL`]).
  pub fn new(base_url: impl Into<String>) -> Result<Self, ResolveError> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(10))
      .build()
      .map_err(|e| ResolveError::Upstream(e.to_string()))?;
    Ok(Self {
      http,
      base_url: base_url.into(),
    })
  }

  /// `GET {base}/{cep}/json` — `cep` must already be canonical.
  async fn fetch(&self, cep: &str) -> Result<CepInfo, ResolveError> {
    let url = format!("{}/{}/json", self.base_url.trim_end_matches('/'), cep);

    let response = self
      .http
      .get(&url)
      .send()
      .await
      .map_err(|e| ResolveError::Upstream(e.to_string()))?;

    // ViaCEP answers 400 for syntactically bad paths; anything non-2xx is
    // treated as the service's problem since we normalise beforehand.
    if !response.status().is_success() {
      return Err(ResolveError::Upstream(format!(
        "viacep returned status {}",
        response.status()
      )));
    }

    let payload: ViaCepPayload = response
      .json()
      .await
      .map_err(|e| ResolveError::Upstream(e.to_string()))?;

    payload.into_info(cep)
  }
}

impl CepResolver for ViaCepClient {
  async fn resolve(&self, cep: &str) -> Result<CepInfo, ResolveError> {
    let cep = normalize_cep(cep)?;
    tracing::debug!(%cep, "resolving CEP via viacep");
    self.fetch(&cep).await
  }
}

// ─── Wire format ─────────────────────────────────────────────────────────────

/// The ViaCEP JSON payload. An unknown-but-well-formed CEP comes back as
/// `{"erro": true}` with every address field absent.
#[derive(Debug, Deserialize)]
struct ViaCepPayload {
  #[serde(default)]
  erro:       bool,
  logradouro: Option<String>,
  bairro:     Option<String>,
  localidade: Option<String>,
  uf:         Option<String>,
}

impl ViaCepPayload {
  fn into_info(self, cep: &str) -> Result<CepInfo, ResolveError> {
    if self.erro {
      return Err(ResolveError::NotFound(cep.to_owned()));
    }

    let uf_code = self
      .uf
      .ok_or_else(|| ResolveError::NotFound(cep.to_owned()))?;
    let uf = uf_code
      .parse()
      .map_err(|e: cadastro_core::Error| ResolveError::Invalid(e))?;

    Ok(CepInfo {
      cep:      cep.to_owned(),
      street:   none_if_empty(self.logradouro),
      district: none_if_empty(self.bairro),
      city:     none_if_empty(self.localidade),
      uf,
    })
  }
}

fn none_if_empty(field: Option<String>) -> Option<String> {
  field.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
  use cadastro_core::uf::FederativeUnit;

  use super::*;

  #[test]
  fn decodes_a_hit() {
    let payload: ViaCepPayload = serde_json::from_str(
      r#"{
        "cep": "01001-000",
        "logradouro": "Praça da Sé",
        "complemento": "lado ímpar",
        "bairro": "Sé",
        "localidade": "São Paulo",
        "uf": "SP",
        "ddd": "11"
      }"#,
    )
    .unwrap();

    let info = payload.into_info("01001000").unwrap();
    assert_eq!(info.cep, "01001000");
    assert_eq!(info.street.as_deref(), Some("Praça da Sé"));
    assert_eq!(info.city.as_deref(), Some("São Paulo"));
    assert_eq!(info.uf, FederativeUnit::SP);
  }

  #[test]
  fn erro_marker_means_not_found() {
    let payload: ViaCepPayload =
      serde_json::from_str(r#"{"erro": true}"#).unwrap();

    assert!(matches!(
      payload.into_info("99999999"),
      Err(ResolveError::NotFound(cep)) if cep == "99999999"
    ));
  }

  #[test]
  fn missing_uf_means_not_found() {
    let payload: ViaCepPayload = serde_json::from_str(r#"{}"#).unwrap();
    assert!(matches!(
      payload.into_info("01001000"),
      Err(ResolveError::NotFound(_))
    ));
  }

  #[test]
  fn unknown_uf_is_invalid() {
    let payload: ViaCepPayload =
      serde_json::from_str(r#"{"uf": "ZZ"}"#).unwrap();
    assert!(matches!(
      payload.into_info("01001000"),
      Err(ResolveError::Invalid(_))
    ));
  }

  #[test]
  fn empty_address_fields_collapse_to_none() {
    let payload: ViaCepPayload = serde_json::from_str(
      r#"{"logradouro": "", "bairro": "", "localidade": "Curitiba", "uf": "PR"}"#,
    )
    .unwrap();

    let info = payload.into_info("80010000").unwrap();
    assert!(info.street.is_none());
    assert!(info.district.is_none());
    assert_eq!(info.city.as_deref(), Some("Curitiba"));
    assert_eq!(info.uf, FederativeUnit::PR);
  }
}
