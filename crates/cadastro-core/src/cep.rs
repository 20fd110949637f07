//! CEP normalization and the lookup-resolver seam.
//!
//! A company's or supplier's UF is never accepted from the client; it is
//! derived from the CEP through a [`CepResolver`] implementation
//! (`cadastro-viacep` in production, a canned resolver in tests).

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, uf::FederativeUnit};

/// Address data returned by a CEP lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CepInfo {
  /// The canonical 8-digit CEP.
  pub cep:      String,
  pub street:   Option<String>,
  pub district: Option<String>,
  pub city:     Option<String>,
  pub uf:       FederativeUnit,
}

/// Strip separators and require exactly 8 digits.
pub fn normalize_cep(raw: &str) -> Result<String> {
  if raw.trim().is_empty() {
    return Err(Error::CepMissing);
  }

  let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

  if digits.len() != 8 {
    return Err(Error::CepMalformed);
  }

  Ok(digits)
}

/// Failure modes of a CEP lookup, shaped for transport mapping: `Invalid`
/// and `NotFound` are the caller's fault, `Upstream` is the service's.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
  #[error(transparent)]
  Invalid(#[from] Error),

  #[error("CEP not found: {0}")]
  NotFound(String),

  #[error("CEP lookup service failure: {0}")]
  Upstream(String),
}

/// Abstraction over the postal-code lookup service.
pub trait CepResolver: Send + Sync {
  /// Resolve a raw CEP to address data. Implementations normalise the input
  /// and fail on malformed or unknown codes.
  fn resolve<'a>(
    &'a self,
    cep: &'a str,
  ) -> impl Future<Output = Result<CepInfo, ResolveError>> + Send + 'a;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_the_conventional_hyphen() {
    assert_eq!(normalize_cep("80010-000").unwrap(), "80010000");
    assert_eq!(normalize_cep("80010000").unwrap(), "80010000");
  }

  #[test]
  fn blank_is_missing() {
    assert!(matches!(normalize_cep(""), Err(Error::CepMissing)));
    assert!(matches!(normalize_cep("  "), Err(Error::CepMissing)));
  }

  #[test]
  fn wrong_digit_counts_are_malformed() {
    assert!(matches!(normalize_cep("8001000"), Err(Error::CepMalformed)));
    assert!(matches!(normalize_cep("800100001"), Err(Error::CepMalformed)));
    assert!(matches!(normalize_cep("abc"), Err(Error::CepMalformed)));
  }
}
