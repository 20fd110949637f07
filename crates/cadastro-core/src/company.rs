//! Company — a buyer registered under a CNPJ.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::uf::FederativeUnit;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
  pub id:   Uuid,
  pub name: String,
  /// Canonical 14-digit CNPJ.
  pub cnpj: String,
  /// The 8-digit postal code the UF was derived from.
  pub cep:  String,
  pub uf:   FederativeUnit,
}

/// Partial update; `None` fields are left untouched.
///
/// A new CEP always arrives together with its freshly resolved UF. A provided
/// supplier id set *replaces* the current association.
#[derive(Debug, Clone, Default)]
pub struct CompanyPatch {
  pub name:         Option<String>,
  pub cep_uf:       Option<(String, FederativeUnit)>,
  pub supplier_ids: Option<Vec<Uuid>>,
}
