//! Supplier — an individual (PF) or organization (PJ) that companies buy
//! from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::uf::FederativeUnit;

/// Whether a supplier is a natural person or a legal entity. Decides which
/// document form applies and whether the age rule can bite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplierKind {
  Individual,
  Organization,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
  pub id:        Uuid,
  pub name:      String,
  pub kind:      SupplierKind,
  /// Canonical digit string — CPF for individuals, CNPJ for organizations.
  pub cpf_cnpj:  String,
  /// Identity-card number; required for individuals.
  pub rg:        Option<String>,
  /// Required for individuals; feeds the PR age rule.
  pub birthdate: Option<NaiveDate>,
  pub email:     Option<String>,
  /// The 8-digit postal code the UF was derived from.
  pub cep:       String,
  pub uf:        FederativeUnit,
}

/// Partial update; `None` fields are left untouched.
///
/// A new CEP always arrives together with its freshly resolved UF. A provided
/// company id set *replaces* the current association.
#[derive(Debug, Clone, Default)]
pub struct SupplierPatch {
  pub name:        Option<String>,
  pub rg:          Option<String>,
  pub birthdate:   Option<NaiveDate>,
  pub email:       Option<String>,
  pub cep_uf:      Option<(String, FederativeUnit)>,
  pub company_ids: Option<Vec<Uuid>>,
}
