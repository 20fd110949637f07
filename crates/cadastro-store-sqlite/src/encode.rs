//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Dates are stored as ISO 8601 (`YYYY-MM-DD`) strings, UUIDs as hyphenated
//! lowercase strings, and enums as their lowercase/two-letter text forms.

use cadastro_core::{
  company::Company,
  supplier::{Supplier, SupplierKind},
  uf::FederativeUnit,
};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String {
  id.hyphenated().to_string()
}

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Ok(Uuid::parse_str(s)?)
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String {
  d.format("%Y-%m-%d").to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── FederativeUnit ──────────────────────────────────────────────────────────

pub fn decode_uf(s: &str) -> Result<FederativeUnit> {
  Ok(s.parse::<FederativeUnit>()?)
}

// ─── SupplierKind ────────────────────────────────────────────────────────────

pub fn encode_supplier_kind(k: SupplierKind) -> &'static str {
  match k {
    SupplierKind::Individual => "individual",
    SupplierKind::Organization => "organization",
  }
}

pub fn decode_supplier_kind(s: &str) -> Result<SupplierKind> {
  match s {
    "individual" => Ok(SupplierKind::Individual),
    "organization" => Ok(SupplierKind::Organization),
    other => Err(Error::UnknownSupplierKind(other.to_owned())),
  }
}

// ─── Row carriers ────────────────────────────────────────────────────────────

/// A `companies` row as raw strings, decoded off the database thread.
pub struct RawCompany {
  pub company_id: String,
  pub name:       String,
  pub cnpj:       String,
  pub cep:        String,
  pub uf:         String,
}

impl RawCompany {
  pub fn into_company(self) -> Result<Company> {
    Ok(Company {
      id:   decode_uuid(&self.company_id)?,
      name: self.name,
      cnpj: self.cnpj,
      cep:  self.cep,
      uf:   decode_uf(&self.uf)?,
    })
  }
}

/// A `suppliers` row as raw strings, decoded off the database thread.
pub struct RawSupplier {
  pub supplier_id: String,
  pub name:        String,
  pub kind:        String,
  pub cpf_cnpj:    String,
  pub rg:          Option<String>,
  pub birthdate:   Option<String>,
  pub email:       Option<String>,
  pub cep:         String,
  pub uf:          String,
}

impl RawSupplier {
  pub fn into_supplier(self) -> Result<Supplier> {
    Ok(Supplier {
      id:        decode_uuid(&self.supplier_id)?,
      name:      self.name,
      kind:      decode_supplier_kind(&self.kind)?,
      cpf_cnpj:  self.cpf_cnpj,
      rg:        self.rg,
      birthdate: self.birthdate.as_deref().map(decode_date).transpose()?,
      email:     self.email,
      cep:       self.cep,
      uf:        decode_uf(&self.uf)?,
    })
  }
}
