//! Error types for `cadastro-core`.

use thiserror::Error;

use crate::supplier::Supplier;

#[derive(Debug, Error)]
pub enum Error {
  // ── CPF/CNPJ validation ───────────────────────────────────────────────

  #[error("CPF/CNPJ is required")]
  DocumentMissing,

  #[error("malformed CPF/CNPJ: expected 11 or 14 digits, got {digits}")]
  DocumentMalformed { digits: usize },

  /// Repeated-digit strings satisfy the checksum arithmetic by construction
  /// and must be rejected before it runs.
  #[error("CPF/CNPJ is a repeated-digit sequence")]
  DocumentRepeated,

  #[error("invalid CPF check digits")]
  CpfChecksum,

  #[error("invalid CNPJ check digits")]
  CnpjChecksum,

  // ── CEP ───────────────────────────────────────────────────────────────

  #[error("CEP is required")]
  CepMissing,

  #[error("CEP must contain exactly 8 digits")]
  CepMalformed,

  #[error("unknown federative unit: {0:?}")]
  UnknownUf(String),

  // ── Supplier linking ──────────────────────────────────────────────────

  /// The full offending set, so callers can report every supplier at once.
  #[error(
    "underage individual suppliers cannot be linked to a PR company: {}",
    supplier_names(.0)
  )]
  UnderageSuppliers(Vec<Supplier>),
}

fn supplier_names(suppliers: &[Supplier]) -> String {
  suppliers
    .iter()
    .map(|s| s.name.as_str())
    .collect::<Vec<_>>()
    .join(", ")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
