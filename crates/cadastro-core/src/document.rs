//! CPF/CNPJ validation.
//!
//! Both Brazilian taxpayer identifiers are protected by fixed mod-11
//! check-digit schemes. The weight tables and remainder mapping are national
//! standards and are reproduced here digit-exact; any deviation silently
//! accepts or rejects wrong documents.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A validated taxpayer identifier in canonical form (digits only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "digits", rename_all = "lowercase")]
pub enum Document {
  /// 11-digit personal identifier.
  Cpf(String),
  /// 14-digit company identifier.
  Cnpj(String),
}

impl Document {
  pub fn digits(&self) -> &str {
    match self {
      Self::Cpf(d) | Self::Cnpj(d) => d,
    }
  }

  pub fn is_cnpj(&self) -> bool {
    matches!(self, Self::Cnpj(_))
  }
}

impl fmt::Display for Document {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.digits())
  }
}

/// Validate a raw CPF/CNPJ string.
///
/// Separators (`.`, `-`, `/`, spaces) are stripped before classification;
/// the digit count then decides the branch: 11 → CPF, 14 → CNPJ, anything
/// else is malformed. Repeated-digit sequences are rejected up front.
pub fn validate_document(raw: &str) -> Result<Document> {
  if raw.trim().is_empty() {
    return Err(Error::DocumentMissing);
  }

  let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

  if all_same(&digits) {
    return Err(Error::DocumentRepeated);
  }

  match digits.len() {
    11 => {
      if valid_cpf(digits.as_bytes()) {
        Ok(Document::Cpf(digits))
      } else {
        Err(Error::CpfChecksum)
      }
    }
    14 => {
      if valid_cnpj(digits.as_bytes()) {
        Ok(Document::Cnpj(digits))
      } else {
        Err(Error::CnpjChecksum)
      }
    }
    n => Err(Error::DocumentMalformed { digits: n }),
  }
}

/// Non-empty and every digit identical, e.g. `00000000000`.
fn all_same(digits: &str) -> bool {
  let mut bytes = digits.bytes();
  match bytes.next() {
    Some(first) => bytes.all(|b| b == first),
    None => false,
  }
}

/// CPF check digits (positions 9 and 10).
///
/// The second weighted sum takes the *computed* first check value at weight
/// 2, not the document's own position-9 digit. The two are equal whenever
/// the first check passed, but the first check must short-circuit on
/// mismatch before the second is attempted.
fn valid_cpf(d: &[u8]) -> bool {
  let digit = |i: usize| u32::from(d[i] - b'0');

  let mut sum: u32 = (0..9).map(|i| digit(i) * (10 - i as u32)).sum();
  sum *= 10;
  let mut first = sum % 11;
  if first == 10 {
    first = 0;
  }
  if first != digit(9) {
    return false;
  }

  let mut sum: u32 = (0..9).map(|i| digit(i) * (11 - i as u32)).sum();
  sum += first * 2;
  sum *= 10;
  let mut second = sum % 11;
  if second == 10 {
    second = 0;
  }
  second == digit(10)
}

const CNPJ_WEIGHTS_FIRST: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_WEIGHTS_SECOND: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// CNPJ check digits (positions 12 and 13).
fn valid_cnpj(d: &[u8]) -> bool {
  let digit = |i: usize| u32::from(d[i] - b'0');

  let check = |weights: &[u32]| {
    let sum: u32 = weights
      .iter()
      .enumerate()
      .map(|(i, w)| digit(i) * w)
      .sum();
    match sum % 11 {
      0 | 1 => 0,
      m => 11 - m,
    }
  };

  check(&CNPJ_WEIGHTS_FIRST) == digit(12)
    && check(&CNPJ_WEIGHTS_SECOND) == digit(13)
}
