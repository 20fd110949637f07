//! Brazilian federative units.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// A federative unit (state or the federal district), identified by the
/// two-letter code used by the postal service.
///
/// Never accepted directly from clients — always derived from a CEP lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FederativeUnit {
  AC,
  AL,
  AP,
  AM,
  BA,
  CE,
  DF,
  ES,
  GO,
  MA,
  MT,
  MS,
  MG,
  PA,
  PB,
  PR,
  PE,
  PI,
  RJ,
  RN,
  RS,
  RO,
  RR,
  SC,
  SP,
  SE,
  TO,
}

impl FederativeUnit {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::AC => "AC",
      Self::AL => "AL",
      Self::AP => "AP",
      Self::AM => "AM",
      Self::BA => "BA",
      Self::CE => "CE",
      Self::DF => "DF",
      Self::ES => "ES",
      Self::GO => "GO",
      Self::MA => "MA",
      Self::MT => "MT",
      Self::MS => "MS",
      Self::MG => "MG",
      Self::PA => "PA",
      Self::PB => "PB",
      Self::PR => "PR",
      Self::PE => "PE",
      Self::PI => "PI",
      Self::RJ => "RJ",
      Self::RN => "RN",
      Self::RS => "RS",
      Self::RO => "RO",
      Self::RR => "RR",
      Self::SC => "SC",
      Self::SP => "SP",
      Self::SE => "SE",
      Self::TO => "TO",
    }
  }
}

impl fmt::Display for FederativeUnit {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for FederativeUnit {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "AC" => Ok(Self::AC),
      "AL" => Ok(Self::AL),
      "AP" => Ok(Self::AP),
      "AM" => Ok(Self::AM),
      "BA" => Ok(Self::BA),
      "CE" => Ok(Self::CE),
      "DF" => Ok(Self::DF),
      "ES" => Ok(Self::ES),
      "GO" => Ok(Self::GO),
      "MA" => Ok(Self::MA),
      "MT" => Ok(Self::MT),
      "MS" => Ok(Self::MS),
      "MG" => Ok(Self::MG),
      "PA" => Ok(Self::PA),
      "PB" => Ok(Self::PB),
      "PR" => Ok(Self::PR),
      "PE" => Ok(Self::PE),
      "PI" => Ok(Self::PI),
      "RJ" => Ok(Self::RJ),
      "RN" => Ok(Self::RN),
      "RS" => Ok(Self::RS),
      "RO" => Ok(Self::RO),
      "RR" => Ok(Self::RR),
      "SC" => Ok(Self::SC),
      "SP" => Ok(Self::SP),
      "SE" => Ok(Self::SE),
      "TO" => Ok(Self::TO),
      other => Err(Error::UnknownUf(other.to_owned())),
    }
  }
}
