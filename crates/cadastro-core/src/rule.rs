//! The Paraná supplier-age rule.
//!
//! Companies registered in PR may not be linked to individual suppliers under
//! the age of majority. The rule is evaluated over the full candidate set on
//! every mutating association, before anything is written — a failure must
//! leave the persisted graph untouched.

use chrono::{Datelike, NaiveDate};

use crate::{
  Error, Result,
  supplier::{Supplier, SupplierKind},
  uf::FederativeUnit,
};

/// Age in whole years at `today`, truncated — the birthday only counts once
/// reached.
pub fn age_on(birthdate: NaiveDate, today: NaiveDate) -> i32 {
  let mut years = today.year() - birthdate.year();
  if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
    years -= 1;
  }
  years
}

/// Gate a candidate supplier set for a company registered in `uf`.
///
/// Passes unconditionally unless `uf` is PR. For PR, fails with the complete
/// set of individual suppliers younger than 18; partial associations are
/// never allowed through.
pub fn check_supplier_link(
  uf: FederativeUnit,
  suppliers: &[Supplier],
  today: NaiveDate,
) -> Result<()> {
  if uf != FederativeUnit::PR {
    return Ok(());
  }

  let underage: Vec<Supplier> = suppliers
    .iter()
    .filter(|s| {
      s.kind == SupplierKind::Individual
        && s.birthdate.is_some_and(|b| age_on(b, today) < 18)
    })
    .cloned()
    .collect();

  if underage.is_empty() {
    Ok(())
  } else {
    Err(Error::UnderageSuppliers(underage))
  }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn supplier(
    name: &str,
    kind: SupplierKind,
    birthdate: Option<NaiveDate>,
  ) -> Supplier {
    Supplier {
      id: Uuid::new_v4(),
      name: name.to_owned(),
      kind,
      cpf_cnpj: "52998224725".into(),
      rg: Some("123456789".into()),
      birthdate,
      email: None,
      cep: "80010000".into(),
      uf: FederativeUnit::PR,
    }
  }

  #[test]
  fn age_truncates_to_whole_years() {
    let birth = date(2000, 6, 15);
    assert_eq!(age_on(birth, date(2018, 6, 14)), 17);
    assert_eq!(age_on(birth, date(2018, 6, 15)), 18);
    assert_eq!(age_on(birth, date(2018, 6, 16)), 18);
    assert_eq!(age_on(birth, date(2019, 1, 1)), 18);
  }

  #[test]
  fn non_pr_companies_accept_any_candidate_set() {
    let minors = vec![
      supplier("a", SupplierKind::Individual, Some(date(2015, 1, 1))),
      supplier("b", SupplierKind::Individual, Some(date(2020, 1, 1))),
    ];
    assert!(
      check_supplier_link(FederativeUnit::SP, &minors, date(2025, 1, 1))
        .is_ok()
    );
  }

  #[test]
  fn pr_company_rejects_a_single_underage_individual() {
    let candidates = vec![
      supplier("adult", SupplierKind::Individual, Some(date(1990, 1, 1))),
      supplier("minor", SupplierKind::Individual, Some(date(2015, 1, 1))),
    ];

    let err =
      check_supplier_link(FederativeUnit::PR, &candidates, date(2025, 1, 1))
        .unwrap_err();

    match err {
      Error::UnderageSuppliers(offenders) => {
        assert_eq!(offenders.len(), 1);
        assert_eq!(offenders[0].name, "minor");
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[test]
  fn pr_company_enumerates_every_offender() {
    let candidates = vec![
      supplier("m1", SupplierKind::Individual, Some(date(2012, 3, 3))),
      supplier("adult", SupplierKind::Individual, Some(date(1980, 1, 1))),
      supplier("m2", SupplierKind::Individual, Some(date(2014, 7, 7))),
    ];

    let err =
      check_supplier_link(FederativeUnit::PR, &candidates, date(2025, 1, 1))
        .unwrap_err();

    match err {
      Error::UnderageSuppliers(offenders) => {
        let mut names: Vec<_> =
          offenders.iter().map(|s| s.name.as_str()).collect();
        names.sort();
        assert_eq!(names, ["m1", "m2"]);
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[test]
  fn organizations_are_never_age_checked() {
    // Even with a recent "birthdate"-like field set.
    let candidates = vec![
      supplier("org", SupplierKind::Organization, Some(date(2020, 1, 1))),
    ];
    assert!(
      check_supplier_link(FederativeUnit::PR, &candidates, date(2025, 1, 1))
        .is_ok()
    );
  }

  #[test]
  fn eighteenth_birthday_is_the_exact_boundary() {
    let birth = date(2007, 5, 10);
    let candidate = vec![supplier("s", SupplierKind::Individual, Some(birth))];

    assert!(
      check_supplier_link(FederativeUnit::PR, &candidate, date(2025, 5, 9))
        .is_err()
    );
    assert!(
      check_supplier_link(FederativeUnit::PR, &candidate, date(2025, 5, 10))
        .is_ok()
    );
  }

  #[test]
  fn empty_candidate_set_passes() {
    assert!(
      check_supplier_link(FederativeUnit::PR, &[], date(2025, 1, 1)).is_ok()
    );
  }
}
