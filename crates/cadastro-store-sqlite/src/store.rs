//! [`SqliteStore`] — the SQLite implementation of [`RegistryStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use cadastro_core::{
  company::{Company, CompanyPatch},
  store::{Page, PageRequest, RegistryStore, SearchField, SearchQuery},
  supplier::{Supplier, SupplierPatch},
};

use crate::{
  Error, Result,
  encode::{RawCompany, RawSupplier, encode_date, encode_uuid},
  schema::SCHEMA,
};

// ─── Row mappers ─────────────────────────────────────────────────────────────

const COMPANY_COLS: &str = "company_id, name, cnpj, cep, uf";
const SUPPLIER_COLS: &str =
  "supplier_id, name, kind, cpf_cnpj, rg, birthdate, email, cep, uf";

fn company_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCompany> {
  Ok(RawCompany {
    company_id: row.get(0)?,
    name:       row.get(1)?,
    cnpj:       row.get(2)?,
    cep:        row.get(3)?,
    uf:         row.get(4)?,
  })
}

fn supplier_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSupplier> {
  Ok(RawSupplier {
    supplier_id: row.get(0)?,
    name:        row.get(1)?,
    kind:        row.get(2)?,
    cpf_cnpj:    row.get(3)?,
    rg:          row.get(4)?,
    birthdate:   row.get(5)?,
    email:       row.get(6)?,
    cep:         row.get(7)?,
    uf:          row.get(8)?,
  })
}

/// WHERE clause for a filtered company search; `?1` is the LIKE pattern.
/// SQLite's LIKE is already case-insensitive over ASCII.
fn company_filter(field: SearchField) -> &'static str {
  match field {
    SearchField::General => "WHERE name LIKE ?1 OR cnpj LIKE ?1",
    SearchField::Name => "WHERE name LIKE ?1",
    SearchField::Document => "WHERE cnpj LIKE ?1",
  }
}

fn supplier_filter(field: SearchField) -> &'static str {
  match field {
    SearchField::General => "WHERE name LIKE ?1 OR cpf_cnpj LIKE ?1",
    SearchField::Name => "WHERE name LIKE ?1",
    SearchField::Document => "WHERE cpf_cnpj LIKE ?1",
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A registry store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Shared pagination query: `COUNT(*)` plus one page of rows.
  async fn page_query<R>(
    &self,
    table: &'static str,
    cols: &'static str,
    filter_sql: Option<&'static str>,
    pattern: Option<String>,
    page: PageRequest,
    mapper: fn(&rusqlite::Row<'_>) -> rusqlite::Result<R>,
  ) -> Result<(Vec<R>, u64)>
  where
    R: Send + 'static,
  {
    let limit = page.size as i64;
    let offset = page.offset() as i64;

    let (rows, total): (Vec<R>, i64) = self
      .conn
      .call(move |conn| match (filter_sql, pattern) {
        (Some(where_sql), Some(pattern)) => {
          let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {table} {where_sql}"),
            rusqlite::params![pattern],
            |r| r.get(0),
          )?;
          let mut stmt = conn.prepare(&format!(
            "SELECT {cols} FROM {table} {where_sql} \
             ORDER BY name LIMIT ?2 OFFSET ?3"
          ))?;
          let rows = stmt
            .query_map(rusqlite::params![pattern, limit, offset], mapper)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok((rows, total))
        }
        _ => {
          let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {table}"),
            [],
            |r| r.get(0),
          )?;
          let mut stmt = conn.prepare(&format!(
            "SELECT {cols} FROM {table} ORDER BY name LIMIT ?1 OFFSET ?2"
          ))?;
          let rows = stmt
            .query_map(rusqlite::params![limit, offset], mapper)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok((rows, total))
        }
      })
      .await?;

    Ok((rows, total as u64))
  }

  async fn exists(
    &self,
    sql: &'static str,
    value: String,
  ) -> Result<bool> {
    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(sql, rusqlite::params![value], |_| Ok(true))
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(found)
  }
}

// ─── RegistryStore impl ──────────────────────────────────────────────────────

impl RegistryStore for SqliteStore {
  type Error = Error;

  // ── Companies ─────────────────────────────────────────────────────────────

  async fn create_company(
    &self,
    company: Company,
    supplier_ids: Vec<Uuid>,
  ) -> Result<()> {
    let id_str = encode_uuid(company.id);
    let uf = company.uf.as_str();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO companies (company_id, name, cnpj, cep, uf)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, company.name, company.cnpj, company.cep, uf],
        )?;
        {
          let mut ins = tx.prepare(
            "INSERT OR IGNORE INTO company_suppliers (company_id, supplier_id)
             VALUES (?1, ?2)",
          )?;
          for sid in &supplier_ids {
            ins.execute(rusqlite::params![id_str, encode_uuid(*sid)])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_company(&self, id: Uuid) -> Result<Option<Company>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCompany> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {COMPANY_COLS} FROM companies WHERE company_id = ?1"
              ),
              rusqlite::params![id_str],
              company_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCompany::into_company).transpose()
  }

  async fn search_companies(
    &self,
    query: &SearchQuery,
    page: PageRequest,
  ) -> Result<Page<Company>> {
    let pattern = query.filter().map(|f| format!("%{f}%"));
    let filter_sql = pattern.as_ref().map(|_| company_filter(query.field));

    let (raws, total) = self
      .page_query("companies", COMPANY_COLS, filter_sql, pattern, page, company_row)
      .await?;

    let items = raws
      .into_iter()
      .map(RawCompany::into_company)
      .collect::<Result<Vec<_>>>()?;

    Ok(Page { items, page: page.page, size: page.size, total })
  }

  async fn update_company(
    &self,
    id: Uuid,
    patch: CompanyPatch,
  ) -> Result<Company> {
    let id_str = encode_uuid(id);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if let Some(name) = &patch.name {
          tx.execute(
            "UPDATE companies SET name = ?2 WHERE company_id = ?1",
            rusqlite::params![id_str, name],
          )?;
        }
        if let Some((cep, uf)) = &patch.cep_uf {
          tx.execute(
            "UPDATE companies SET cep = ?2, uf = ?3 WHERE company_id = ?1",
            rusqlite::params![id_str, cep, uf.as_str()],
          )?;
        }
        if let Some(ids) = &patch.supplier_ids {
          tx.execute(
            "DELETE FROM company_suppliers WHERE company_id = ?1",
            rusqlite::params![id_str],
          )?;
          {
            let mut ins = tx.prepare(
              "INSERT OR IGNORE INTO company_suppliers \
               (company_id, supplier_id) VALUES (?1, ?2)",
            )?;
            for sid in ids {
              ins.execute(rusqlite::params![id_str, encode_uuid(*sid)])?;
            }
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    self
      .get_company(id)
      .await?
      .ok_or(Error::CompanyNotFound(id))
  }

  async fn delete_company(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM companies WHERE company_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::CompanyNotFound(id));
    }
    Ok(())
  }

  async fn company_exists_by_cnpj(&self, cnpj: &str) -> Result<bool> {
    self
      .exists("SELECT 1 FROM companies WHERE cnpj = ?1", cnpj.to_owned())
      .await
  }

  async fn companies_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Company>> {
    let id_strs: Vec<String> = ids.iter().map(|id| encode_uuid(*id)).collect();

    let raws: Vec<RawCompany> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMPANY_COLS} FROM companies WHERE company_id = ?1"
        ))?;
        let mut rows = Vec::new();
        for id in &id_strs {
          if let Some(raw) = stmt
            .query_row(rusqlite::params![id], company_row)
            .optional()?
          {
            rows.push(raw);
          }
        }
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCompany::into_company).collect()
  }

  async fn company_supplier_ids(&self, id: Uuid) -> Result<Vec<Uuid>> {
    let id_str = encode_uuid(id);

    let ids: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT supplier_id FROM company_suppliers WHERE company_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    ids.iter().map(|s| crate::encode::decode_uuid(s)).collect()
  }

  async fn company_suppliers(&self, id: Uuid) -> Result<Vec<Supplier>> {
    let id_str = encode_uuid(id);

    let raws: Vec<RawSupplier> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT s.supplier_id, s.name, s.kind, s.cpf_cnpj, s.rg, \
                  s.birthdate, s.email, s.cep, s.uf
           FROM suppliers s
           JOIN company_suppliers cs ON cs.supplier_id = s.supplier_id
           WHERE cs.company_id = ?1
           ORDER BY s.name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], supplier_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSupplier::into_supplier).collect()
  }

  // ── Suppliers ─────────────────────────────────────────────────────────────

  async fn create_supplier(
    &self,
    supplier: Supplier,
    company_ids: Vec<Uuid>,
  ) -> Result<()> {
    let id_str = encode_uuid(supplier.id);
    let kind = crate::encode::encode_supplier_kind(supplier.kind);
    let birthdate = supplier.birthdate.map(encode_date);
    let uf = supplier.uf.as_str();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO suppliers
             (supplier_id, name, kind, cpf_cnpj, rg, birthdate, email, cep, uf)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str,
            supplier.name,
            kind,
            supplier.cpf_cnpj,
            supplier.rg,
            birthdate,
            supplier.email,
            supplier.cep,
            uf,
          ],
        )?;
        {
          let mut ins = tx.prepare(
            "INSERT OR IGNORE INTO company_suppliers (company_id, supplier_id)
             VALUES (?1, ?2)",
          )?;
          for cid in &company_ids {
            ins.execute(rusqlite::params![encode_uuid(*cid), id_str])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_supplier(&self, id: Uuid) -> Result<Option<Supplier>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSupplier> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SUPPLIER_COLS} FROM suppliers WHERE supplier_id = ?1"
              ),
              rusqlite::params![id_str],
              supplier_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSupplier::into_supplier).transpose()
  }

  async fn search_suppliers(
    &self,
    query: &SearchQuery,
    page: PageRequest,
  ) -> Result<Page<Supplier>> {
    let pattern = query.filter().map(|f| format!("%{f}%"));
    let filter_sql = pattern.as_ref().map(|_| supplier_filter(query.field));

    let (raws, total) = self
      .page_query("suppliers", SUPPLIER_COLS, filter_sql, pattern, page, supplier_row)
      .await?;

    let items = raws
      .into_iter()
      .map(RawSupplier::into_supplier)
      .collect::<Result<Vec<_>>>()?;

    Ok(Page { items, page: page.page, size: page.size, total })
  }

  async fn update_supplier(
    &self,
    id: Uuid,
    patch: SupplierPatch,
  ) -> Result<Supplier> {
    let id_str = encode_uuid(id);
    let birthdate = patch.birthdate.map(encode_date);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if let Some(name) = &patch.name {
          tx.execute(
            "UPDATE suppliers SET name = ?2 WHERE supplier_id = ?1",
            rusqlite::params![id_str, name],
          )?;
        }
        if let Some(rg) = &patch.rg {
          tx.execute(
            "UPDATE suppliers SET rg = ?2 WHERE supplier_id = ?1",
            rusqlite::params![id_str, rg],
          )?;
        }
        if let Some(birthdate) = &birthdate {
          tx.execute(
            "UPDATE suppliers SET birthdate = ?2 WHERE supplier_id = ?1",
            rusqlite::params![id_str, birthdate],
          )?;
        }
        if let Some(email) = &patch.email {
          tx.execute(
            "UPDATE suppliers SET email = ?2 WHERE supplier_id = ?1",
            rusqlite::params![id_str, email],
          )?;
        }
        if let Some((cep, uf)) = &patch.cep_uf {
          tx.execute(
            "UPDATE suppliers SET cep = ?2, uf = ?3 WHERE supplier_id = ?1",
            rusqlite::params![id_str, cep, uf.as_str()],
          )?;
        }
        if let Some(ids) = &patch.company_ids {
          tx.execute(
            "DELETE FROM company_suppliers WHERE supplier_id = ?1",
            rusqlite::params![id_str],
          )?;
          {
            let mut ins = tx.prepare(
              "INSERT OR IGNORE INTO company_suppliers \
               (company_id, supplier_id) VALUES (?1, ?2)",
            )?;
            for cid in ids {
              ins.execute(rusqlite::params![encode_uuid(*cid), id_str])?;
            }
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    self
      .get_supplier(id)
      .await?
      .ok_or(Error::SupplierNotFound(id))
  }

  async fn delete_supplier(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM suppliers WHERE supplier_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::SupplierNotFound(id));
    }
    Ok(())
  }

  async fn supplier_exists_by_document(&self, cpf_cnpj: &str) -> Result<bool> {
    self
      .exists(
        "SELECT 1 FROM suppliers WHERE cpf_cnpj = ?1",
        cpf_cnpj.to_owned(),
      )
      .await
  }

  async fn suppliers_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Supplier>> {
    let id_strs: Vec<String> = ids.iter().map(|id| encode_uuid(*id)).collect();

    let raws: Vec<RawSupplier> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUPPLIER_COLS} FROM suppliers WHERE supplier_id = ?1"
        ))?;
        let mut rows = Vec::new();
        for id in &id_strs {
          if let Some(raw) = stmt
            .query_row(rusqlite::params![id], supplier_row)
            .optional()?
          {
            rows.push(raw);
          }
        }
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSupplier::into_supplier).collect()
  }

  async fn supplier_company_ids(&self, id: Uuid) -> Result<Vec<Uuid>> {
    let id_str = encode_uuid(id);

    let ids: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT company_id FROM company_suppliers WHERE supplier_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    ids.iter().map(|s| crate::encode::decode_uuid(s)).collect()
  }

  async fn supplier_companies(&self, id: Uuid) -> Result<Vec<Company>> {
    let id_str = encode_uuid(id);

    let raws: Vec<RawCompany> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT c.company_id, c.name, c.cnpj, c.cep, c.uf
           FROM companies c
           JOIN company_suppliers cs ON cs.company_id = c.company_id
           WHERE cs.supplier_id = ?1
           ORDER BY c.name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], company_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCompany::into_company).collect()
  }
}
