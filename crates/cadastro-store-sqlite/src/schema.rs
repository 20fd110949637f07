//! SQL schema for the cadastro SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS companies (
    company_id  TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    cnpj        TEXT NOT NULL UNIQUE,   -- canonical 14 digits
    cep         TEXT NOT NULL,          -- canonical 8 digits
    uf          TEXT NOT NULL           -- two-letter federative unit
);

CREATE TABLE IF NOT EXISTS suppliers (
    supplier_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    kind        TEXT NOT NULL,          -- 'individual' | 'organization'
    cpf_cnpj    TEXT NOT NULL UNIQUE,   -- canonical 11 or 14 digits
    rg          TEXT UNIQUE,
    birthdate   TEXT,                   -- ISO 8601 date; set for individuals
    email       TEXT UNIQUE,
    cep         TEXT NOT NULL,
    uf          TEXT NOT NULL
);

-- The many-to-many association, keyed by opaque ids on both sides.
CREATE TABLE IF NOT EXISTS company_suppliers (
    company_id  TEXT NOT NULL
                REFERENCES companies(company_id)  ON DELETE CASCADE,
    supplier_id TEXT NOT NULL
                REFERENCES suppliers(supplier_id) ON DELETE CASCADE,
    PRIMARY KEY (company_id, supplier_id)
);

CREATE INDEX IF NOT EXISTS company_suppliers_supplier_idx
    ON company_suppliers(supplier_id);

PRAGMA user_version = 1;
";
