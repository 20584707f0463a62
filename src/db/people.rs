//! Queries shared by the two person tables. Students and instructors have
//! identical columns, so the SQL lives here once and `students.rs` /
//! `instructors.rs` supply the table names and row types.

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::error::{Result, SchoolError};
use crate::validation::validate_person;

use super::{db_error, is_foreign_key_violation, like_pattern, term_as_id, QueryContext};

/// A row type backed by a `(id, name, age, email)` table.
pub(super) trait PersonRecord: Sized {
    /// Human label used in errors and logs.
    const ENTITY: &'static str;
    const TABLE: &'static str;
    const ID_COLUMN: &'static str;

    fn new(id: i64, name: String, age: i64, email: String) -> Self;

    fn not_found(id: i64) -> SchoolError;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self::new(row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    }

    fn select_sql(filter: &str) -> String {
        format!(
            "SELECT {id}, name, age, email FROM {table} {filter} ORDER BY {id}",
            id = Self::ID_COLUMN,
            table = Self::TABLE,
        )
    }
}

pub(super) fn create<P: PersonRecord>(
    conn: &Connection,
    name: &str,
    age: i64,
    email: &str,
) -> Result<P> {
    let (name, email) = validate_person(P::ENTITY, name, age, email)?;
    conn.execute(
        &format!("INSERT INTO {} (name, age, email) VALUES (?1, ?2, ?3)", P::TABLE),
        params![name, age, email],
    )
    .db_context("insert person")?;

    let id = conn.last_insert_rowid();
    info!(entity = P::ENTITY, id, "inserted");
    Ok(P::new(id, name.to_string(), age, email.to_string()))
}

pub(super) fn fetch_all<P: PersonRecord>(conn: &Connection) -> Result<Vec<P>> {
    let mut stmt = conn
        .prepare(&P::select_sql(""))
        .db_context("prepare person query")?;
    let rows = stmt
        .query_map([], P::from_row)
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .db_context("load people")?;
    debug!(entity = P::ENTITY, count = rows.len(), "loaded rows");
    Ok(rows)
}

pub(super) fn fetch_one<P: PersonRecord>(conn: &Connection, id: i64) -> Result<P> {
    let sql = P::select_sql(&format!("WHERE {} = ?1", P::ID_COLUMN));
    conn.query_row(&sql, [id], P::from_row)
        .optional()
        .db_context("load person")?
        .ok_or_else(|| P::not_found(id))
}

pub(super) fn exists<P: PersonRecord>(conn: &Connection, id: i64) -> Result<bool> {
    let found = conn
        .query_row(
            &format!("SELECT 1 FROM {} WHERE {} = ?1", P::TABLE, P::ID_COLUMN),
            [id],
            |_| Ok(()),
        )
        .optional()
        .db_context("check person exists")?;
    Ok(found.is_some())
}

/// Rows whose name contains `term` or whose id equals it.
pub(super) fn filter<P: PersonRecord>(conn: &Connection, term: &str) -> Result<Vec<P>> {
    let sql = P::select_sql(&format!("WHERE name LIKE ?1 OR {} = ?2", P::ID_COLUMN));
    let mut stmt = conn.prepare(&sql).db_context("prepare person filter")?;
    let rows = stmt
        .query_map(params![like_pattern(term), term_as_id(term)], P::from_row)
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .db_context("filter people")?;
    debug!(entity = P::ENTITY, term, count = rows.len(), "filtered rows");
    Ok(rows)
}

/// First id whose name matches exactly.
pub(super) fn find_id_by_name<P: PersonRecord>(conn: &Connection, name: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            &format!(
                "SELECT {id} FROM {table} WHERE name = ?1 ORDER BY {id} LIMIT 1",
                id = P::ID_COLUMN,
                table = P::TABLE,
            ),
            [name.trim()],
            |row| row.get(0),
        )
        .optional()
        .db_context("look up person by name")?;
    Ok(id)
}

pub(super) fn update<P: PersonRecord>(
    conn: &Connection,
    id: i64,
    name: &str,
    age: i64,
    email: &str,
) -> Result<()> {
    let (name, email) = validate_person(P::ENTITY, name, age, email)?;
    let updated = conn
        .execute(
            &format!(
                "UPDATE {} SET name = ?1, age = ?2, email = ?3 WHERE {} = ?4",
                P::TABLE,
                P::ID_COLUMN
            ),
            params![name, age, email, id],
        )
        .db_context("update person")?;

    if updated == 0 {
        return Err(P::not_found(id));
    }
    info!(entity = P::ENTITY, id, "updated");
    Ok(())
}

pub(super) fn delete<P: PersonRecord>(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute(
            &format!("DELETE FROM {} WHERE {} = ?1", P::TABLE, P::ID_COLUMN),
            [id],
        )
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                SchoolError::StillReferenced(format!("{} {id}", P::ENTITY))
            } else {
                db_error("delete person", err)
            }
        })?;

    if deleted == 0 {
        return Err(P::not_found(id));
    }
    info!(entity = P::ENTITY, id, "deleted");
    Ok(())
}
