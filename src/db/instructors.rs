use rusqlite::Connection;

use crate::error::{Result, SchoolError};
use crate::models::Instructor;

use super::people::{self, PersonRecord};

impl PersonRecord for Instructor {
    const ENTITY: &'static str = "Instructor";
    const TABLE: &'static str = "instructors";
    const ID_COLUMN: &'static str = "instructor_id";

    fn new(id: i64, name: String, age: i64, email: String) -> Self {
        Instructor {
            id,
            name,
            age,
            email,
        }
    }

    fn not_found(id: i64) -> SchoolError {
        SchoolError::InstructorNotFound(id)
    }
}

/// Validate and insert an instructor, returning the hydrated row.
pub fn create_instructor(
    conn: &Connection,
    name: &str,
    age: i64,
    email: &str,
) -> Result<Instructor> {
    people::create(conn, name, age, email)
}

pub fn fetch_instructors(conn: &Connection) -> Result<Vec<Instructor>> {
    people::fetch_all(conn)
}

pub fn fetch_instructor(conn: &Connection, id: i64) -> Result<Instructor> {
    people::fetch_one(conn, id)
}

pub fn filter_instructors(conn: &Connection, term: &str) -> Result<Vec<Instructor>> {
    people::filter(conn, term)
}

/// Look up an instructor id by exact name. When several instructors share a
/// name the oldest one wins.
pub fn find_instructor_id_by_name(conn: &Connection, name: &str) -> Result<Option<i64>> {
    people::find_id_by_name::<Instructor>(conn, name)
}

pub fn update_instructor(
    conn: &Connection,
    id: i64,
    name: &str,
    age: i64,
    email: &str,
) -> Result<()> {
    people::update::<Instructor>(conn, id, name, age, email)
}

/// Remove an instructor. Courses they taught become unassigned.
pub fn delete_instructor(conn: &Connection, id: i64) -> Result<()> {
    people::delete::<Instructor>(conn, id)
}

pub(super) fn instructor_exists(conn: &Connection, id: i64) -> Result<bool> {
    people::exists::<Instructor>(conn, id)
}
