//! Persistence module split across logical submodules. Every public function
//! takes a borrowed connection, runs its checks, then issues one statement
//! and relies on SQLite autocommit.

mod connection;
mod courses;
mod enrollments;
mod instructors;
mod people;
mod students;

use std::os::raw::c_int;

use rusqlite::{ffi, Error as SqlError, ErrorCode};

use crate::error::{Result, SchoolError};

pub use connection::{ensure_schema, open_database, open_in_memory};
pub use courses::{
    assign_instructor, create_course, delete_course, fetch_course, fetch_course_listings,
    fetch_courses, filter_course_listings, filter_courses, find_course_id_by_name, update_course,
};
pub use enrollments::{
    fetch_courses_for_student, fetch_enrollments, fetch_students_for_course, is_registered,
    register_student_course, unregister_student_course,
};
pub use instructors::{
    create_instructor, delete_instructor, fetch_instructor, fetch_instructors,
    filter_instructors, find_instructor_id_by_name, update_instructor,
};
pub use students::{
    create_student, delete_student, fetch_student, fetch_students, filter_students,
    update_student,
};

/// Attach the attempted action to a rusqlite failure so logs and the footer
/// say which query broke.
trait QueryContext<T> {
    fn db_context(self, action: &'static str) -> Result<T>;
}

impl<T> QueryContext<T> for rusqlite::Result<T> {
    fn db_context(self, action: &'static str) -> Result<T> {
        self.map_err(|source| db_error(action, source))
    }
}

fn db_error(action: &'static str, source: SqlError) -> SchoolError {
    SchoolError::Database { action, source }
}

/// Whether `err` is a constraint violation with the given extended code
/// (`SQLITE_CONSTRAINT_UNIQUE`, `SQLITE_CONSTRAINT_FOREIGNKEY`, ...).
fn is_constraint(err: &SqlError, extended: c_int) -> bool {
    match err {
        SqlError::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation && failure.extended_code == extended
        }
        _ => false,
    }
}

fn is_unique_violation(err: &SqlError) -> bool {
    is_constraint(err, ffi::SQLITE_CONSTRAINT_UNIQUE)
        || is_constraint(err, ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
}

fn is_foreign_key_violation(err: &SqlError) -> bool {
    is_constraint(err, ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}

/// Parse a filter term as a row id so `WHERE id = ?` can match it. Terms that
/// are not integers bind as NULL and never match.
fn term_as_id(term: &str) -> Option<i64> {
    term.trim().parse().ok()
}

/// Wrap a filter term in `%` wildcards for `LIKE`.
fn like_pattern(term: &str) -> String {
    format!("%{}%", term.trim())
}
