use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::error::{Result, SchoolError};
use crate::models::{Course, CourseListing};
use crate::validation::normalize_name;

use super::instructors::instructor_exists;
use super::{
    db_error, is_foreign_key_violation, is_unique_violation, like_pattern, term_as_id,
    QueryContext,
};

const LISTING_SELECT: &str = "SELECT c.course_id, c.course_name, c.instructor_id, i.name
     FROM courses c
     LEFT JOIN instructors i ON i.instructor_id = c.instructor_id";

fn course_from_row(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: row.get(0)?,
        name: row.get(1)?,
        instructor_id: row.get(2)?,
    })
}

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<CourseListing> {
    Ok(CourseListing {
        course: course_from_row(row)?,
        instructor_name: row.get(3)?,
    })
}

/// Insert a course. The instructor, when given, must already exist and the
/// name must not be taken; the instructor is checked first.
pub fn create_course(conn: &Connection, name: &str, instructor_id: Option<i64>) -> Result<Course> {
    let name = normalize_name("Course", name)?;
    ensure_instructor(conn, instructor_id)?;
    ensure_name_free(conn, name, None)?;

    conn.execute(
        "INSERT INTO courses (course_name, instructor_id) VALUES (?1, ?2)",
        params![name, instructor_id],
    )
    .map_err(|err| map_course_constraint(err, "insert course", name, instructor_id))?;

    let id = conn.last_insert_rowid();
    info!(id, course = name, ?instructor_id, "course inserted");
    Ok(Course {
        id,
        name: name.to_string(),
        instructor_id,
    })
}

/// Every course ordered by id.
pub fn fetch_courses(conn: &Connection) -> Result<Vec<Course>> {
    let mut stmt = conn
        .prepare("SELECT course_id, course_name, instructor_id FROM courses ORDER BY course_id")
        .db_context("prepare courses query")?;
    let courses = stmt
        .query_map([], course_from_row)
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .db_context("load courses")?;
    debug!(count = courses.len(), "loaded courses");
    Ok(courses)
}

pub fn fetch_course(conn: &Connection, id: i64) -> Result<Course> {
    conn.query_row(
        "SELECT course_id, course_name, instructor_id FROM courses WHERE course_id = ?1",
        [id],
        course_from_row,
    )
    .optional()
    .db_context("load course")?
    .ok_or(SchoolError::CourseNotFound(id))
}

/// Courses whose name contains `term` or whose id is `term`.
pub fn filter_courses(conn: &Connection, term: &str) -> Result<Vec<Course>> {
    let mut stmt = conn
        .prepare(
            "SELECT course_id, course_name, instructor_id FROM courses
             WHERE course_name LIKE ?1 OR course_id = ?2
             ORDER BY course_id",
        )
        .db_context("prepare course filter")?;
    let courses = stmt
        .query_map(params![like_pattern(term), term_as_id(term)], course_from_row)
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .db_context("filter courses")?;
    debug!(term, count = courses.len(), "filtered courses");
    Ok(courses)
}

/// Courses joined with their instructor's name, for the course table view.
pub fn fetch_course_listings(conn: &Connection) -> Result<Vec<CourseListing>> {
    let mut stmt = conn
        .prepare(&format!("{LISTING_SELECT} ORDER BY c.course_id"))
        .db_context("prepare course listing query")?;
    let listings = stmt
        .query_map([], listing_from_row)
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .db_context("load course listings")?;
    Ok(listings)
}

/// Same matching rules as [`filter_courses`], hydrated with instructor names.
pub fn filter_course_listings(conn: &Connection, term: &str) -> Result<Vec<CourseListing>> {
    let mut stmt = conn
        .prepare(&format!(
            "{LISTING_SELECT}
             WHERE c.course_name LIKE ?1 OR c.course_id = ?2
             ORDER BY c.course_id"
        ))
        .db_context("prepare course listing filter")?;
    let listings = stmt
        .query_map(params![like_pattern(term), term_as_id(term)], listing_from_row)
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .db_context("filter course listings")?;
    Ok(listings)
}

/// Look up a course id by its exact name. Files written before names were
/// unique may hold several; the lowest id wins.
pub fn find_course_id_by_name(conn: &Connection, name: &str) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT course_id FROM courses WHERE course_name = ?1 ORDER BY course_id LIMIT 1",
        [name.trim()],
        |row| row.get(0),
    )
    .optional()
    .db_context("look up course by name")
}

/// Rename a course and/or change its instructor. Uniqueness ignores the
/// course's own current name.
pub fn update_course(
    conn: &Connection,
    id: i64,
    name: &str,
    instructor_id: Option<i64>,
) -> Result<()> {
    let name = normalize_name("Course", name)?;
    ensure_instructor(conn, instructor_id)?;
    ensure_name_free(conn, name, Some(id))?;

    let updated = conn
        .execute(
            "UPDATE courses SET course_name = ?1, instructor_id = ?2 WHERE course_id = ?3",
            params![name, instructor_id, id],
        )
        .map_err(|err| map_course_constraint(err, "update course", name, instructor_id))?;

    if updated == 0 {
        return Err(SchoolError::CourseNotFound(id));
    }
    info!(id, course = name, ?instructor_id, "course updated");
    Ok(())
}

/// Point a course at an existing instructor.
pub fn assign_instructor(conn: &Connection, course_id: i64, instructor_id: i64) -> Result<()> {
    ensure_instructor(conn, Some(instructor_id))?;

    let updated = conn
        .execute(
            "UPDATE courses SET instructor_id = ?1 WHERE course_id = ?2",
            params![instructor_id, course_id],
        )
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                SchoolError::InstructorNotFound(instructor_id)
            } else {
                db_error("assign instructor", err)
            }
        })?;

    if updated == 0 {
        return Err(SchoolError::CourseNotFound(course_id));
    }
    info!(course_id, instructor_id, "instructor assigned");
    Ok(())
}

/// Remove a course. Enrollments in it cascade away.
pub fn delete_course(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM courses WHERE course_id = ?1", [id])
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                SchoolError::StillReferenced(format!("Course {id}"))
            } else {
                db_error("delete course", err)
            }
        })?;

    if deleted == 0 {
        return Err(SchoolError::CourseNotFound(id));
    }
    info!(id, "course deleted");
    Ok(())
}

pub(super) fn course_exists(conn: &Connection, id: i64) -> Result<bool> {
    let found = conn
        .query_row("SELECT 1 FROM courses WHERE course_id = ?1", [id], |_| Ok(()))
        .optional()
        .db_context("check course exists")?;
    Ok(found.is_some())
}

fn ensure_instructor(conn: &Connection, instructor_id: Option<i64>) -> Result<()> {
    if let Some(id) = instructor_id {
        if !instructor_exists(conn, id)? {
            return Err(SchoolError::InstructorNotFound(id));
        }
    }
    Ok(())
}

/// Fail when any other course already uses `name`. `except` skips the course
/// being edited, so a file that already holds duplicates can still edit each
/// copy without renaming it.
fn ensure_name_free(conn: &Connection, name: &str, except: Option<i64>) -> Result<()> {
    let taken = conn
        .query_row(
            "SELECT 1 FROM courses WHERE course_name = ?1 AND course_id IS NOT ?2 LIMIT 1",
            params![name, except],
            |_| Ok(()),
        )
        .optional()
        .db_context("check course name")?;
    match taken {
        Some(()) => Err(SchoolError::DuplicateCourseName(name.to_string())),
        None => Ok(()),
    }
}

/// The pre-checks cover the common cases; this catches anything the schema
/// itself rejects.
fn map_course_constraint(
    err: rusqlite::Error,
    action: &'static str,
    name: &str,
    instructor_id: Option<i64>,
) -> SchoolError {
    if is_unique_violation(&err) {
        SchoolError::DuplicateCourseName(name.to_string())
    } else if let (true, Some(id)) = (is_foreign_key_violation(&err), instructor_id) {
        SchoolError::InstructorNotFound(id)
    } else {
        db_error(action, err)
    }
}
