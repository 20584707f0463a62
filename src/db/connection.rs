use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

/// Open (creating if needed) the SQLite file at `path` and make sure every
/// table exists. Parent directories are created first so a fresh home
/// directory works out of the box.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }
    }

    let conn = Connection::open(path).context("failed to open SQLite database")?;
    ensure_schema(&conn)?;
    info!(path = %path.display(), "database ready");
    Ok(conn)
}

/// In-memory database with the full schema. Handy for tests and throwaway
/// sessions.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Enable foreign keys and run the lazy migrations. Every statement is
/// `IF NOT EXISTS`, so files created by older builds keep their layout.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students (
            student_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            age INTEGER NOT NULL,
            email TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create students table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS instructors (
            instructor_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            age INTEGER NOT NULL,
            email TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create instructors table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS courses (
            course_id INTEGER PRIMARY KEY AUTOINCREMENT,
            course_name TEXT NOT NULL UNIQUE,
            instructor_id INTEGER,
            FOREIGN KEY(instructor_id) REFERENCES instructors(instructor_id) ON DELETE SET NULL
        )",
        [],
    )
    .context("failed to create courses table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS student_courses (
            student_id INTEGER NOT NULL,
            course_id INTEGER NOT NULL,
            PRIMARY KEY (student_id, course_id),
            FOREIGN KEY(student_id) REFERENCES students(student_id) ON DELETE CASCADE,
            FOREIGN KEY(course_id) REFERENCES courses(course_id) ON DELETE CASCADE
        )",
        [],
    )
    .context("failed to create student_courses table")?;

    prune_dangling_rows(conn)
}

/// Files written with foreign keys off can hold enrollments for deleted
/// students or courses and courses pointing at deleted instructors. Those
/// rows are invisible in the joined views yet block later deletes, so they
/// are cleared on open.
fn prune_dangling_rows(conn: &Connection) -> Result<()> {
    let enrollments = conn
        .execute(
            "DELETE FROM student_courses
             WHERE student_id NOT IN (SELECT student_id FROM students)
                OR course_id NOT IN (SELECT course_id FROM courses)",
            [],
        )
        .context("failed to prune orphaned enrollments")?;

    let courses = conn
        .execute(
            "UPDATE courses SET instructor_id = NULL
             WHERE instructor_id IS NOT NULL
               AND instructor_id NOT IN (SELECT instructor_id FROM instructors)",
            [],
        )
        .context("failed to clear missing instructors")?;

    if enrollments > 0 || courses > 0 {
        info!(enrollments, courses, "pruned dangling references");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap()
    }

    #[test]
    fn creates_all_four_tables() {
        let conn = open_in_memory().unwrap();
        assert_eq!(
            table_names(&conn),
            vec!["courses", "instructors", "student_courses", "students"]
        );
    }

    #[test]
    fn schema_creation_is_idempotent() {
        let conn = open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        assert_eq!(table_names(&conn).len(), 4);
    }

    #[test]
    fn dangling_rows_are_pruned() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "PRAGMA foreign_keys = OFF;
             CREATE TABLE students (student_id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, age INTEGER NOT NULL, email TEXT NOT NULL);
             CREATE TABLE instructors (instructor_id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, age INTEGER NOT NULL, email TEXT NOT NULL);
             CREATE TABLE courses (course_id INTEGER PRIMARY KEY AUTOINCREMENT, course_name TEXT NOT NULL, instructor_id INTEGER, FOREIGN KEY (instructor_id) REFERENCES instructors(instructor_id));
             CREATE TABLE student_courses (student_id INTEGER, course_id INTEGER, PRIMARY KEY (student_id, course_id), FOREIGN KEY (student_id) REFERENCES students(student_id), FOREIGN KEY (course_id) REFERENCES courses(course_id));
             INSERT INTO students (name, age, email) VALUES ('Ada', 19, 'ada@example.com');
             INSERT INTO courses (course_name, instructor_id) VALUES ('Math', 9);
             INSERT INTO student_courses VALUES (1, 1), (2, 1), (1, 5);",
        )
        .unwrap();

        ensure_schema(&conn).unwrap();

        let pairs: Vec<(i64, i64)> = conn
            .prepare("SELECT student_id, course_id FROM student_courses")
            .unwrap()
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(pairs, vec![(1, 1)]);

        let instructor: Option<i64> = conn
            .query_row("SELECT instructor_id FROM courses WHERE course_id = 1", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(instructor, None);
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let conn = open_in_memory().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
