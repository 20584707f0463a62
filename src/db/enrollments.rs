use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::error::{Result, SchoolError};
use crate::models::{Course, Enrollment, Student};

use super::courses::course_exists;
use super::students::student_exists;
use super::{db_error, is_foreign_key_violation, is_unique_violation, QueryContext};

fn enrollment_from_row(row: &Row<'_>) -> rusqlite::Result<Enrollment> {
    Ok(Enrollment {
        student_id: row.get(0)?,
        student_name: row.get(1)?,
        course_id: row.get(2)?,
        course_name: row.get(3)?,
    })
}

/// Enroll a student in a course. Both rows must exist and the pair may only
/// be registered once.
pub fn register_student_course(conn: &Connection, student_id: i64, course_id: i64) -> Result<()> {
    if !student_exists(conn, student_id)? {
        return Err(SchoolError::StudentNotFound(student_id));
    }
    if !course_exists(conn, course_id)? {
        return Err(SchoolError::CourseNotFound(course_id));
    }

    conn.execute(
        "INSERT INTO student_courses (student_id, course_id) VALUES (?1, ?2)",
        params![student_id, course_id],
    )
    .map_err(|err| {
        if is_unique_violation(&err) {
            SchoolError::AlreadyRegistered {
                student_id,
                course_id,
            }
        } else if is_foreign_key_violation(&err) {
            SchoolError::CourseNotFound(course_id)
        } else {
            db_error("register student", err)
        }
    })?;

    info!(student_id, course_id, "student registered");
    Ok(())
}

/// Drop an enrollment, erroring when the pair was never registered.
pub fn unregister_student_course(
    conn: &Connection,
    student_id: i64,
    course_id: i64,
) -> Result<()> {
    let deleted = conn
        .execute(
            "DELETE FROM student_courses WHERE student_id = ?1 AND course_id = ?2",
            params![student_id, course_id],
        )
        .db_context("unregister student")?;

    if deleted == 0 {
        return Err(SchoolError::NotRegistered {
            student_id,
            course_id,
        });
    }
    info!(student_id, course_id, "student unregistered");
    Ok(())
}

pub fn is_registered(conn: &Connection, student_id: i64, course_id: i64) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM student_courses WHERE student_id = ?1 AND course_id = ?2",
            params![student_id, course_id],
            |_| Ok(()),
        )
        .optional()
        .db_context("check registration")?;
    Ok(found.is_some())
}

/// Every enrollment with display names, ordered case-insensitively by student
/// then course.
pub fn fetch_enrollments(conn: &Connection) -> Result<Vec<Enrollment>> {
    let mut stmt = conn
        .prepare(
            "SELECT s.student_id, s.name, c.course_id, c.course_name
             FROM student_courses sc
             INNER JOIN students s ON s.student_id = sc.student_id
             INNER JOIN courses c ON c.course_id = sc.course_id
             ORDER BY s.name COLLATE NOCASE, s.student_id, c.course_name COLLATE NOCASE",
        )
        .db_context("prepare enrollment query")?;
    let enrollments = stmt
        .query_map([], enrollment_from_row)
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .db_context("load enrollments")?;
    debug!(count = enrollments.len(), "loaded enrollments");
    Ok(enrollments)
}

/// Courses a student is registered for.
pub fn fetch_courses_for_student(conn: &Connection, student_id: i64) -> Result<Vec<Course>> {
    let mut stmt = conn
        .prepare(
            "SELECT c.course_id, c.course_name, c.instructor_id
             FROM courses c
             INNER JOIN student_courses sc ON sc.course_id = c.course_id
             WHERE sc.student_id = ?1
             ORDER BY c.course_name COLLATE NOCASE",
        )
        .db_context("prepare courses for student query")?;
    let courses = stmt
        .query_map([student_id], |row| {
            Ok(Course {
                id: row.get(0)?,
                name: row.get(1)?,
                instructor_id: row.get(2)?,
            })
        })
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .db_context("load courses for student")?;
    Ok(courses)
}

/// Students registered for a course.
pub fn fetch_students_for_course(conn: &Connection, course_id: i64) -> Result<Vec<Student>> {
    let mut stmt = conn
        .prepare(
            "SELECT s.student_id, s.name, s.age, s.email
             FROM students s
             INNER JOIN student_courses sc ON sc.student_id = s.student_id
             WHERE sc.course_id = ?1
             ORDER BY s.name COLLATE NOCASE",
        )
        .db_context("prepare students for course query")?;
    let students = stmt
        .query_map([course_id], |row| {
            Ok(Student {
                id: row.get(0)?,
                name: row.get(1)?,
                age: row.get(2)?,
                email: row.get(3)?,
            })
        })
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .db_context("load students for course")?;
    Ok(students)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_course, create_student, delete_course, delete_student, open_in_memory};

    fn seed(conn: &Connection) -> (Student, Student, Course, Course) {
        let ada = create_student(conn, "Ada", 19, "ada@example.com").unwrap();
        let bob = create_student(conn, "bob", 20, "bob@example.com").unwrap();
        let math = create_course(conn, "Math", None).unwrap();
        let art = create_course(conn, "Art", None).unwrap();
        (ada, bob, math, art)
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let conn = open_in_memory().unwrap();
        let (ada, _, math, _) = seed(&conn);

        register_student_course(&conn, ada.id, math.id).unwrap();
        let err = register_student_course(&conn, ada.id, math.id).unwrap_err();
        assert!(matches!(
            err,
            SchoolError::AlreadyRegistered { student_id, course_id }
                if student_id == ada.id && course_id == math.id
        ));
        assert_eq!(fetch_enrollments(&conn).unwrap().len(), 1);
    }

    #[test]
    fn registration_requires_existing_rows() {
        let conn = open_in_memory().unwrap();
        let (ada, _, math, _) = seed(&conn);

        assert!(matches!(
            register_student_course(&conn, 999, math.id),
            Err(SchoolError::StudentNotFound(999))
        ));
        assert!(matches!(
            register_student_course(&conn, ada.id, 999),
            Err(SchoolError::CourseNotFound(999))
        ));
        assert!(fetch_enrollments(&conn).unwrap().is_empty());
    }

    #[test]
    fn enrollments_are_listed_by_student_then_course() {
        let conn = open_in_memory().unwrap();
        let (ada, bob, math, art) = seed(&conn);

        register_student_course(&conn, bob.id, math.id).unwrap();
        register_student_course(&conn, ada.id, math.id).unwrap();
        register_student_course(&conn, ada.id, art.id).unwrap();

        let pairs: Vec<_> = fetch_enrollments(&conn)
            .unwrap()
            .into_iter()
            .map(|e| (e.student_name, e.course_name))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Ada".to_string(), "Art".to_string()),
                ("Ada".to_string(), "Math".to_string()),
                ("bob".to_string(), "Math".to_string()),
            ]
        );

        let ada_courses: Vec<_> = fetch_courses_for_student(&conn, ada.id)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(ada_courses, vec!["Art", "Math"]);

        let math_students: Vec<_> = fetch_students_for_course(&conn, math.id)
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(math_students, vec!["Ada", "bob"]);
    }

    #[test]
    fn unregister_removes_only_that_pair() {
        let conn = open_in_memory().unwrap();
        let (ada, _, math, art) = seed(&conn);
        register_student_course(&conn, ada.id, math.id).unwrap();
        register_student_course(&conn, ada.id, art.id).unwrap();

        unregister_student_course(&conn, ada.id, math.id).unwrap();
        assert!(!is_registered(&conn, ada.id, math.id).unwrap());
        assert!(is_registered(&conn, ada.id, art.id).unwrap());

        assert!(matches!(
            unregister_student_course(&conn, ada.id, math.id),
            Err(SchoolError::NotRegistered { .. })
        ));
    }

    #[test]
    fn deleting_student_or_course_cascades() {
        let conn = open_in_memory().unwrap();
        let (ada, bob, math, art) = seed(&conn);
        register_student_course(&conn, ada.id, math.id).unwrap();
        register_student_course(&conn, bob.id, art.id).unwrap();

        delete_student(&conn, ada.id).unwrap();
        delete_course(&conn, art.id).unwrap();
        assert!(fetch_enrollments(&conn).unwrap().is_empty());
    }
}
