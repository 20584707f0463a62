use rusqlite::Connection;

use crate::error::{Result, SchoolError};
use crate::models::Student;

use super::people::{self, PersonRecord};

impl PersonRecord for Student {
    const ENTITY: &'static str = "Student";
    const TABLE: &'static str = "students";
    const ID_COLUMN: &'static str = "student_id";

    fn new(id: i64, name: String, age: i64, email: String) -> Self {
        Student {
            id,
            name,
            age,
            email,
        }
    }

    fn not_found(id: i64) -> SchoolError {
        SchoolError::StudentNotFound(id)
    }
}

/// Validate and insert a student, returning the hydrated row.
pub fn create_student(conn: &Connection, name: &str, age: i64, email: &str) -> Result<Student> {
    people::create(conn, name, age, email)
}

/// Every student ordered by id.
pub fn fetch_students(conn: &Connection) -> Result<Vec<Student>> {
    people::fetch_all(conn)
}

pub fn fetch_student(conn: &Connection, id: i64) -> Result<Student> {
    people::fetch_one(conn, id)
}

/// Students whose name contains `term` or whose id is `term`.
pub fn filter_students(conn: &Connection, term: &str) -> Result<Vec<Student>> {
    people::filter(conn, term)
}

pub fn update_student(conn: &Connection, id: i64, name: &str, age: i64, email: &str) -> Result<()> {
    people::update::<Student>(conn, id, name, age, email)
}

/// Remove a student. Their enrollments cascade away with them.
pub fn delete_student(conn: &Connection, id: i64) -> Result<()> {
    people::delete::<Student>(conn, id)
}

pub(super) fn student_exists(conn: &Connection, id: i64) -> Result<bool> {
    people::exists::<Student>(conn, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn surrounding_whitespace_in_email_is_dropped() {
        let conn = open_in_memory().unwrap();
        let student = create_student(&conn, "A", 1, " a@b.com").unwrap();
        assert_eq!(student.email, "a@b.com");
        assert_eq!(fetch_student(&conn, student.id).unwrap().email, "a@b.com");

        update_student(&conn, student.id, "A", 2, "c@d.org  ").unwrap();
        assert_eq!(fetch_student(&conn, student.id).unwrap().email, "c@d.org");
    }

    #[test]
    fn create_fetch_update_delete_round_trip() {
        let conn = open_in_memory().unwrap();

        let created = create_student(&conn, "  Ada Lovelace ", 19, "ada@example.com").unwrap();
        assert_eq!(created.name, "Ada Lovelace");
        assert_eq!(fetch_student(&conn, created.id).unwrap(), created);

        update_student(&conn, created.id, "Ada King", 20, "ada.king@example.com").unwrap();
        let updated = fetch_student(&conn, created.id).unwrap();
        assert_eq!(updated.name, "Ada King");
        assert_eq!(updated.age, 20);
        assert_eq!(updated.email, "ada.king@example.com");

        delete_student(&conn, created.id).unwrap();
        assert!(matches!(
            fetch_student(&conn, created.id),
            Err(SchoolError::StudentNotFound(id)) if id == created.id
        ));
    }

    #[test]
    fn rejects_invalid_input_without_writing() {
        let conn = open_in_memory().unwrap();

        assert!(matches!(
            create_student(&conn, "Bob", 20, "bob-at-example"),
            Err(SchoolError::InvalidEmail(_))
        ));
        assert!(matches!(
            create_student(&conn, "Bob", 0, "bob@example.com"),
            Err(SchoolError::InvalidAge(0))
        ));
        assert!(matches!(
            create_student(&conn, " ", 20, "bob@example.com"),
            Err(SchoolError::EmptyName("Student"))
        ));
        assert!(fetch_students(&conn).unwrap().is_empty());
    }

    #[test]
    fn update_validates_and_reports_missing_rows() {
        let conn = open_in_memory().unwrap();
        let student = create_student(&conn, "Cy", 30, "cy@example.com").unwrap();

        assert!(matches!(
            update_student(&conn, student.id, "Cy", -1, "cy@example.com"),
            Err(SchoolError::InvalidAge(-1))
        ));
        assert_eq!(fetch_student(&conn, student.id).unwrap().age, 30);

        assert!(matches!(
            update_student(&conn, 999, "Ghost", 30, "ghost@example.com"),
            Err(SchoolError::StudentNotFound(999))
        ));
        assert!(matches!(
            delete_student(&conn, 999),
            Err(SchoolError::StudentNotFound(999))
        ));
    }

    #[test]
    fn filter_matches_name_fragment_or_id() {
        let conn = open_in_memory().unwrap();
        let ada = create_student(&conn, "Ada", 19, "ada@example.com").unwrap();
        let grace = create_student(&conn, "Grace", 22, "grace@example.com").unwrap();
        create_student(&conn, "Linus", 21, "linus@example.com").unwrap();

        let by_name: Vec<_> = filter_students(&conn, "ra")
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(by_name, vec![grace.id]);

        let by_id = filter_students(&conn, &ada.id.to_string()).unwrap();
        assert_eq!(by_id, vec![ada.clone()]);

        assert_eq!(filter_students(&conn, "").unwrap().len(), 3);
        assert!(filter_students(&conn, "zzz").unwrap().is_empty());
    }

    #[test]
    fn fetch_orders_by_id() {
        let conn = open_in_memory().unwrap();
        let first = create_student(&conn, "Zed", 18, "zed@example.com").unwrap();
        let second = create_student(&conn, "Amy", 18, "amy@example.com").unwrap();

        let ids: Vec<_> = fetch_students(&conn).unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }
}
