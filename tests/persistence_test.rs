use rusqlite::Connection;
use school_manager::db::{
    assign_instructor, create_course, create_instructor, create_student, delete_course,
    delete_instructor, delete_student, fetch_course, fetch_course_listings, fetch_courses,
    fetch_courses_for_student, fetch_enrollments, fetch_students, fetch_students_for_course,
    find_course_id_by_name, find_instructor_id_by_name, register_student_course,
    unregister_student_course, update_course,
};
use school_manager::{open_database, SchoolError};
use tempfile::TempDir;

#[test]
fn data_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("school1.db");

    {
        let conn = open_database(&db_path).unwrap();
        let ada = create_student(&conn, "Ada", 19, "ada@example.com").unwrap();
        let math = create_course(&conn, "Math", None).unwrap();
        register_student_course(&conn, ada.id, math.id).unwrap();
    }

    let conn = open_database(&db_path).unwrap();
    let students = fetch_students(&conn).unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0].email, "ada@example.com");
    assert_eq!(fetch_enrollments(&conn).unwrap().len(), 1);
}

#[test]
fn missing_data_directory_is_created() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("deeper").join("school1.db");

    open_database(&db_path).unwrap();
    assert!(db_path.exists());
}

const LEGACY_SCHEMA: &str = "
    PRAGMA foreign_keys = OFF;
    CREATE TABLE students (
        student_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        age INTEGER NOT NULL,
        email TEXT NOT NULL
    );
    CREATE TABLE instructors (
        instructor_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        age INTEGER NOT NULL,
        email TEXT NOT NULL
    );
    CREATE TABLE courses (
        course_id INTEGER PRIMARY KEY AUTOINCREMENT,
        course_name TEXT NOT NULL,
        instructor_id INTEGER,
        FOREIGN KEY (instructor_id) REFERENCES instructors(instructor_id)
    );
    CREATE TABLE student_courses (
        student_id INTEGER,
        course_id INTEGER,
        PRIMARY KEY (student_id, course_id),
        FOREIGN KEY (student_id) REFERENCES students(student_id),
        FOREIGN KEY (course_id) REFERENCES courses(course_id)
    );";

/// Write a file the way the desktop builds did: no UNIQUE course names, no
/// cascading deletes, foreign keys never switched on.
fn legacy_file(temp_dir: &TempDir, extra_sql: &str) -> std::path::PathBuf {
    let db_path = temp_dir.path().join("legacy.db");
    let conn = Connection::open(&db_path).unwrap();
    conn.execute_batch(LEGACY_SCHEMA).unwrap();
    if !extra_sql.is_empty() {
        conn.execute_batch(extra_sql).unwrap();
    }
    db_path
}

#[test]
fn legacy_schema_is_tolerated() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = legacy_file(&temp_dir, "");

    let conn = open_database(&db_path).unwrap();
    let ada = create_student(&conn, "Ada", 19, "ada@example.com").unwrap();
    let math = create_course(&conn, "Math", None).unwrap();

    let err = create_course(&conn, "Math", None).unwrap_err();
    assert!(matches!(err, SchoolError::DuplicateCourseName(name) if name == "Math"));

    register_student_course(&conn, ada.id, math.id).unwrap();
    let err = register_student_course(&conn, ada.id, math.id).unwrap_err();
    assert!(matches!(err, SchoolError::AlreadyRegistered { .. }));

    let err = delete_student(&conn, ada.id).unwrap_err();
    assert!(matches!(err, SchoolError::StillReferenced(_)));
    assert_eq!(
        err.to_string(),
        format!("Student {} is still referenced by other records.", ada.id)
    );

    unregister_student_course(&conn, ada.id, math.id).unwrap();
    delete_student(&conn, ada.id).unwrap();
}

#[test]
fn legacy_duplicate_course_names_stay_editable() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = legacy_file(
        &temp_dir,
        "INSERT INTO instructors (name, age, email) VALUES ('Noether', 50, 'noether@example.com');
         INSERT INTO courses (course_name) VALUES ('Math'), ('Math'), ('Art');",
    );

    let conn = open_database(&db_path).unwrap();
    update_course(&conn, 2, "Math", Some(1)).unwrap();
    update_course(&conn, 1, "Math", Some(1)).unwrap();
    assert_eq!(fetch_course(&conn, 2).unwrap().instructor_id, Some(1));

    assert!(matches!(
        update_course(&conn, 3, "Math", None),
        Err(SchoolError::DuplicateCourseName(_))
    ));
    assert_eq!(find_course_id_by_name(&conn, "Math").unwrap(), Some(1));
}

#[test]
fn legacy_orphaned_enrollments_are_cleared_on_open() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = legacy_file(
        &temp_dir,
        "INSERT INTO students (name, age, email) VALUES ('Ada', 19, 'ada@example.com');
         INSERT INTO courses (course_name) VALUES ('Math');
         INSERT INTO student_courses VALUES (1, 1);
         DELETE FROM students WHERE student_id = 1;",
    );

    let conn = open_database(&db_path).unwrap();
    assert!(fetch_enrollments(&conn).unwrap().is_empty());
    let leftover: i64 = conn
        .query_row("SELECT COUNT(*) FROM student_courses", [], |row| row.get(0))
        .unwrap();
    assert_eq!(leftover, 0);

    delete_course(&conn, 1).unwrap();
    assert!(fetch_courses(&conn).unwrap().is_empty());
}

#[test]
fn full_workflow() {
    let temp_dir = TempDir::new().unwrap();
    let conn = open_database(&temp_dir.path().join("school1.db")).unwrap();

    let turing = create_instructor(&conn, "Turing", 41, "turing@example.com").unwrap();
    let hopper = create_instructor(&conn, "Hopper", 45, "hopper@example.com").unwrap();
    let logic = create_course(&conn, "Logic", Some(turing.id)).unwrap();
    let compilers = create_course(&conn, "Compilers", None).unwrap();
    assign_instructor(&conn, compilers.id, hopper.id).unwrap();

    let ada = create_student(&conn, "Ada", 19, "ada@example.com").unwrap();
    let bob = create_student(&conn, "Bob", 20, "bob@example.com").unwrap();
    register_student_course(&conn, ada.id, logic.id).unwrap();
    register_student_course(&conn, ada.id, compilers.id).unwrap();
    register_student_course(&conn, bob.id, logic.id).unwrap();

    assert_eq!(find_instructor_id_by_name(&conn, "Hopper").unwrap(), Some(hopper.id));
    assert_eq!(find_course_id_by_name(&conn, "Logic").unwrap(), Some(logic.id));

    let ada_courses: Vec<_> = fetch_courses_for_student(&conn, ada.id)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(ada_courses, ["Compilers", "Logic"]);
    assert_eq!(fetch_students_for_course(&conn, logic.id).unwrap().len(), 2);

    delete_instructor(&conn, turing.id).unwrap();
    let listings = fetch_course_listings(&conn).unwrap();
    let logic_listing = listings.iter().find(|l| l.course.id == logic.id).unwrap();
    assert_eq!(logic_listing.course.instructor_id, None);
    assert_eq!(logic_listing.instructor_label(), "-");

    delete_course(&conn, logic.id).unwrap();
    let remaining = fetch_enrollments(&conn).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].course_name, "Compilers");

    delete_student(&conn, ada.id).unwrap();
    assert!(fetch_enrollments(&conn).unwrap().is_empty());
}
