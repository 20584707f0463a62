//! Row types that mirror the SQLite schema. They stay plain data holders so
//! the persistence layer and the TUI can pass them around freely.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A row of the `students` table.
pub struct Student {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A row of the `instructors` table. Same shape as [`Student`], kept as its
/// own type so ids of one kind cannot be handed to the other's queries.
pub struct Instructor {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A row of the `courses` table. `instructor_id` is `None` until someone is
/// assigned to teach it.
pub struct Course {
    pub id: i64,
    pub name: String,
    pub instructor_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A course joined with its instructor's name for list views.
pub struct CourseListing {
    pub course: Course,
    pub instructor_name: Option<String>,
}

impl CourseListing {
    /// Text for the instructor column: the name, the bare id when the row
    /// dangles, or a dash when unassigned.
    pub fn instructor_label(&self) -> String {
        match (&self.instructor_name, self.course.instructor_id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("#{id}"),
            (None, None) => "-".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One row of the `student_courses` join table, hydrated with display names.
pub struct Enrollment {
    pub student_id: i64,
    pub student_name: String,
    pub course_id: i64,
    pub course_name: String,
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.name, self.id)
    }
}

impl fmt::Display for Instructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.name, self.id)
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.name, self.id)
    }
}
