//! Error taxonomy for the persistence layer. Every rejection the database
//! functions can produce has its own variant so the UI can print a friendly
//! sentence and tests can match on the exact reason.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchoolError {
    #[error("Invalid email format: '{0}'.")]
    InvalidEmail(String),
    #[error("Age must be positive (got {0}).")]
    InvalidAge(i64),
    #[error("{0} name is required.")]
    EmptyName(&'static str),
    #[error("Course with name '{0}' already exists.")]
    DuplicateCourseName(String),
    #[error("Student ID {0} does not exist.")]
    StudentNotFound(i64),
    #[error("Instructor ID {0} does not exist.")]
    InstructorNotFound(i64),
    #[error("Course ID {0} does not exist.")]
    CourseNotFound(i64),
    #[error("Student {student_id} is already registered for course {course_id}.")]
    AlreadyRegistered { student_id: i64, course_id: i64 },
    #[error("Student {student_id} is not registered for course {course_id}.")]
    NotRegistered { student_id: i64, course_id: i64 },
    #[error("{0} is still referenced by other records.")]
    StillReferenced(String),
    #[error("failed to {action}")]
    Database {
        action: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

pub type Result<T> = std::result::Result<T, SchoolError>;

impl SchoolError {
    /// True for rejections caused by user input rather than the database
    /// itself failing.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, SchoolError::Database { .. })
    }
}
