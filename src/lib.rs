//! School records manager: students, instructors, courses and enrollments in
//! one SQLite file, browsed and edited through a terminal UI.
//!
//! The persistence layer in [`db`] is usable on its own; the binary wires it
//! to [`ui`] through [`Config`].
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod ui;
pub mod validation;

pub use config::Config;
pub use db::{ensure_schema, open_database, open_in_memory};
pub use error::{Result, SchoolError};
pub use models::{Course, CourseListing, Enrollment, Instructor, Student};
pub use ui::{run_app, App};
