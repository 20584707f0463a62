//! Input checks shared by every write in the persistence layer.

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::error::{Result, SchoolError};

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// Whether `email` looks like `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

pub fn validate_email(email: &str) -> Result<()> {
    if is_valid_email(email) {
        Ok(())
    } else {
        warn!(email, "rejected invalid email");
        Err(SchoolError::InvalidEmail(email.to_string()))
    }
}

pub fn validate_age(age: i64) -> Result<()> {
    if age > 0 {
        Ok(())
    } else {
        warn!(age, "rejected non-positive age");
        Err(SchoolError::InvalidAge(age))
    }
}

/// Trim `name` and reject it when nothing is left. `entity` names the kind of
/// record for the error message ("Student", "Course", ...).
pub fn normalize_name<'a>(entity: &'static str, name: &'a str) -> Result<&'a str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        warn!(entity, "rejected empty name");
        Err(SchoolError::EmptyName(entity))
    } else {
        Ok(trimmed)
    }
}

/// Run the person checks in the order the forms report them: name, email,
/// then age. Returns the trimmed name and email to store.
pub fn validate_person<'a, 'b>(
    entity: &'static str,
    name: &'a str,
    age: i64,
    email: &'b str,
) -> Result<(&'a str, &'b str)> {
    let name = normalize_name(entity, name)?;
    let email = email.trim();
    validate_email(email)?;
    validate_age(age)?;
    Ok((name, email))
}
