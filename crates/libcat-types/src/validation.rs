//! Field rules shared by the REST layer (through [`garde`] adapters) and the catalog importer.
//!
//! Rules never touch the store, uniqueness is checked by the store itself.

use crate::error::{Result, ValidationError};

pub const ISBN_LENGTH: usize = 13;

const LETTERS_SPACES: &str = "must contain only letters and spaces";
const LETTERS_SPACES_HYPHENS: &str = "must contain only letters, spaces and hyphens";
const GENRE_CHARS: &str = "must contain only letters, spaces, hyphens and apostrophes";
const USERNAME_CHARS: &str = "must be lowercase and must not contain @, - or |";
const SURROUNDING_SPACES: &str = "must not start or end with spaces";

/// Non blank and trimmed, the importer matches on trimmed cells.
fn require(field: &'static str, value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::RequiredFieldMissing { field })
    } else if trimmed.len() != value.len() {
        Err(ValidationError::InvalidFormat {
            field,
            reason: SURROUNDING_SPACES,
        })
    } else {
        Ok(())
    }
}

fn only_letters_and(
    field: &'static str,
    value: &str,
    extra: &[char],
    reason: &'static str,
) -> Result<()> {
    if value
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ' || extra.contains(&c))
    {
        Ok(())
    } else {
        Err(ValidationError::InvalidFormat { field, reason })
    }
}

/// Author name or surname, collection name
pub fn check_name(field: &'static str, value: &str) -> Result<()> {
    require(field, value)?;
    only_letters_and(field, value, &[], LETTERS_SPACES)
}

/// Book title, comment name
pub fn check_title(field: &'static str, value: &str) -> Result<()> {
    require(field, value)?;
    only_letters_and(field, value, &['-'], LETTERS_SPACES_HYPHENS)
}

pub fn check_genre_name(value: &str) -> Result<()> {
    require("name", value)?;
    only_letters_and("name", value, &['-', '\''], GENRE_CHARS)
}

/// Numeric check comes first, so a short value with a letter is reported as non numeric.
pub fn check_isbn(value: &str) -> Result<()> {
    require("isbn", value)?;
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::NonNumericIsbn);
    }
    let length = value.chars().count();
    if length != ISBN_LENGTH {
        return Err(ValidationError::InvalidIsbn { length });
    }
    Ok(())
}

pub fn check_username(value: &str) -> Result<()> {
    require("name", value)?;
    let has_forbidden = value.contains(['@', '-', '|']);
    if has_forbidden || value.to_lowercase() != value {
        Err(ValidationError::InvalidFormat {
            field: "name",
            reason: USERNAME_CHARS,
        })
    } else {
        Ok(())
    }
}

pub fn validate_author(name: &str, surname: &str) -> Result<()> {
    check_name("name", name)?;
    check_name("surname", surname)
}

pub fn validate_book(title: &str, isbn: &str) -> Result<()> {
    check_title("title", title)?;
    check_isbn(isbn)
}

/// Adapters for `#[garde(custom(...))]` attributes
pub mod rules {
    use super::*;

    fn garde_error(error: ValidationError) -> garde::Error {
        let message = match error {
            ValidationError::RequiredFieldMissing { .. } => "is required".to_string(),
            ValidationError::InvalidFormat { reason, .. } => reason.to_string(),
            e => e.to_string(),
        };
        garde::Error::new(message)
    }

    pub fn name(value: &str, _ctx: &()) -> garde::Result {
        check_name("name", value).map_err(garde_error)
    }

    pub fn title(value: &str, _ctx: &()) -> garde::Result {
        check_title("title", value).map_err(garde_error)
    }

    pub fn genre_name(value: &str, _ctx: &()) -> garde::Result {
        check_genre_name(value).map_err(garde_error)
    }

    pub fn isbn(value: &str, _ctx: &()) -> garde::Result {
        check_isbn(value).map_err(garde_error)
    }

    pub fn username(value: &str, _ctx: &()) -> garde::Result {
        check_username(value).map_err(garde_error)
    }
}
