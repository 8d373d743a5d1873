//! Required-field checks, run before anything is encrypted or stored.

use chrono::NaiveDate;

use crate::crypto::Fields;
use crate::error::{Result, RosterError};
use crate::storage::RecordType;

/// Date format for `birth_date`.
pub const BIRTH_DATE_FORMAT: &str = "%d.%m.%Y";

const STUDENT_REQUIRED: &[&str] = &["surname", "first_name", "patronymic", "birth_date", "class"];
const TEACHER_REQUIRED: &[&str] = &["surname", "first_name", "patronymic", "position"];

/// Fields that must be present and non-empty for `record_type`.
pub fn required_fields(record_type: RecordType) -> &'static [&'static str] {
    match record_type {
        RecordType::Student => STUDENT_REQUIRED,
        RecordType::Teacher => TEACHER_REQUIRED,
        RecordType::Parent => &[],
    }
}

fn value<'a>(fields: &'a Fields, name: &str) -> &'a str {
    fields.get(name).map(|v| v.trim()).unwrap_or("")
}

/// Check `fields` against the rules for `record_type`.
///
/// # Errors
///
/// Returns `RosterError::Validation` naming every missing field, or the
/// malformed birth date.
pub fn validate_fields(record_type: RecordType, fields: &Fields) -> Result<()> {
    let missing: Vec<&str> = required_fields(record_type)
        .iter()
        .copied()
        .filter(|name| value(fields, name).is_empty())
        .collect();
    if !missing.is_empty() {
        return Err(RosterError::Validation(format!(
            "Missing required fields for {}: {}",
            record_type,
            missing.join(", ")
        )));
    }

    if record_type == RecordType::Student {
        let birth_date = value(fields, "birth_date");
        NaiveDate::parse_from_str(birth_date, BIRTH_DATE_FORMAT).map_err(|_| {
            RosterError::Validation(format!(
                "birth_date '{}' is not a valid DD.MM.YYYY date",
                birth_date
            ))
        })?;
    }

    if fields.values().all(|v| v.trim().is_empty()) {
        return Err(RosterError::Validation(format!(
            "At least one field must be filled for {}",
            record_type
        )));
    }

    Ok(())
}

/// Short plain-text label for a record: "surname first_name patronymic".
pub fn describe(fields: &Fields) -> String {
    ["surname", "first_name", "patronymic"]
        .iter()
        .map(|name| value(fields, name))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
