//! Parsing helpers for record types and `key=value` fields.

use std::path::Path;

use roster_core::{Fields, RecordType};

use crate::errors::CliError;

/// Parse a record type argument.
pub fn parse_record_type(value: &str) -> anyhow::Result<RecordType> {
    value
        .parse::<RecordType>()
        .map_err(|e| CliError::invalid_input(e.to_string()).into())
}

/// Parse one `key=value` argument. The value may itself contain `=`.
fn parse_field(raw: &str) -> anyhow::Result<(String, String)> {
    let (key, value) = raw.split_once('=').ok_or_else(|| {
        CliError::invalid_input(format!("Invalid field '{}' (expected key=value)", raw))
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::invalid_input(format!("Field name missing in '{}'", raw)).into());
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Parse repeated `--field key=value` arguments. Later keys win.
pub fn parse_fields(raw: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    raw.iter().map(|item| parse_field(item)).collect()
}

/// Apply parsed pairs to `fields`. An empty value removes the key.
pub fn merge_fields(fields: &mut Fields, pairs: Vec<(String, String)>) {
    for (key, value) in pairs {
        if value.is_empty() {
            fields.remove(&key);
        } else {
            fields.insert(key, value);
        }
    }
}

/// Read a JSON object of fields from a file. Non-string scalars are
/// stringified; nested values are rejected.
pub fn read_fields_file(path: &Path) -> anyhow::Result<Fields> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    let value: serde_json::Value = serde_json::from_str(&contents).map_err(|e| {
        CliError::invalid_input(format!("{} is not valid JSON: {}", path.display(), e))
    })?;
    let object = value.as_object().ok_or_else(|| {
        CliError::invalid_input(format!("{} must contain a JSON object", path.display()))
    })?;

    let mut fields = Fields::new();
    for (key, value) in object {
        let text = match value {
            serde_json::Value::String(s) => s.trim().to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Null => continue,
            _ => {
                return Err(CliError::invalid_input(format!(
                    "Field '{}' in {} must be a plain value",
                    key,
                    path.display()
                ))
                .into())
            }
        };
        if !text.is_empty() {
            fields.insert(key.clone(), text);
        }
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_fields() {
        let pairs = parse_fields(&[
            "surname=Ivanova".to_string(),
            " note = a=b ".to_string(),
        ])
        .unwrap();
        assert_eq!(
            pairs,
            vec![
                ("surname".to_string(), "Ivanova".to_string()),
                ("note".to_string(), "a=b".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_field_rejects_missing_separator_or_key() {
        assert!(parse_fields(&["surname".to_string()]).is_err());
        assert!(parse_fields(&["=value".to_string()]).is_err());
    }

    #[test]
    fn test_merge_removes_empty_values() {
        let mut fields = Fields::new();
        fields.insert("phone".to_string(), "123".to_string());
        merge_fields(
            &mut fields,
            vec![
                ("phone".to_string(), String::new()),
                ("email".to_string(), "a@b.c".to_string()),
            ],
        );
        assert!(!fields.contains_key("phone"));
        assert_eq!(fields["email"], "a@b.c");
    }

    #[test]
    fn test_read_fields_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("student.json");
        std::fs::write(
            &path,
            r#"{"surname": "Ivanova", "class": 7, "skip": null, "empty": " "}"#,
        )
        .unwrap();

        let fields = read_fields_file(&path).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["class"], "7");
    }

    #[test]
    fn test_read_fields_file_rejects_nested() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"children": ["a"]}"#).unwrap();

        assert!(read_fields_file(&path).is_err());
    }

    #[test]
    fn test_parse_record_type() {
        assert_eq!(parse_record_type("Teacher").unwrap(), RecordType::Teacher);
        assert!(parse_record_type("janitor").is_err());
    }
}
