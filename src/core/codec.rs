//! Line <-> entity mapping for the flat comma-delimited format.
//!
//! Fields are joined by a bare `,` with no quoting or escaping, so a comma
//! inside an author, title or name shifts every following field. Such lines
//! fail the field-count check instead of decoding into the wrong shape.

use crate::domain::model::{Book, Decoded, FieldIssue, ParsePolicy, User};
use crate::domain::ports::Record;
use crate::utils::error::{CatalogError, Result};

pub const DELIMITER: char = ',';

pub fn split_fields(line: &str) -> Vec<&str> {
    line.split(DELIMITER).collect()
}

pub fn decode<T: Record>(line: &str, policy: ParsePolicy) -> Result<Decoded<T>> {
    T::from_fields(&split_fields(line), policy)
}

pub fn decode_book(line: &str, policy: ParsePolicy) -> Result<Decoded<Book>> {
    decode(line, policy)
}

pub fn decode_user(line: &str, policy: ParsePolicy) -> Result<Decoded<User>> {
    decode(line, policy)
}

pub fn encode<T: Record>(record: &T) -> String {
    record.to_fields().join(",")
}

pub fn encode_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn check_field_count<T: Record>(fields: &[&str]) -> Result<()> {
    if fields.len() != T::FIELDS.len() {
        return Err(CatalogError::malformed(format!(
            "expected {} fields ({}), found {}",
            T::FIELDS.len(),
            T::FIELDS.join(","),
            fields.len()
        )));
    }
    Ok(())
}

/// Applies `policy` to one typed field. `parsed` is `None` when the text did not parse.
fn resolve<V: Default>(
    parsed: Option<V>,
    field: &'static str,
    raw: &str,
    policy: ParsePolicy,
    issues: &mut Vec<FieldIssue>,
) -> Result<V> {
    match (parsed, policy) {
        (Some(value), _) => Ok(value),
        (None, ParsePolicy::Strict) => Err(CatalogError::malformed(format!(
            "field '{}' has invalid value '{}'",
            field, raw
        ))),
        (None, ParsePolicy::Lenient) => {
            let value = V::default();
            tracing::warn!(field, value = raw, "invalid field value, using default");
            issues.push(FieldIssue {
                line: 0,
                field,
                value: raw.to_string(),
            });
            Ok(value)
        }
    }
}

fn parse_int(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok()
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

impl Record for Book {
    const FIELDS: &'static [&'static str] = &["author", "title", "serial_number", "checked_out"];

    fn from_fields(fields: &[&str], policy: ParsePolicy) -> Result<Decoded<Self>> {
        check_field_count::<Self>(fields)?;

        let mut issues = Vec::new();
        let serial_number = resolve(
            parse_int(fields[2]),
            "serial_number",
            fields[2],
            policy,
            &mut issues,
        )?;
        let checked_out = resolve(
            parse_bool(fields[3]),
            "checked_out",
            fields[3],
            policy,
            &mut issues,
        )?;

        Ok(Decoded {
            record: Book::new(fields[0], fields[1], serial_number, checked_out),
            issues,
        })
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.author.clone(),
            self.title.clone(),
            self.serial_number.to_string(),
            encode_bool(self.checked_out).to_string(),
        ]
    }
}

impl Record for User {
    const FIELDS: &'static [&'static str] = &["id", "name", "password", "role"];

    fn from_fields(fields: &[&str], policy: ParsePolicy) -> Result<Decoded<Self>> {
        check_field_count::<Self>(fields)?;

        let mut issues = Vec::new();
        let id = resolve(parse_int(fields[0]), "id", fields[0], policy, &mut issues)?;

        Ok(Decoded {
            record: User::new(id, fields[1], fields[2], fields[3]),
            issues,
        })
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.password.clone(),
            self.role.clone(),
        ]
    }
}
