use serde::{Deserialize, Serialize};

pub const ROLE_USER: &str = "user";
pub const ROLE_LIBRARIAN: &str = "librarian";

/// A catalog entry. `serial_number` is the identity key; uniqueness is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub author: String,
    pub title: String,
    pub serial_number: i64,
    pub checked_out: bool,
}

impl Book {
    pub fn new(
        author: impl Into<String>,
        title: impl Into<String>,
        serial_number: i64,
        checked_out: bool,
    ) -> Self {
        Self {
            author: author.into(),
            title: title.into(),
            serial_number,
            checked_out,
        }
    }
}

/// A catalog account. The password is stored in plaintext, as in the file format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub password: String,
    pub role: String,
}

impl User {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        password: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            password: password.into(),
            role: role.into(),
        }
    }

    pub fn is_librarian(&self) -> bool {
        self.role.eq_ignore_ascii_case(ROLE_LIBRARIAN)
    }
}

/// How typed fields (integers, booleans) that fail to parse are handled.
///
/// The same rule applies to every typed field of every entity:
/// - `Strict` rejects the record with a malformed-record error.
/// - `Lenient` substitutes the type default (`0`, `false`) and reports a
///   [`FieldIssue`] next to the decoded record.
///
/// A wrong field count is always an error under both policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    Strict,
    #[default]
    Lenient,
}

/// A typed field that was replaced by its default under [`ParsePolicy::Lenient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// 1-based line in the source file, 0 when decoded from a bare line.
    pub line: usize,
    pub field: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    pub record: T,
    pub issues: Vec<FieldIssue>,
}

/// Result of loading a whole file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub issues: Vec<FieldIssue>,
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            issues: Vec::new(),
        }
    }
}
