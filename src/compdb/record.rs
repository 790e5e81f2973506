use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::path::Path;

use crate::compdb::CompilationDatabaseError;

/// One entry of a compilation database
///
/// `file` and `command` are validated and extracted up front; the original
/// JSON object is retained so that rewriting a database preserves every
/// field a build system emitted (`directory`, `output`, `arguments`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRecord {
    /// Path of the translation unit, as written in the database
    pub file: String,
    /// Full compiler invocation string
    pub command: String,
    fields: Map<String, Value>,
}

impl InvocationRecord {
    /// Validate a JSON value as an invocation record
    ///
    /// `index` is the position in the database and only labels errors.
    pub fn from_value(index: usize, value: Value) -> Result<Self, CompilationDatabaseError> {
        let fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(CompilationDatabaseError::MalformedEntry {
                    index,
                    reason: format!("expected an object, found {}", json_type_name(&other)),
                });
            }
        };

        let file = required_string(index, &fields, "file")?;
        let command = required_string(index, &fields, "command")?;

        Ok(Self {
            file,
            command,
            fields,
        })
    }

    /// The `directory` field, which the indexer itself does not use
    pub fn directory(&self) -> Option<&str> {
        self.fields.get("directory").and_then(Value::as_str)
    }

    /// All fields of the original entry
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Serializes as the original JSON object, not as the extracted fields
impl Serialize for InvocationRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.fields.serialize(serializer)
    }
}

/// Split a parsed compilation database into validated records
///
/// The whole database is rejected on the first malformed entry.
pub fn records_from_value(
    value: Value,
    origin: &Path,
) -> Result<Vec<InvocationRecord>, CompilationDatabaseError> {
    let entries = match value {
        Value::Array(entries) => entries,
        other => {
            return Err(CompilationDatabaseError::ParseError {
                path: origin.to_string_lossy().to_string(),
                error: format!(
                    "compilation database must be a JSON array, found {}",
                    json_type_name(&other)
                ),
            });
        }
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| InvocationRecord::from_value(index, entry))
        .collect()
}

fn required_string(
    index: usize,
    fields: &Map<String, Value>,
    key: &str,
) -> Result<String, CompilationDatabaseError> {
    match fields.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(CompilationDatabaseError::MalformedEntry {
            index,
            reason: format!("'{key}' must be a string, found {}", json_type_name(other)),
        }),
        None => Err(CompilationDatabaseError::MalformedEntry {
            index,
            reason: format!("missing required field '{key}'"),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
