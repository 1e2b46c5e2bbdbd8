use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::LoadError;
use crate::models::StudentRecord;
use crate::session::{LoadOutcome, Session};

pub fn parse_student(text: &str) -> Result<StudentRecord, LoadError> {
    let value: Value = serde_json::from_str(text)?;
    let kind = match value {
        Value::Object(_) => return Ok(serde_json::from_value(value)?),
        Value::Array(_) => "an array",
        Value::String(_) => "a string",
        Value::Number(_) => "a number",
        Value::Bool(_) => "a boolean",
        Value::Null => "null",
    };
    Err(LoadError::NotAnObject(kind))
}

pub async fn read_student(path: &Path) -> Result<StudentRecord, LoadError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(bytes = text.len(), "read {}", path.display());
    parse_student(&text)
}

/// Reads `path` and hands the result to the session. The ticket is taken
/// before the read so a newer load started meanwhile wins.
pub async fn load_into(session: &mut Session, path: &Path) -> Result<LoadOutcome, LoadError> {
    let ticket = session.begin_load();
    let record = read_student(path).await?;
    Ok(session.complete_load(ticket, path, record))
}
