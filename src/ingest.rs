use std::path::Path;

use anyhow::Context;
use log::{debug, warn};
use serde_json::Value;

use crate::models::StudentRecord;

/// Reads an "all users" snapshot: a JSON array of student records.
///
/// Malformed platform data inside a record decodes as absent; only entries
/// that are not student records at all are logged and skipped.
pub async fn load_snapshot(path: &Path) -> anyhow::Result<Vec<StudentRecord>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    parse_snapshot(&content).with_context(|| format!("invalid snapshot {}", path.display()))
}

pub fn parse_snapshot(content: &str) -> anyhow::Result<Vec<StudentRecord>> {
    let entries: Vec<Value> =
        serde_json::from_str(content).context("snapshot must be a JSON array of students")?;
    let total = entries.len();
    let mut students = Vec::with_capacity(total);

    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<StudentRecord>(entry) {
            Ok(student) => students.push(student),
            Err(err) => warn!("skipping snapshot entry {index}: {err}"),
        }
    }

    debug!("decoded {} of {} snapshot entries", students.len(), total);
    Ok(students)
}
