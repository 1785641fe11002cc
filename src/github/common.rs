use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::TimeZone;

// Both the feed and the GDPR export write timestamps in this exact shape.
const WIRE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub(crate) fn parse_dt(value: &str) -> anyhow::Result<chrono::DateTime<chrono::Utc>> {
    let naive = chrono::NaiveDateTime::parse_from_str(value, WIRE_DATETIME_FORMAT)
        .with_context(|| format!("invalid timestamp: {value}"))?;
    Ok(chrono::Utc.from_utc_datetime(&naive))
}

pub(crate) fn json_files_sorted(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to read directory {}", dir.display()))?
            .path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("json") && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

pub(crate) fn read_json_array(path: &Path) -> anyhow::Result<Vec<serde_json::Value>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("invalid JSON in {}", path.display()))?;

    match value {
        serde_json::Value::Array(records) => Ok(records),
        _ => anyhow::bail!("expected a JSON array in {}", path.display()),
    }
}
