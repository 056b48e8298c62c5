//! Read-only access to human evaluation labels.
//!
//! Labels live in `labels_<attempt id>.json` files written by the evaluation
//! UI. This crate only reads them; files that fail to parse are skipped.

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;

const LABEL_PREFIX: &str = "labels_";
const LABEL_SUFFIX: &str = ".json";

/// Fields that identify a label file rather than describe the attempt
const IDENTITY_FIELDS: &[&str] = &["attemptId", "geneName", "timestamp"];

/// Attempt id encoded in a label filename, if it is one.
pub fn attempt_id_from_label_file(file_name: &str) -> Option<&str> {
    file_name
        .strip_prefix(LABEL_PREFIX)?
        .strip_suffix(LABEL_SUFFIX)
        .filter(|id| !id.is_empty())
}

/// Load every `labels_<id>.json` in `labels_dir`, keyed by attempt id.
///
/// A missing directory yields an empty map.
pub fn load_labels(labels_dir: &Path) -> Result<BTreeMap<String, Value>> {
    let mut labels = BTreeMap::new();
    if !labels_dir.is_dir() {
        return Ok(labels);
    }

    for entry in std::fs::read_dir(labels_dir)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().to_string();
        let Some(attempt_id) = attempt_id_from_label_file(&file_name) else {
            continue;
        };

        match read_label_file(&entry.path()) {
            Ok(value) => {
                labels.insert(attempt_id.to_string(), value);
            }
            Err(e) => log::warn!("Error reading labels file {}: {}", file_name, e),
        }
    }

    log::debug!("Loaded {} label files from {}", labels.len(), labels_dir.display());
    Ok(labels)
}

fn read_label_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Per-field value counts across label files, most common first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelDistributions {
    pub files: usize,
    pub fields: BTreeMap<String, Vec<(String, usize)>>,
}

impl LabelDistributions {
    /// Total non-empty responses recorded for `field`.
    pub fn total(&self, field: &str) -> usize {
        self.fields
            .get(field)
            .map(|counts| counts.iter().map(|(_, n)| n).sum())
            .unwrap_or(0)
    }
}

fn value_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() || s == "null" => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Count values per field over a set of label documents, skipping identity
/// fields and null/empty values. Ties keep first-seen order.
pub fn distributions<'a, I>(documents: I) -> LabelDistributions
where
    I: IntoIterator<Item = &'a Value>,
{
    // field -> (value -> (count, first seen))
    let mut raw: BTreeMap<String, BTreeMap<String, (usize, usize)>> = BTreeMap::new();
    let mut files = 0;
    let mut seen = 0;

    for doc in documents {
        let Some(object) = doc.as_object() else {
            continue;
        };
        files += 1;
        for (field, value) in object {
            if IDENTITY_FIELDS.contains(&field.as_str()) {
                continue;
            }
            let Some(key) = value_key(value) else {
                continue;
            };
            let slot = raw
                .entry(field.clone())
                .or_default()
                .entry(key)
                .or_insert((0, seen));
            slot.0 += 1;
            seen += 1;
        }
    }

    let fields = raw
        .into_iter()
        .map(|(field, counts)| {
            let mut counts: Vec<(String, usize, usize)> = counts
                .into_iter()
                .map(|(value, (count, first))| (value, count, first))
                .collect();
            counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
            let counts = counts.into_iter().map(|(v, n, _)| (v, n)).collect();
            (field, counts)
        })
        .collect();

    LabelDistributions { files, fields }
}
