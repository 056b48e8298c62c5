use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::{Result, VizError};

/// Image extensions recognised as evidence figures (lowercase)
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp"];

/// Name fragments that mark a figure as secondary evidence
const SECONDARY_KEYWORDS: &[&str] = &["single", "cell", "segmentation", "composite", "comparison"];

/// Extensions listed in an attempt's file inventory
const LISTED_EXTENSIONS: &[&str] = &["png", "jpg", "md", "csv", "json"];

/// How strongly a figure documents the finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FigureKind {
    /// Filename contains "comprehensive"; the primary evidence image.
    Comprehensive,
    /// Single-cell, segmentation, composite or comparison figures.
    Secondary,
}

/// An evidence figure, addressed by its web path under the results root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Figure {
    pub path: String,
    pub kind: FigureKind,
}

/// A file sitting directly in an attempt folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptFile {
    pub name: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Everything one recursive pass over an attempt folder yields
#[derive(Debug, Clone, Default)]
pub struct AttemptWalk {
    /// Comprehensive figures first, then secondary, each sorted by path.
    pub figures: Vec<Figure>,
    /// File names of CSV/PNG outputs anywhere in the folder, in walk order.
    pub data_file_names: Vec<String>,
}

/// Classify a filename as an evidence figure, if it is one.
pub fn classify_figure(file_name: &str) -> Option<FigureKind> {
    let lower = file_name.to_lowercase();
    let extension = lower.rsplit_once('.').map(|(_, ext)| ext)?;
    if !IMAGE_EXTENSIONS.contains(&extension) {
        return None;
    }

    if lower.contains("comprehensive") {
        Some(FigureKind::Comprehensive)
    } else if SECONDARY_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Some(FigureKind::Secondary)
    } else {
        None
    }
}

/// Render `path` relative to `root` with forward slashes, for use in URLs.
pub fn web_path(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| {
        VizError::InvalidInput(format!(
            "{} is outside the results root {}",
            path.display(),
            root.display()
        ))
    })?;

    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

/// Recursively walk one attempt folder collecting evidence figures and the
/// names of its data outputs. Unreadable entries below the folder are skipped.
pub fn walk_attempt(results_root: &Path, attempt_dir: &Path) -> Result<AttemptWalk> {
    let mut walk = AttemptWalk::default();

    for entry in WalkDir::new(attempt_dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        let lower = file_name.to_lowercase();
        if lower.ends_with(".csv") || lower.ends_with(".png") {
            walk.data_file_names.push(file_name.clone());
        }

        if let Some(kind) = classify_figure(&file_name) {
            walk.figures.push(Figure {
                path: web_path(results_root, entry.path())?,
                kind,
            });
        }
    }

    walk.figures
        .sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.path.cmp(&b.path)));

    log::debug!(
        "Found {} figures in {}",
        walk.figures.len(),
        attempt_dir.display()
    );
    Ok(walk)
}

/// Non-hidden files directly inside `attempt_dir` with a listed extension,
/// sorted by name.
pub fn list_attempt_files(attempt_dir: &Path) -> Result<Vec<AttemptFile>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(attempt_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }

        let extension = Path::new(&name)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();
        if !LISTED_EXTENSIONS.contains(&extension.as_str()) {
            continue;
        }

        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }

        files.push(AttemptFile {
            name,
            size: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}
