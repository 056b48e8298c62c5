//! Attempt scanner: turns a results directory of `attempt_*` folders into
//! typed [`Attempt`] records.
//!
//! The scanner holds no state. Every call re-reads the filesystem, so
//! concurrent scans are independent and need no locking.

mod gene;
mod walker;

pub use gene::{gene_from_file_names, infer_gene_hint, parse_report_name, GeneMatch, UNKNOWN_GENE};
pub use walker::{
    classify_figure, list_attempt_files, walk_attempt, web_path, AttemptFile, AttemptWalk, Figure,
    FigureKind,
};

use std::path::{Path, PathBuf};

use crate::error::{Result, VizError};

/// Folder-name prefix that marks an attempt
pub const ATTEMPT_PREFIX: &str = "attempt_";

/// One research run's output folder
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    /// Folder name, e.g. `attempt_5`.
    pub id: String,
    /// Absolute or root-relative folder location on disk.
    pub dir: PathBuf,
    pub gene: GeneMatch,
    /// Prefix-based guess, only consulted by the UI when `gene` is unparsed.
    pub gene_hint: Option<String>,
    /// Report filename inside the folder, if any. This is the first
    /// `report_*.md` by name and need not be the file `gene` was parsed from.
    pub report_file: Option<String>,
    /// Web path of the report under the results root.
    pub report_path: Option<String>,
    pub figures: Vec<Figure>,
    pub files: Vec<AttemptFile>,
}

impl Attempt {
    /// The part of the id after `attempt_`.
    pub fn number(&self) -> &str {
        self.id.strip_prefix(ATTEMPT_PREFIX).unwrap_or(&self.id)
    }

    pub fn display_name(&self) -> String {
        format!("Attempt {}", self.number())
    }

    pub fn figure_paths(&self) -> Vec<String> {
        self.figures.iter().map(|f| f.path.clone()).collect()
    }

    pub fn figure_count(&self) -> usize {
        self.figures.len()
    }

    /// Filesystem location of the report, if the attempt has one.
    pub fn report_fs_path(&self) -> Option<PathBuf> {
        self.report_file.as_ref().map(|name| self.dir.join(name))
    }

    /// Placeholder for a folder whose contents could not be read.
    fn empty(id: String, dir: PathBuf) -> Self {
        Self {
            id,
            dir,
            gene: GeneMatch::Unparsed,
            gene_hint: None,
            report_file: None,
            report_path: None,
            figures: Vec::new(),
            files: Vec::new(),
        }
    }
}

/// Whether `name` can be an attempt id: `attempt_` prefix, a single path segment.
pub fn is_attempt_id(name: &str) -> bool {
    name.starts_with(ATTEMPT_PREFIX)
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
}

/// Numeric attempts first in numeric order, then the rest by id.
fn sort_key(attempt: &Attempt) -> (bool, u64, String) {
    let number = attempt.number().parse::<u64>().ok();
    (number.is_none(), number.unwrap_or(0), attempt.id.clone())
}

/// Scan every immediate `attempt_*` subdirectory of `results_root`.
///
/// Fails with `NotFound` when the root is missing and `Io` when it cannot be
/// listed. A folder that cannot be read is still reported, with an unknown
/// gene and no figures.
pub fn scan_attempts(results_root: &Path) -> Result<Vec<Attempt>> {
    let entries = std::fs::read_dir(results_root).map_err(|e| {
        VizError::from_read(e, &format!("results root {}", results_root.display()))
    })?;

    let mut attempts = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {}", results_root.display(), e);
                continue;
            }
        };
        let id = entry.file_name().to_string_lossy().to_string();
        let dir = entry.path();
        if !is_attempt_id(&id) || !dir.is_dir() {
            continue;
        }

        match scan_attempt_dir(results_root, &id) {
            Ok(attempt) => attempts.push(attempt),
            Err(e) => {
                log::warn!("Could not read {}: {}", dir.display(), e);
                attempts.push(Attempt::empty(id, dir));
            }
        }
    }

    attempts.sort_by_key(sort_key);
    log::info!(
        "Scanned {} attempts in {}",
        attempts.len(),
        results_root.display()
    );
    Ok(attempts)
}

/// Load a single attempt by id.
///
/// Returns `NotFound` when the id is malformed or no such folder exists.
pub fn load_attempt(results_root: &Path, id: &str) -> Result<Attempt> {
    if !is_attempt_id(id) {
        return Err(VizError::NotFound(format!("Attempt {} not found", id)));
    }

    let dir = results_root.join(id);
    if !dir.is_dir() {
        return Err(VizError::NotFound(format!("Attempt {} not found", id)));
    }

    scan_attempt_dir(results_root, id)
}

/// Extract gene, report and figures from one attempt folder.
fn scan_attempt_dir(results_root: &Path, id: &str) -> Result<Attempt> {
    let dir = results_root.join(id);
    let files = list_attempt_files(&dir).map_err(|e| match e {
        VizError::Io(io) => VizError::from_read(io, &format!("attempt {}", id)),
        other => other,
    })?;

    // Ties between several reports go to the first name in sorted order.
    let report_file = files
        .iter()
        .map(|f| f.name.as_str())
        .find(|name| name.starts_with("report_") && name.ends_with(".md"))
        .map(str::to_string);
    let gene = gene_from_file_names(files.iter().map(|f| f.name.as_str()));

    let walk = walk_attempt(results_root, &dir)?;
    let gene_hint = if gene.is_parsed() {
        None
    } else {
        infer_gene_hint(walk.data_file_names.iter().map(String::as_str))
    };

    let report_path = report_file.as_ref().map(|name| format!("{}/{}", id, name));

    log::debug!(
        "Attempt {}: gene={} report={:?} figures={}",
        id,
        gene,
        report_file,
        walk.figures.len()
    );

    Ok(Attempt {
        id: id.to_string(),
        dir,
        gene,
        gene_hint,
        report_file,
        report_path,
        figures: walk.figures,
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_attempt(root: &Path, id: &str, files: &[&str]) {
        let dir = root.join(id);
        fs::create_dir_all(&dir).unwrap();
        for f in files {
            fs::write(dir.join(f), b"x").unwrap();
        }
    }

    #[test]
    fn test_scan_counts_attempt_folders_only() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        make_attempt(root, "attempt_1", &["report_BRCA1_findings.md"]);
        make_attempt(root, "attempt_2", &[]);
        make_attempt(root, "attempt_10", &["notes.md"]);
        make_attempt(root, "other_run", &["report_X_y.md"]);
        fs::write(root.join("attempt_99"), "a file, not a folder").unwrap();

        let attempts = scan_attempts(root).unwrap();
        assert_eq!(attempts.len(), 3);
        let ids: Vec<&str> = attempts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["attempt_1", "attempt_2", "attempt_10"]);
    }

    #[test]
    fn test_gene_from_report_name() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        make_attempt(root, "attempt_1", &["report_BRCA1_findings.md"]);

        let attempt = load_attempt(root, "attempt_1").unwrap();
        assert_eq!(attempt.gene.as_str(), "BRCA1");
        assert_eq!(attempt.report_path.as_deref(), Some("attempt_1/report_BRCA1_findings.md"));
        assert_eq!(attempt.gene_hint, None);
    }

    #[test]
    fn test_missing_report_is_unknown_not_error() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        make_attempt(root, "attempt_2", &["data.csv"]);

        let attempt = load_attempt(root, "attempt_2").unwrap();
        assert_eq!(attempt.gene, GeneMatch::Unparsed);
        assert_eq!(attempt.gene.as_str(), "unknown");
        assert!(attempt.report_path.is_none());
        assert!(attempt.figures.is_empty());
    }

    #[test]
    fn test_gene_hint_only_when_unparsed() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        make_attempt(
            root,
            "attempt_4",
            &["KRAS_comprehensive.png", "KRAS_counts.csv"],
        );

        let attempt = load_attempt(root, "attempt_4").unwrap();
        assert_eq!(attempt.gene.as_str(), "unknown");
        assert_eq!(attempt.gene_hint.as_deref(), Some("KRAS"));
        assert_eq!(attempt.figure_count(), 1);
    }

    #[test]
    fn test_multiple_reports_first_in_sorted_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        make_attempt(
            root,
            "attempt_6",
            &["report_ZEB1_b.md", "report_AKT1_a.md"],
        );

        let attempt = load_attempt(root, "attempt_6").unwrap();
        assert_eq!(attempt.gene.as_str(), "AKT1");
        assert_eq!(attempt.report_file.as_deref(), Some("report_AKT1_a.md"));
    }

    #[test]
    fn test_report_file_and_gene_source_can_differ() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        make_attempt(root, "attempt_3", &["report_TP53_a.md", "report_A.md"]);

        let attempt = load_attempt(root, "attempt_3").unwrap();
        assert_eq!(attempt.report_file.as_deref(), Some("report_A.md"));
        assert_eq!(
            attempt.gene,
            GeneMatch::Parsed {
                gene: "TP53".to_string(),
                report: "report_TP53_a.md".to_string(),
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_dangling_entries() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        make_attempt(root, "attempt_1", &["report_BRCA1_findings.md"]);
        std::os::unix::fs::symlink(root.join("missing"), root.join("attempt_2")).unwrap();

        let attempts = scan_attempts(root).unwrap();
        let ids: Vec<&str> = attempts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["attempt_1"]);
    }

    #[test]
    fn test_end_to_end_detail() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        make_attempt(
            root,
            "attempt_5",
            &["report_TP53_summary.md", "TP53_comprehensive_v1.png"],
        );

        let attempt = load_attempt(root, "attempt_5").unwrap();
        assert_eq!(attempt.id, "attempt_5");
        assert_eq!(attempt.gene.as_str(), "TP53");
        assert!(attempt
            .report_path
            .as_deref()
            .unwrap()
            .ends_with("/report_TP53_summary.md"));
        assert_eq!(
            attempt.figure_paths(),
            vec!["attempt_5/TP53_comprehensive_v1.png".to_string()]
        );
        assert_eq!(attempt.display_name(), "Attempt 5");
    }

    #[test]
    fn test_load_missing_attempt_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_attempt(temp_dir.path(), "attempt_10").unwrap_err();
        assert!(matches!(err, VizError::NotFound(_)));
    }

    #[test]
    fn test_load_rejects_traversal_ids() {
        let temp_dir = TempDir::new().unwrap();
        for id in ["../etc", "attempt_1/../..", "results", ""] {
            let err = load_attempt(temp_dir.path(), id).unwrap_err();
            assert!(matches!(err, VizError::NotFound(_)), "id {:?}", id);
        }
    }

    #[test]
    fn test_missing_root_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let err = scan_attempts(&temp_dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, VizError::NotFound(_)));
    }

    #[test]
    fn test_scan_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        make_attempt(root, "attempt_1", &["report_EGFR_a.md", "EGFR_cell.png"]);
        make_attempt(root, "attempt_2", &["report_MYC_b.md"]);

        let first = scan_attempts(root).unwrap();
        let second = scan_attempts(root).unwrap();
        assert_eq!(first, second);
    }
}
