use serde::Serialize;

use crate::report::{extract_hypothesis, extract_summary, read_report, QualityScores};
use crate::scan::{Attempt, AttemptFile, Figure};

/// One node of the graph, as returned by `GET /api/attempts`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptSummary {
    pub id: String,
    pub name: String,
    pub attempt_number: String,
    pub gene: String,
    pub gene_hint: Option<String>,
    pub figure_count: usize,
    pub report_path: Option<String>,
    pub research_hypothesis: Option<String>,
    pub scores: QualityScores,
}

impl AttemptSummary {
    /// Build the list entry, reading the report for hypothesis and scores.
    pub fn from_attempt(attempt: &Attempt) -> Self {
        let report = attempt.report_fs_path().and_then(|p| read_report(&p));
        Self::with_report(attempt, report.as_deref())
    }

    pub fn with_report(attempt: &Attempt, report: Option<&str>) -> Self {
        Self {
            id: attempt.id.clone(),
            name: attempt.display_name(),
            attempt_number: attempt.number().to_string(),
            gene: attempt.gene.as_str().to_string(),
            gene_hint: attempt.gene_hint.clone(),
            figure_count: attempt.figure_count(),
            report_path: attempt.report_path.clone(),
            research_hypothesis: report.and_then(extract_hypothesis),
            scores: report.map(QualityScores::from_report).unwrap_or_default(),
        }
    }
}

/// Full record for one attempt, as returned by `GET /api/attempt/{id}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptDetail {
    pub id: String,
    pub gene: String,
    pub gene_hint: Option<String>,
    pub report_path: Option<String>,
    pub figure_paths: Vec<String>,
    pub figures: Vec<Figure>,
    pub summary: Option<String>,
    pub files: Vec<AttemptFile>,
}

impl AttemptDetail {
    pub fn from_attempt(attempt: &Attempt) -> Self {
        let summary = attempt
            .report_fs_path()
            .and_then(|p| read_report(&p))
            .and_then(|content| extract_summary(&content));

        Self {
            id: attempt.id.clone(),
            gene: attempt.gene.as_str().to_string(),
            gene_hint: attempt.gene_hint.clone(),
            report_path: attempt.report_path.clone(),
            figure_paths: attempt.figure_paths(),
            figures: attempt.figures.clone(),
            summary,
            files: attempt.files.clone(),
        }
    }
}

/// Body of every non-2xx API response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok",
            service: "attemptviz",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
