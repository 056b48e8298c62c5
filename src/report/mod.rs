//! Report analysis: summary, hypothesis and heuristic quality scores pulled
//! from an attempt's markdown report.

mod render;

pub use render::{render_markdown_page, title_from_file_name};

use serde::Serialize;
use std::path::Path;

/// Lines scanned after a hypothesis heading before giving up
const HYPOTHESIS_LOOKAHEAD: usize = 9;

/// Keyword-driven quality scores shown on graph nodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityScores {
    pub overall: f64,
    pub confidence: u32,
    pub novelty: u32,
    pub evidence: u32,
}

impl Default for QualityScores {
    /// Neutral scores for attempts without a readable report.
    fn default() -> Self {
        Self {
            overall: 50.0,
            confidence: 50,
            novelty: 50,
            evidence: 50,
        }
    }
}

fn clamp_score(value: u32) -> u32 {
    value.clamp(20, 100)
}

impl QualityScores {
    /// Score a report from the statistical and discovery language it uses.
    pub fn from_report(content: &str) -> Self {
        let text = content.to_lowercase();
        let has = |needle: &str| text.contains(needle);

        let mut confidence = 30;
        if has("p <") || has("p<") {
            confidence += 20;
        }
        if has("significant") {
            confidence += 15;
        }
        if has("p < 0.05") || has("p<0.05") {
            confidence += 10;
        }
        if has("p < 0.01") || has("p<0.01") {
            confidence += 15;
        }
        if has("comprehensive") {
            confidence += 10;
        }

        let mut novelty = 40;
        if has("novel") {
            novelty += 20;
        }
        if has("unprecedented") || has("first time") {
            novelty += 15;
        }
        if has("discovery") {
            novelty += 10;
        }
        if has("mechanism") {
            novelty += 10;
        }
        if has("pathway") {
            novelty += 5;
        }

        let mut evidence = 35;
        for (needle, points) in [
            ("figure", 10),
            ("morphological", 15),
            ("validation", 10),
            ("comprehensive", 15),
            ("statistical", 10),
            ("correlation", 5),
        ] {
            if has(needle) {
                evidence += points;
            }
        }

        let overall =
            confidence as f64 * 0.4 + novelty as f64 * 0.3 + evidence as f64 * 0.3;

        Self {
            overall: overall.clamp(20.0, 100.0),
            confidence: clamp_score(confidence),
            novelty: clamp_score(novelty),
            evidence: clamp_score(evidence),
        }
    }
}

/// Read a report, logging rather than failing when it is unreadable.
pub fn read_report(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            log::warn!("Could not read report {}: {}", path.display(), e);
            None
        }
    }
}

/// Up to three non-empty lines under `## Executive Summary` or `## Summary`.
pub fn extract_summary(content: &str) -> Option<String> {
    let mut lines = Vec::new();
    let mut in_summary = false;

    for line in content.lines() {
        if line.contains("## Executive Summary") || line.contains("## Summary") {
            in_summary = true;
            continue;
        }
        if !in_summary {
            continue;
        }
        if line.starts_with("##") {
            break;
        }
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed);
            if lines.len() >= 3 {
                break;
            }
        }
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" "))
    }
}

fn strip_emphasis(line: &str) -> String {
    line.replace("**", "").replace('*', "").trim().to_string()
}

fn mentions_hypothesis(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("research hypothesis")
        || lower.contains("hypothesis:")
        || lower.contains("research question")
}

/// The stated research hypothesis, or failing that the first substantial
/// paragraph line of the report.
pub fn extract_hypothesis(content: &str) -> Option<String> {
    let lines: Vec<&str> = content.lines().collect();

    for (i, line) in lines.iter().enumerate() {
        if !mentions_hypothesis(line) {
            continue;
        }
        let window = lines.iter().skip(i + 1).take(HYPOTHESIS_LOOKAHEAD);
        for next in window {
            let next = next.trim();
            if next.is_empty() || next.starts_with('#') || next.starts_with('*') {
                continue;
            }
            let hypothesis = strip_emphasis(next);
            if hypothesis.chars().count() > 20 {
                return Some(hypothesis);
            }
            // Only the first candidate line after a heading counts.
            break;
        }
    }

    lines
        .iter()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .filter(|line| {
            let lower = line.to_lowercase();
            !["date:", "author:", "version:"]
                .iter()
                .any(|k| lower.contains(k))
        })
        .map(|line| strip_emphasis(line))
        .find(|cleaned| cleaned.chars().count() > 30 && !cleaned.starts_with("Investigation"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"# TP53 Investigation

Date: 2025-01-01

## Research Hypothesis

Loss of **TP53** drives a distinct nuclear morphology in U2OS cells.

## Executive Summary

TP53 knockout cells show enlarged nuclei.
The effect is significant (p < 0.01).

Validated across three plates.
A fourth line that is not included.

## Methods

Details.
"#;

    #[test]
    fn test_extract_summary() {
        let summary = extract_summary(REPORT).unwrap();
        assert_eq!(
            summary,
            "TP53 knockout cells show enlarged nuclei. The effect is significant (p < 0.01). Validated across three plates."
        );
    }

    #[test]
    fn test_extract_summary_missing() {
        assert_eq!(extract_summary("# Title\n\nNo summary here."), None);
    }

    #[test]
    fn test_extract_hypothesis_from_heading() {
        assert_eq!(
            extract_hypothesis(REPORT).as_deref(),
            Some("Loss of TP53 drives a distinct nuclear morphology in U2OS cells.")
        );
    }

    #[test]
    fn test_extract_hypothesis_fallback_paragraph() {
        let content = "# Report\n\nAuthor: someone important here\nShort line.\nThis paragraph describes the main finding in detail.\n";
        assert_eq!(
            extract_hypothesis(content).as_deref(),
            Some("This paragraph describes the main finding in detail.")
        );
    }

    #[test]
    fn test_extract_hypothesis_lookahead_window() {
        let candidate = "Nuclear area grows a lot";
        let within = format!("## Research Hypothesis\n{}{}\n", "\n".repeat(8), candidate);
        assert_eq!(extract_hypothesis(&within).as_deref(), Some(candidate));

        let beyond = format!("## Research Hypothesis\n{}{}\n", "\n".repeat(9), candidate);
        assert_eq!(extract_hypothesis(&beyond), None);
    }

    #[test]
    fn test_extract_hypothesis_counts_characters() {
        // 17 characters, 32 bytes
        let content = "## Research Hypothesis\néééééé ééééé éééé\n";
        assert_eq!(extract_hypothesis(content), None);
    }

    #[test]
    fn test_extract_hypothesis_none() {
        assert_eq!(extract_hypothesis("# Only a title\n\nshort"), None);
    }

    #[test]
    fn test_scores_from_report() {
        let scores = QualityScores::from_report(REPORT);
        // "p <", "significant", "p < 0.01"
        assert_eq!(scores.confidence, 30 + 20 + 15 + 15);
        assert_eq!(scores.novelty, 40);
        // "morphological" is absent, "morphology" does not count
        assert_eq!(scores.evidence, 35);
        let expected = 80.0 * 0.4 + 40.0 * 0.3 + 35.0 * 0.3;
        assert!((scores.overall - expected).abs() < 1e-9);
    }

    #[test]
    fn test_scores_saturate() {
        let text = "p < 0.05 p < 0.01 significant comprehensive novel unprecedented discovery \
                    mechanism pathway figure morphological validation statistical correlation";
        let scores = QualityScores::from_report(text);
        assert_eq!(scores.confidence, 100);
        assert_eq!(scores.novelty, 100);
        assert_eq!(scores.evidence, 100);
        assert!((scores.overall - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_scores() {
        let scores = QualityScores::default();
        assert_eq!(scores.confidence, 50);
        assert_eq!(scores.overall, 50.0);
    }
}
