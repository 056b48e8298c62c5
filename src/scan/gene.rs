//! Gene name extraction from attempt filenames (regex-based).
//!
//! The gene comes only from the report filename. A weaker prefix heuristic is
//! offered separately as a hint and never stands in for the parsed gene.

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Sentinel shown when no report filename carries a gene
pub const UNKNOWN_GENE: &str = "unknown";

/// Prefixes that look like genes but name plot or table kinds
const GENERIC_PREFIXES: &[&str] = &[
    "TOP", "ALL", "CELL", "IMAGE", "DATA", "RESULT", "ANALYSIS", "FIGURE", "TABLE", "PLOT",
    "GRAPH", "CHART", "SUMMARY",
];

/// `report_<GENE>_<anything>.md`; group 1 is the gene symbol.
fn report_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^report_([A-Za-z0-9]+)_.*\.md$").expect("Invalid regex pattern")
    })
}

/// Outcome of parsing a gene symbol out of an attempt's report filenames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GeneMatch {
    /// A report filename matched; `report` is that filename.
    Parsed { gene: String, report: String },
    /// No report filename matched.
    Unparsed,
}

impl GeneMatch {
    /// Gene symbol, or `"unknown"` for an unparsed attempt.
    pub fn as_str(&self) -> &str {
        match self {
            GeneMatch::Parsed { gene, .. } => gene,
            GeneMatch::Unparsed => UNKNOWN_GENE,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, GeneMatch::Parsed { .. })
    }
}

impl std::fmt::Display for GeneMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a single filename against the report pattern.
pub fn parse_report_name(file_name: &str) -> GeneMatch {
    match report_regex().captures(file_name) {
        Some(cap) => GeneMatch::Parsed {
            gene: cap[1].to_string(),
            report: file_name.to_string(),
        },
        None => GeneMatch::Unparsed,
    }
}

/// First report filename (in the given order) that yields a gene.
pub fn gene_from_file_names<'a, I>(file_names: I) -> GeneMatch
where
    I: IntoIterator<Item = &'a str>,
{
    file_names
        .into_iter()
        .map(parse_report_name)
        .find(GeneMatch::is_parsed)
        .unwrap_or(GeneMatch::Unparsed)
}

/// Guess a gene from the most common filename prefix of CSV/PNG outputs.
///
/// A prefix is the part of the stem before the first underscore, uppercased,
/// kept when it is 2-10 alphanumeric characters and not a generic word.
/// Prefers the most frequent prefix seen at least twice; ties go to the
/// prefix seen first.
pub fn infer_gene_hint<'a, I>(file_names: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();

    for (order, name) in file_names.into_iter().enumerate() {
        let lower = name.to_lowercase();
        if !(lower.ends_with(".csv") || lower.ends_with(".png")) {
            continue;
        }
        let stem = match name.rsplit_once('.') {
            Some((stem, _)) => stem,
            None => name,
        };
        let prefix = stem.split('_').next().unwrap_or(stem);
        if !(2..=10).contains(&prefix.chars().count())
            || !prefix.chars().all(|c| c.is_alphanumeric())
        {
            continue;
        }
        let prefix = prefix.to_uppercase();
        if GENERIC_PREFIXES.contains(&prefix.as_str()) {
            continue;
        }
        counts.entry(prefix).or_insert((0, order)).0 += 1;
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(prefix, (count, first_seen))| (prefix, count, first_seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .iter()
        .find(|(_, count, _)| *count >= 2)
        .or_else(|| ranked.first())
        .map(|(prefix, _, _)| prefix.clone())
}
