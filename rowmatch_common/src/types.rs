use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier for one participant source in a comparison run.
///
/// Stable and caller-supplied: a file path, an upload id, anything that
/// names the sequence. Carries no ordering significance between sources.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(pub String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One row pulled from a source during a lockstep round.
///
/// `step` is the shared round counter at which the row was pulled, not the
/// row's line number in its originating file. The matching key is the
/// ordered field values themselves; equality is structural, with no
/// trimming or coercion of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRecord {
    pub source: SourceId,
    pub step: usize,
    pub values: Vec<String>,
}

impl RowRecord {
    pub fn new(source: SourceId, values: Vec<String>, step: usize) -> Self {
        Self {
            source,
            step,
            values,
        }
    }

    /// Content key used for cross-source matching.
    pub fn key(&self) -> &[String] {
        &self.values
    }
}

/// Unmatched rows per source, keyed by the lockstep step at which each row
/// was pulled. Built once per comparison run and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscrepancyReport {
    entries: BTreeMap<SourceId, BTreeMap<usize, Vec<String>>>,
}

impl DiscrepancyReport {
    /// Seed the report with an empty entry for every participant, so that
    /// fully-matched runs still enumerate each source.
    pub fn with_sources<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = SourceId>,
    {
        Self {
            entries: sources
                .into_iter()
                .map(|source| (source, BTreeMap::new()))
                .collect(),
        }
    }

    pub fn record(&mut self, source: SourceId, step: usize, values: Vec<String>) {
        self.entries.entry(source).or_default().insert(step, values);
    }

    pub fn get(&self, source: &SourceId) -> Option<&BTreeMap<usize, Vec<String>>> {
        self.entries.get(source)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SourceId, &BTreeMap<usize, Vec<String>>)> {
        self.entries.iter()
    }

    pub fn source_count(&self) -> usize {
        self.entries.len()
    }

    /// Total unmatched rows across all sources.
    pub fn unmatched_rows(&self) -> usize {
        self.entries.values().map(|rows| rows.len()).sum()
    }

    /// True when every source entry is empty, i.e. all content matched.
    pub fn is_fully_matched(&self) -> bool {
        self.entries.values().all(|rows| rows.is_empty())
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Field delimiter for delimited input files
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Treat the first record of each input as a header row and skip it
    #[serde(default)]
    pub has_headers: bool,

    /// Accept records whose field counts differ within one input
    #[serde(default = "default_flexible")]
    pub flexible: bool,

    /// Enable portable mode (config alongside binary)
    #[serde(default)]
    pub portable_mode: bool,
}

fn default_delimiter() -> char {
    ','
}

fn default_flexible() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            has_headers: false,
            flexible: default_flexible(),
            portable_mode: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_key_is_structural() {
        let a = RowRecord::new(SourceId::from("a"), vec!["x".into(), "1".into()], 0);
        let b = RowRecord::new(SourceId::from("b"), vec!["x".into(), "1".into()], 7);
        assert_eq!(a.key(), b.key());

        // Same values, different order: different key
        let c = RowRecord::new(SourceId::from("c"), vec!["1".into(), "x".into()], 0);
        assert_ne!(a.key(), c.key());

        // Differing field counts: different key, even with a shared prefix
        let d = RowRecord::new(SourceId::from("d"), vec!["x".into(), "1".into(), "".into()], 0);
        assert_ne!(a.key(), d.key());
    }

    #[test]
    fn test_row_key_no_normalization() {
        let spaced = RowRecord::new(SourceId::from("a"), vec![" x ".into()], 0);
        let plain = RowRecord::new(SourceId::from("b"), vec!["x".into()], 0);
        assert_ne!(spaced.key(), plain.key());
    }

    #[test]
    fn test_report_seeds_all_sources() {
        let report =
            DiscrepancyReport::with_sources(vec![SourceId::from("a"), SourceId::from("b")]);
        assert_eq!(report.source_count(), 2);
        assert_eq!(report.unmatched_rows(), 0);
        assert!(report.is_fully_matched());
        assert!(report.get(&SourceId::from("a")).is_some());
    }

    #[test]
    fn test_report_record_and_count() {
        let mut report = DiscrepancyReport::with_sources(vec![SourceId::from("a")]);
        report.record(SourceId::from("a"), 3, vec!["v".into()]);
        assert_eq!(report.unmatched_rows(), 1);
        assert!(!report.is_fully_matched());

        let rows = report.get(&SourceId::from("a")).expect("source entry");
        assert_eq!(rows.get(&3), Some(&vec!["v".to_string()]));
    }

    #[test]
    fn test_report_json_shape() {
        let mut report =
            DiscrepancyReport::with_sources(vec![SourceId::from("a"), SourceId::from("b")]);
        report.record(SourceId::from("b"), 1, vec!["3".into(), "c".into()]);

        let json = serde_json::to_value(&report).expect("serialize report");
        assert_eq!(
            json,
            serde_json::json!({
                "a": {},
                "b": { "1": ["3", "c"] },
            })
        );
    }

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.delimiter, ',');
        assert!(!config.has_headers);
        assert!(config.flexible);
        assert!(!config.portable_mode);
    }
}
