//! Result aggregation.
//!
//! Results are folded into three views:
//! - `StatusTally`: exact status (or `Error`) to count
//! - `CategoryTally`: status class (`"2xx"`, `"4xx"`, ..., `"Error"`) to count
//! - `SubdomainLog`: every `(subdomain, status)` pair that got a response
//!
//! The dispatcher threads an `Aggregator` through its window loop and calls
//! `finish` once all windows are done. `summarize` does the same for a plain
//! slice of results.

use crate::types::{ProbeResult, ProbeStatus};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

/// Status class of a single status.
///
/// ```
/// use linkprobe_lib::{category_of, ProbeStatus};
///
/// assert_eq!(category_of(ProbeStatus::Code(404)), "4xx");
/// assert_eq!(category_of(ProbeStatus::Error), "Error");
/// ```
pub fn category_of(status: ProbeStatus) -> String {
    match status {
        ProbeStatus::Code(code) => format!("{}xx", code / 100),
        ProbeStatus::Error => ProbeStatus::ERROR_KEY.to_string(),
    }
}

/// Count of results per exact status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusTally {
    counts: HashMap<ProbeStatus, usize>,
}

impl StatusTally {
    pub fn increment(&mut self, status: ProbeStatus) {
        *self.counts.entry(status).or_insert(0) += 1;
    }

    /// Count for one status (zero if never seen).
    pub fn get(&self, status: ProbeStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries ordered by the string form of the status.
    ///
    /// Numeric codes sort before `"Error"` because digits precede letters.
    pub fn sorted(&self) -> Vec<(ProbeStatus, usize)> {
        let mut entries: Vec<(ProbeStatus, usize)> =
            self.counts.iter().map(|(s, c)| (*s, *c)).collect();
        entries.sort_by_key(|(status, _)| status.to_string());
        entries
    }

    /// Group counts by status class.
    ///
    /// Pure: the same tally always yields the same categories.
    pub fn categorize(&self) -> CategoryTally {
        let mut categories = CategoryTally::default();
        for (status, count) in &self.counts {
            categories.add(category_of(*status), *count);
        }
        categories
    }
}

/// Count of results per status class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTally {
    counts: BTreeMap<String, usize>,
}

impl CategoryTally {
    fn add(&mut self, category: String, count: usize) {
        *self.counts.entry(category).or_insert(0) += count;
    }

    /// Count for one category (zero if never seen).
    pub fn get(&self, category: &str) -> usize {
        self.counts.get(category).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries in lexicographic category order.
    pub fn sorted(&self) -> Vec<(&str, usize)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v)).collect()
    }
}

/// One entry of the subdomain log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubdomainEntry {
    pub subdomain: String,
    pub status: ProbeStatus,
}

/// Append-only log of subdomains that produced a status.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SubdomainLog {
    entries: Vec<SubdomainEntry>,
}

impl SubdomainLog {
    pub fn push(&mut self, subdomain: String, status: ProbeStatus) {
        self.entries.push(SubdomainEntry { subdomain, status });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = &SubdomainEntry> {
        self.entries.iter()
    }
}

/// Running accumulator for a probe run.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    statuses: StatusTally,
    log: SubdomainLog,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one result into the tallies.
    pub fn record(&mut self, result: &ProbeResult) {
        self.statuses.increment(result.status);
        if let Some(subdomain) = &result.subdomain {
            self.log.push(subdomain.clone(), result.status);
        }
    }

    /// Fold a batch of results, returning the updated accumulator.
    pub fn absorb<'a, I>(mut self, results: I) -> Self
    where
        I: IntoIterator<Item = &'a ProbeResult>,
    {
        for result in results {
            self.record(result);
        }
        self
    }

    /// Derive categories and close the accumulator.
    pub fn finish(self) -> Summary {
        let categories = self.statuses.categorize();
        Summary {
            statuses: self.statuses,
            categories,
            log: self.log,
        }
    }
}

/// Final tallies of a probe run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub statuses: StatusTally,
    pub categories: CategoryTally,
    pub log: SubdomainLog,
}

impl Summary {
    /// Total number of requests issued.
    pub fn total(&self) -> usize {
        self.statuses.total()
    }

    /// Requests that failed before yielding a status.
    pub fn error_count(&self) -> usize {
        self.statuses.get(ProbeStatus::Error)
    }
}

/// Aggregate a complete set of results.
pub fn summarize<'a, I>(results: I) -> Summary
where
    I: IntoIterator<Item = &'a ProbeResult>,
{
    Aggregator::new().absorb(results).finish()
}

/// Serializes a sorted tally as a JSON object keyed by the string form.
struct SortedCounts<'a, K: ToString>(&'a [(K, usize)]);

impl<K: ToString> Serialize for SortedCounts<'_, K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, count) in self.0 {
            map.serialize_entry(&key.to_string(), count)?;
        }
        map.end()
    }
}

impl Serialize for Summary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let statuses = self.statuses.sorted();
        let categories = self.categories.sorted();

        let mut state = serializer.serialize_struct("Summary", 4)?;
        state.serialize_field("statuses", &SortedCounts(&statuses))?;
        state.serialize_field("categories", &SortedCounts(&categories))?;
        state.serialize_field("subdomains", &self.log)?;
        state.serialize_field("total", &self.total())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_results() -> Vec<ProbeResult> {
        vec![
            ProbeResult::success(404, "abcde"),
            ProbeResult::error(),
            ProbeResult::success(200, "fghijk"),
            ProbeResult::success(404, "lmnopqr"),
            ProbeResult::success(302, "stuvw"),
            ProbeResult::error(),
        ]
    }

    #[test]
    fn test_category_of() {
        assert_eq!(category_of(ProbeStatus::Code(200)), "2xx");
        assert_eq!(category_of(ProbeStatus::Code(204)), "2xx");
        assert_eq!(category_of(ProbeStatus::Code(301)), "3xx");
        assert_eq!(category_of(ProbeStatus::Code(404)), "4xx");
        assert_eq!(category_of(ProbeStatus::Code(503)), "5xx");
        assert_eq!(category_of(ProbeStatus::Code(100)), "1xx");
        assert_eq!(category_of(ProbeStatus::Error), "Error");
    }

    #[test]
    fn test_summarize_counts() {
        let summary = summarize(&sample_results());

        assert_eq!(summary.statuses.get(ProbeStatus::Code(404)), 2);
        assert_eq!(summary.statuses.get(ProbeStatus::Code(200)), 1);
        assert_eq!(summary.statuses.get(ProbeStatus::Code(302)), 1);
        assert_eq!(summary.statuses.get(ProbeStatus::Error), 2);
        assert_eq!(summary.statuses.get(ProbeStatus::Code(500)), 0);

        assert_eq!(summary.categories.get("4xx"), 2);
        assert_eq!(summary.categories.get("2xx"), 1);
        assert_eq!(summary.categories.get("3xx"), 1);
        assert_eq!(summary.categories.get("Error"), 2);

        assert_eq!(summary.total(), 6);
        assert_eq!(summary.error_count(), 2);
        assert_eq!(summary.categories.total(), summary.statuses.total());
    }

    #[test]
    fn test_log_excludes_errors_and_keeps_order() {
        let summary = summarize(&sample_results());

        let subdomains: Vec<&str> = summary.log.iter().map(|e| e.subdomain.as_str()).collect();
        assert_eq!(subdomains, vec!["abcde", "fghijk", "lmnopqr", "stuvw"]);
        assert_eq!(summary.log.len(), summary.total() - summary.error_count());
    }

    #[test]
    fn test_sorted_status_order() {
        let summary = summarize(&sample_results());
        let keys: Vec<String> = summary
            .statuses
            .sorted()
            .into_iter()
            .map(|(s, _)| s.to_string())
            .collect();
        assert_eq!(keys, vec!["200", "302", "404", "Error"]);
    }

    #[test]
    fn test_sorted_category_order() {
        let summary = summarize(&sample_results());
        let keys: Vec<&str> = summary.categories.sorted().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["2xx", "3xx", "4xx", "Error"]);
    }

    #[test]
    fn test_categorize_is_pure() {
        let summary = summarize(&sample_results());
        let first = summary.statuses.categorize();
        let second = summary.statuses.categorize();
        assert_eq!(first, second);
        assert_eq!(first, summary.categories);
    }

    #[test]
    fn test_absorb_matches_record() {
        let results = sample_results();

        let mut recorded = Aggregator::new();
        for result in &results {
            recorded.record(result);
        }

        let absorbed = Aggregator::new()
            .absorb(&results[..3])
            .absorb(&results[3..]);

        assert_eq!(recorded.finish(), absorbed.finish());
    }

    #[test]
    fn test_all_errors() {
        let results = vec![ProbeResult::error(); 4];
        let summary = summarize(&results);

        assert_eq!(summary.total(), 4);
        assert!(summary.log.is_empty());
        assert_eq!(summary.categories.sorted(), vec![("Error", 4)]);
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&Vec::<ProbeResult>::new());
        assert_eq!(summary.total(), 0);
        assert!(summary.statuses.is_empty());
        assert!(summary.categories.is_empty());
        assert!(summary.log.is_empty());
    }

    #[test]
    fn test_summary_json() {
        let summary = summarize(&[
            ProbeResult::success(404, "abcde"),
            ProbeResult::error(),
        ]);
        let json: serde_json::Value = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["statuses"]["404"], 1);
        assert_eq!(json["statuses"]["Error"], 1);
        assert_eq!(json["categories"]["4xx"], 1);
        assert_eq!(json["categories"]["Error"], 1);
        assert_eq!(json["subdomains"][0]["subdomain"], "abcde");
        assert_eq!(json["subdomains"][0]["status"], 404);
        assert_eq!(json["total"], 2);
    }
}
