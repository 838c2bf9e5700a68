use rowmatch_common::{DiscrepancyReport, Result, RowRecord, SourceId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::grouper::{LockstepRowGrouper, RowSeq};

/// Streams grouped rows and decides which row contents are shared by every
/// source and which are source-specific leftovers.
///
/// Matching is content-based, not position-based, and the pruning
/// threshold is a plain count of accumulated entries per content key:
/// duplicate rows inside a single source count toward it exactly as rows
/// from distinct sources do.
pub struct DiscrepancyTracker {
    sources: Vec<SourceId>,
    grouper: LockstepRowGrouper,
    outstanding: HashMap<Vec<String>, Vec<RowRecord>>,
    report: Option<DiscrepancyReport>,
}

impl DiscrepancyTracker {
    pub fn new<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = (SourceId, RowSeq)>,
    {
        let grouper = LockstepRowGrouper::new(sources);
        let sources = grouper.source_ids();

        Self {
            sources,
            grouper,
            outstanding: HashMap::new(),
            report: None,
        }
    }

    /// Drain the grouper fully, bucketing every row by content key and
    /// pruning each bucket the moment it reaches full representation.
    pub fn run(mut self) -> Result<Self> {
        info!("comparing {} sources in lockstep", self.sources.len());

        while let Some(batch) = self.grouper.next() {
            for row in batch? {
                self.process_row(row);
            }
        }

        debug!(
            "drained {} rounds, {} contents outstanding",
            self.grouper.rounds(),
            self.outstanding.len()
        );
        Ok(self)
    }

    /// Number of lockstep rounds driven so far.
    pub fn rounds(&self) -> usize {
        self.grouper.rounds()
    }

    fn process_row(&mut self, row: RowRecord) {
        let threshold = self.sources.len();

        match self.outstanding.entry(row.key().to_vec()) {
            Entry::Occupied(mut bucket) => {
                bucket.get_mut().push(row);
                // Reaching one entry per source means the content matched
                // everywhere; the bucket is dropped whole, on the spot.
                // A later identical row starts over from a count of one.
                if bucket.get().len() >= threshold {
                    bucket.remove();
                }
            }
            Entry::Vacant(slot) => {
                if threshold > 1 {
                    slot.insert(vec![row]);
                }
                // With a single source the first entry already meets the
                // threshold, so the bucket never materializes.
            }
        }
    }

    /// Build (once) and return the discrepancy report: whatever is still
    /// outstanding, placed at `report[source][step] = values`. Repeated
    /// calls return the same memoized report.
    pub fn results(&mut self) -> &DiscrepancyReport {
        if self.report.is_none() {
            let mut report = DiscrepancyReport::with_sources(self.sources.iter().cloned());
            for bucket in self.outstanding.values() {
                for row in bucket {
                    report.record(row.source.clone(), row.step, row.values.clone());
                }
            }
            debug!("report holds {} unmatched rows", report.unmatched_rows());
            self.report = Some(report);
        }

        self.report.get_or_insert_with(DiscrepancyReport::default)
    }

    /// Consume the tracker, yielding the report by value.
    pub fn into_results(mut self) -> DiscrepancyReport {
        self.results();
        self.report.unwrap_or_default()
    }
}

/// Compare a set of sources in one pass and return the unmatched rows per
/// source.
pub fn compare_sources<I>(sources: I) -> Result<DiscrepancyReport>
where
    I: IntoIterator<Item = (SourceId, RowSeq)>,
{
    Ok(DiscrepancyTracker::new(sources).run()?.into_results())
}
