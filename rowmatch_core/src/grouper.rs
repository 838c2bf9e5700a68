use rowmatch_common::{Result, RowRecord, SourceId};
use tracing::debug;

/// A lazily-produced, finite, forward-only sequence of field-value rows.
pub type RowSeq = Box<dyn Iterator<Item = Result<Vec<String>>>>;

/// Pull state for one source. `exhausted` makes the end of a sequence an
/// explicit branch: once a source runs dry the cursor keeps answering
/// every round without touching the underlying sequence again.
struct SourceCursor {
    source: SourceId,
    rows: RowSeq,
    exhausted: bool,
}

impl SourceCursor {
    fn new(source: SourceId, rows: RowSeq) -> Self {
        Self {
            source,
            rows,
            exhausted: false,
        }
    }

    fn pull(&mut self) -> Result<Option<Vec<String>>> {
        if self.exhausted {
            return Ok(None);
        }

        match self.rows.next() {
            Some(Ok(values)) => Ok(Some(values)),
            Some(Err(e)) => Err(e),
            None => {
                debug!("source {} exhausted", self.source);
                self.exhausted = true;
                Ok(None)
            }
        }
    }
}

/// Drives all source sequences in lockstep: one attempted pull from every
/// source per round, each produced row tagged with the shared round
/// counter. Holds no rows beyond the batch currently being assembled.
pub struct LockstepRowGrouper {
    cursors: Vec<SourceCursor>,
    step: usize,
    done: bool,
}

impl LockstepRowGrouper {
    pub fn new<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = (SourceId, RowSeq)>,
    {
        let cursors: Vec<SourceCursor> = sources
            .into_iter()
            .map(|(source, rows)| SourceCursor::new(source, rows))
            .collect();
        debug!("grouping {} sources in lockstep", cursors.len());

        Self {
            cursors,
            step: 0,
            done: false,
        }
    }

    pub fn source_count(&self) -> usize {
        self.cursors.len()
    }

    pub fn source_ids(&self) -> Vec<SourceId> {
        self.cursors.iter().map(|c| c.source.clone()).collect()
    }

    /// Number of rounds produced so far.
    pub fn rounds(&self) -> usize {
        self.step
    }
}

impl Iterator for LockstepRowGrouper {
    type Item = Result<Vec<RowRecord>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut batch = Vec::with_capacity(self.cursors.len());
        for cursor in &mut self.cursors {
            match cursor.pull() {
                Ok(Some(values)) => {
                    batch.push(RowRecord::new(cursor.source.clone(), values, self.step));
                }
                Ok(None) => {}
                Err(e) => {
                    // A read fault is fatal for the whole run.
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        if batch.is_empty() {
            // Every source came up empty this round: the stream is over.
            self.done = true;
            return None;
        }

        self.step += 1;
        Some(Ok(batch))
    }
}
