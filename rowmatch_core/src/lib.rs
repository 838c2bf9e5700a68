pub mod csv_source;
pub mod grouper;
pub mod tracker;

pub use csv_source::{rows_from_path, rows_from_reader, CsvOptions};
pub use grouper::{LockstepRowGrouper, RowSeq};
pub use tracker::{compare_sources, DiscrepancyTracker};
