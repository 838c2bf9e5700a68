use csv::ReaderBuilder;
use rowmatch_common::{AppConfig, Result, RowMatchError};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::grouper::RowSeq;

/// Options controlling how delimited input is decoded into rows.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Skip the first record of each input as a header row.
    pub has_headers: bool,
    /// Accept records whose field counts differ within one input.
    pub flexible: bool,
}

impl CsvOptions {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        if !config.delimiter.is_ascii() {
            return Err(RowMatchError::Config(format!(
                "delimiter must be a single ASCII character, got '{}'",
                config.delimiter
            )));
        }

        Ok(Self {
            delimiter: config.delimiter as u8,
            has_headers: config.has_headers,
            flexible: config.flexible,
        })
    }
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: false,
            flexible: true,
        }
    }
}

/// Open a delimited file as a lazy row sequence for the grouper.
pub fn rows_from_path(path: &Path, options: &CsvOptions) -> Result<RowSeq> {
    let file = File::open(path)?;
    Ok(rows_from_reader(file, options))
}

/// Wrap any byte reader as a lazy row sequence. Rows are decoded on pull;
/// a decode fault surfaces mid-stream and aborts the comparison run.
pub fn rows_from_reader<R: Read + 'static>(reader: R, options: &CsvOptions) -> RowSeq {
    let records = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.has_headers)
        .flexible(options.flexible)
        .from_reader(reader)
        .into_records();

    Box::new(records.map(|record| {
        record
            .map(|fields| fields.iter().map(|field| field.to_string()).collect())
            .map_err(|e| RowMatchError::Csv(e.to_string()))
    }))
}
