use anyhow::{Context, Result};
use std::path::Path;

use crate::models::AcceptedRecord;
use crate::pipeline::RejectedRecord;

/// Writes the final record list with a fixed header.
#[derive(Debug, Clone, Copy)]
pub struct CsvWriter {
    include_id: bool,
}

impl CsvWriter {
    pub fn new(include_id: bool) -> Self {
        Self { include_id }
    }

    pub fn header(&self) -> &'static [&'static str] {
        if self.include_id {
            &["Title", "Year", "ID"]
        } else {
            &["Title", "Year"]
        }
    }

    /// Rows are written in the order given; ordering is the driver's job.
    pub fn write(&self, path: &Path, records: &[AcceptedRecord]) -> Result<usize> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        writer.write_record(self.header())?;
        for accepted in records {
            let record = &accepted.record;
            if self.include_id {
                let id = record.external_id.as_ref().map(|id| id.0.as_str()).unwrap_or("");
                writer.write_record([record.title.as_str(), record.year.as_str(), id])?;
            } else {
                writer.write_record([record.title.as_str(), record.year.as_str()])?;
            }
        }

        writer.flush()?;
        Ok(records.len())
    }
}

/// `Title,Year,ID,Reason` report of everything the filters turned away.
pub fn write_rejections(path: &Path, rejected: &[RejectedRecord]) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(["Title", "Year", "ID", "Reason"])?;
    for entry in rejected {
        let record = &entry.record;
        let id = record.external_id.as_ref().map(|id| id.0.clone()).unwrap_or_default();
        writer.write_record([
            record.title.clone(),
            record.year.clone(),
            id,
            entry.reason.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(rejected.len())
}
