//! Staging files for bulk loads
//!
//! Large exports are written to a local JSON-Lines file and handed to the
//! warehouse as one load job instead of thousands of streaming inserts.
//!
//! The file is created with owner-only permissions before any record is
//! written: staged rows contain pre-redaction-adjacent home data and must
//! never be readable by other local users. Cleanup is RAII; dropping the
//! writer removes the file even when the load failed.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use hearth_record::TimelineRecord;
use tempfile::{Builder, TempPath};

use crate::error::Result;

#[cfg(test)]
#[path = "staging_test.rs"]
mod tests;

/// Owner read/write only
#[cfg(unix)]
const STAGING_FILE_MODE: u32 = 0o600;

/// Writes timeline records to a temporary JSON-Lines staging file.
#[derive(Debug)]
pub struct StagingWriter {
    writer: BufWriter<File>,
    path: TempPath,
    records: u64,
}

impl StagingWriter {
    /// Create a staging file under `dir`, or the system temp directory
    /// when `dir` is `None`.
    pub fn create(dir: Option<&Path>) -> Result<Self> {
        let mut builder = Builder::new();
        builder.prefix("hearth_export_").suffix(".jsonl");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(STAGING_FILE_MODE));
        }

        let file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        let (file, path) = file.into_parts();

        Ok(Self {
            writer: BufWriter::new(file),
            path,
            records: 0,
        })
    }

    /// Append one record as a JSON line.
    pub fn write_record(&mut self, record: &TimelineRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        self.writer.write_all(b"\n")?;
        self.records += 1;
        Ok(())
    }

    /// Flush buffered output so the file is complete on disk.
    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Path of the staging file, valid until the writer is dropped.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records written so far.
    pub fn record_count(&self) -> u64 {
        self.records
    }

    /// Consume the writer, deleting the staging file immediately.
    pub fn cleanup(self) -> Result<()> {
        self.path.close()?;
        Ok(())
    }

    /// Absolute path as an owned buffer, for log lines.
    pub fn path_buf(&self) -> PathBuf {
        self.path.to_path_buf()
    }
}
