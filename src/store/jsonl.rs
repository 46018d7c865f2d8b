//! Line-delimited JSON record streams.
//!
//! Shared plumbing for the event log, telemetry streams, and ops log: one
//! serialized record per line, appended with an fsync, read back with a
//! full scan that skips anything unparseable.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::StoreError;

/// Appends one record as a JSON line, syncing to stable storage before
/// returning.
///
/// Opens the file per call so that a failure (removed directory, revoked
/// permissions) surfaces on the append itself rather than at startup.
pub(crate) fn append_record<T: Serialize>(path: &Path, record: &T) -> Result<(), StoreError> {
    let line = serde_json::to_string(record)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")?;
    file.sync_all()?;
    Ok(())
}

/// Reads every parseable record from the stream in arrival order.
///
/// A missing file is an empty stream. Lines that fail to read or parse
/// (truncated tail after a crash, non-UTF-8 bytes, manual edits) are
/// skipped with a warning; stream corruption must never block the
/// service or hide records past the damage.
pub(crate) fn read_records<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to open record stream");
            return Vec::new();
        }
    };

    let mut records = Vec::new();
    for line in BufReader::new(file).lines() {
        let Ok(line) = line else {
            // `Lines` stays usable after an Err; only this line is lost.
            tracing::warn!(path = %path.display(), "skipping unreadable line in record stream");
            continue;
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping corrupt record line");
            }
        }
    }
    records
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        n: u32,
    }

    fn tempdir() -> tempfile::TempDir {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir creation failed");
        };
        dir
    }

    #[test]
    fn appends_and_reads_in_order() {
        let dir = tempdir();
        let path = dir.path().join("rows.jsonl");
        for n in 0..3 {
            assert!(append_record(&path, &Row { n }).is_ok());
        }
        let rows: Vec<Row> = read_records(&path);
        assert_eq!(rows, vec![Row { n: 0 }, Row { n: 1 }, Row { n: 2 }]);
    }

    #[test]
    fn missing_file_reads_empty() {
        let rows: Vec<Row> = read_records(Path::new("/nonexistent/rows.jsonl"));
        assert!(rows.is_empty());
    }

    #[test]
    fn corrupt_lines_are_skipped() {
        let dir = tempdir();
        let path = dir.path().join("rows.jsonl");
        assert!(append_record(&path, &Row { n: 1 }).is_ok());
        let mut raw = std::fs::read_to_string(&path).unwrap_or_default();
        raw.push_str("{\"n\": tru\n");
        assert!(std::fs::write(&path, raw).is_ok());
        assert!(append_record(&path, &Row { n: 2 }).is_ok());

        let rows: Vec<Row> = read_records(&path);
        assert_eq!(rows, vec![Row { n: 1 }, Row { n: 2 }]);
    }

    #[test]
    fn non_utf8_lines_are_skipped_without_truncating_the_scan() {
        let dir = tempdir();
        let path = dir.path().join("rows.jsonl");
        assert!(append_record(&path, &Row { n: 1 }).is_ok());
        {
            let file = OpenOptions::new().append(true).open(&path);
            let Ok(mut file) = file else {
                panic!("open for append failed");
            };
            assert!(file.write_all(&[0xff, 0xfe, 0xfd, b'\n']).is_ok());
        }
        assert!(append_record(&path, &Row { n: 2 }).is_ok());

        let rows: Vec<Row> = read_records(&path);
        assert_eq!(rows, vec![Row { n: 1 }, Row { n: 2 }]);
    }
}
