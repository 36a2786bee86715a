//! Per-core output destinations for equation records.
//!
//! The pipeline only talks to the `EquationSink` trait. The file sink maps each
//! core id to its own append-only text file; the mapping is built once, up
//! front, so writing is a lookup rather than a branch per core.
//!
//! Files are never held open between calls: every `write_lines` opens the
//! destination, writes through a buffer, flushes, and closes it when the scope
//! ends (including on error paths).

use std::collections::BTreeMap;
use std::fs::{OpenOptions, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::domain::CoreId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SinkError {
    #[error("no destination configured for {0}")]
    UnknownCore(CoreId),
    #[error("{message}")]
    Io { destination: String, message: String },
}

impl SinkError {
    pub fn destination(&self) -> String {
        match self {
            SinkError::UnknownCore(core) => core.to_string(),
            SinkError::Io { destination, .. } => destination.clone(),
        }
    }
}

/// Append-only destination for formatted equation lines.
pub trait EquationSink {
    /// Append `lines` (one record each) to the destination of `core`.
    fn write_lines(&mut self, core: CoreId, lines: &[String]) -> Result<(), SinkError>;
}

/// One text file per core: `<dir>/<prefix><core>.txt`.
#[derive(Debug, Clone)]
pub struct FileSink {
    destinations: BTreeMap<CoreId, PathBuf>,
}

impl FileSink {
    pub fn new(dir: &Path, prefix: &str, cores: &[CoreId]) -> Self {
        let destinations = cores
            .iter()
            .map(|&core| (core, dir.join(format!("{prefix}{}.txt", core.0))))
            .collect();
        Self { destinations }
    }

    pub fn path(&self, core: CoreId) -> Option<&Path> {
        self.destinations.get(&core).map(PathBuf::as_path)
    }
}

impl EquationSink for FileSink {
    fn write_lines(&mut self, core: CoreId, lines: &[String]) -> Result<(), SinkError> {
        let path = self.destinations.get(&core).ok_or(SinkError::UnknownCore(core))?;
        let io_err = |e: std::io::Error| SinkError::Io {
            destination: path.display().to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir_all(parent).map_err(io_err)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        for line in lines {
            writeln!(writer, "{line}").map_err(io_err)?;
        }
        writer.flush().map_err(io_err)?;

        debug!(%core, path = %path.display(), lines = lines.len(), "appended records");
        Ok(())
    }
}

/// Keeps every line in memory, keyed by core.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub lines: BTreeMap<CoreId, Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines_for(&self, core: CoreId) -> &[String] {
        self.lines.get(&core).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl EquationSink for MemorySink {
    fn write_lines(&mut self, core: CoreId, lines: &[String]) -> Result<(), SinkError> {
        self.lines.entry(core).or_default().extend(lines.iter().cloned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sink_appends_per_core() {
        let dir = tempfile::tempdir().unwrap();
        let cores = [CoreId(0), CoreId(1)];
        let mut sink = FileSink::new(dir.path(), "cpuTemps-core-", &cores);

        sink.write_lines(CoreId(0), &["a".to_string()]).unwrap();
        sink.write_lines(CoreId(0), &["b".to_string(), "c".to_string()]).unwrap();
        sink.write_lines(CoreId(1), &["z".to_string()]).unwrap();

        let core0 = std::fs::read_to_string(dir.path().join("cpuTemps-core-0.txt")).unwrap();
        let core1 = std::fs::read_to_string(dir.path().join("cpuTemps-core-1.txt")).unwrap();
        assert_eq!(core0, "a\nb\nc\n");
        assert_eq!(core1, "z\n");
    }

    #[test]
    fn file_sink_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out");
        let mut sink = FileSink::new(&out, "t-", &[CoreId(3)]);
        sink.write_lines(CoreId(3), &["x".to_string()]).unwrap();
        assert!(out.join("t-3.txt").exists());
        assert_eq!(sink.path(CoreId(3)), Some(out.join("t-3.txt").as_path()));
    }

    #[test]
    fn unknown_core_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(dir.path(), "p", &[CoreId(0)]);
        let err = sink.write_lines(CoreId(5), &["x".to_string()]).unwrap_err();
        assert_eq!(err, SinkError::UnknownCore(CoreId(5)));
    }

    #[test]
    fn unwritable_destination_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the open fail.
        std::fs::create_dir(dir.path().join("p0.txt")).unwrap();
        let mut sink = FileSink::new(dir.path(), "p", &[CoreId(0)]);
        let err = sink.write_lines(CoreId(0), &["x".to_string()]).unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }));
        assert!(err.destination().ends_with("p0.txt"));
    }

    #[test]
    fn memory_sink_collects_lines() {
        let mut sink = MemorySink::new();
        sink.write_lines(CoreId(2), &["a".to_string()]).unwrap();
        assert_eq!(sink.lines_for(CoreId(2)), &["a".to_string()]);
        assert!(sink.lines_for(CoreId(0)).is_empty());
    }
}
