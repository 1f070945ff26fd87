//! Program capture sink
//!
//! Owns the program file and the communication log for the lifetime of one
//! session. The program file is recreated when the session starts; the log is
//! appended to across the whole process lifetime. Each accepted line is
//! written and flushed before it is acknowledged, so a disconnect never loses
//! a line the client already saw `ok` for.
//!
//! Both handles are plain owned values: dropping the sink on any exit path
//! of the session closes the files.

use grblbridge_core::{CaptureError, Result};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Locations of the capture files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturePaths {
    /// Program file, one G-code command per line, recreated per session
    pub program_file: PathBuf,
    /// Communication log, append-only
    pub log_file: PathBuf,
}

impl CapturePaths {
    pub fn new(program_file: impl Into<PathBuf>, log_file: impl Into<PathBuf>) -> Self {
        Self {
            program_file: program_file.into(),
            log_file: log_file.into(),
        }
    }
}

impl Default for CapturePaths {
    fn default() -> Self {
        Self::new("lightburn_program.ngc", "lightburn_log.txt")
    }
}

/// Open program file and communication log of the active session
#[derive(Debug)]
pub struct ProgramCapture {
    paths: CapturePaths,
    program: File,
    log: File,
    lines_written: usize,
}

impl ProgramCapture {
    /// Truncate the program file and open the log for appending
    pub async fn open(paths: &CapturePaths) -> Result<Self> {
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&paths.log_file)
            .await
            .map_err(|e| open_failed(&paths.log_file, e))?;

        let program = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&paths.program_file)
            .await
            .map_err(|e| open_failed(&paths.program_file, e))?;

        tracing::debug!(
            "Capture opened: program={}, log={}",
            paths.program_file.display(),
            paths.log_file.display()
        );

        Ok(Self {
            paths: paths.clone(),
            program,
            log,
            lines_written: 0,
        })
    }

    /// Append one program line to both files and flush them
    pub async fn append(&mut self, line: &str) -> Result<()> {
        let record = format!("{}\n", line);

        write_flushed(&mut self.program, &self.paths.program_file, &record).await?;
        write_flushed(&mut self.log, &self.paths.log_file, &record).await?;

        self.lines_written += 1;
        Ok(())
    }

    /// Number of lines captured since the program file was recreated
    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    pub fn paths(&self) -> &CapturePaths {
        &self.paths
    }
}

async fn write_flushed(file: &mut File, path: &Path, record: &str) -> Result<()> {
    file.write_all(record.as_bytes())
        .await
        .map_err(|e| write_failed(path, e))?;
    file.flush().await.map_err(|e| write_failed(path, e))?;
    Ok(())
}

fn open_failed(path: &Path, e: std::io::Error) -> grblbridge_core::Error {
    CaptureError::OpenFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
    .into()
}

fn write_failed(path: &Path, e: std::io::Error) -> grblbridge_core::Error {
    CaptureError::WriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths_in(dir: &Path) -> CapturePaths {
        CapturePaths::new(dir.join("program.ngc"), dir.join("log.txt"))
    }

    #[tokio::test]
    async fn test_append_writes_program_and_log() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());

        let mut capture = ProgramCapture::open(&paths).await.unwrap();
        capture.append("G1 X10 Y10").await.unwrap();
        capture.append("M5").await.unwrap();
        assert_eq!(capture.lines_written(), 2);

        // Flushed per line, readable while the sink is still open.
        let program = std::fs::read_to_string(&paths.program_file).unwrap();
        assert_eq!(program, "G1 X10 Y10\nM5\n");
        let log = std::fs::read_to_string(&paths.log_file).unwrap();
        assert_eq!(log, "G1 X10 Y10\nM5\n");
    }

    #[tokio::test]
    async fn test_reopen_truncates_program_but_appends_log() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());

        let mut first = ProgramCapture::open(&paths).await.unwrap();
        first.append("G0 X0").await.unwrap();
        drop(first);

        let mut second = ProgramCapture::open(&paths).await.unwrap();
        assert_eq!(std::fs::read_to_string(&paths.program_file).unwrap(), "");
        second.append("G0 X5").await.unwrap();
        drop(second);

        assert_eq!(
            std::fs::read_to_string(&paths.program_file).unwrap(),
            "G0 X5\n"
        );
        assert_eq!(
            std::fs::read_to_string(&paths.log_file).unwrap(),
            "G0 X0\nG0 X5\n"
        );
    }

    #[tokio::test]
    async fn test_open_failure_is_capture_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths = CapturePaths::new(
            dir.path().join("missing").join("program.ngc"),
            dir.path().join("log.txt"),
        );

        let err = ProgramCapture::open(&paths).await.unwrap_err();
        assert!(err.is_capture_error());
        assert!(err.to_string().contains("program.ngc"));
    }
}
