//! Program backups and viewing
//!
//! The program file is overwritten by the next session, so a job worth
//! keeping is copied to a timestamped sibling before the next transfer.

use chrono::{DateTime, Local};
use grblbridge_core::{CaptureError, Catalog, Error, MessageKey, Result};
use std::path::{Path, PathBuf};

/// Backup file name for `program_file` taken at `stamp`
///
/// `lightburn_program.ngc` becomes `lightburn_program_20240131_174502.ngc`.
pub fn backup_file_name(program_file: &Path, stamp: DateTime<Local>) -> PathBuf {
    let stem = program_file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("program");
    PathBuf::from(format!("{}_{}.ngc", stem, stamp.format("%Y%m%d_%H%M%S")))
}

/// Copy the current program file into `backup_dir`
pub fn create_backup(program_file: &Path, backup_dir: &Path) -> Result<PathBuf> {
    if !program_file.is_file() {
        return Err(CaptureError::ProgramFileMissing {
            path: program_file.display().to_string(),
        }
        .into());
    }

    let target = backup_dir.join(backup_file_name(program_file, Local::now()));
    let backup_failed = |e: std::io::Error| -> Error {
        CaptureError::BackupFailed {
            path: target.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    };

    std::fs::create_dir_all(backup_dir).map_err(backup_failed)?;
    std::fs::copy(program_file, &target).map_err(backup_failed)?;
    tracing::info!("Backed up {} to {}", program_file.display(), target.display());

    Ok(target)
}

/// User-facing outcome of [`create_backup`]
pub fn backup_message(result: &Result<PathBuf>, catalog: &Catalog) -> String {
    match result {
        Ok(path) => format!("{} {}", catalog.text(MessageKey::BackupCreated), path.display()),
        Err(Error::Capture(CaptureError::ProgramFileMissing { .. })) => {
            catalog.text(MessageKey::NoProgramFile).to_string()
        }
        Err(e) => format!("{} {}", catalog.text(MessageKey::BackupError), e),
    }
}

/// Current contents of the program file
pub fn read_program(program_file: &Path) -> Result<String> {
    if !program_file.is_file() {
        return Err(CaptureError::ProgramFileMissing {
            path: program_file.display().to_string(),
        }
        .into());
    }

    std::fs::read_to_string(program_file).map_err(|e| {
        CaptureError::OpenFailed {
            path: program_file.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use grblbridge_core::Language;

    #[test]
    fn test_backup_file_name() {
        let stamp = Local.with_ymd_and_hms(2024, 1, 31, 17, 45, 2).unwrap();
        assert_eq!(
            backup_file_name(Path::new("/jobs/lightburn_program.ngc"), stamp),
            PathBuf::from("lightburn_program_20240131_174502.ngc")
        );
        assert_eq!(
            backup_file_name(Path::new("cut.gcode"), stamp),
            PathBuf::from("cut_20240131_174502.ngc")
        );
    }

    #[test]
    fn test_backup_messages() {
        let en = Catalog::new(Language::En);
        let de = Catalog::new(Language::De);

        let ok: Result<PathBuf> = Ok(PathBuf::from("job_1.ngc"));
        assert_eq!(backup_message(&ok, &en), "Backup created: job_1.ngc");
        assert_eq!(backup_message(&ok, &de), "Backup erstellt: job_1.ngc");

        let missing: Result<PathBuf> = Err(CaptureError::ProgramFileMissing {
            path: "job.ngc".to_string(),
        }
        .into());
        assert_eq!(backup_message(&missing, &en), "No program file available");

        let failed: Result<PathBuf> = Err(Error::other("disk full"));
        assert!(backup_message(&failed, &en).starts_with("Error creating backup file:"));
    }
}
