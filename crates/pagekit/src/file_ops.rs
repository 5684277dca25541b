//! File-system helpers reporting through the step recorder.

use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::reporter::StepRecorder;
use crate::result::{PagekitError, PagekitResult};

/// Replace the contents of `path` with `content`.
///
/// # Errors
///
/// Returns the I/O error after recording a failed step.
pub fn write_in_text_file(
    recorder: &StepRecorder,
    content: &str,
    path: impl AsRef<Path>,
) -> PagekitResult<()> {
    let path = path.as_ref();
    match fs::write(path, content) {
        Ok(()) => {
            recorder.passed(format!("'{content}' values written in {}", path.display()));
            Ok(())
        }
        Err(err) => {
            recorder.failed(format!(
                "write to {} failed due to the following error: {err}",
                path.display()
            ));
            Err(err.into())
        }
    }
}

/// Copy `source` over `destination`.
///
/// # Errors
///
/// Returns the I/O error after recording a failed step.
pub fn copy_file(
    recorder: &StepRecorder,
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
) -> PagekitResult<()> {
    let (source, destination) = (source.as_ref(), destination.as_ref());
    match fs::copy(source, destination) {
        Ok(_) => {
            recorder.passed(format!(
                "File Moved from '{}' to '{}'",
                source.display(),
                destination.display()
            ));
            Ok(())
        }
        Err(err) => {
            recorder.failed(format!("File not moved: {err}"));
            Err(err.into())
        }
    }
}

/// Require `path` to be a readable directory.
///
/// # Errors
///
/// Returns `AssertionFailed` when `path` is missing, is not a directory, or
/// cannot be listed.
pub fn verify_files_present_in_directory(
    recorder: &StepRecorder,
    path: impl AsRef<Path>,
) -> PagekitResult<()> {
    let path = path.as_ref();
    match fs::read_dir(path) {
        Ok(_) => {
            recorder.passed(format!("File present in {}", path.display()));
            Ok(())
        }
        Err(err) => {
            debug!(path = %path.display(), error = %err, "directory not listed");
            let message = format!("{} File not present", path.display());
            recorder.failed(message.clone());
            Err(PagekitError::assertion(message))
        }
    }
}

/// Delete the file at `path`.
///
/// A failed delete is only logged unless `throw_on_failure` is set.
///
/// # Errors
///
/// Returns the I/O error when the delete fails and `throw_on_failure` is set.
pub fn delete_system_file(
    recorder: &StepRecorder,
    path: impl AsRef<Path>,
    throw_on_failure: bool,
) -> PagekitResult<()> {
    let path = path.as_ref();
    match fs::remove_file(path) {
        Ok(()) => {
            recorder.passed(format!("{} file deleted", path.display()));
            Ok(())
        }
        Err(err) if throw_on_failure => {
            recorder.failed(format!("{} File not deleted: {err}", path.display()));
            Err(err.into())
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "delete failed");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::StepStatus;

    #[test]
    fn test_write_then_copy() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = StepRecorder::new();
        let source = dir.path().join("links.txt");
        let destination = dir.path().join("copy.txt");
        write_in_text_file(&recorder, "Careers", &source).unwrap();
        copy_file(&recorder, &source, &destination).unwrap();
        assert_eq!(fs::read_to_string(&destination).unwrap(), "Careers");
        assert_eq!(recorder.len(), 2);
    }

    #[test]
    fn test_copy_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = StepRecorder::new();
        let err = copy_file(&recorder, dir.path().join("nope"), dir.path().join("x")).unwrap_err();
        assert!(matches!(err, PagekitError::Io(_)));
        assert_eq!(recorder.steps()[0].status, StepStatus::Failed);
    }

    #[test]
    fn test_verify_present() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = StepRecorder::new();
        verify_files_present_in_directory(&recorder, dir.path()).unwrap();
        assert!(verify_files_present_in_directory(&recorder, dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_verify_rejects_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("report.xml");
        fs::write(&file, "<report/>").unwrap();
        let recorder = StepRecorder::new();
        let err = verify_files_present_in_directory(&recorder, &file).unwrap_err();
        assert!(matches!(err, PagekitError::AssertionFailed { .. }));
        assert_eq!(recorder.failures(), vec![format!("{} File not present", file.display())]);
    }

    #[test]
    fn test_delete_missing_file_tolerated_unless_required() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = StepRecorder::new();
        let missing = dir.path().join("missing.xml");
        delete_system_file(&recorder, &missing, false).unwrap();
        assert!(recorder.is_empty());
        assert!(delete_system_file(&recorder, &missing, true).is_err());
        assert_eq!(recorder.failures().len(), 1);
    }

    #[test]
    fn test_delete_existing() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = StepRecorder::new();
        let file = dir.path().join("a.xml");
        fs::write(&file, "<a/>").unwrap();
        delete_system_file(&recorder, &file, true).unwrap();
        assert!(!file.exists());
    }
}
