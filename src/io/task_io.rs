use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::model::task::Task;
use crate::parse::{DateError, parse_task_file, serialize_tasks};

/// Error type for task file I/O
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: io::Error,
    },
    #[error("could not load {path}, line {line}: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        source: DateError,
    },
}

/// Load tasks from the task file.
///
/// A missing file is an empty list. Lines that cannot become tasks are
/// skipped, reported with a warning and copied to the recovery log. A bad
/// deadline anywhere fails the whole load.
pub fn load_tasks(path: &Path) -> Result<Vec<Task>, StorageError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no task file yet");
        return Ok(Vec::new());
    }

    let text = fs::read_to_string(path).map_err(|e| StorageError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let parsed = parse_task_file(&text).map_err(|e| StorageError::Parse {
        path: path.to_path_buf(),
        line: e.line,
        source: e.source,
    })?;

    if !parsed.dropped.is_empty() {
        tracing::warn!(
            path = %path.display(),
            count = parsed.dropped.len(),
            "skipped malformed lines in task file"
        );
        let fields = parsed
            .dropped
            .iter()
            .map(|d| (format!("Line {}", d.line), d.fault.to_string()))
            .chain(std::iter::once(("Source".to_string(), path.display().to_string())))
            .collect();
        let body = parsed
            .dropped
            .iter()
            .map(|d| d.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        recovery::log_recovery(
            recovery::parent_dir(path),
            RecoveryEntry {
                timestamp: chrono::Utc::now(),
                category: RecoveryCategory::Parser,
                description: format!("dropped {} line(s)", parsed.dropped.len()),
                fields,
                body,
            },
        );
    }

    tracing::debug!(path = %path.display(), count = parsed.tasks.len(), "loaded tasks");
    Ok(parsed.tasks)
}

/// Save tasks to the task file, replacing its contents.
///
/// The write goes through a temp file and rename, so a failed save leaves the
/// previous file intact. The unsaved content is copied to the recovery log.
pub fn save_tasks(path: &Path, tasks: &[Task]) -> Result<(), StorageError> {
    let content = serialize_tasks(tasks);
    let dir = recovery::parent_dir(path);

    let result = fs::create_dir_all(dir).and_then(|_| recovery::atomic_write(path, content.as_bytes()));
    if let Err(e) = result {
        tracing::warn!(path = %path.display(), error = %e, "task file write failed");
        recovery::log_recovery(
            dir,
            RecoveryEntry {
                timestamp: chrono::Utc::now(),
                category: RecoveryCategory::Write,
                description: "task file write failed".to_string(),
                fields: vec![
                    ("Target".to_string(), path.display().to_string()),
                    ("Error".to_string(), e.to_string()),
                ],
                body: content,
            },
        );
        return Err(StorageError::Write {
            path: path.to_path_buf(),
            source: e,
        });
    }

    tracing::debug!(path = %path.display(), count = tasks.len(), "saved tasks");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::recovery::read_recovery_entries;
    use crate::model::task::Priority;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task {
                name: "Call mom".into(),
                priority: Priority::Low,
                completed: false,
                deadline: ymd(2025, 1, 5),
            },
            Task {
                name: "Pay rent".into(),
                priority: Priority::High,
                completed: false,
                deadline: ymd(2025, 1, 10),
            },
            Task {
                name: "Renew passport".into(),
                priority: Priority::Medium,
                completed: true,
                deadline: ymd(2024, 11, 30),
            },
        ]
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let tasks = load_tasks(&tmp.path().join("nope.txt")).unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tasks.txt");
        save_tasks(&path, &sample_tasks()).unwrap();
        assert_eq!(load_tasks(&path).unwrap(), sample_tasks());
    }

    #[test]
    fn test_save_empty_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tasks.txt");
        save_tasks(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
        assert!(load_tasks(&path).unwrap().is_empty());
    }

    #[test]
    fn test_save_overwrites() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tasks.txt");
        save_tasks(&path, &sample_tasks()).unwrap();
        save_tasks(&path, &sample_tasks()[..1]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Call mom|Low|false|05-01-2025\n");
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/tasks.txt");
        save_tasks(&path, &sample_tasks()).unwrap();
        assert_eq!(load_tasks(&path).unwrap().len(), 3);
    }

    #[test]
    fn test_load_skips_short_line_and_logs_it() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tasks.txt");
        fs::write(
            &path,
            "Pay rent|High|false|10-01-2025\nno deadline|Low|false\nCall mom|Low|false|05-01-2025\n",
        )
        .unwrap();

        let tasks = load_tasks(&path).unwrap();
        let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Pay rent", "Call mom"]);

        let entries = read_recovery_entries(tmp.path(), None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Parser);
        assert_eq!(entries[0].body, "no deadline|Low|false");
        assert!(
            entries[0]
                .fields
                .contains(&("Line 2".to_string(), "expected 4 fields, found 3".to_string()))
        );
    }

    #[test]
    fn test_reloading_same_bad_file_logs_once() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tasks.txt");
        fs::write(&path, "Pay rent|High|false|10-01-2025\nbroken|Low\n").unwrap();

        for _ in 0..5 {
            assert_eq!(load_tasks(&path).unwrap().len(), 1);
        }
        assert_eq!(read_recovery_entries(tmp.path(), None).len(), 1);
    }

    #[test]
    fn test_clean_load_writes_no_recovery_log() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tasks.txt");
        save_tasks(&path, &sample_tasks()).unwrap();
        load_tasks(&path).unwrap();
        assert!(!recovery::recovery_log_path(tmp.path()).exists());
    }

    #[test]
    fn test_load_bad_deadline_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tasks.txt");
        fs::write(&path, "A|High|false|01-01-2030\nB|Low|false|32-01-2030\n").unwrap();

        match load_tasks(&path) {
            Err(StorageError::Parse { line, source, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(source, DateError::NotADate("32-01-2030".into()));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_save_to_directory_path_fails_and_is_logged() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("taken");
        fs::create_dir(&path).unwrap();

        let err = save_tasks(&path, &sample_tasks()).unwrap_err();
        assert!(matches!(err, StorageError::Write { .. }));

        let entries = read_recovery_entries(tmp.path(), None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Write);
        assert!(entries[0].body.contains("Pay rent|High|false|10-01-2025"));
    }
}
