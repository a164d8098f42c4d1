use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

/// File name of the recovery log, kept beside the task file.
pub const RECOVERY_LOG_NAME: &str = ".todo-recovery.log";

/// Size at which appending trims the log first.
const MAX_LOG_SIZE: u64 = 1_048_576;

/// Default number of days before entries are prunable.
pub const PRUNE_AGE_DAYS: u32 = 30;

/// Self-documenting header written at the top of a new recovery log.
const FILE_HEADER: &str = "\
<!-- todo recovery log: append-only record of task data that was not kept
     Lines dropped while loading the task file and saves that failed end
     up here, so nothing typed is lost silently.
     View with: todo recovery
     Clear with: todo recovery prune --all -->

---
";

/// Separator between the timestamp and the category in an entry header.
const HEADER_SEPARATOR: &str = " - ";

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Category of a recovery entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCategory {
    /// Lines skipped while loading the task file
    Parser,
    /// A save that could not be written
    Write,
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryCategory::Parser => write!(f, "parser"),
            RecoveryCategory::Write => write!(f, "write"),
        }
    }
}

impl RecoveryCategory {
    pub fn parse_category(s: &str) -> Option<Self> {
        match s {
            "parser" => Some(RecoveryCategory::Parser),
            "write" => Some(RecoveryCategory::Write),
            _ => None,
        }
    }
}

/// A single entry in the recovery log.
#[derive(Debug, Clone)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

/// A backtick fence longer than any backtick run inside `body`.
fn body_fence(body: &str) -> String {
    let longest = body.split(|c| c != '`').map(str::len).max().unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

/// Return the path to the recovery log file in `dir`.
pub fn recovery_log_path(dir: &Path) -> PathBuf {
    dir.join(RECOVERY_LOG_NAME)
}

/// Directory holding a file, `.` for bare file names.
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

// ---------------------------------------------------------------------------
// Atomic file write
// ---------------------------------------------------------------------------

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut tmp = NamedTempFile::new_in(parent_dir(path))?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry formatting
// ---------------------------------------------------------------------------

impl RecoveryEntry {
    /// Format this entry as a markdown block for the recovery log.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "## {}{}{}: {}\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            HEADER_SEPARATOR,
            self.category,
            self.description,
        ));
        out.push('\n');

        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }

        if !self.body.is_empty() {
            let fence = body_fence(&self.body);
            out.push('\n');
            out.push_str(&fence);
            out.push_str("text\n");
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&fence);
            out.push('\n');
        }

        out.push('\n');
        out.push_str("---\n");
        out
    }

    /// Same category, description and body as `other`
    fn repeats(&self, other: &RecoveryEntry) -> bool {
        self.category == other.category
            && self.description == other.description
            && self.body.trim_end_matches('\n') == other.body.trim_end_matches('\n')
    }

    /// Serialize to JSON value for `todo recovery --json`.
    pub fn to_json(&self) -> serde_json::Value {
        let fields: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();

        serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            "category": self.category.to_string(),
            "description": self.description,
            "fields": fields,
            "body": self.body,
        })
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Append a recovery entry to the log. Errors are swallowed and printed to stderr.
pub fn log_recovery(dir: &Path, entry: RecoveryEntry) {
    if let Err(e) = log_recovery_inner(dir, entry) {
        eprintln!("warning: could not write to recovery log: {}", e);
    }
}

fn log_recovery_inner(dir: &Path, entry: RecoveryEntry) -> io::Result<()> {
    let path = recovery_log_path(dir);
    let existing = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };

    // Reading the same bad file again records nothing new
    if parse_entries(&existing)
        .last()
        .is_some_and(|newest| newest.repeats(&entry))
    {
        tracing::debug!(path = %path.display(), category = %entry.category, "recovery entry already logged");
        return Ok(());
    }

    if existing.len() as u64 > MAX_LOG_SIZE {
        trim_log(&path, &existing)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    if existing.is_empty() {
        file.write_all(FILE_HEADER.as_bytes())?;
    }
    file.write_all(entry.to_markdown().as_bytes())?;

    tracing::debug!(path = %path.display(), category = %entry.category, "recovery entry logged");
    Ok(())
}

/// Rewrite an oversized log: drop entries past the prune age, then the
/// oldest remaining ones until the log is at most half of `MAX_LOG_SIZE`.
fn trim_log(path: &Path, content: &str) -> io::Result<()> {
    let cutoff = Utc::now() - chrono::Duration::days(i64::from(PRUNE_AGE_DAYS));
    let rendered: Vec<String> = parse_entries(content)
        .into_iter()
        .filter(|e| e.timestamp >= cutoff)
        .map(|e| e.to_markdown())
        .collect();

    let budget = (MAX_LOG_SIZE / 2) as usize;
    let mut size = FILE_HEADER.len() + rendered.iter().map(String::len).sum::<usize>();
    let mut skip = 0;
    while size > budget && skip < rendered.len() {
        size -= rendered[skip].len();
        skip += 1;
    }

    let mut trimmed = String::from(FILE_HEADER);
    for entry in &rendered[skip..] {
        trimmed.push_str(entry);
    }
    tracing::debug!(path = %path.display(), dropped = skip, "trimmed recovery log");
    atomic_write(path, trimmed.as_bytes())
}

// ---------------------------------------------------------------------------
// Reading entries
// ---------------------------------------------------------------------------

/// Read recovery entries from the log, most recent first.
pub fn read_recovery_entries(dir: &Path, limit: Option<usize>) -> Vec<RecoveryEntry> {
    let path = recovery_log_path(dir);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    let mut entries = parse_entries(&content);

    // Entries are parsed oldest-first
    if let Some(n) = limit {
        let skip = entries.len().saturating_sub(n);
        entries.drain(..skip);
    }

    entries.reverse();
    entries
}

/// Parse all entries from the log content string.
fn parse_entries(content: &str) -> Vec<RecoveryEntry> {
    let mut entries = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let Some(header) = line.strip_prefix("## ") else {
            continue;
        };
        let Some((timestamp, category, description)) = parse_entry_header(header) else {
            continue;
        };

        let mut fields = Vec::new();
        let mut body = String::new();
        // The fence that opened the current code block, if inside one
        let mut open_fence: Option<&str> = None;

        for line in lines.by_ref() {
            if open_fence.is_none() && (line == "---" || line.starts_with("## ")) {
                break;
            }

            if let Some(fence) = open_fence {
                if line == fence {
                    open_fence = None;
                } else {
                    if !body.is_empty() {
                        body.push('\n');
                    }
                    body.push_str(line);
                }
                continue;
            }

            if line.starts_with("```") {
                let ticks = line.len() - line.trim_start_matches('`').len();
                open_fence = Some(&line[..ticks]);
                continue;
            }

            if let Some((key, value)) = line.trim().split_once(": ") {
                fields.push((key.to_string(), value.to_string()));
            }
        }

        entries.push(RecoveryEntry {
            timestamp,
            category,
            description,
            fields,
            body,
        });
    }

    entries
}

/// Parse an entry header: `<timestamp> - <category>: <description>`
fn parse_entry_header(header: &str) -> Option<(DateTime<Utc>, RecoveryCategory, String)> {
    let (timestamp_str, rest) = header.split_once(HEADER_SEPARATOR)?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp_str)
        .ok()?
        .with_timezone(&Utc);
    let (category_str, description) = rest.split_once(": ")?;
    let category = RecoveryCategory::parse_category(category_str)?;
    Some((timestamp, category, description.to_string()))
}

// ---------------------------------------------------------------------------
// Pruning
// ---------------------------------------------------------------------------

/// Remove entries older than `before`, or every entry when `all` is set.
/// Returns the number of entries removed.
pub fn prune_recovery(dir: &Path, before: Option<DateTime<Utc>>, all: bool) -> io::Result<usize> {
    let path = recovery_log_path(dir);
    if !path.exists() {
        return Ok(0);
    }

    let content = std::fs::read_to_string(&path)?;
    let mut entries = parse_entries(&content);
    let original_count = entries.len();

    if all {
        entries.clear();
    } else if let Some(cutoff) = before {
        entries.retain(|e| e.timestamp >= cutoff);
    }

    let mut rewritten = String::from(FILE_HEADER);
    for entry in &entries {
        rewritten.push_str(&entry.to_markdown());
    }
    atomic_write(&path, rewritten.as_bytes())?;

    Ok(original_count - entries.len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
