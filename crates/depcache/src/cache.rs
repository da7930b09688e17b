use anyhow::{Context, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::lock::{CacheLock, RetryPolicy};
use crate::record::{record_key, DependencyRecord};

/// Result of one merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// A fresh record replaced any previous one for the file.
    Updated,
    /// The file has no imports; the cache was left untouched.
    Unchanged,
    /// The cache stayed locked through every retry.
    Skipped,
}

/// Shared per-output-directory dependency cache.
#[derive(Debug, Clone)]
pub struct DependencyCache {
    path: PathBuf,
    policy: RetryPolicy,
}

impl DependencyCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the record for `src_path` with one built from `imports`.
    pub fn merge(&self, src_path: &str, imports: &[String], src_root: &Path) -> Result<MergeOutcome> {
        self.merge_at(src_path, imports, src_root, epoch_secs())
    }

    /// Same as [`merge`](Self::merge) with an explicit timestamp.
    pub fn merge_at(
        &self,
        src_path: &str,
        imports: &[String],
        src_root: &Path,
        now: u64,
    ) -> Result<MergeOutcome> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let Some(_lock) = CacheLock::acquire(&self.path, &self.policy)? else {
            return Ok(MergeOutcome::Skipped);
        };

        let mut lines = self.read_lines()?;
        if let Some(pos) = lines.iter().position(|l| record_key(l) == Some(src_path)) {
            lines.remove(pos);
        }
        let Some(record) = DependencyRecord::from_imports(src_path, imports, src_root, now) else {
            debug!(file = src_path, "no imports, dependency cache untouched");
            return Ok(MergeOutcome::Unchanged);
        };
        lines.push(record.to_line());
        self.rewrite(&lines)?;
        info!(
            file = src_path,
            imports = record.imports.len(),
            cache = %self.path.display(),
            "dependency cache updated"
        );
        Ok(MergeOutcome::Updated)
    }

    /// Reads every well-formed record. A missing cache reads as empty.
    pub fn load(&self) -> Result<Vec<DependencyRecord>> {
        let records = self
            .read_lines()?
            .iter()
            .filter_map(|line| {
                let record = DependencyRecord::parse(line);
                if record.is_none() && !line.trim().is_empty() {
                    debug!(line = %line, "skipping malformed cache line");
                }
                record
            })
            .collect();
        Ok(records)
    }

    fn read_lines(&self) -> Result<Vec<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(text.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", self.path.display())),
        }
    }

    /// Writes `lines` to a temporary file beside the cache and renames it
    /// over the cache.
    fn rewrite(&self, lines: &[String]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
        for line in lines {
            writeln!(tmp, "{line}")
                .with_context(|| format!("failed to write {}", tmp.path().display()))?;
        }
        tmp.flush()?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
