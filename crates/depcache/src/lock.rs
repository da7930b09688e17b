use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Bounded retry discipline for exclusive access to the cache file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
    /// A lock file older than this is assumed abandoned and removed.
    pub stale_after: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 50,
            delay: Duration::from_millis(100),
            stale_after: Duration::from_secs(30),
        }
    }
}

/// Exclusive hold on a cache file, backed by a sidecar `<cache>.lock` file
/// that is created atomically and holds the owner's token. Dropping the
/// hold removes the lock file only while it still carries that token.
#[derive(Debug)]
pub struct CacheLock {
    path: PathBuf,
    token: String,
}

impl CacheLock {
    /// Tries to take the lock for `cache`. `Ok(None)` means every attempt
    /// found the lock held.
    pub fn acquire(cache: &Path, policy: &RetryPolicy) -> Result<Option<Self>> {
        let path = lock_path(cache);
        for attempt in 0..policy.attempts {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    let token = new_token();
                    if let Err(e) = file.write_all(token.as_bytes()) {
                        drop(file);
                        let _ = fs::remove_file(&path);
                        return Err(e)
                            .with_context(|| format!("failed to write lock {}", path.display()));
                    }
                    debug!(lock = %path.display(), attempt, "cache lock acquired");
                    return Ok(Some(Self { path, token }));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if let Some(seen) = stale_token(&path, policy.stale_after) {
                        if take_over(&path, &seen) {
                            warn!(lock = %path.display(), "broke stale cache lock");
                        }
                        continue;
                    }
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("failed to create lock {}", path.display()))
                }
            }
            if attempt + 1 < policy.attempts {
                thread::sleep(policy.delay);
            }
        }
        warn!(
            cache = %cache.display(),
            attempts = policy.attempts,
            "cache busy, skipping dependency update"
        );
        Ok(None)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Content written to the lock file by this holder.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        match fs::read_to_string(&self.path) {
            Ok(content) if content == self.token => {
                let _ = fs::remove_file(&self.path);
            }
            Ok(_) => warn!(lock = %self.path.display(), "cache lock taken over by another holder"),
            Err(_) => {}
        }
    }
}

pub fn lock_path(cache: &Path) -> PathBuf {
    let mut name = cache.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

/// `<pid> <nanos> <sequence>`, unique across processes and within one.
fn new_token() -> String {
    static SEQUENCE: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!(
        "{} {} {}",
        std::process::id(),
        nanos,
        SEQUENCE.fetch_add(1, Ordering::Relaxed)
    )
}

/// Content of the lock at `path` when it is older than `stale_after`.
fn stale_token(path: &Path, stale_after: Duration) -> Option<String> {
    let age = fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| SystemTime::now().duration_since(t).ok())?;
    if age <= stale_after {
        return None;
    }
    fs::read_to_string(path).ok()
}

/// Removes the lock at `path` if it still holds `seen`. The lock is first
/// renamed to a private name so only one waiter can claim it; a lock that
/// turns out to be a newer one is linked back in place.
pub(crate) fn take_over(path: &Path, seen: &str) -> bool {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".stale.{}", new_token().replace(' ', "-")));
    let claimed = PathBuf::from(name);
    if fs::rename(path, &claimed).is_err() {
        return false;
    }
    let ours = fs::read_to_string(&claimed).is_ok_and(|c| c == seen);
    if !ours && fs::hard_link(&claimed, path).is_err() {
        warn!(lock = %path.display(), "could not restore a live cache lock");
    }
    let _ = fs::remove_file(&claimed);
    ours
}
