//! Per-line hashes for duplicate code detection.
//!
//! Each line is whitespace-normalized and hashed with djb2 over its UTF-16
//! code units. The output holds one `<hex hash> <line number>` entry per
//! line, numbered from 1.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Collapses every whitespace run, leading runs included, into one space.
pub fn normalize_whitespace(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut after_text = true;
    for c in line.chars() {
        if is_java_whitespace(c) {
            if after_text {
                out.push(' ');
            }
            after_text = false;
        } else {
            out.push(c);
            after_text = true;
        }
    }
    out
}

/// Java's notion of whitespace excludes the non-breaking spaces.
fn is_java_whitespace(c: char) -> bool {
    c.is_whitespace() && !matches!(c, '\u{a0}' | '\u{2007}' | '\u{202f}')
}

pub fn djb2(text: &str) -> i32 {
    text.encode_utf16().fold(5381i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_add(hash)
            .wrapping_add(i32::from(unit))
    })
}

/// Hash listing for `source`. Trailing empty lines are not listed.
pub fn dup_hashes(source: &str) -> String {
    let mut lines: Vec<&str> = source.split('\n').collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let hash = djb2(&normalize_whitespace(line));
        let _ = writeln!(out, "{:x} {}", hash as u32, i + 1);
    }
    out
}

/// Writes the hash listing of `source` to `path`, creating parent
/// directories as needed.
pub fn write_dup_hashes(source: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, dup_hashes(source))
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(file = %path.display(), "duplicate hashes written");
    Ok(())
}
