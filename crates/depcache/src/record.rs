use std::path::Path;

/// One imported file: directory (with trailing `/`) and leaf file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    pub dir: String,
    pub file: String,
}

/// A cache line: `path|parseTime;checkTime;(dir;file;)*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRecord {
    pub path: String,
    pub parse_time: u64,
    /// Always written equal to `parse_time`.
    pub check_time: u64,
    pub imports: Vec<ImportEntry>,
}

impl DependencyRecord {
    /// Builds the record for `path` from raw import declarations. Returns
    /// `None` when the file has no imports at all.
    pub fn from_imports(path: &str, imports: &[String], src_root: &Path, now: u64) -> Option<Self> {
        if imports.is_empty() {
            return None;
        }
        let root = with_trailing_sep(&src_root.to_string_lossy());
        let imports = imports
            .iter()
            .filter_map(|i| import_target(i))
            .map(|(dir, leaf)| {
                let dir = if Path::new(&format!("{root}{dir}")).is_dir() {
                    format!("{root}{dir}")
                } else {
                    dir
                };
                ImportEntry {
                    dir,
                    file: format!("{leaf}.java"),
                }
            })
            .collect();
        Some(Self {
            path: path.to_string(),
            parse_time: now,
            check_time: now,
            imports,
        })
    }

    pub fn to_line(&self) -> String {
        let mut line = format!("{}|{};{};", self.path, self.parse_time, self.check_time);
        for entry in &self.imports {
            line.push_str(&entry.dir);
            line.push(';');
            line.push_str(&entry.file);
            line.push(';');
        }
        line
    }

    /// Parses a cache line. The value list after `|` must hold both times
    /// and complete `dir;file` pairs.
    pub fn parse(line: &str) -> Option<Self> {
        let (path, rest) = line.split_once('|')?;
        let values: Vec<&str> = rest.split(';').filter(|v| !v.is_empty()).collect();
        if values.len() < 2 || values.len() % 2 != 0 {
            return None;
        }
        let parse_time = values[0].trim().parse().ok()?;
        let check_time = values[1].trim().parse().ok()?;
        let imports = values[2..]
            .chunks(2)
            .map(|pair| ImportEntry {
                dir: pair[0].to_string(),
                file: pair[1].to_string(),
            })
            .collect();
        Some(Self {
            path: path.to_string(),
            parse_time,
            check_time,
            imports,
        })
    }
}

/// Key of a cache line: the text before the first `|`.
pub fn record_key(line: &str) -> Option<&str> {
    line.split_once('|').map(|(key, _)| key)
}

/// Splits an import declaration into `(dir/, leaf)` with dots turned into
/// slashes. Declarations without a package part yield `None`.
///
/// `import java.util.List;` gives `("java/util/", "List")`.
pub fn import_target(import: &str) -> Option<(String, String)> {
    let mut text = import.trim();
    text = text.strip_prefix("import").map(str::trim_start).unwrap_or(text);
    text = text.strip_prefix("static ").map(str::trim_start).unwrap_or(text);
    let text = text.trim_end().trim_end_matches(';').trim().replace('.', "/");
    let (dir, leaf) = text.rsplit_once('/')?;
    Some((format!("{dir}/"), leaf.to_string()))
}

fn with_trailing_sep(dir: &str) -> String {
    if dir.ends_with('/') || dir.ends_with('\\') {
        dir.to_string()
    } else {
        format!("{dir}/")
    }
}
