use std::fs;
use std::path::{Path, PathBuf};

fn absolute(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Output path for the document of `src`.
///
/// The source path relative to `src_root` is flattened into one file name:
/// `.` becomes `_d` and path separators become `_s`, then `.ext` is appended.
/// `pkg/A.java` under the root yields `<out_dir>/pkg_sA_djava.xmi`.
pub fn output_file_name(src: &Path, src_root: &Path, out_dir: &Path, ext: &str) -> PathBuf {
    let out = absolute(out_dir);
    let src = absolute(src).to_string_lossy().into_owned();
    let root = absolute(src_root).to_string_lossy().into_owned();

    let mut name = src.clone();
    if src.len() > root.len() {
        name = src.get(root.len() + 1..).unwrap_or(&src).replace('.', "_d");
        name.push('.');
        name.push_str(ext);
    }
    let name = name.replace(['/', '\\'], "_s");
    out.join(name)
}

/// Path of the duplicate-hash file for a document written to `out_file`:
/// `<parent of output dir>/<dups_dir>/<document stem>.hsh`.
pub fn dups_file_name(out_file: &Path, dups_dir: &str) -> PathBuf {
    let out_dir = out_file.parent().unwrap_or_else(|| Path::new("."));
    let base = out_dir.parent().unwrap_or(out_dir);
    let stem = out_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    base.join(dups_dir).join(format!("{stem}.hsh"))
}
