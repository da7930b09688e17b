use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "javamodel - extracts the structural model of a Java source file",
    long_about = "javamodel parses one Java source file and writes its structural model \
(classes, relations, attributes, operations and per-operation statement streams) \
as an XMI document for diagram tooling.

Each run also records the file's imports in a dependency cache shared by every \
run targeting the same output directory.

Examples:
  javamodel src/app/Main.java src out          # Write out/app_sMain_djava.xmi
  javamodel src/app/Main.java src out -dups    # Also write duplicate-line hashes
  javamodel src/app/Main.java src out src/app/Helper.java"
)]
pub struct Cli {
    /// Java source file to analyze
    pub source: PathBuf,
    /// Root directory of the source tree
    pub source_root: PathBuf,
    /// Directory receiving the model document
    pub output_dir: PathBuf,
    /// Additional Java files whose classes help resolve names
    pub context: Vec<PathBuf>,
    /// Write per-line hashes for duplicate code detection
    #[arg(long)]
    pub dups: bool,
    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
    /// Suppress non-essential output
    #[arg(long)]
    pub quiet: bool,
    /// Write the built model as JSON
    #[arg(long = "dump-model")]
    pub dump_model: Option<PathBuf>,
    /// Write the lowered syntax tree as JSON
    #[arg(long = "dump-tree")]
    pub dump_tree: Option<PathBuf>,
}

/// Rewrites the single-dash `-dups` spelling to `--dups`.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|a| if a == "-dups" { OsString::from("--dups") } else { a })
        .collect()
}

pub fn parse_cli() -> Cli {
    Cli::parse_from(normalize_args(std::env::args_os()))
}
