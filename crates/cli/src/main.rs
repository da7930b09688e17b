//! Entry point for the command-line interface.
//! Argument handling and the analysis pipeline live in the library crate.

use javamodel::analyze::run_analysis;
use javamodel::args::parse_cli;

fn main() -> anyhow::Result<()> {
    let cli = parse_cli();
    run_analysis(cli)
}
