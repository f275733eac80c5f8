use crate::commands;

/// Entry point the binary drives. Parsing and dispatch live in `commands`;
/// this seam exists so tests can exercise the full command surface without
/// spawning a process.
pub fn run(args: Vec<String>) -> Result<String, String> {
    commands::run_cli(args)
}
