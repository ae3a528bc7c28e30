//! Helpers for talking to the GitHub Actions runner.
//!
//! Inputs arrive as `INPUT_<NAME>` environment variables, and the runner
//! interprets `::command::value` lines written to stdout.

use std::env;

/// Environment variable holding the action input `name`.
pub fn input_var(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

/// Value of the action input `name`, or an empty string if unset.
pub fn input(name: &str) -> String { env::var(input_var(name)).unwrap_or_default() }

/// Ask the runner to redact `value` from all subsequent log output.
pub fn add_mask(value: &str) {
    for line in value.lines().map(str::trim).filter(|l| !l.is_empty()) {
        println!("::add-mask::{}", escape_data(line));
    }
}

/// Report an error annotation for the current step.
pub fn error(message: &str) {
    println!("::error::{}", escape_data(message));
}

fn escape_data(value: &str) -> String {
    value.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}
