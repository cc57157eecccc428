//! Read access to the artifacts left behind by a mock command's runs.
//!
//! None of these functions fail. A missing artifact means that the mock has
//! not been run, and is reported as `false` or empty.
//!

//		Modules

#[cfg(test)]
#[path = "tests/inspect.rs"]
mod tests;



//		Packages

use crate::script::{ENVIRONMENT_LOG, ERROR_LOG, OUTPUT_LOG, PARAMETERS_LOG, RAN_MARKER};
use std::{
	fs,
	path::Path,
};



//		Functions

//		has_run
/// Indicates whether the mock command in `directory` has been run.
#[must_use]
pub fn has_run(directory: &Path) -> bool {
	directory.join(RAN_MARKER).try_exists().unwrap_or(false)
}

//		output
/// Returns the standard output written by the latest run.
#[must_use]
pub fn output(directory: &Path) -> String {
	read_artifact(directory, OUTPUT_LOG)
}

//		error_output
/// Returns the standard error written by the latest run.
#[must_use]
pub fn error_output(directory: &Path) -> String {
	read_artifact(directory, ERROR_LOG)
}

//		environment
/// Returns the environment dumps of every run, as `KEY=value` lines.
#[must_use]
pub fn environment(directory: &Path) -> String {
	read_artifact(directory, ENVIRONMENT_LOG)
}

//		parameters
/// Returns the positional parameters received, one entry per argument.
///
/// Arguments are listed in the order received. Runs accumulate, so after
/// several runs the list holds the arguments of each run in turn. Each entry
/// is exactly the argument received, including any carriage returns, newlines,
/// or backslashes in it.
///
#[must_use]
pub fn parameters(directory: &Path) -> Vec<String> {
	read_artifact(directory, PARAMETERS_LOG).split_terminator('\n').map(unescape_parameter).collect()
}

//		read_artifact
/// Reads an artifact file as text, or an empty string if it cannot be read.
fn read_artifact(directory: &Path, artifact: &str) -> String {
	fs::read(directory.join(artifact))
		.map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
		.unwrap_or_default()
}

//		unescape_parameter
/// Reverses the escaping applied to one line of the parameters log.
///
/// `\\` becomes a backslash and `\n` becomes a newline. Any other backslash is
/// kept as it is.
///
fn unescape_parameter(line: &str) -> String {
	let mut unescaped = String::with_capacity(line.len());
	let mut chars     = line.chars();
	while let Some(current) = chars.next() {
		if current != '\\' {
			unescaped.push(current);
			continue;
		}
		match chars.next() {
			Some('\\') => unescaped.push('\\'),
			Some('n')  => unescaped.push('\n'),
			Some(next) => {
				unescaped.push('\\');
				unescaped.push(next);
			},
			None       => unescaped.push('\\'),
		}
	}
	unescaped
}
