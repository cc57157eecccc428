//! This module renders the fake executable that stands in for a real command.
//!
//! The executable is a small POSIX shell script rendered from a fixed template,
//! with the configured text embedded as quoted shell words.
//! When run, it replays the configured output and exit status, and leaves
//! behind a set of invocation artifacts next to itself, which can be read back
//! using the functions in the [`inspect`](crate::inspect) module.
//!

//		Modules

#[cfg(test)]
#[path = "tests/script.rs"]
mod tests;



//		Packages

use crate::errors::MockError;
use minijinja::{Environment, UndefinedBehavior, context};
use shell_quote::{QuoteRefExt as _, Sh};
use std::{
	fs::{Permissions, self},
	os::unix::fs::PermissionsExt as _,
	path::{Path, PathBuf},
};



//		Constants

/// The name of the marker file touched on every run.
pub(crate) const RAN_MARKER: &str = ".ran";

/// The name of the log holding the standard output of the latest run.
pub(crate) const OUTPUT_LOG: &str = ".out";

/// The name of the log holding the standard error of the latest run.
pub(crate) const ERROR_LOG: &str = ".err";

/// The name of the log that receives one line per positional argument.
///
/// Within each line, a backslash is written as `\\` and a newline as `\n`, so
/// that every argument occupies exactly one line.
///
pub(crate) const PARAMETERS_LOG: &str = ".params";

/// The name of the log that receives an environment dump on every run.
pub(crate) const ENVIRONMENT_LOG: &str = ".envs";

/// Every artifact name, none of which may be used as a command name.
const ARTIFACTS: [&str; 5] = [RAN_MARKER, OUTPUT_LOG, ERROR_LOG, PARAMETERS_LOG, ENVIRONMENT_LOG];

/// The permissions applied to the generated executable.
const EXECUTABLE_MODE: u32 = 0o755;

/// The script template.
///
/// Only shell builtins are used, apart from `env`, which is looked up on the
/// default system path. That way a mock of any command name, including the
/// utilities a script would normally call, never ends up running itself.
/// Artifacts are written before the output streams, so that they are complete
/// even if the caller has stopped reading.
///
const SCRIPT_TEMPLATE: &str = r#"#!/bin/sh

case $0 in
	*/*) dir=${0%/*} ;;
	*)   dir=. ;;
esac
stdout={{ stdout }}
stderr={{ stderr }}
nl='
'

for arg in "$@"
do
	rest=$arg
	escaped=
	while [ -n "$rest" ]
	do
		char=${rest%"${rest#?}"}
		rest=${rest#?}
		case $char in
			\\)    escaped="$escaped\\\\" ;;
			"$nl") escaped="$escaped\\n" ;;
			*)     escaped="$escaped$char" ;;
		esac
	done
	printf '%s\n' "$escaped" >> "$dir/{{ parameters_log }}"
done
: > "$dir/{{ ran_marker }}"
command -p env >> "$dir/{{ environment_log }}"
printf '%s' "$stdout" > "$dir/{{ output_log }}"
printf '%s' "$stderr" > "$dir/{{ error_log }}"

printf '%s' "$stdout"
printf '%s' "$stderr" >&2
exit {{ status }}
"#;



//		Structs

//		Config
/// The behaviour of a mock command.
#[cfg_attr(    feature = "reasons",  allow(clippy::exhaustive_structs, reason = "Provided for configuration"))]
#[cfg_attr(not(feature = "reasons"), allow(clippy::exhaustive_structs))]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Config {
	//		Public properties
	/// The command name. This becomes the filename of the executable, and so
	/// is what callers resolve through the search path, e.g. `ssh`.
	pub name:   String,

	/// The text written to standard output on every run.
	pub stdout: String,

	/// The text written to standard error on every run.
	pub stderr: String,

	/// The exit status returned on every run.
	pub status: u8,
}

//󰭅		Config
impl Config {
	//		new
	/// Creates a configuration for a command that prints nothing and succeeds.
	///
	/// # Parameters
	///
	/// * `name` - The command name to fake.
	///
	#[must_use]
	pub fn new<S: Into<String>>(name: S) -> Self {
		Self {
			name: name.into(),
			..Default::default()
		}
	}

	//		with_stdout
	/// Sets the text written to standard output.
	#[must_use]
	pub fn with_stdout<S: Into<String>>(mut self, stdout: S) -> Self {
		self.stdout = stdout.into();
		self
	}

	//		with_stderr
	/// Sets the text written to standard error.
	#[must_use]
	pub fn with_stderr<S: Into<String>>(mut self, stderr: S) -> Self {
		self.stderr = stderr.into();
		self
	}

	//		with_status
	/// Sets the exit status.
	#[must_use]
	pub const fn with_status(mut self, status: u8) -> Self {
		self.status = status;
		self
	}
}



//		Functions

//		validate_name
/// Checks that a command name can be used as a filename inside a directory.
///
/// Besides path separators and the special directory entries, the names of
/// the artifacts are rejected, as the executable would clash with them.
///
/// # Errors
///
/// * [`MockError::InvalidName`]
///
pub(crate) fn validate_name(name: &str) -> Result<(), MockError> {
	if name.is_empty()
		|| name == "."
		|| name == ".."
		|| name.contains(['/', '\0'])
		|| ARTIFACTS.contains(&name)
	{
		return Err(MockError::InvalidName(name.to_owned()));
	}
	Ok(())
}

//		render
/// Renders the script for a configuration.
///
/// # Errors
///
/// Returns the reason as a message, to be wrapped by the caller together with
/// the target path. This happens if the configured text cannot be quoted, or
/// if the template fails to render.
///
pub(crate) fn render(config: &Config) -> Result<String, String> {
	let mut env = Environment::new();
	env.set_undefined_behavior(UndefinedBehavior::Strict);
	env.render_str(SCRIPT_TEMPLATE, context! {
		stdout          => quote(&config.stdout)?,
		stderr          => quote(&config.stderr)?,
		status          => config.status,
		output_log      => OUTPUT_LOG,
		error_log       => ERROR_LOG,
		parameters_log  => PARAMETERS_LOG,
		ran_marker      => RAN_MARKER,
		environment_log => ENVIRONMENT_LOG,
	}).map_err(|err| err.to_string())
}

//		quote
/// Quotes text as a single `/bin/sh` word that expands to exactly that text.
///
/// # Errors
///
/// Returns a message if the quoted bytes are not valid UTF-8.
///
fn quote(text: &str) -> Result<String, String> {
	let bytes: Vec<u8> = text.quoted(Sh);
	String::from_utf8(bytes).map_err(|err| format!("Unable to quote configured output: {err}"))
}

//		write_executable
/// Renders the script into `directory`, and marks it executable.
///
/// Returns the path of the executable, which is `directory/name`.
///
/// # Errors
///
/// * [`MockError::ArtifactWriteFailed`]
///
pub(crate) fn write_executable(config: &Config, directory: &Path) -> Result<PathBuf, MockError> {
	let path   = directory.join(&config.name);
	let script = render(config).map_err(|msg| MockError::ArtifactWriteFailed(path.clone(), msg))?;
	fs::write(&path, script).map_err(|err|
		MockError::ArtifactWriteFailed(path.clone(), err.to_string())
	)?;
	fs::set_permissions(&path, Permissions::from_mode(EXECUTABLE_MODE)).map_err(|err|
		MockError::ArtifactWriteFailed(path.clone(), err.to_string())
	)?;
	Ok(path)
}
