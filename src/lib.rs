//! The Commandmocker crate fakes command-line programs for tests of code that
//! shells out to them.
//!
//! For a command name such as `ssh`, a small executable script is generated in
//! a private temporary directory, and that directory is placed at the front of
//! the process's `PATH`. Any subprocess launched by name after that point runs
//! the fake instead of the real program. The fake prints the configured output,
//! exits with the configured status, and records how it was called, which the
//! test can then inspect.
//!
//! ```no_run
//! use std::process::Command;
//!
//! let path = commandmocker::error("ssh", "HELP!", 1).unwrap();
//! let out  = Command::new("ssh").args(["-l", "root", "127.0.0.1"]).output().unwrap();
//! assert_eq!(out.status.code(), Some(1));
//! assert_eq!(out.stderr, b"HELP!");
//! assert_eq!(commandmocker::parameters(&path), ["-l", "root", "127.0.0.1"]);
//! assert!(commandmocker::has_run(&path));
//! commandmocker::remove(&path).unwrap();
//! ```
//!
//! The functions at the crate root use the process-wide [`Registry`]. Use
//! [`Registry::mock()`] for a handle that cleans up after itself.
//!



//		Global configuration

#![cfg_attr(feature = "reasons", feature(lint_reasons))]

//	Customisations of the standard linting configuration
#![cfg_attr(    feature = "reasons",  allow(clippy::multiple_crate_versions, reason = "Cannot resolve all these"))]
#![cfg_attr(not(feature = "reasons"), allow(clippy::multiple_crate_versions))]



//		Modules

pub mod errors;
pub mod inspect;
pub mod registry;
pub mod script;

mod search_path;



//		Packages

pub use crate::{
	errors::MockError,
	inspect::{environment, error_output, has_run, output, parameters},
	registry::{Mock, Registry},
	script::Config,
	search_path::contains as is_in_search_path,
};
use std::path::{Path, PathBuf};




//		Functions

//		add
/// Fakes a command that prints `output` and succeeds.
///
/// Returns the instance directory, for inspection and for passing to
/// [`remove()`].
///
/// # Errors
///
/// As for [`Registry::register()`].
///
pub fn add(name: &str, output: &str) -> Result<PathBuf, MockError> {
	Registry::global().register(&Config::new(name).with_stdout(output))
}

//		add_stderr
/// Fakes a command that prints to both output streams and succeeds.
///
/// # Errors
///
/// As for [`Registry::register()`].
///
pub fn add_stderr(name: &str, stdout: &str, stderr: &str) -> Result<PathBuf, MockError> {
	Registry::global().register(&Config::new(name).with_stdout(stdout).with_stderr(stderr))
}

//		error
/// Fakes a command that prints `output` to standard error and fails with
/// `status`.
///
/// # Errors
///
/// As for [`Registry::register()`].
///
pub fn error(name: &str, output: &str, status: u8) -> Result<PathBuf, MockError> {
	Registry::global().register(&Config::new(name).with_stderr(output).with_status(status))
}

//		remove
/// Removes a command faked by one of the functions above.
///
/// # Errors
///
/// As for [`Registry::unregister()`].
///
pub fn remove(directory: &Path) -> Result<(), MockError> {
	Registry::global().unregister(directory)
}
