//! Edits to the process-wide executable search path.
//!
//! The search path is a single environment variable, and edits to it are a
//! read-modify-write sequence. All edits made by this crate go through the
//! functions here, which hold [`SEARCH_PATH_LOCK`] for the whole sequence, so
//! that concurrent registrations never lose each other's segments.
//!

//		Modules

#[cfg(test)]
#[path = "tests/search_path.rs"]
mod tests;



//		Packages

use crate::errors::MockError;
use parking_lot::Mutex;
use std::{
	env,
	ffi::{OsStr, OsString},
	path::{Path, PathBuf},
};
use tracing::debug;



//		Constants

/// The name of the search path environment variable.
const SEARCH_PATH_VAR: &str = "PATH";



//		Statics

/// Serialises every read-modify-write of the search path variable.
static SEARCH_PATH_LOCK: Mutex<()> = Mutex::new(());



//		Functions

//		current
/// Reads the current search path, if it is set.
pub(crate) fn current() -> Option<OsString> {
	env::var_os(SEARCH_PATH_VAR)
}

//		contains
/// Checks whether a directory is currently a segment of the search path.
#[must_use]
pub fn contains(directory: &Path) -> bool {
	let _guard = SEARCH_PATH_LOCK.lock();
	current().is_some_and(|value| env::split_paths(&value).any(|segment| segment == directory))
}

//		prepend
/// Publishes a directory at the front of the search path.
///
/// # Errors
///
/// * [`MockError::EnvironmentUpdateFailed`]
///
pub(crate) fn prepend(directory: &Path) -> Result<(), MockError> {
	let _guard  = SEARCH_PATH_LOCK.lock();
	let updated = with_segment_prepended(current().as_deref(), directory)?;
	commit(&updated)?;
	debug!("Prepended {directory:?} to the search path");
	Ok(())
}

//		remove
/// Removes a directory from the search path, wherever it currently sits.
///
/// # Errors
///
/// * [`MockError::EnvironmentUpdateFailed`]
/// * [`MockError::NotInSearchPath`]
///
pub(crate) fn remove(directory: &Path) -> Result<(), MockError> {
	let _guard  = SEARCH_PATH_LOCK.lock();
	let Some(value) = current() else {
		return Err(MockError::NotInSearchPath(directory.to_owned()));
	};
	let updated = without_segment(&value, directory)?;
	commit(&updated)?;
	debug!("Removed {directory:?} from the search path");
	Ok(())
}

//		with_segment_prepended
/// Builds a search path value with `directory` as its first segment.
///
/// An unset or empty search path results in a value holding only the new
/// segment, rather than a trailing empty segment that would mean the current
/// working directory.
///
/// # Errors
///
/// * [`MockError::EnvironmentUpdateFailed`]
///
fn with_segment_prepended(value: Option<&OsStr>, directory: &Path) -> Result<OsString, MockError> {
	let mut segments = vec![directory.to_owned()];
	if let Some(existing) = value.filter(|v| !v.is_empty()) {
		segments.extend(env::split_paths(existing));
	}
	env::join_paths(segments).map_err(|err| MockError::EnvironmentUpdateFailed(err.to_string()))
}

//		without_segment
/// Builds a search path value with the first segment equal to `directory`
/// removed, along with one adjacent delimiter.
///
/// Segments are compared whole, so a directory never matches a longer path
/// that merely starts with it. The segment may be in any position.
///
/// # Errors
///
/// * [`MockError::EnvironmentUpdateFailed`]
/// * [`MockError::NotInSearchPath`]
///
fn without_segment(value: &OsStr, directory: &Path) -> Result<OsString, MockError> {
	let mut segments: Vec<PathBuf> = env::split_paths(value).collect();
	let Some(index) = segments.iter().position(|segment| segment == directory) else {
		return Err(MockError::NotInSearchPath(directory.to_owned()));
	};
	drop(segments.remove(index));
	env::join_paths(segments).map_err(|err| MockError::EnvironmentUpdateFailed(err.to_string()))
}

//		commit
/// Writes a new value to the search path variable.
///
/// # Errors
///
/// * [`MockError::EnvironmentUpdateFailed`]
///
#[expect(unsafe_code, reason = "Environment writes are unsafe in edition 2024")]
fn commit(value: &OsStr) -> Result<(), MockError> {
	if value.as_encoded_bytes().contains(&0) {
		return Err(MockError::EnvironmentUpdateFailed(format!("Value contains a NUL byte: {value:?}")));
	}
	//	SAFETY: All writes to the variable are made while SEARCH_PATH_LOCK is
	//	held, and readers in this crate go through std::env, which takes the
	//	standard library's own environment lock.
	unsafe { env::set_var(SEARCH_PATH_VAR, value) };
	Ok(())
}
