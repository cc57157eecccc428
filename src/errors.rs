//! Errors produced while creating, publishing, and removing mock commands.



//		Modules

#[cfg(test)]
#[path = "tests/errors.rs"]
mod tests;



//		Packages

use std::path::PathBuf;
use thiserror::Error as ThisError;



//		Enums

//		MockError
/// Errors that can occur when registering or unregistering a mock command.
///
/// Filesystem failures carry the path involved and the rendered IO error
/// message, so that the error stays comparable and cloneable.
///
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[non_exhaustive]
pub enum MockError {
	/// The script could not be rendered, written, or made executable.
	#[error("Unable to write mock executable {0:?}: {1}")]
	ArtifactWriteFailed(PathBuf, String),

	/// The instance directory could not be created.
	#[error("Unable to create mock directory {0:?}: {1}")]
	DirectoryCreationFailed(PathBuf, String),

	/// The instance directory could not be deleted during unregistration. The
	/// search path has already been updated, and the name has been released.
	#[error("Unable to remove mock directory {0:?}: {1}")]
	DirectoryRemovalFailed(PathBuf, String),

	/// The search path variable could not be updated to the new value.
	#[error("Unable to update the search path: {0}")]
	EnvironmentUpdateFailed(String),

	/// The command name cannot be used as an executable filename.
	#[error(r#"Invalid mock command name "{0}""#)]
	InvalidName(String),

	/// Unregistration was requested for a directory that does not live beneath
	/// the temporary directory root. Nothing is deleted in this case.
	#[error("Only temporary mock directories can be removed, tried to remove {0:?}")]
	InvalidTarget(PathBuf),

	/// Unregistration was requested for a directory that is not a segment of
	/// the current search path.
	#[error("{0:?} is not in the search path")]
	NotInSearchPath(PathBuf),
}
