//! This module provides the registry of live mock commands.
//!
//! The [`Registry`] owns the mapping of command names to instance directories,
//! and is responsible for the whole lifecycle of a mock: allocating its
//! directory, writing the executable, publishing the directory on the search
//! path, and undoing all of that again.
//!
//! Only one mock per command name can be live in a registry at any one time.
//! Registering a name that is already live blocks until the existing mock is
//! unregistered, so tests that fake the same command never collide, even when
//! running concurrently.
//!

//		Modules

#[cfg(test)]
#[path = "tests/registry.rs"]
mod tests;



//		Packages

use crate::{
	errors::MockError,
	inspect,
	script::{Config, self},
	search_path,
};
use parking_lot::{Condvar, Mutex};
use rand::{RngCore as _, rngs::OsRng};
use std::{
	collections::HashMap,
	env,
	ffi::{OsStr, OsString},
	fs::{DirBuilder, self},
	os::unix::fs::DirBuilderExt as _,
	path::{Component, Path, PathBuf},
	sync::LazyLock,
};
use tracing::{debug, info};



//		Constants

/// The prefix of every instance directory name.
const DIRECTORY_PREFIX: &str = "commandmocker-";

/// The number of random bytes in an instance directory name.
const TOKEN_BYTES: usize = 8;

/// The permissions applied to instance directories.
const DIRECTORY_MODE: u32 = 0o700;



//		Statics

/// The process-wide registry, used by the crate-level convenience functions.
static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::new);



//		Structs

//		Registry
/// A registry of live mock commands.
///
/// Most users will want the process-wide instance returned by
/// [`Registry::global()`]. Separate instances can be created with a different
/// temporary directory root, which is useful for isolating tests of code that
/// manages its own mocks. Note that the search path itself is always shared by
/// the whole process.
///
/// When a registry is dropped, any mocks still live in it are unregistered.
///
#[derive(Debug)]
pub struct Registry {
	//		Private properties
	/// The live mocks, keyed by command name.
	live:                 Mutex<HashMap<String, PathBuf>>,

	/// The search path value at the time the registry was created.
	original_search_path: Option<OsString>,

	/// Signalled whenever a name is released.
	released:             Condvar,

	/// The directory under which all instance directories are created, and
	/// outside of which nothing will be removed.
	temp_root:            PathBuf,
}

//󰭅		Registry
impl Registry {
	//		Constructors

	//		new
	/// Creates a registry rooted in the system temporary directory.
	#[must_use]
	pub fn new() -> Self {
		Self::with_temp_root(env::temp_dir())
	}

	//		with_temp_root
	/// Creates a registry rooted in the given directory.
	///
	/// # Parameters
	///
	/// * `temp_root` - The directory to create instance directories in. It
	///                 will be created if it does not exist.
	///
	#[must_use]
	pub fn with_temp_root<P: Into<PathBuf>>(temp_root: P) -> Self {
		Self {
			live:                 Mutex::new(HashMap::new()),
			original_search_path: search_path::current(),
			released:             Condvar::new(),
			temp_root:            temp_root.into(),
		}
	}

	//		global
	/// Returns the process-wide registry.
	#[must_use]
	pub fn global() -> &'static Self {
		&GLOBAL
	}

	//		Public methods

	//		register
	/// Creates a mock command and publishes it on the search path.
	///
	/// If a mock with the same name is already live in this registry, this
	/// blocks until it has been unregistered. There is no timeout.
	///
	/// Returns the instance directory, which is needed to inspect the mock's
	/// runs and to unregister it.
	///
	/// # Parameters
	///
	/// * `config` - The name and behaviour of the mock command.
	///
	/// # Errors
	///
	/// * [`MockError::ArtifactWriteFailed`]
	/// * [`MockError::DirectoryCreationFailed`]
	/// * [`MockError::EnvironmentUpdateFailed`]
	/// * [`MockError::InvalidName`]
	///
	/// After any error, the name is free to be registered again.
	///
	pub fn register(&self, config: &Config) -> Result<PathBuf, MockError> {
		script::validate_name(&config.name)?;
		let directory = self.claim(&config.name);
		if let Err(err) = materialise(config, &directory) {
			let _ignored = fs::remove_dir_all(&directory);
			self.release(&directory);
			return Err(err);
		}
		info!("Registered mock {:?} in {directory:?}", config.name);
		Ok(directory)
	}

	//		mock
	/// Creates a mock command, returning a handle that removes it when dropped.
	///
	/// # Errors
	///
	/// As for [`register()`](Self::register()).
	///
	pub fn mock(&self, config: &Config) -> Result<Mock<'_>, MockError> {
		Ok(Mock {
			directory: self.register(config)?,
			registry:  self,
			removed:   false,
		})
	}

	//		unregister
	/// Removes a mock command from the search path and from disk.
	///
	/// The name held by the mock is released whatever the outcome, so that a
	/// failure here never blocks later registrations of the same name.
	///
	/// # Parameters
	///
	/// * `directory` - The instance directory returned by
	///                 [`register()`](Self::register()).
	///
	/// # Errors
	///
	/// * [`MockError::DirectoryRemovalFailed`]
	/// * [`MockError::EnvironmentUpdateFailed`]
	/// * [`MockError::InvalidTarget`]
	/// * [`MockError::NotInSearchPath`]
	///
	pub fn unregister(&self, directory: &Path) -> Result<(), MockError> {
		let outcome = self.dismantle(directory);
		self.release(directory);
		if outcome.is_ok() {
			info!("Unregistered mock in {directory:?}");
		}
		outcome
	}

	//		teardown
	/// Unregisters every mock that is live in this registry.
	///
	/// Every mock is attempted, and the first error encountered is returned.
	/// Provided nothing else has edited the search path, it is left as it was
	/// when the registry was created.
	///
	/// # Errors
	///
	/// As for [`unregister()`](Self::unregister()).
	///
	pub fn teardown(&self) -> Result<(), MockError> {
		let directories: Vec<PathBuf> = self.live.lock().values().cloned().collect();
		directories.iter().fold(Ok(()), |outcome, directory| outcome.and(self.unregister(directory)))
	}

	//		is_live
	/// Checks whether a mock with the given name is currently live.
	#[must_use]
	pub fn is_live(&self, name: &str) -> bool {
		self.live.lock().contains_key(name)
	}

	//		live_directory
	/// Returns the instance directory of the live mock with the given name.
	#[must_use]
	pub fn live_directory(&self, name: &str) -> Option<PathBuf> {
		self.live.lock().get(name).cloned()
	}

	//		original_search_path
	/// Returns the search path as it was when the registry was created.
	#[must_use]
	pub fn original_search_path(&self) -> Option<&OsStr> {
		self.original_search_path.as_deref()
	}

	//		temp_root
	/// Returns the directory that instance directories are created in.
	#[must_use]
	pub fn temp_root(&self) -> &Path {
		&self.temp_root
	}

	//		Private methods

	//		claim
	/// Waits until `name` is free, then records a new unique directory for it.
	///
	/// The name is recorded before the directory exists, so that concurrent
	/// registrants of the same name wait from this point on.
	///
	fn claim(&self, name: &str) -> PathBuf {
		let mut live = self.live.lock();
		while live.contains_key(name) {
			debug!("Waiting for mock {name:?} to be released");
			self.released.wait(&mut live);
		}
		let directory = loop {
			let candidate = self.temp_root.join(format!("{DIRECTORY_PREFIX}{}", generate_token()));
			let taken     = candidate.try_exists().unwrap_or(false)
				|| live.values().any(|existing| *existing == candidate);
			if !taken {
				break candidate;
			}
		};
		drop(live.insert(name.to_owned(), directory.clone()));
		directory
	}

	//		release
	/// Forgets the mock held in `directory`, and wakes any waiting registrants.
	fn release(&self, directory: &Path) {
		self.live.lock().retain(|_, existing| existing.as_path() != directory);
		let _woken = self.released.notify_all();
	}

	//		dismantle
	/// Removes an instance directory from the search path and from disk.
	///
	/// # Errors
	///
	/// * [`MockError::DirectoryRemovalFailed`]
	/// * [`MockError::EnvironmentUpdateFailed`]
	/// * [`MockError::InvalidTarget`]
	/// * [`MockError::NotInSearchPath`]
	///
	fn dismantle(&self, directory: &Path) -> Result<(), MockError> {
		if !self.is_within_temp_root(directory) {
			return Err(MockError::InvalidTarget(directory.to_owned()));
		}
		search_path::remove(directory)?;
		fs::remove_dir_all(directory).map_err(|err|
			MockError::DirectoryRemovalFailed(directory.to_owned(), err.to_string())
		)
	}

	//		is_within_temp_root
	/// Checks that a directory lies strictly beneath the temporary root.
	fn is_within_temp_root(&self, directory: &Path) -> bool {
		directory != self.temp_root
			&& directory.starts_with(&self.temp_root)
			&& !directory.components().any(|component| component == Component::ParentDir)
	}
}

//󰭅		Default
impl Default for Registry {
	//		default
	fn default() -> Self {
		Self::new()
	}
}

//󰭅		Drop
impl Drop for Registry {
	//		drop
	fn drop(&mut self) {
		//	Errors cannot be reported from here, and the directories are
		//	temporary anyway
		let _ignored = self.teardown();
	}
}

//		Mock
/// A live mock command, unregistered when dropped.
///
/// This is a convenience wrapper around an instance directory, returned by
/// [`Registry::mock()`]. It provides the [`inspect`] functions as methods.
///
#[derive(Debug)]
pub struct Mock<'r> {
	//		Private properties
	/// The instance directory.
	directory: PathBuf,

	/// The registry that the mock is live in.
	registry:  &'r Registry,

	/// Whether the mock has already been explicitly removed.
	removed:   bool,
}

//󰭅		Mock
impl Mock<'_> {
	//		directory
	/// Returns the instance directory.
	#[must_use]
	pub fn directory(&self) -> &Path {
		&self.directory
	}

	//		has_run
	/// See [`inspect::has_run()`].
	#[must_use]
	pub fn has_run(&self) -> bool {
		inspect::has_run(&self.directory)
	}

	//		output
	/// See [`inspect::output()`].
	#[must_use]
	pub fn output(&self) -> String {
		inspect::output(&self.directory)
	}

	//		error_output
	/// See [`inspect::error_output()`].
	#[must_use]
	pub fn error_output(&self) -> String {
		inspect::error_output(&self.directory)
	}

	//		environment
	/// See [`inspect::environment()`].
	#[must_use]
	pub fn environment(&self) -> String {
		inspect::environment(&self.directory)
	}

	//		parameters
	/// See [`inspect::parameters()`].
	#[must_use]
	pub fn parameters(&self) -> Vec<String> {
		inspect::parameters(&self.directory)
	}

	//		remove
	/// Unregisters the mock now, reporting any problems.
	///
	/// # Errors
	///
	/// As for [`Registry::unregister()`].
	///
	pub fn remove(mut self) -> Result<(), MockError> {
		self.removed = true;
		self.registry.unregister(&self.directory)
	}
}

//󰭅		Drop
impl Drop for Mock<'_> {
	//		drop
	fn drop(&mut self) {
		if !self.removed {
			let _ignored = self.registry.unregister(&self.directory);
		}
	}
}



//		Functions

//		generate_token
/// Generates the random, hex-encoded part of an instance directory name.
fn generate_token() -> String {
	let mut bytes = [0_u8; TOKEN_BYTES];
	OsRng.fill_bytes(&mut bytes);
	hex::encode(bytes)
}

//		materialise
/// Creates the instance directory, writes the executable into it, and
/// publishes it on the search path.
///
/// # Errors
///
/// * [`MockError::ArtifactWriteFailed`]
/// * [`MockError::DirectoryCreationFailed`]
/// * [`MockError::EnvironmentUpdateFailed`]
///
fn materialise(config: &Config, directory: &Path) -> Result<(), MockError> {
	DirBuilder::new().recursive(true).mode(DIRECTORY_MODE).create(directory).map_err(|err|
		MockError::DirectoryCreationFailed(directory.to_owned(), err.to_string())
	)?;
	let _executable = script::write_executable(config, directory)?;
	search_path::prepend(directory)
}
