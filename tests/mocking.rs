#![allow(non_snake_case)]

//		Modules

#[allow(unused, reason = "Not every helper is used by every test binary")]
#[path = "common/setup.rs"]
mod common;



//		Packages

use crate::common::{initialize, run};
use claims::{assert_err_eq, assert_ok};
use commandmocker::{Config, MockError, Registry};
use core::time::Duration;
use std::{
	path::{Path, PathBuf},
	process::Command,
	thread,
};



//		Tests

#[cfg(test)]
mod convenience {
	use super::*;

	//		error
	#[test]
	fn error__ssh_scenario() {
		initialize();
		let path   = commandmocker::error("ssh", "HELP!", 1).unwrap();
		let output = run("ssh", &["-l", "root", "127.0.0.1"]);
		assert_eq!(output.status.code(),               Some(1));
		assert_eq!(output.stdout,                      b"");
		assert_eq!(output.stderr,                      b"HELP!");
		assert_eq!(commandmocker::parameters(&path),   vec!["-l", "root", "127.0.0.1"]);
		assert!(commandmocker::has_run(&path),         "Should have run");
		assert_ok!(commandmocker::remove(&path));
		assert!(!path.exists(),                        "Directory should be removed");
	}

	//		add
	#[test]
	fn add() {
		initialize();
		let path   = commandmocker::add("it-add", "hello\nworld\n").unwrap();
		assert!(!commandmocker::has_run(&path), "Should not have run yet");
		let output = run("it-add", &[]);
		assert_eq!(output.status.code(),           Some(0));
		assert_eq!(output.stdout,                  b"hello\nworld\n");
		assert_eq!(commandmocker::output(&path),   "hello\nworld\n");
		assert!(commandmocker::parameters(&path).is_empty(), "Should have no parameters");
		assert!(commandmocker::has_run(&path),     "Should have run");
		assert_ok!(commandmocker::remove(&path));
	}

	//		add_stderr
	#[test]
	fn add_stderr() {
		initialize();
		let path   = commandmocker::add_stderr("it-add-stderr", "to stdout", "to stderr").unwrap();
		let output = run("it-add-stderr", &["one argument with spaces"]);
		assert_eq!(output.status.code(),               Some(0));
		assert_eq!(output.stdout,                      b"to stdout");
		assert_eq!(output.stderr,                      b"to stderr");
		assert_eq!(commandmocker::error_output(&path), "to stderr");
		assert_eq!(commandmocker::parameters(&path),   vec!["one argument with spaces"]);
		assert_ok!(commandmocker::remove(&path));
	}

	//		environment
	#[test]
	fn environment() {
		initialize();
		let path   = commandmocker::add("it-env", "").unwrap();
		let status = Command::new("it-env").env("COMMANDMOCKER_MARKER", "marker value").status().unwrap();
		assert!(status.success(), "Mock should succeed");
		let envs   = commandmocker::environment(&path);
		assert!(envs.contains("COMMANDMOCKER_MARKER=marker value"), "Environment should be captured: {envs}");
		assert!(envs.contains(&path.display().to_string()), "Search path should include the mock");
		assert_ok!(commandmocker::remove(&path));
	}

	//		remove
	#[test]
	fn remove__not_a_temporary_directory() {
		initialize();
		assert_err_eq!(commandmocker::remove(Path::new("/etc")), MockError::InvalidTarget(PathBuf::from("/etc")));
		assert!(Path::new("/etc").is_dir(), "Nothing should have been deleted");
	}
}

#[cfg(test)]
mod registry {
	use super::*;

	//		register
	#[test]
	fn register__same_name_serialises() {
		initialize();
		let registry           = Registry::global();
		let first              = registry.register(&Config::new("it-serial").with_stdout("first")).unwrap();
		let (sender, receiver) = flume::unbounded();
		let waiter             = thread::spawn(move || {
			let second = registry.register(&Config::new("it-serial").with_stdout("second")).unwrap();
			sender.send(second).unwrap();
		});
		assert!(receiver.recv_timeout(Duration::from_millis(200)).is_err(), "Second registration should wait");
		assert_eq!(run("it-serial", &[]).stdout, b"first");
		assert_ok!(registry.unregister(&first));
		let second = receiver.recv_timeout(Duration::from_secs(10)).unwrap();
		waiter.join().unwrap();
		assert_eq!(run("it-serial", &[]).stdout, b"second");
		assert_ok!(registry.unregister(&second));
	}

	//		mock
	#[test]
	fn mock__layered() {
		initialize();
		let registry = Registry::global();
		let lower    = registry.mock(&Config::new("it-layer-lower").with_status(3)).unwrap();
		let upper    = registry.mock(&Config::new("it-layer-upper").with_status(4)).unwrap();
		assert_ok!(lower.remove());
		assert_eq!(run("it-layer-upper", &[]).status.code(), Some(4));
		assert!(upper.has_run(), "Upper mock should have run");
		assert!(Command::new("it-layer-lower").status().is_err(), "Lower mock should no longer resolve");
	}

	//		Artifacts of repeated runs
	#[test]
	fn mock__repeated_runs() {
		initialize();
		let mock = Registry::global().mock(&Config::new("it-repeat").with_stdout("again")).unwrap();
		drop(run("it-repeat", &["first"]));
		drop(run("it-repeat", &["second", "third"]));
		assert_eq!(mock.parameters(), vec!["first", "second", "third"]);
		assert_eq!(mock.output(),     "again");
		assert_eq!(mock.environment().lines().filter(|line| line.starts_with("PATH=")).count(), 2);
	}
}
