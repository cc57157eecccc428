//! Logging and process helpers for integration tests.

//		Packages

use std::{
	process::{Command, Output},
	sync::Once,
};
use tracing_subscriber::{
	EnvFilter,
	fmt::{format::FmtSpan, layer},
	layer::SubscriberExt,
	registry,
	util::SubscriberInitExt,
};



//		Statics

/// Guards the one-off logging setup.
static INIT: Once = Once::new();



//		Functions

//		initialize
/// Installs a logging subscriber, once per test binary.
pub(crate) fn initialize() {
	INIT.call_once(|| {
		registry()
			.with(
				EnvFilter::new("commandmocker=debug")
			)
			.with(
				layer()
					.with_span_events(FmtSpan::NONE)
					.with_target(false)
					.with_test_writer()
			)
			.init()
		;
	});
}

//		run
/// Runs a command by name, resolving it through the current search path, and
/// returns its output.
///
/// # Parameters
///
/// * `name` - The command name, as code under test would use it.
/// * `args` - The arguments to pass.
///
pub(crate) fn run(name: &str, args: &[&str]) -> Output {
	Command::new(name).args(args).output().unwrap()
}
