use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, CommandFactory, Parser, ValueEnum};
use elf::header::Class;
use log::{debug, LevelFilter};

use crate::dump::{DumpError, Outcome};

mod dump;

/// A tool to dump the .metadata section of an ELF binary, one string per
/// line.
#[derive(Debug, Parser)]
#[command(name = "dump-elf-metadata", version, about)]
struct Args {
	/// ELF binary to read. Prints this help when omitted.
	path: Option<PathBuf>,

	/// Only accept images of this address width instead of detecting it.
	#[arg(long, value_enum, value_name = "BITS")]
	class: Option<ClassArg>,

	/// Name of the section to dump.
	#[arg(long, value_name = "NAME", default_value = elf::metadata::SECTION_NAME)]
	section: String,

	/// Log more about the parse to stderr (repeatable). `RUST_LOG` overrides
	/// this.
	#[arg(short, long, action = ArgAction::Count)]
	verbose: u8,

	/// Ignored.
	#[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
	rest: Vec<OsString>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ClassArg {
	#[value(name = "32")]
	Elf32,
	#[value(name = "64")]
	Elf64,
}

impl From<ClassArg> for Class {
	fn from(class: ClassArg) -> Self {
		match class {
			ClassArg::Elf32 => Self::Elf32,
			ClassArg::Elf64 => Self::Elf64,
		}
	}
}

fn init_logger(verbose: u8) {
	let level = match verbose {
		0 => LevelFilter::Warn,
		1 => LevelFilter::Info,
		2 => LevelFilter::Debug,
		_ => LevelFilter::Trace,
	};

	env_logger::Builder::new()
		.filter_level(level)
		.parse_default_env()
		.init();
}

fn main() -> ExitCode {
	let args = match Args::try_parse() {
		Ok(args) => args,
		// --help and --version
		Err(err) if !err.use_stderr() => {
			return match err.print() {
				Ok(()) => ExitCode::SUCCESS,
				Err(_) => ExitCode::FAILURE,
			};
		}
		Err(err) => {
			let _ = err.print();
			return ExitCode::FAILURE;
		}
	};
	init_logger(args.verbose);

	if !args.rest.is_empty() {
		debug!("ignoring extra arguments {:?}", args.rest);
	}

	let Some(path) = &args.path else {
		return match Args::command().print_help() {
			Ok(()) => ExitCode::SUCCESS,
			Err(_) => ExitCode::FAILURE,
		};
	};

	let class = args.class.map(Class::from);
	let mut stdout = io::stdout().lock();

	match dump::run(path, class, args.section.as_bytes(), &mut stdout) {
		Ok(Outcome::Dumped { count }) => {
			debug!("wrote {} strings", count);
			ExitCode::SUCCESS
		}
		// Not an error: the file is fine, it just carries no metadata.
		Ok(Outcome::NotFound) => {
			debug!(
				"{}: no section named {:?}",
				path.display(),
				args.section
			);
			ExitCode::FAILURE
		}
		Err(DumpError::Write(err)) if err.kind() == io::ErrorKind::BrokenPipe => {
			ExitCode::FAILURE
		}
		Err(err) => {
			eprintln!("dump-elf-metadata: {}", err);
			ExitCode::FAILURE
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn verify_cli() {
		Args::command().debug_assert();
	}

	#[test]
	fn defaults() {
		let args = Args::try_parse_from(["dump-elf-metadata", "a.out"]).unwrap();

		assert_eq!(args.path, Some(PathBuf::from("a.out")));
		assert_eq!(args.class, None);
		assert_eq!(args.section, ".metadata");
		assert_eq!(args.verbose, 0);
	}

	#[test]
	fn no_path() {
		let args = Args::try_parse_from(["dump-elf-metadata"]).unwrap();

		assert_eq!(args.path, None);
	}

	#[test]
	fn options() {
		let args = Args::try_parse_from([
			"dump-elf-metadata",
			"--class",
			"32",
			"--section",
			".note.meta",
			"-vv",
			"lib.so",
		])
		.unwrap();

		assert_eq!(args.class.map(Class::from), Some(Class::Elf32));
		assert_eq!(args.section, ".note.meta");
		assert_eq!(args.verbose, 2);
	}

	#[test]
	fn extra_arguments_are_collected() {
		let args =
			Args::try_parse_from(["dump-elf-metadata", "a.out", "extra", "--more"]).unwrap();

		assert_eq!(args.path, Some(PathBuf::from("a.out")));
		assert_eq!(args.rest, ["extra", "--more"]);
	}

	#[test]
	fn rejects_unknown_class() {
		assert!(Args::try_parse_from(["dump-elf-metadata", "--class", "16", "x"]).is_err());
	}
}
