/*
vpxscene library & toolset
Copyright (C) 2018 Steve Muller <steve.muller@outlook.com>

This program is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/

extern crate clap;
extern crate vpxscene;

use std::io::{stdin, stdout, Cursor, Read, Seek, Write};
use std::fs::File;
use clap::{Arg, App, AppSettings, SubCommand, ArgMatches};
use vpxscene::cfbf::Container;
use vpxscene::io::Debug;
use vpxscene::Error;

trait ReadSeek: Read + Seek { }
impl<T> ReadSeek for T where T: Read + Seek { }

fn main() {
	let matches = App::new("vpxdump")
		.version("1.0")
		.author("Steve Muller <steve.muller@outlook.com>")
		.about("This utility reads a Visual Pinball table file (.vpx), which is a Compound File Binary File Format container, and lists or dumps the contained streams.")
		.setting(AppSettings::SubcommandRequired)
		.arg(Arg::with_name("verbose")
			.short("v")
			.help("Increases the debug verbosity. This will print a lot of debug messages to standard error (STDERR). Can be used up to 3 times.")
			.multiple(true)
			.takes_value(false))
		.subcommand(SubCommand::with_name("list")
			.about("Lists all streams contained in the file. Each output line contains the stream size in bytes and the stream path, separated by a space.")
			.arg(Arg::with_name("input")
				.value_name("FILE")
				.help("A table file. If omitted, the file will be read from STDIN instead.")
				.short("i")
				.long("input")
				.required(false))
		)
		.subcommand(SubCommand::with_name("dump")
			.about("Dumps a stream from the file.")
			.arg(Arg::with_name("path")
				.value_name("PATH")
				.help("The path of the stream that shall be dumped, e.g. 'GameStg/GameData'.")
				.long("path")
				.short("p")
				.required(true))
			.arg(Arg::with_name("output")
				.value_name("FILE")
				.help("The file where the stream shall be written to. If this parameter is not specified (or has the value '-'), the stream will be written to STDOUT instead.")
				.short("o")
				.long("output")
				.required(false))
			.arg(Arg::with_name("input")
				.value_name("FILE")
				.help("A table file. If omitted, the file will be read from STDIN instead.")
				.short("i")
				.long("input")
				.required(false))
		)
	.get_matches();

	let verbose = matches.occurrences_of("verbose") as i8;
	if let Err(e) = Debug::init(verbose) {
		eprintln!("ERROR: {}", e);
		std::process::exit(1);
	}

	if let Err(e) = dispatch(matches) {
		eprintln!("ERROR: {}", e);
		std::process::exit(1);
	}
}

fn dispatch(matches: ArgMatches) -> Result<(), Error> {
	match matches.subcommand() {
		("list", Some(submatches)) => dispatch_list(submatches),
		("dump", Some(submatches)) => dispatch_dump(submatches),
		_ => unreachable!("clap requires a subcommand"),
	}
}

/// Opens the input file, or buffers STDIN so that it can be seeked.
fn open_input(matches: &ArgMatches) -> Result<Container<Box<dyn ReadSeek>>, Error> {
	let inputfile = matches.value_of("input").unwrap_or("");
	let input: Box<dyn ReadSeek> = match inputfile {
		"" | "-" => {
			let mut buffer = Vec::new();
			stdin().read_to_end(&mut buffer)?;
			Box::new(Cursor::new(buffer))
		},
		_ => Box::new(File::open(inputfile)?),
	};
	Ok(Container::new(input)?)
}

fn dispatch_list(matches: &ArgMatches) -> Result<(), Error> {
	let container = open_input(matches)?;
	let out = stdout();
	let mut out = out.lock();
	let mut result = Ok(());
	container.root().walk("", &mut |path, entry| {
		if result.is_ok() {
			result = writeln!(out, "{} {}", entry.size, path);
		}
	});
	Ok(result?)
}

fn dispatch_dump(matches: &ArgMatches) -> Result<(), Error> {
	let path = matches.value_of("path").unwrap_or("");
	let outputfile = matches.value_of("output").unwrap_or("");

	let mut container = open_input(matches)?;
	let data = container.read_path(path)?;

	let mut output: Box<dyn Write> = match outputfile {
		"" | "-" => Box::new(stdout()),
		_ => Box::new(File::create(outputfile)?),
	};
	output.write_all(&data)?;
	output.flush()?;
	Ok(())
}
