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

use std::io::{Read, Seek, SeekFrom, Write};
use std::io::{stderr, Error};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Debug output on standard error (STDERR), filtered by a verbosity level.
/// Verbosity 0 only shows warnings; every additional level adds info, debug and trace messages.
pub struct Debug {
	level: LevelFilter,
}

impl Debug {
	pub fn new(verbosity: i8) -> Debug {
		let level = match verbosity {
			i8::MIN..=0 => LevelFilter::Warn,
			1 => LevelFilter::Info,
			2 => LevelFilter::Debug,
			_ => LevelFilter::Trace,
		};
		Debug { level }
	}

	/// Installs this sink as the global logger.
	pub fn init(verbosity: i8) -> Result<(), SetLoggerError> {
		let debug = Debug::new(verbosity);
		let level = debug.level;
		log::set_boxed_logger(Box::new(debug))?;
		log::set_max_level(level);
		Ok(())
	}

	pub fn level(&self) -> LevelFilter {
		self.level
	}
}

impl Log for Debug {
	fn enabled(&self, metadata: &Metadata) -> bool {
		metadata.level() <= self.level
	}

	fn log(&self, record: &Record) {
		if !self.enabled(record.metadata()) {
			return;
		}
		let prefix = match record.level() {
			Level::Error => "ERROR: ",
			Level::Warn => "WARNING: ",
			_ => "",
		};
		// A broken STDERR leaves nowhere to report to
		let _ = writeln!(stderr(), "{}{}", prefix, record.args());
	}

	fn flush(&self) {
		let _ = stderr().flush();
	}
}

/// Reads exactly `length` bytes at the absolute `offset`.
pub fn read_at<T: Read + Seek>(file: &mut T, offset: u64, length: usize) -> Result<Vec<u8>, Error> {
	let mut buffer = vec![0; length];
	file.seek(SeekFrom::Start(offset))?;
	file.read_exact(&mut buffer)?;
	Ok(buffer)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Cursor;

	#[test]
	fn verbosity_maps_to_levels() {
		assert_eq!(Debug::new(0).level(), LevelFilter::Warn);
		assert_eq!(Debug::new(1).level(), LevelFilter::Info);
		assert_eq!(Debug::new(2).level(), LevelFilter::Debug);
		assert_eq!(Debug::new(5).level(), LevelFilter::Trace);
		assert_eq!(Debug::new(-1).level(), LevelFilter::Warn);
	}

	#[test]
	fn read_at_reads_positioned_bytes() {
		let mut file = Cursor::new((0u8..32).collect::<Vec<u8>>());
		assert_eq!(read_at(&mut file, 4, 3).unwrap(), vec![4, 5, 6]);
		assert!(read_at(&mut file, 30, 4).is_err());
	}
}
