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

use std::io;

/// Errors in the compound file structure. Any of these aborts the whole load.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
	#[error("bad signature, not a compound file")]
	BadSignature,

	#[error("header field {field} has invalid value {value}")]
	BadHeader { field: &'static str, value: u16 },

	#[error("{what}: expected {expected}, found {actual}")]
	SizeMismatch { what: &'static str, expected: usize, actual: usize },

	#[error("sector #{sector} is out of range (table has {len} entries)")]
	SectorOutOfRange { sector: u32, len: usize },

	#[error("sector chain starting at #{start} does not terminate")]
	ChainCycle { start: u32 },

	#[error("no root entry in directory")]
	NoRootEntry,

	#[error("directory entry #{0} is referenced twice on the same path")]
	DirectoryCycle(u32),

	#[error("stream '{0}' not found")]
	StreamNotFound(String),

	#[error("I/O error: {0}")]
	Io(#[from] io::Error),
}

/// Errors in the record contents of a stream. These abort the current item, and with it the load.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
	#[error("material table holds {available} bytes, {count} materials need {needed}")]
	MaterialTableTruncated { count: usize, needed: usize, available: usize },

	#[error("physics material '{0}' does not match any material")]
	MaterialNotFound(String),

	#[error("record '{tag}' holds {actual} bytes, expected at least {expected}")]
	ShortRecord { tag: String, expected: usize, actual: usize },

	#[error("cannot inflate '{tag}': {source}")]
	Decompress { tag: String, source: io::Error },

	#[error("mesh of '{0}' is inconsistent: {1}")]
	BadMesh(String, String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Container(#[from] ContainerError),

	#[error(transparent)]
	Format(#[from] FormatError),

	#[error("declared stream '{0}' is missing")]
	MissingStream(String),
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Error {
		Error::Container(ContainerError::Io(e))
	}
}

pub type Result<T> = std::result::Result<T, Error>;
