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

//! BIFF record streams.
//!
//! Every record is laid out as `int32 length; char tag[4]; payload[length - 4]`.
//! A group start tag opens a nested list of records that runs until the next `ENDB`,
//! and an `ENDB` outside any group ends the stream.
//! Streamed tags carry a second int32 length after the tag and their payload is not sliced.

pub mod decode;
mod tags;

pub use self::tags::TagTable;

use glam::{Vec2, Vec3};
use log::{trace, warn};
use crate::error::FormatError;

/// Tag that closes a nested group, or the whole stream.
pub const END_TAG: &str = "ENDB";

/// A window onto the remaining bytes of a stream.
#[derive(Copy, Clone, Debug)]
pub struct Chunk<'a> {
	pub data: &'a [u8],
	/// Position of `data[0]` within the stream.
	pub storage_offset: u64,
}

/// Outcome of decoding one record.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
	/// The record was handled; this many bytes belong to it.
	Consumed(usize),
	/// End of this record stream.
	Stop,
}

/// One decoded record. Borrowed from the stream, never stored.
#[derive(Clone, Debug)]
pub struct Record<'a> {
	pub tag: String,
	/// The payload; `None` for streamed tags whose bytes the caller reads itself.
	pub data: Option<&'a [u8]>,
	/// Position of the payload within the stream.
	pub offset: u64,
	/// The record length; for streamed tags this includes the inner length and blob.
	pub len: usize,
}

impl<'a> Record<'a> {
	/// Length of the blob that follows the inner length of a streamed record.
	pub fn streamed_len(&self) -> usize {
		self.len.saturating_sub(8)
	}

	fn short(&self, expected: usize) -> FormatError {
		FormatError::ShortRecord {
			tag: self.tag.clone(),
			expected,
			actual: self.data.map_or(0, |d| d.len()),
		}
	}

	pub fn bytes(&self) -> Result<&'a [u8], FormatError> {
		self.data.ok_or_else(|| self.short(0))
	}

	pub fn i32(&self) -> Result<i32, FormatError> {
		self.data.and_then(|d| decode::read_i32(d, 0)).ok_or_else(|| self.short(4))
	}

	pub fn u32(&self) -> Result<u32, FormatError> {
		self.i32().map(|v| v as u32)
	}

	pub fn f32(&self) -> Result<f32, FormatError> {
		self.data.and_then(|d| decode::read_f32(d, 0)).ok_or_else(|| self.short(4))
	}

	pub fn bool(&self) -> Result<bool, FormatError> {
		self.i32().map(|v| v != 0)
	}

	/// A `0x00BBGGRR` color, returned as `0x00RRGGBB`.
	pub fn color(&self) -> Result<u32, FormatError> {
		self.u32().map(decode::bgr_to_rgb)
	}

	pub fn string(&self) -> Result<String, FormatError> {
		self.data.and_then(decode::read_string).ok_or_else(|| self.short(4))
	}

	pub fn wide_string(&self) -> Result<String, FormatError> {
		self.data.and_then(decode::read_wide_string).ok_or_else(|| self.short(4))
	}

	pub fn vertex2(&self) -> Result<Vec2, FormatError> {
		let floats = self.f32_array(2)?;
		Ok(Vec2::new(floats[0], floats[1]))
	}

	pub fn vertex3(&self) -> Result<Vec3, FormatError> {
		let floats = self.f32_array(3)?;
		Ok(Vec3::new(floats[0], floats[1], floats[2]))
	}

	pub fn f32_array(&self, count: usize) -> Result<Vec<f32>, FormatError> {
		self.data.and_then(|d| decode::read_f32_array(d, count)).ok_or_else(|| self.short(count * 4))
	}
}

/// Collects the records of one nested group and hands the result to the parent when the group ends.
pub trait GroupAccumulator<T> {
	fn on_tag(&mut self, record: &Record) -> Result<(), FormatError>;
	fn on_end(self: Box<Self>, parent: &mut T) -> Result<(), FormatError>;
}

/// A tag that opens a nested group, with the factory for its accumulator.
pub struct GroupDescriptor<T> {
	pub tag: &'static str,
	pub on_start: fn() -> Box<dyn GroupAccumulator<T>>,
}

pub struct ChunkStreamParser<T> {
	groups: Vec<GroupDescriptor<T>>,
	streamed_tags: Vec<&'static str>,
	active: Vec<Box<dyn GroupAccumulator<T>>>,
}

impl<T> Default for ChunkStreamParser<T> {
	fn default() -> Self {
		ChunkStreamParser { groups: Vec::new(), streamed_tags: Vec::new(), active: Vec::new() }
	}
}

impl<T> ChunkStreamParser<T> {
	pub fn new() -> ChunkStreamParser<T> {
		ChunkStreamParser::default()
	}

	pub fn with_group(mut self, tag: &'static str, on_start: fn() -> Box<dyn GroupAccumulator<T>>) -> Self {
		self.groups.push(GroupDescriptor { tag, on_start });
		self
	}

	pub fn with_streamed_tag(mut self, tag: &'static str) -> Self {
		self.streamed_tags.push(tag);
		self
	}

	/// Number of groups that are open.
	pub fn depth(&self) -> usize {
		self.active.len()
	}

	/// Decodes the record at the start of `chunk` and dispatches it to the innermost open group,
	/// or to `handler` if no group is open.
	pub fn next_record<F>(&mut self, chunk: Chunk, target: &mut T, handler: &mut F) -> Result<Step, FormatError>
		where F: FnMut(&mut T, &Record) -> Result<(), FormatError>
	{
		let data = chunk.data;
		if data.len() < 4 {
			return Ok(Step::Stop);
		}
		let len = match decode::read_i32(data, 0) {
			Some(len) if len >= 0 => len as usize,
			_ => {
				warn!("[next_record] Negative record length at {:#X}, stopping.", chunk.storage_offset);
				return Ok(Step::Stop);
			},
		};
		let tag_end = data.len().min(8).min(4 + len);
		let tag: String = String::from_utf8_lossy(&data[4..tag_end]).trim_end_matches('\0').to_owned();

		if tag.is_empty() || tag == END_TAG {
			return match self.active.pop() {
				Some(group) => {
					trace!("[next_record] Closing group at {:#X}.", chunk.storage_offset);
					group.on_end(target)?;
					Ok(Step::Consumed(len + 4))
				},
				None => Ok(Step::Stop),
			};
		}

		if len < 4 || len + 4 > data.len() {
			warn!("[next_record] Record '{}' at {:#X} runs past the end of the stream, stopping.", tag, chunk.storage_offset);
			return Ok(Step::Stop);
		}

		if let Some(group) = self.groups.iter().find(|g| g.tag == tag) {
			trace!("[next_record] Opening group '{}' at {:#X}.", tag, chunk.storage_offset);
			self.active.push((group.on_start)());
			return Ok(Step::Consumed(len + 4));
		}

		let record = if self.streamed_tags.contains(&tag.as_str()) {
			let inner = match decode::read_i32(data, 8) {
				Some(inner) if inner >= 0 => inner as usize,
				_ => {
					warn!("[next_record] Streamed record '{}' at {:#X} has no valid inner length, stopping.", tag, chunk.storage_offset);
					return Ok(Step::Stop);
				},
			};
			let effective = len + inner + 4;
			if effective + 4 > data.len() {
				warn!("[next_record] Streamed record '{}' at {:#X} runs past the end of the stream, stopping.", tag, chunk.storage_offset);
				return Ok(Step::Stop);
			}
			Record { tag, data: None, offset: chunk.storage_offset + 12, len: effective }
		}
		else {
			Record { tag, data: Some(&data[8..4 + len]), offset: chunk.storage_offset + 8, len }
		};

		match self.active.last_mut() {
			Some(group) => group.on_tag(&record)?,
			None => handler(target, &record)?,
		}
		Ok(Step::Consumed(record.len + 4))
	}

	/// Dispatches all records of `data` until the stream ends.
	/// `base_offset` is the position of `data[0]` within its stream.
	pub fn parse<F>(&mut self, data: &[u8], base_offset: u64, target: &mut T, mut handler: F) -> Result<(), FormatError>
		where F: FnMut(&mut T, &Record) -> Result<(), FormatError>
	{
		self.active.clear();
		let mut position = 0;
		while position < data.len() {
			let chunk = Chunk { data: &data[position..], storage_offset: base_offset + position as u64 };
			match self.next_record(chunk, target, &mut handler)? {
				Step::Consumed(n) => position += n,
				Step::Stop => break,
			}
		}
		if !self.active.is_empty() {
			warn!("[parse] {} group(s) left open at the end of the stream, discarding.", self.active.len());
			self.active.clear();
		}
		Ok(())
	}
}
