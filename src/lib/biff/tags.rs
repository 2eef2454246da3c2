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

use std::collections::HashMap;
use glam::{Vec2, Vec3};
use log::debug;
use super::{Chunk, ChunkStreamParser, GroupAccumulator, Record, Step};
use crate::error::FormatError;

type Setter<T> = Box<dyn Fn(&mut T, &Record) -> Result<(), FormatError>>;

/// Maps record tags to the fields of `T` they fill in.
/// One table is built per item type and then shared by every item of that type.
pub struct TagTable<T> {
	name: &'static str,
	setters: HashMap<&'static str, Setter<T>>,
	groups: Vec<(&'static str, fn() -> Box<dyn GroupAccumulator<T>>)>,
	streamed: Vec<&'static str>,
	terminal: Vec<&'static str>,
}

impl<T: 'static> TagTable<T> {
	pub fn new(name: &'static str) -> TagTable<T> {
		TagTable { name, setters: HashMap::new(), groups: Vec::new(), streamed: Vec::new(), terminal: Vec::new() }
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn field<F>(mut self, tag: &'static str, setter: F) -> Self
		where F: Fn(&mut T, &Record) -> Result<(), FormatError> + 'static
	{
		self.setters.insert(tag, Box::new(setter));
		self
	}

	pub fn f32(self, tag: &'static str, field: fn(&mut T) -> &mut f32) -> Self {
		self.field(tag, move |t, r| { *field(t) = r.f32()?; Ok(()) })
	}

	pub fn i32(self, tag: &'static str, field: fn(&mut T) -> &mut i32) -> Self {
		self.field(tag, move |t, r| { *field(t) = r.i32()?; Ok(()) })
	}

	pub fn u32(self, tag: &'static str, field: fn(&mut T) -> &mut u32) -> Self {
		self.field(tag, move |t, r| { *field(t) = r.u32()?; Ok(()) })
	}

	pub fn bool(self, tag: &'static str, field: fn(&mut T) -> &mut bool) -> Self {
		self.field(tag, move |t, r| { *field(t) = r.bool()?; Ok(()) })
	}

	pub fn color(self, tag: &'static str, field: fn(&mut T) -> &mut u32) -> Self {
		self.field(tag, move |t, r| { *field(t) = r.color()?; Ok(()) })
	}

	pub fn string(self, tag: &'static str, field: fn(&mut T) -> &mut String) -> Self {
		self.field(tag, move |t, r| { *field(t) = r.string()?; Ok(()) })
	}

	pub fn wide_string(self, tag: &'static str, field: fn(&mut T) -> &mut String) -> Self {
		self.field(tag, move |t, r| { *field(t) = r.wide_string()?; Ok(()) })
	}

	pub fn vertex2(self, tag: &'static str, field: fn(&mut T) -> &mut Vec2) -> Self {
		self.field(tag, move |t, r| { *field(t) = r.vertex2()?; Ok(()) })
	}

	pub fn vertex3(self, tag: &'static str, field: fn(&mut T) -> &mut Vec3) -> Self {
		self.field(tag, move |t, r| { *field(t) = r.vertex3()?; Ok(()) })
	}

	/// Registers a tag that opens a nested group of records.
	pub fn group(mut self, tag: &'static str, on_start: fn() -> Box<dyn GroupAccumulator<T>>) -> Self {
		self.groups.push((tag, on_start));
		self
	}

	/// Registers a tag whose blob follows an inner length instead of being a sliced payload.
	pub fn streamed<F>(mut self, tag: &'static str, setter: F) -> Self
		where F: Fn(&mut T, &Record) -> Result<(), FormatError> + 'static
	{
		self.streamed.push(tag);
		self.field(tag, setter)
	}

	/// Registers a tag after which the rest of the stream cannot be framed as records.
	pub fn terminal<F>(mut self, tag: &'static str, setter: F) -> Self
		where F: Fn(&mut T, &Record) -> Result<(), FormatError> + 'static
	{
		self.terminal.push(tag);
		self.field(tag, setter)
	}

	/// Applies one record to `target`. Returns `false` for tags this table does not know.
	pub fn apply(&self, target: &mut T, record: &Record) -> Result<bool, FormatError> {
		match self.setters.get(record.tag.as_str()) {
			Some(setter) => {
				setter(target, record)?;
				Ok(true)
			},
			None => {
				debug!("[{}] Ignoring unknown tag '{}' at {:#X}.", self.name, record.tag, record.offset);
				Ok(false)
			},
		}
	}

	/// Parses a whole record stream into `target`.
	/// `base_offset` is the position of `data[0]` within its stream.
	pub fn parse(&self, data: &[u8], base_offset: u64, target: &mut T) -> Result<(), FormatError> {
		let mut parser = ChunkStreamParser::new();
		for &(tag, on_start) in &self.groups {
			parser = parser.with_group(tag, on_start);
		}
		for &tag in &self.streamed {
			parser = parser.with_streamed_tag(tag);
		}

		let mut handler = |target: &mut T, record: &Record| self.apply(target, record).map(|_| ());
		let mut position = 0;
		while position < data.len() {
			let remaining = &data[position..];
			let is_terminal = parser.depth() == 0 && remaining.len() >= 8
				&& self.terminal.iter().any(|t| t.as_bytes() == &remaining[4..8]);
			let chunk = Chunk { data: remaining, storage_offset: base_offset + position as u64 };
			match parser.next_record(chunk, target, &mut handler)? {
				Step::Consumed(_) if is_terminal => break,
				Step::Consumed(n) => position += n,
				Step::Stop => break,
			}
		}
		Ok(())
	}
}
