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

use log::trace;
use crate::biff::{GroupAccumulator, Record, TagTable};
use crate::error::FormatError;

/// Location of a blob inside a container stream, read only when asked for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryRef {
	pub stream: String,
	pub offset: u64,
	pub length: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Texture {
	pub name: String,
	pub internal_name: String,
	pub path: String,
	pub width: i32,
	pub height: i32,
	pub alpha_test_value: f32,
	pub link: i32,
	/// The encoded image file (JPEG, PNG, ...), if embedded.
	pub binary: Option<BinaryRef>,
	/// Set for images stored as a raw bitmap, which carries no length and is not extracted.
	pub raw_bitmap: bool,
}

impl Texture {
	/// Decodes an `Image` stream. `stream` is its path in the container.
	pub fn parse(data: &[u8], stream: &str) -> Result<Texture, FormatError> {
		let mut texture = Texture::default();
		tag_table().parse(data, 0, &mut texture)?;
		if let Some(binary) = texture.binary.as_mut() {
			binary.stream = stream.to_owned();
		}
		Ok(texture)
	}
}

/// Collects the `JPEG` group: the embedded file and its metadata.
#[derive(Default)]
struct ImageFileGroup {
	size: Option<i32>,
	data: Option<(u64, usize)>,
}

impl GroupAccumulator<Texture> for ImageFileGroup {
	fn on_tag(&mut self, record: &Record) -> Result<(), FormatError> {
		match record.tag.as_str() {
			"SIZE" => self.size = Some(record.i32()?),
			"DATA" => self.data = Some((record.offset, record.bytes()?.len())),
			_ => trace!("[ImageFileGroup] Ignoring tag '{}' at {:#X}.", record.tag, record.offset),
		}
		Ok(())
	}

	fn on_end(self: Box<Self>, parent: &mut Texture) -> Result<(), FormatError> {
		if let Some((offset, payload_length)) = self.data {
			let length = match self.size {
				Some(size) if size >= 0 => payload_length.min(size as usize),
				_ => payload_length,
			};
			parent.binary = Some(BinaryRef { stream: String::new(), offset, length });
		}
		Ok(())
	}
}

fn image_file_group() -> Box<dyn GroupAccumulator<Texture>> {
	Box::new(ImageFileGroup::default())
}

fn tag_table() -> TagTable<Texture> {
	TagTable::<Texture>::new("image")
		.string("NAME", |t| &mut t.name)
		.string("INME", |t| &mut t.internal_name)
		.string("PATH", |t| &mut t.path)
		.i32("WDTH", |t| &mut t.width)
		.i32("HGHT", |t| &mut t.height)
		.f32("ALTV", |t| &mut t.alpha_test_value)
		.i32("LINK", |t| &mut t.link)
		.group("JPEG", image_file_group)
		.terminal("BITS", |t, _| { t.raw_bitmap = true; Ok(()) })
}
