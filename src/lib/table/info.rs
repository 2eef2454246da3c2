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

use std::collections::BTreeMap;
use std::io::{Read, Seek};
use log::debug;
use crate::biff::decode::parse_wide_string;
use crate::cfbf::Container;
use crate::error::ContainerError;

const STORAGE: &str = "TableInfo";

/// Binary streams of the storage that are not text.
const BINARY_STREAMS: [&str; 1] = ["Screenshot"];

/// Author metadata from the optional `TableInfo` storage. Every stream holds bare UTF-16LE text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableInfo {
	pub name: String,
	pub author: String,
	pub version: String,
	pub release_date: String,
	pub email: String,
	pub website: String,
	pub blurb: String,
	pub description: String,
	pub rules: String,
	/// Any other text streams, by stream name.
	pub properties: BTreeMap<String, String>,
}

impl TableInfo {
	pub fn load<R: Read + Seek>(container: &mut Container<R>) -> Result<TableInfo, ContainerError> {
		let mut info = TableInfo::default();
		let streams: Vec<_> = match container.root().storage(STORAGE) {
			Some(storage) => storage.streams().cloned().collect(),
			None => {
				debug!("[TableInfo::load] No {} storage.", STORAGE);
				return Ok(info);
			},
		};

		for entry in streams {
			if BINARY_STREAMS.contains(&entry.name.as_str()) {
				continue;
			}
			let text = parse_wide_string(&container.read_stream(&entry)?);
			match entry.name.as_str() {
				"TableName" => info.name = text,
				"AuthorName" => info.author = text,
				"TableVersion" => info.version = text,
				"ReleaseDate" => info.release_date = text,
				"AuthorEmail" => info.email = text,
				"AuthorWebSite" => info.website = text,
				"TableBlurb" => info.blurb = text,
				"TableDescription" => info.description = text,
				"TableRules" => info.rules = text,
				_ => {
					info.properties.insert(entry.name.clone(), text);
				},
			}
		}
		Ok(info)
	}
}
