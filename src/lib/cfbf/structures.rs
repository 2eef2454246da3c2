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

// Also see: [MS-CFB]: Compound File Binary File Format specifications, https://msdn.microsoft.com/en-us/library/dd942138.aspx

use std::collections::BTreeMap;
use crate::error::ContainerError;

pub const SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Number of MSAT entries stored inline in the header.
pub const HEADER_MSAT_ENTRIES: usize = 109;

/// Size of a directory entry in bytes.
pub const DIRECTORY_ENTRY_SIZE: usize = 128;

/// Index marking an absent left/right/child directory entry.
pub const NO_ENTRY: u32 = 0xFFFF_FFFF;

/// The header of a compound file.
#[derive(Clone, Debug)]
pub struct Header {
	pub sector_shift: u16,
	pub sector_size: u64, // virtual field; not actually contained in the file
	pub short_sector_shift: u16,
	pub short_sector_size: u64, // virtual field; not actually contained in the file
	pub sat_size: u32,
	pub dir_sec_id: i32,
	/// Streams smaller than this live in the short stream (typically 4096 bytes).
	pub short_stream_max: u32,
	pub ssat_sec_id: i32,
	pub ssat_size: u32,
	pub msat_sec_id: i32,
	pub msat_size: u32,
	pub msat: Vec<i32>,
}

/// One entry of an allocation table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SectorEntry {
	/// The sector that follows in the chain.
	Next(u32),
	Free,
	EndOfChain,
	/// The sector holds part of the SAT itself.
	Sat,
	/// The sector holds part of the MSAT.
	Msat,
}

impl SectorEntry {
	pub fn from_raw(raw: i32) -> SectorEntry {
		match raw {
			-1 => SectorEntry::Free,
			-2 => SectorEntry::EndOfChain,
			-3 => SectorEntry::Sat,
			-4 => SectorEntry::Msat,
			n if n >= 0 => SectorEntry::Next(n as u32),
			// other negative ids are reserved; nothing can follow them
			_ => SectorEntry::EndOfChain,
		}
	}
}

/// A sector allocation table (SAT or SSAT): for every sector, the sector that follows it.
#[derive(Clone, Debug, Default)]
pub struct AllocationTable {
	entries: Vec<SectorEntry>,
}

impl AllocationTable {
	pub fn new(entries: Vec<SectorEntry>) -> AllocationTable {
		AllocationTable { entries }
	}

	/// Decodes a table from concatenated little-endian int32 entries.
	pub fn from_bytes(bytes: &[u8]) -> AllocationTable {
		let entries = bytes
			.chunks_exact(4)
			.map(|c| SectorEntry::from_raw(i32::from_le_bytes([c[0], c[1], c[2], c[3]])))
			.collect();
		AllocationTable { entries }
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, sector: u32) -> Option<SectorEntry> {
		self.entries.get(sector as usize).copied()
	}

	/// Follows the chain that starts at `start` and returns all of its sector ids in order.
	/// A negative start id denotes an empty chain.
	pub fn get_sec_id_chain(&self, start: i32) -> Result<Vec<u32>, ContainerError> {
		let mut chain = Vec::new();
		if start < 0 {
			return Ok(chain);
		}
		let mut current = start as u32;
		loop {
			let entry = self.get(current).ok_or(ContainerError::SectorOutOfRange { sector: current, len: self.entries.len() })?;
			chain.push(current);
			if chain.len() > self.entries.len() {
				return Err(ContainerError::ChainCycle { start: start as u32 });
			}
			match entry {
				SectorEntry::Next(next) => current = next,
				_ => return Ok(chain),
			}
		}
	}
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntryType {
	Empty,
	/// A folder.
	Storage,
	/// A file.
	Stream,
	/// The root folder, which also owns the short stream.
	Root,
}

impl EntryType {
	pub fn from_byte(byte: u8) -> EntryType {
		match byte {
			1 => EntryType::Storage,
			2 => EntryType::Stream,
			5 => EntryType::Root,
			_ => EntryType::Empty,
		}
	}
}

#[derive(Clone, Debug)]
pub struct DirectoryEntry {
	/// Position of this entry in the directory.
	pub id: u32,
	pub name: String,
	pub entry_type: EntryType,
	pub color: u8,
	/// The ID of the left sibling entry in the red-black tree, or `NO_ENTRY`.
	pub left: u32,
	/// The ID of the right sibling entry in the red-black tree, or `NO_ENTRY`.
	pub right: u32,
	/// If this entry is a storage: the ID of the root of its children's tree, or `NO_ENTRY`.
	pub storage_dir_id: u32,
	pub start_sector: i32,
	pub size: u32,
}

/// A folder of the compound file with its resolved children.
#[derive(Clone, Debug)]
pub struct Storage {
	pub name: String,
	storages: BTreeMap<String, Storage>,
	streams: BTreeMap<String, DirectoryEntry>,
}

impl Storage {
	pub fn new(name: String) -> Storage {
		Storage { name, storages: BTreeMap::new(), streams: BTreeMap::new() }
	}

	pub fn storage(&self, name: &str) -> Option<&Storage> {
		self.storages.get(name)
	}

	pub fn stream(&self, name: &str) -> Option<&DirectoryEntry> {
		self.streams.get(name)
	}

	pub fn storages(&self) -> impl Iterator<Item = &Storage> {
		self.storages.values()
	}

	pub fn streams(&self) -> impl Iterator<Item = &DirectoryEntry> {
		self.streams.values()
	}

	pub(crate) fn add_storage(&mut self, storage: Storage) {
		self.storages.insert(storage.name.clone(), storage);
	}

	pub(crate) fn add_stream(&mut self, entry: DirectoryEntry) {
		self.streams.insert(entry.name.clone(), entry);
	}

	/// Resolves a slash-separated path such as `GameStg/GameData` to a stream entry.
	pub fn find_stream(&self, path: &str) -> Option<&DirectoryEntry> {
		let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
		let name = segments.pop()?;
		let mut storage = self;
		for segment in segments {
			storage = storage.storage(segment)?;
		}
		storage.stream(name)
	}

	/// Visits every stream below this storage, depth first, with its full path.
	pub fn walk<F>(&self, prefix: &str, visit: &mut F) where F: FnMut(&str, &DirectoryEntry) {
		for stream in self.streams.values() {
			visit(&format!("{}/{}", prefix, stream.name), stream);
		}
		for storage in self.storages.values() {
			storage.walk(&format!("{}/{}", prefix, storage.name), visit);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn table(raw: &[i32]) -> AllocationTable {
		AllocationTable::new(raw.iter().map(|r| SectorEntry::from_raw(*r)).collect())
	}

	#[test]
	fn chain_follows_next_pointers() {
		let sat = table(&[-1, -1, 5, -1, -1, -2]);
		assert_eq!(sat.get_sec_id_chain(2).unwrap(), vec![2, 5]);
	}

	#[test]
	fn chain_from_end_of_chain_is_empty() {
		let sat = table(&[-2]);
		assert!(sat.get_sec_id_chain(-2).unwrap().is_empty());
	}

	#[test]
	fn chain_out_of_range_is_fatal() {
		let sat = table(&[7, -2]);
		match sat.get_sec_id_chain(0) {
			Err(ContainerError::SectorOutOfRange { sector: 7, len: 2 }) => {},
			other => panic!("unexpected {:?}", other),
		}
	}

	#[test]
	fn chain_cycle_terminates() {
		let sat = table(&[1, 0]);
		assert!(matches!(sat.get_sec_id_chain(0), Err(ContainerError::ChainCycle { start: 0 })));
	}

	#[test]
	fn sentinels_decode() {
		assert_eq!(SectorEntry::from_raw(-1), SectorEntry::Free);
		assert_eq!(SectorEntry::from_raw(-3), SectorEntry::Sat);
		assert_eq!(SectorEntry::from_raw(-4), SectorEntry::Msat);
		assert_eq!(SectorEntry::from_raw(12), SectorEntry::Next(12));
	}

	#[test]
	fn find_stream_by_path() {
		let mut game = Storage::new("GameStg".to_owned());
		game.add_stream(DirectoryEntry {
			id: 2,
			name: "GameData".to_owned(),
			entry_type: EntryType::Stream,
			color: 1,
			left: NO_ENTRY,
			right: NO_ENTRY,
			storage_dir_id: NO_ENTRY,
			start_sector: 0,
			size: 10,
		});
		let mut root = Storage::new("Root Entry".to_owned());
		root.add_storage(game);
		assert_eq!(root.find_stream("GameStg/GameData").map(|e| e.id), Some(2));
		assert!(root.find_stream("GameStg/Missing").is_none());
		assert!(root.find_stream("Other/GameData").is_none());
	}
}
