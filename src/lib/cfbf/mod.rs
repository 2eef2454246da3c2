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

mod structures;

pub use self::structures::{AllocationTable, DirectoryEntry, EntryType, Header, SectorEntry, Storage};
pub use self::structures::{DIRECTORY_ENTRY_SIZE, HEADER_MSAT_ENTRIES, NO_ENTRY, SIGNATURE};

use std::char::{decode_utf16, REPLACEMENT_CHARACTER};
use std::cmp::min;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use log::{debug, trace};
use crate::error::ContainerError;
use crate::io::read_at;

/// Size of the header block at the beginning of the file.
const HEADER_SIZE: usize = 512;

pub struct Container<TFile: Read + Seek> {
	file: TFile,
	/// Number of bytes that precede the compound file within `file`.
	skip_bytes: u64,
	header: Header,
	sat: AllocationTable,
	ssat: AllocationTable,
	entries: Vec<DirectoryEntry>,
	root: Storage,
	/// The sectors of the short stream, which is owned by the root entry.
	root_chain: Vec<u32>,
}

impl Container<BufReader<File>> {
	pub fn open<P: AsRef<Path>>(path: P) -> Result<Container<BufReader<File>>, ContainerError> {
		debug!("[open] Opening {:?} ...", path.as_ref());
		let file = File::open(path)?;
		Container::new(BufReader::new(file))
	}
}

impl<TFile> Container<TFile> where TFile: Read + Seek {
	pub fn new(file: TFile) -> Result<Container<TFile>, ContainerError> {
		Container::with_offset(file, 0)
	}

	/// Reads a compound file that starts `skip_bytes` into `file`.
	pub fn with_offset(mut file: TFile, skip_bytes: u64) -> Result<Container<TFile>, ContainerError> {
		let header = read_header(&mut file, skip_bytes)?;
		let mut container = Container {
			file,
			skip_bytes,
			header,
			sat: AllocationTable::default(),
			ssat: AllocationTable::default(),
			entries: Vec::new(),
			root: Storage::new(String::new()),
			root_chain: Vec::new(),
		};
		let msat = container.read_msat()?;
		container.sat = container.read_sat(&msat)?;
		container.ssat = container.read_ssat()?;
		container.read_directory_tree()?;
		Ok(container)
	}

	pub fn header(&self) -> &Header {
		&self.header
	}

	pub fn sat(&self) -> &AllocationTable {
		&self.sat
	}

	pub fn ssat(&self) -> &AllocationTable {
		&self.ssat
	}

	/// All directory entries, indexed by their id.
	pub fn entries(&self) -> &[DirectoryEntry] {
		&self.entries
	}

	pub fn root(&self) -> &Storage {
		&self.root
	}

	/// Collects the SAT sector ids: the 109 inline entries of the header, then the MSAT sector chain.
	fn read_msat(&mut self) -> Result<Vec<u32>, ContainerError> {
		let sat_size = self.header.sat_size as usize;
		debug!("[read_msat] Collecting {} SAT sector ids ...", sat_size);
		let mut msat: Vec<u32> = self.header.msat.iter()
			.take(min(sat_size, HEADER_MSAT_ENTRIES))
			.map(|&id| id as u32)
			.collect();

		let entries_per_sector = (self.header.sector_size as usize - 4) / 4;
		let mut next = self.header.msat_sec_id;
		let mut visited = 0;
		while msat.len() < sat_size {
			if next < 0 {
				return Err(ContainerError::SizeMismatch { what: "MSAT", expected: sat_size, actual: msat.len() });
			}
			visited += 1;
			if visited > self.header.msat_size as usize + 1 {
				return Err(ContainerError::ChainCycle { start: self.header.msat_sec_id as u32 });
			}
			trace!("[read_msat] Reading MSAT sector #{} ...", next);
			let buffer = self.read_sector(next as u32)?;
			for i in 0..entries_per_sector {
				if msat.len() == sat_size {
					break;
				}
				msat.push(i32_at(&buffer, i * 4) as u32);
			}
			next = i32_at(&buffer, entries_per_sector * 4);
		}
		Ok(msat)
	}

	fn read_sat(&mut self, msat: &[u32]) -> Result<AllocationTable, ContainerError> {
		debug!("[read_sat] Reading {} SAT sectors ...", msat.len());
		let mut bytes = Vec::with_capacity(msat.len() * self.header.sector_size as usize);
		for &sector in msat {
			bytes.extend(self.read_sector(sector)?);
		}
		let sat = AllocationTable::from_bytes(&bytes);
		debug!("[read_sat] SAT has {} entries.", sat.len());
		Ok(sat)
	}

	fn read_ssat(&mut self) -> Result<AllocationTable, ContainerError> {
		let chain = self.sat.get_sec_id_chain(self.header.ssat_sec_id)?;
		if chain.len() != self.header.ssat_size as usize {
			return Err(ContainerError::SizeMismatch { what: "SSAT", expected: self.header.ssat_size as usize, actual: chain.len() });
		}
		debug!("[read_ssat] Reading {} SSAT sectors ...", chain.len());
		let mut bytes = Vec::new();
		for sector in chain {
			bytes.extend(self.read_sector(sector)?);
		}
		Ok(AllocationTable::from_bytes(&bytes))
	}

	fn read_directory_tree(&mut self) -> Result<(), ContainerError> {
		let chain = self.sat.get_sec_id_chain(self.header.dir_sec_id)?;
		debug!("[read_directory_tree] Reading {} directory sectors ...", chain.len());
		let mut entries = Vec::new();
		for sector in chain {
			let buffer = self.read_sector(sector)?;
			for chunk in buffer.chunks_exact(DIRECTORY_ENTRY_SIZE) {
				let entry = read_directory_entry(entries.len() as u32, chunk);
				trace!("[read_directory_tree] Entry #{} '{}' ({:?}, {} bytes).", entry.id, entry.name, entry.entry_type, entry.size);
				entries.push(entry);
			}
		}
		self.entries = entries;

		let root_entry = self.entries.iter()
			.find(|e| e.entry_type == EntryType::Root)
			.cloned()
			.ok_or(ContainerError::NoRootEntry)?;
		self.root_chain = self.sat.get_sec_id_chain(root_entry.start_sector)?;
		let mut path = vec![root_entry.id];
		self.root = self.build_storage(&root_entry, &mut path)?;
		Ok(())
	}

	/// Resolves the children of `entry` by in-order traversal of its red-black tree.
	fn build_storage(&self, entry: &DirectoryEntry, path: &mut Vec<u32>) -> Result<Storage, ContainerError> {
		let mut storage = Storage::new(entry.name.clone());
		let mut children = Vec::new();
		self.collect_in_order(entry.storage_dir_id, &mut children, &mut Vec::new(), path)?;
		for id in children {
			let child = &self.entries[id as usize];
			match child.entry_type {
				EntryType::Storage => {
					if path.contains(&child.id) {
						return Err(ContainerError::DirectoryCycle(child.id));
					}
					path.push(child.id);
					let substorage = self.build_storage(child, path)?;
					path.pop();
					storage.add_storage(substorage);
				},
				EntryType::Stream => storage.add_stream(child.clone()),
				EntryType::Empty | EntryType::Root => trace!("[build_storage] Skipping entry #{} ({:?}).", child.id, child.entry_type),
			}
		}
		Ok(storage)
	}

	/// Visits `left`, records the node itself, then visits `right`.
	/// `seen` holds every sibling entered so far, so a link back into the tree is a cycle.
	fn collect_in_order(&self, id: u32, out: &mut Vec<u32>, seen: &mut Vec<u32>, path: &[u32]) -> Result<(), ContainerError> {
		if id == NO_ENTRY {
			return Ok(());
		}
		let entry = self.entries.get(id as usize).ok_or(ContainerError::SectorOutOfRange { sector: id, len: self.entries.len() })?;
		if seen.contains(&id) || path.contains(&id) {
			return Err(ContainerError::DirectoryCycle(id));
		}
		seen.push(id);
		self.collect_in_order(entry.left, out, seen, path)?;
		out.push(id);
		self.collect_in_order(entry.right, out, seen, path)
	}

	/// Reads the full content of a stream entry.
	pub fn read_stream(&mut self, entry: &DirectoryEntry) -> Result<Vec<u8>, ContainerError> {
		let size = entry.size as usize;
		let mut data = Vec::with_capacity(size);
		if entry.size < self.header.short_stream_max {
			debug!("[read_stream] Reading '{}' ({} bytes) from the short stream ...", entry.name, size);
			let chain = self.ssat.get_sec_id_chain(entry.start_sector)?;
			let short_size = self.header.short_sector_size as usize;
			for short_sector in chain {
				if data.len() >= size {
					break;
				}
				let offset = self.short_sector_offset(short_sector)?;
				let length = min(short_size, size - data.len());
				data.extend(read_at(&mut self.file, offset, length)?);
			}
		}
		else {
			debug!("[read_stream] Reading '{}' ({} bytes) from sectors ...", entry.name, size);
			let chain = self.sat.get_sec_id_chain(entry.start_sector)?;
			let sector_size = self.header.sector_size as usize;
			for sector in chain {
				if data.len() >= size {
					break;
				}
				let length = min(sector_size, size - data.len());
				let offset = self.sector_offset(sector);
				data.extend(read_at(&mut self.file, offset, length)?);
			}
		}
		if data.len() < size {
			return Err(ContainerError::SizeMismatch { what: "stream", expected: size, actual: data.len() });
		}
		Ok(data)
	}

	/// Reads the stream at a slash-separated path below the root, e.g. `GameStg/GameData`.
	pub fn read_path(&mut self, path: &str) -> Result<Vec<u8>, ContainerError> {
		let entry = self.root.find_stream(path).cloned().ok_or_else(|| ContainerError::StreamNotFound(path.to_owned()))?;
		self.read_stream(&entry)
	}

	pub fn has_stream(&self, path: &str) -> bool {
		self.root.find_stream(path).is_some()
	}

	/// File offset of a regular sector; the `+1` skips the header block.
	fn sector_offset(&self, sector: u32) -> u64 {
		self.skip_bytes + (sector as u64 + 1) * self.header.sector_size
	}

	/// File offset of a short sector, located through the sectors of the root entry.
	fn short_sector_offset(&self, short_sector: u32) -> Result<u64, ContainerError> {
		let short_offset = short_sector as u64 * self.header.short_sector_size;
		let host_index = (short_offset / self.header.sector_size) as usize;
		let host_sector = *self.root_chain.get(host_index).ok_or(ContainerError::SectorOutOfRange { sector: short_sector, len: self.root_chain.len() })?;
		Ok(self.sector_offset(host_sector) + short_offset % self.header.sector_size)
	}

	fn read_sector(&mut self, sector: u32) -> Result<Vec<u8>, ContainerError> {
		let offset = self.sector_offset(sector);
		Ok(read_at(&mut self.file, offset, self.header.sector_size as usize)?)
	}
}

fn read_header<TFile: Read + Seek>(file: &mut TFile, skip_bytes: u64) -> Result<Header, ContainerError> {
	debug!("[read_header] Reading compound file header ({} bytes) ...", HEADER_SIZE);
	let buffer = read_at(file, skip_bytes, HEADER_SIZE)?;
	if buffer[0..8] != SIGNATURE {
		return Err(ContainerError::BadSignature);
	}

	let sector_shift = u16_at(&buffer, 30);
	let short_sector_shift = u16_at(&buffer, 32);
	if !(7..=16).contains(&sector_shift) {
		return Err(ContainerError::BadHeader { field: "sector shift", value: sector_shift });
	}
	if short_sector_shift > sector_shift {
		return Err(ContainerError::BadHeader { field: "short sector shift", value: short_sector_shift });
	}
	let msat = (0..HEADER_MSAT_ENTRIES).map(|i| i32_at(&buffer, 76 + i * 4)).collect();
	let header = Header {
		sector_shift,
		sector_size: 1 << sector_shift,
		short_sector_shift,
		short_sector_size: 1 << short_sector_shift,
		sat_size: i32_at(&buffer, 44) as u32,
		dir_sec_id: i32_at(&buffer, 48),
		short_stream_max: i32_at(&buffer, 56) as u32,
		ssat_sec_id: i32_at(&buffer, 60),
		ssat_size: i32_at(&buffer, 64) as u32,
		msat_sec_id: i32_at(&buffer, 68),
		msat_size: i32_at(&buffer, 72) as u32,
		msat,
	};
	debug!("[read_header] Sector size {}, short sector size {}, {} SAT sectors, {} SSAT sectors.",
		header.sector_size, header.short_sector_size, header.sat_size, header.ssat_size);
	Ok(header)
}

fn read_directory_entry(id: u32, buffer: &[u8]) -> DirectoryEntry {
	// The length is expressed in bytes, but we read u16's; also remove the trailing NUL character
	let name_length = min((u16_at(buffer, 64) / 2).saturating_sub(1) as usize, 31);
	let name = decode_utf16((0..name_length).map(|i| u16_at(buffer, i * 2)))
		.map(|r| r.unwrap_or(REPLACEMENT_CHARACTER))
		.collect::<String>();

	DirectoryEntry {
		id,
		name,
		entry_type: EntryType::from_byte(buffer[66]),
		color: buffer[67],
		left: i32_at(buffer, 68) as u32,
		right: i32_at(buffer, 72) as u32,
		storage_dir_id: i32_at(buffer, 76) as u32,
		start_sector: i32_at(buffer, 116),
		size: i32_at(buffer, 120) as u32,
	}
}

fn u16_at(buffer: &[u8], offset: usize) -> u16 {
	u16::from_le_bytes([buffer[offset], buffer[offset + 1]])
}

fn i32_at(buffer: &[u8], offset: usize) -> i32 {
	i32::from_le_bytes([buffer[offset], buffer[offset + 1], buffer[offset + 2], buffer[offset + 3]])
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Cursor;

	#[test]
	fn bad_signature_is_rejected() {
		let data = vec![0u8; 1024];
		match Container::new(Cursor::new(data)) {
			Err(ContainerError::BadSignature) => {},
			Err(e) => panic!("unexpected error {}", e),
			Ok(_) => panic!("accepted a file without signature"),
		}
	}

	fn header_with_shifts(sector_shift: u16, short_sector_shift: u16) -> Vec<u8> {
		let mut data = SIGNATURE.to_vec();
		data.resize(HEADER_SIZE, 0);
		data[30..32].copy_from_slice(&sector_shift.to_le_bytes());
		data[32..34].copy_from_slice(&short_sector_shift.to_le_bytes());
		data
	}

	#[test]
	fn invalid_shifts_name_the_header_field() {
		match Container::new(Cursor::new(header_with_shifts(20, 6))) {
			Err(ContainerError::BadHeader { field: "sector shift", value: 20 }) => {},
			Err(e) => panic!("unexpected error {}", e),
			Ok(_) => panic!("accepted a sector shift of 20"),
		}
		match Container::new(Cursor::new(header_with_shifts(9, 10))) {
			Err(ContainerError::BadHeader { field: "short sector shift", value: 10 }) => {},
			Err(e) => panic!("unexpected error {}", e),
			Ok(_) => panic!("accepted a short sector shift above the sector shift"),
		}
	}

	#[test]
	fn short_file_is_an_io_error() {
		let mut data = SIGNATURE.to_vec();
		data.resize(100, 0);
		assert!(matches!(Container::new(Cursor::new(data)), Err(ContainerError::Io(_))));
	}

	#[test]
	fn directory_entry_decodes_fields() {
		let mut buffer = vec![0u8; DIRECTORY_ENTRY_SIZE];
		for (i, c) in "GameStg".encode_utf16().enumerate() {
			buffer[i * 2..i * 2 + 2].copy_from_slice(&c.to_le_bytes());
		}
		buffer[64..66].copy_from_slice(&16u16.to_le_bytes());
		buffer[66] = 1;
		buffer[67] = 1;
		buffer[68..72].copy_from_slice(&(-1i32).to_le_bytes());
		buffer[72..76].copy_from_slice(&3i32.to_le_bytes());
		buffer[76..80].copy_from_slice(&4i32.to_le_bytes());
		buffer[116..120].copy_from_slice(&(-2i32).to_le_bytes());
		buffer[120..124].copy_from_slice(&0i32.to_le_bytes());

		let entry = read_directory_entry(7, &buffer);
		assert_eq!(entry.id, 7);
		assert_eq!(entry.name, "GameStg");
		assert_eq!(entry.entry_type, EntryType::Storage);
		assert_eq!(entry.left, NO_ENTRY);
		assert_eq!(entry.right, 3);
		assert_eq!(entry.storage_dir_id, 4);
		assert_eq!(entry.start_sector, -2);
	}

	#[test]
	fn empty_name_length_clamps_to_zero() {
		let buffer = vec![0u8; DIRECTORY_ENTRY_SIZE];
		assert_eq!(read_directory_entry(0, &buffer).name, "");
	}
}
