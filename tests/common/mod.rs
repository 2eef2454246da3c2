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

//! Writes small compound files and BIFF records for the integration tests.

#![allow(dead_code)]

const SECTOR_SIZE: usize = 512;
const SHORT_SECTOR_SIZE: usize = 64;
const SHORT_STREAM_MAX: usize = 4096;
const ENTRIES_PER_SAT_SECTOR: usize = SECTOR_SIZE / 4;
const NO_ENTRY: u32 = 0xFFFF_FFFF;
const END_OF_CHAIN: i32 = -2;
const FREE: i32 = -1;
const SAT_SECTOR: i32 = -3;

enum Kind {
	Root,
	Storage,
	Stream(Vec<u8>),
}

struct Node {
	name: String,
	kind: Kind,
	children: Vec<usize>,
	start: i32,
	size: u32,
}

/// Builds a version 3 compound file from stream paths such as `GameStg/GameData`.
#[derive(Default)]
pub struct CompoundBuilder {
	streams: Vec<(String, Vec<u8>)>,
}

impl CompoundBuilder {
	pub fn new() -> CompoundBuilder {
		CompoundBuilder::default()
	}

	pub fn stream(mut self, path: &str, data: &[u8]) -> CompoundBuilder {
		self.streams.push((path.to_owned(), data.to_vec()));
		self
	}

	pub fn build(self) -> Vec<u8> {
		let mut nodes = vec![Node { name: "Root Entry".to_owned(), kind: Kind::Root, children: Vec::new(), start: END_OF_CHAIN, size: 0 }];
		for (path, data) in self.streams {
			let segments: Vec<&str> = path.split('/').collect();
			let mut parent = 0;
			for (i, segment) in segments.iter().enumerate() {
				let existing = nodes[parent].children.iter().copied().find(|&c| nodes[c].name == *segment);
				parent = match existing {
					Some(child) => child,
					None => {
						let kind = if i + 1 == segments.len() { Kind::Stream(data.clone()) } else { Kind::Storage };
						nodes.push(Node { name: segment.to_string(), kind, children: Vec::new(), start: END_OF_CHAIN, size: 0 });
						let id = nodes.len() - 1;
						nodes[parent].children.push(id);
						id
					},
				};
			}
		}

		// Short streams are packed into the mini stream, large ones get their own sectors
		let mut mini_stream = Vec::new();
		let mut ssat: Vec<i32> = Vec::new();
		let mut large: Vec<(usize, Vec<u8>)> = Vec::new();
		for (id, node) in nodes.iter_mut().enumerate() {
			if let Kind::Stream(data) = &node.kind {
				node.size = data.len() as u32;
				if data.is_empty() {
					continue;
				}
				if data.len() < SHORT_STREAM_MAX {
					let first = ssat.len();
					let count = sectors_for(data.len(), SHORT_SECTOR_SIZE);
					ssat.extend(chain(first, count));
					node.start = first as i32;
					mini_stream.extend(data);
					mini_stream.resize(ssat.len() * SHORT_SECTOR_SIZE, 0);
				}
				else {
					large.push((id, data.clone()));
				}
			}
		}

		let dir_sectors = sectors_for(nodes.len() * 128, SECTOR_SIZE);
		let ssat_sectors = sectors_for(ssat.len() * 4, SECTOR_SIZE);
		let mini_sectors = sectors_for(mini_stream.len(), SECTOR_SIZE);
		let large_sectors: usize = large.iter().map(|(_, d)| sectors_for(d.len(), SECTOR_SIZE)).sum();
		let content_sectors = dir_sectors + ssat_sectors + mini_sectors + large_sectors;
		let mut sat_sectors = 1;
		while sat_sectors * ENTRIES_PER_SAT_SECTOR < content_sectors + sat_sectors {
			sat_sectors += 1;
		}
		assert!(sat_sectors <= 109, "test files must fit the header MSAT");

		let mut sat: Vec<i32> = vec![SAT_SECTOR; sat_sectors];
		let dir_start = sat.len();
		sat.extend(chain(dir_start, dir_sectors));
		let ssat_start = sat.len();
		sat.extend(chain(ssat_start, ssat_sectors));
		let mini_start = sat.len();
		sat.extend(chain(mini_start, mini_sectors));
		let mut large_data = Vec::new();
		for (id, data) in &large {
			let start = sat.len();
			let count = sectors_for(data.len(), SECTOR_SIZE);
			sat.extend(chain(start, count));
			nodes[*id].start = start as i32;
			large_data.extend(data);
			large_data.resize(large_data.len().div_ceil(SECTOR_SIZE) * SECTOR_SIZE, 0);
		}
		sat.resize(sat_sectors * ENTRIES_PER_SAT_SECTOR, FREE);
		if mini_sectors > 0 {
			nodes[0].start = mini_start as i32;
			nodes[0].size = mini_stream.len() as u32;
		}

		let mut out = header(sat_sectors, dir_start, if ssat_sectors > 0 { ssat_start as i32 } else { END_OF_CHAIN }, ssat_sectors);
		for entry in &sat {
			out.extend(&entry.to_le_bytes());
		}
		let mut siblings = vec![NO_ENTRY; nodes.len()];
		for node in &nodes {
			for pair in node.children.windows(2) {
				siblings[pair[0]] = pair[1] as u32;
			}
		}
		let mut directory = Vec::new();
		for (node, &right) in nodes.iter().zip(&siblings) {
			directory.extend(directory_entry(node, right));
		}
		directory.resize(dir_sectors * SECTOR_SIZE, 0);
		for chunk in directory.chunks_exact_mut(128).skip(nodes.len()) {
			for offset in [68, 72, 76] {
				chunk[offset..offset + 4].copy_from_slice(&NO_ENTRY.to_le_bytes());
			}
		}
		out.extend(directory);
		let mut ssat_bytes: Vec<u8> = ssat.iter().flat_map(|e| e.to_le_bytes()).collect();
		ssat_bytes.resize(ssat_sectors * SECTOR_SIZE, 0xFF);
		out.extend(ssat_bytes);
		mini_stream.resize(mini_sectors * SECTOR_SIZE, 0);
		out.extend(mini_stream);
		out.extend(large_data);
		out
	}
}

fn sectors_for(len: usize, sector_size: usize) -> usize {
	len.div_ceil(sector_size)
}

/// Allocation entries of `count` consecutive sectors starting at `first`.
fn chain(first: usize, count: usize) -> Vec<i32> {
	(0..count).map(|i| if i + 1 == count { END_OF_CHAIN } else { (first + i + 1) as i32 }).collect()
}

fn header(sat_sectors: usize, dir_start: usize, ssat_start: i32, ssat_sectors: usize) -> Vec<u8> {
	let mut h = vec![0u8; SECTOR_SIZE];
	h[0..8].copy_from_slice(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]);
	h[24..26].copy_from_slice(&0x3Eu16.to_le_bytes());
	h[26..28].copy_from_slice(&3u16.to_le_bytes());
	h[28..30].copy_from_slice(&0xFFFEu16.to_le_bytes());
	h[30..32].copy_from_slice(&9u16.to_le_bytes());
	h[32..34].copy_from_slice(&6u16.to_le_bytes());
	h[44..48].copy_from_slice(&(sat_sectors as i32).to_le_bytes());
	h[48..52].copy_from_slice(&(dir_start as i32).to_le_bytes());
	h[56..60].copy_from_slice(&(SHORT_STREAM_MAX as i32).to_le_bytes());
	h[60..64].copy_from_slice(&ssat_start.to_le_bytes());
	h[64..68].copy_from_slice(&(ssat_sectors as i32).to_le_bytes());
	h[68..72].copy_from_slice(&END_OF_CHAIN.to_le_bytes());
	h[72..76].copy_from_slice(&0i32.to_le_bytes());
	for i in 0..109 {
		let id = if i < sat_sectors { i as i32 } else { FREE };
		h[76 + i * 4..80 + i * 4].copy_from_slice(&id.to_le_bytes());
	}
	h
}

/// Children of a storage are chained through their right sibling pointers.
fn directory_entry(node: &Node, right: u32) -> Vec<u8> {
	let mut e = vec![0u8; 128];
	let units: Vec<u16> = node.name.encode_utf16().collect();
	for (i, unit) in units.iter().enumerate() {
		e[i * 2..i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
	}
	e[64..66].copy_from_slice(&(((units.len() + 1) * 2) as u16).to_le_bytes());
	e[66] = match node.kind {
		Kind::Storage => 1,
		Kind::Stream(_) => 2,
		Kind::Root => 5,
	};
	e[67] = 1;
	e[68..72].copy_from_slice(&NO_ENTRY.to_le_bytes());
	e[72..76].copy_from_slice(&right.to_le_bytes());
	e[76..80].copy_from_slice(&NO_ENTRY.to_le_bytes());
	if let Some(&first) = node.children.first() {
		e[76..80].copy_from_slice(&(first as u32).to_le_bytes());
	}
	e[116..120].copy_from_slice(&node.start.to_le_bytes());
	e[120..124].copy_from_slice(&node.size.to_le_bytes());
	e
}

/// Overwrites the little-endian int32 at `offset`.
pub fn patch_i32(file: &mut [u8], offset: usize, value: i32) {
	file[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

pub fn read_i32(file: &[u8], offset: usize) -> i32 {
	i32::from_le_bytes([file[offset], file[offset + 1], file[offset + 2], file[offset + 3]])
}

/// File offset of directory entry `id`. Entries are numbered in insertion order, the root being 0.
pub fn directory_entry_offset(file: &[u8], id: usize) -> usize {
	let dir_start = read_i32(file, 48) as usize;
	SECTOR_SIZE + dir_start * SECTOR_SIZE + id * 128
}

/// Offsets of the sibling and child links within a directory entry.
pub const LEFT: usize = 68;
pub const RIGHT: usize = 72;
pub const CHILD: usize = 76;

pub fn record(tag: &str, payload: &[u8]) -> Vec<u8> {
	let mut out = ((payload.len() + 4) as i32).to_le_bytes().to_vec();
	out.extend(tag.as_bytes());
	out.extend(payload);
	out
}

pub fn end() -> Vec<u8> {
	record("ENDB", &[])
}

pub fn f32_record(tag: &str, value: f32) -> Vec<u8> {
	record(tag, &value.to_le_bytes())
}

pub fn i32_record(tag: &str, value: i32) -> Vec<u8> {
	record(tag, &value.to_le_bytes())
}

/// A length-prefixed single-byte string payload.
pub fn string(s: &str) -> Vec<u8> {
	let mut out = (s.len() as i32).to_le_bytes().to_vec();
	out.extend(s.as_bytes());
	out
}

/// A length-prefixed UTF-16LE string payload.
pub fn wide(s: &str) -> Vec<u8> {
	let bytes = bare_wide(s);
	let mut out = (bytes.len() as i32).to_le_bytes().to_vec();
	out.extend(bytes);
	out
}

/// UTF-16LE text without a length, as stored in the `TableInfo` streams.
pub fn bare_wide(s: &str) -> Vec<u8> {
	s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
}

pub fn drag_point(x: f32, y: f32) -> Vec<u8> {
	let mut center = x.to_le_bytes().to_vec();
	center.extend(&y.to_le_bytes());
	let mut data = record("DPNT", &[]);
	data.extend(record("VCEN", &center));
	data.extend(end());
	data
}
