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

mod common;

use std::io::Cursor;
use common::{directory_entry_offset, patch_i32, read_i32, CompoundBuilder, CHILD, LEFT, RIGHT};
use vpxscene::cfbf::Container;
use vpxscene::ContainerError;

fn pattern(len: usize) -> Vec<u8> {
	(0..len).map(|i| (i % 251) as u8).collect()
}

#[test]
fn short_and_regular_streams_read_back() {
	let small = pattern(100);
	let large = pattern(10_000);
	let file = CompoundBuilder::new()
		.stream("GameStg/Version", &1070i32.to_le_bytes())
		.stream("GameStg/GameData", &small)
		.stream("GameStg/Image0", &large)
		.build();

	let mut container = Container::new(Cursor::new(file)).unwrap();
	assert_eq!(container.read_path("GameStg/GameData").unwrap(), small);
	assert_eq!(container.read_path("GameStg/Image0").unwrap(), large);
	assert_eq!(container.read_path("GameStg/Version").unwrap(), 1070i32.to_le_bytes().to_vec());
}

#[test]
fn stream_at_the_cutoff_uses_regular_sectors() {
	let below = pattern(4095);
	let at = pattern(4096);
	let file = CompoundBuilder::new()
		.stream("Below", &below)
		.stream("At", &at)
		.build();

	let mut container = Container::new(Cursor::new(file)).unwrap();
	assert_eq!(container.read_path("Below").unwrap(), below);
	assert_eq!(container.read_path("At").unwrap(), at);
}

#[test]
fn walk_lists_every_stream_with_its_path() {
	let file = CompoundBuilder::new()
		.stream("GameStg/GameData", &[1, 2, 3])
		.stream("GameStg/GameItem0", &[4])
		.stream("TableInfo/TableName", &[0x41, 0])
		.build();
	let container = Container::new(Cursor::new(file)).unwrap();

	let mut listed = Vec::new();
	container.root().walk("", &mut |path, entry| listed.push((path.to_owned(), entry.size)));
	listed.sort();
	assert_eq!(listed, vec![
		("/GameStg/GameData".to_owned(), 3),
		("/GameStg/GameItem0".to_owned(), 1),
		("/TableInfo/TableName".to_owned(), 2),
	]);
	assert!(container.has_stream("GameStg/GameItem0"));
	assert!(!container.has_stream("GameStg/GameItem1"));
}

#[test]
fn empty_stream_reads_as_empty() {
	let file = CompoundBuilder::new().stream("GameStg/Empty", &[]).build();
	let mut container = Container::new(Cursor::new(file)).unwrap();
	assert!(container.read_path("GameStg/Empty").unwrap().is_empty());
}

#[test]
fn missing_stream_is_reported_by_path() {
	let file = CompoundBuilder::new().stream("GameStg/GameData", &[0]).build();
	let mut container = Container::new(Cursor::new(file)).unwrap();
	match container.read_path("GameStg/Nope") {
		Err(ContainerError::StreamNotFound(path)) => assert_eq!(path, "GameStg/Nope"),
		other => panic!("unexpected {:?}", other),
	}
}

#[test]
fn foreign_file_is_rejected() {
	let mut file = CompoundBuilder::new().stream("A", &[0]).build();
	file[0] = b'P';
	assert!(matches!(Container::new(Cursor::new(file)), Err(ContainerError::BadSignature)));
}

#[test]
fn container_can_start_inside_a_larger_file() {
	let mut file = vec![0xAA; 100];
	file.extend(CompoundBuilder::new().stream("GameStg/GameData", &pattern(300)).build());
	let mut container = Container::with_offset(Cursor::new(file), 100).unwrap();
	assert_eq!(container.read_path("GameStg/GameData").unwrap(), pattern(300));
}

#[test]
fn ssat_chain_shorter_than_declared_is_rejected() {
	let mut file = CompoundBuilder::new().stream("GameStg/GameData", &pattern(100)).build();
	assert_eq!(read_i32(&file, 64), 1);
	patch_i32(&mut file, 64, 2);
	match Container::new(Cursor::new(file)) {
		Err(ContainerError::SizeMismatch { what: "SSAT", expected: 2, actual: 1 }) => {},
		Err(e) => panic!("unexpected error {}", e),
		Ok(_) => panic!("accepted a truncated SSAT"),
	}
}

/// Root entries: 0 root, 1 "A", 2 "B". The builder links A -> B through `right`.
fn two_streams() -> Vec<u8> {
	CompoundBuilder::new()
		.stream("A", &pattern(10))
		.stream("B", &pattern(20))
		.build()
}

#[test]
fn siblings_are_found_through_left_links() {
	let mut file = two_streams();
	let root = directory_entry_offset(&file, 0);
	let a = directory_entry_offset(&file, 1);
	let b = directory_entry_offset(&file, 2);
	patch_i32(&mut file, root + CHILD, 2);
	patch_i32(&mut file, a + RIGHT, -1);
	patch_i32(&mut file, b + LEFT, 1);

	let mut container = Container::new(Cursor::new(file)).unwrap();
	assert_eq!(container.entries()[2].left, 1);
	assert_eq!(container.read_path("A").unwrap(), pattern(10));
	assert_eq!(container.read_path("B").unwrap(), pattern(20));
}

#[test]
fn sibling_link_back_into_the_tree_is_a_cycle() {
	let mut file = two_streams();
	let b = directory_entry_offset(&file, 2);
	patch_i32(&mut file, b + LEFT, 1);
	match Container::new(Cursor::new(file)) {
		Err(ContainerError::DirectoryCycle(1)) => {},
		Err(e) => panic!("unexpected error {}", e),
		Ok(_) => panic!("accepted a directory cycle"),
	}
}

#[test]
fn self_referencing_sibling_is_a_cycle() {
	let mut file = two_streams();
	let b = directory_entry_offset(&file, 2);
	patch_i32(&mut file, b + LEFT, 2);
	assert!(matches!(Container::new(Cursor::new(file)), Err(ContainerError::DirectoryCycle(2))));
}

#[test]
fn sat_sectors_beyond_the_header_follow_the_msat_chain() {
	let mut file = CompoundBuilder::new()
		.stream("GameStg/GameData", &pattern(300))
		.stream("GameStg/Image0", &pattern(5000))
		.build();
	// the file has fewer than 128 sectors, so only the first SAT sector is ever consulted
	// and the additional ones may repeat it
	assert_eq!(read_i32(&file, 44), 1);
	let msat_sector = (file.len() - 512) / 512;
	patch_i32(&mut file, 44, 110);
	patch_i32(&mut file, 68, msat_sector as i32);
	patch_i32(&mut file, 72, 1);
	for i in 0..109 {
		patch_i32(&mut file, 76 + i * 4, 0);
	}
	let mut msat = vec![0xFFu8; 512];
	patch_i32(&mut msat, 0, 0);
	patch_i32(&mut msat, 508, -2);
	file.extend(msat);

	let mut container = Container::new(Cursor::new(file)).unwrap();
	assert_eq!(container.sat().len(), 110 * 128);
	assert_eq!(container.read_path("GameStg/GameData").unwrap(), pattern(300));
	assert_eq!(container.read_path("GameStg/Image0").unwrap(), pattern(5000));
}

#[test]
fn msat_chain_ending_early_is_rejected() {
	let mut file = CompoundBuilder::new().stream("A", &pattern(10)).build();
	patch_i32(&mut file, 44, 110);
	for i in 0..109 {
		patch_i32(&mut file, 76 + i * 4, 0);
	}
	assert!(matches!(Container::new(Cursor::new(file)), Err(ContainerError::SizeMismatch { what: "MSAT", .. })));
}
