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

//! Stateless decoders for record payloads. All integers are little-endian.

use std::char::{decode_utf16, REPLACEMENT_CHARACTER};
use std::io::{copy, Error};
use libflate::{deflate, zlib};

/// Inflates a compressed payload. Payloads written with a zlib wrapper are detected by their header;
/// anything else is taken as a raw DEFLATE stream.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, Error> {
	let mut output = Vec::new();
	if has_zlib_header(data) {
		let mut decoder = zlib::Decoder::new(data)?;
		copy(&mut decoder, &mut output)?;
	}
	else {
		let mut decoder = deflate::Decoder::new(data);
		copy(&mut decoder, &mut output)?;
	}
	Ok(output)
}

fn has_zlib_header(data: &[u8]) -> bool {
	data.len() >= 2
		&& data[0] & 0x0F == 8
		&& data[0] >> 4 <= 7
		&& (u16::from(data[0]) << 8 | u16::from(data[1])) % 31 == 0
}

/// Reads single-byte characters up to the first NUL byte, or the whole buffer if there is none.
pub fn parse_null_terminated_string(data: &[u8]) -> String {
	data.iter()
		.take_while(|&&b| b != 0)
		.map(|&b| b as char)
		.collect()
}

/// Reads UTF-16LE code units up to the first NUL, or the whole buffer if there is none.
pub fn parse_wide_string(data: &[u8]) -> String {
	let units = data.chunks_exact(2)
		.map(|c| u16::from_le_bytes([c[0], c[1]]))
		.take_while(|&u| u != 0);
	decode_utf16(units)
		.map(|r| r.unwrap_or(REPLACEMENT_CHARACTER))
		.collect()
}

/// Reads a string prefixed by its int32 byte length.
pub fn read_string(data: &[u8]) -> Option<String> {
	let length = read_i32(data, 0)?.max(0) as usize;
	let bytes = data.get(4..4 + length)?;
	Some(bytes.iter().map(|&b| b as char).collect())
}

/// Reads a UTF-16LE string prefixed by its int32 byte length.
pub fn read_wide_string(data: &[u8]) -> Option<String> {
	let length = read_i32(data, 0)?.max(0) as usize;
	let bytes = data.get(4..4 + length)?;
	Some(parse_wide_string(bytes))
}

/// Swaps the red and blue channels of a `0x00BBGGRR` color.
pub fn bgr_to_rgb(color: u32) -> u32 {
	let r = color & 0xFF;
	let g = (color >> 8) & 0xFF;
	let b = (color >> 16) & 0xFF;
	(r << 16) | (g << 8) | b
}

pub fn read_i32(data: &[u8], offset: usize) -> Option<i32> {
	let b = data.get(offset..offset + 4)?;
	Some(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

pub fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
	read_i32(data, offset).map(|v| v as u32)
}

pub fn read_f32(data: &[u8], offset: usize) -> Option<f32> {
	read_u32(data, offset).map(f32::from_bits)
}

pub fn read_u16_array(data: &[u8], count: usize) -> Option<Vec<u16>> {
	let bytes = data.get(..count.checked_mul(2)?)?;
	Some(bytes.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect())
}

pub fn read_u32_array(data: &[u8], count: usize) -> Option<Vec<u32>> {
	let bytes = data.get(..count.checked_mul(4)?)?;
	Some(bytes.chunks_exact(4).map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect())
}

pub fn read_f32_array(data: &[u8], count: usize) -> Option<Vec<f32>> {
	read_u32_array(data, count).map(|v| v.into_iter().map(f32::from_bits).collect())
}
