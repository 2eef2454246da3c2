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
use log::debug;
use crate::biff::decode::{bgr_to_rgb, parse_null_terminated_string, read_f32, read_u32};
use crate::error::FormatError;

/// Size of one entry of the `MATE` material table.
pub const MATERIAL_RECORD_SIZE: usize = 76;

/// Size of one entry of the `PHMA` physics material table.
pub const PHYSICS_MATERIAL_RECORD_SIZE: usize = 48;

/// Length of the NUL-padded name at the start of both record kinds.
const NAME_SIZE: usize = 32;

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
	pub name: String,
	/// Colors are `0x00RRGGBB`.
	pub base_color: u32,
	pub glossy_color: u32,
	pub clearcoat_color: u32,
	pub wrap_lighting: f32,
	pub is_metal: bool,
	pub roughness: f32,
	pub glossy_image_lerp: f32,
	pub thickness: f32,
	pub edge: f32,
	pub opacity: f32,
	pub is_opacity_active: bool,
	pub edge_alpha: f32,
	pub elasticity: f32,
	pub elasticity_falloff: f32,
	pub friction: f32,
	pub scatter_angle: f32,
}

impl Default for Material {
	fn default() -> Material {
		Material {
			name: String::new(),
			base_color: 0x00B4_69B4,
			glossy_color: 0,
			clearcoat_color: 0,
			wrap_lighting: 0.0,
			is_metal: false,
			roughness: 0.0,
			glossy_image_lerp: 1.0,
			thickness: 0.05,
			edge: 1.0,
			opacity: 1.0,
			is_opacity_active: false,
			edge_alpha: 1.0,
			elasticity: 0.0,
			elasticity_falloff: 0.0,
			friction: 0.0,
			scatter_angle: 0.0,
		}
	}
}

impl Material {
	/// Decodes one `MATE` entry. `data` must hold at least `MATERIAL_RECORD_SIZE` bytes.
	fn from_record(data: &[u8]) -> Material {
		let f32_at = |offset| read_f32(data, offset).unwrap_or(0.0);
		let color_at = |offset| read_u32(data, offset).map(bgr_to_rgb).unwrap_or(0);
		let opacity_flags = data[72];
		Material {
			name: parse_null_terminated_string(&data[..NAME_SIZE]),
			base_color: color_at(32),
			glossy_color: color_at(36),
			clearcoat_color: color_at(40),
			wrap_lighting: f32_at(44),
			is_metal: data[48] != 0,
			roughness: f32_at(52),
			glossy_image_lerp: 1.0 - f32::from(data[56]) / 255.0,
			edge: f32_at(60),
			thickness: f32::from(data[64]) / 255.0,
			opacity: f32_at(68),
			is_opacity_active: opacity_flags & 1 != 0,
			edge_alpha: f32::from(opacity_flags >> 1) / 127.0,
			..Material::default()
		}
	}
}

/// Decodes `count` consecutive `MATE` entries.
pub fn parse_materials(data: &[u8], count: usize) -> Result<Vec<Material>, FormatError> {
	let needed = count * MATERIAL_RECORD_SIZE;
	if data.len() < needed {
		return Err(FormatError::MaterialTableTruncated { count, needed, available: data.len() });
	}
	debug!("[parse_materials] Decoding {} materials ...", count);
	Ok(data.chunks_exact(MATERIAL_RECORD_SIZE).take(count).map(Material::from_record).collect())
}

/// Copies the physics values of `count` `PHMA` entries onto the materials they name.
pub fn apply_physics(materials: &mut HashMap<String, Material>, data: &[u8], count: usize) -> Result<(), FormatError> {
	let needed = count * PHYSICS_MATERIAL_RECORD_SIZE;
	if data.len() < needed {
		return Err(FormatError::MaterialTableTruncated { count, needed, available: data.len() });
	}
	for record in data.chunks_exact(PHYSICS_MATERIAL_RECORD_SIZE).take(count) {
		let name = parse_null_terminated_string(&record[..NAME_SIZE]);
		let material = materials.get_mut(&name).ok_or_else(|| FormatError::MaterialNotFound(name.clone()))?;
		material.elasticity = read_f32(record, 32).unwrap_or(0.0);
		material.elasticity_falloff = read_f32(record, 36).unwrap_or(0.0);
		material.friction = read_f32(record, 40).unwrap_or(0.0);
		material.scatter_angle = read_f32(record, 44).unwrap_or(0.0);
	}
	Ok(())
}
