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
use glam::Vec3;
use log::debug;
use crate::biff::TagTable;
use crate::error::FormatError;
use super::material::{apply_physics, parse_materials, Material};

/// Playfield rectangle in table units.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bounds {
	pub left: f32,
	pub top: f32,
	pub right: f32,
	pub bottom: f32,
}

impl Bounds {
	pub fn width(&self) -> f32 {
		self.right - self.left
	}

	pub fn length(&self) -> f32 {
		self.bottom - self.top
	}
}

/// Camera preset for one display mode.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewSetup {
	pub rotation: f32,
	pub inclination: f32,
	pub layback: f32,
	pub fov: f32,
	pub offset: Vec3,
	pub scale: Vec3,
}

impl Default for ViewSetup {
	fn default() -> ViewSetup {
		ViewSetup { rotation: 0.0, inclination: 0.0, layback: 0.0, fov: 45.0, offset: Vec3::ZERO, scale: Vec3::ONE }
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Lighting {
	/// Colors are `0x00RRGGBB`.
	pub ambient: u32,
	pub light0_emission: u32,
	pub light_height: f32,
	pub light_range: f32,
	pub light_emission_scale: f32,
	pub env_emission_scale: f32,
	pub global_emission_scale: f32,
	pub ao_scale: f32,
	pub ball_reflection: i32,
	pub playfield_reflection: i32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhysicsDefaults {
	pub gravity: f32,
	pub friction: f32,
	pub elasticity: f32,
	pub elasticity_falloff: f32,
	pub scatter: f32,
	pub default_scatter: f32,
	pub nudge_time: f32,
	pub plunger_normalize: i32,
}

/// Table-wide parameters from `GameStg/GameData`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameData {
	pub name: String,
	pub bounds: Bounds,
	pub desktop: ViewSetup,
	pub fullscreen: ViewSetup,
	pub full_single_screen: ViewSetup,
	pub glass_height: f32,
	pub table_height: f32,
	pub image: String,
	pub ball_image: String,
	pub lighting: Lighting,
	pub physics: PhysicsDefaults,
	pub num_game_items: i32,
	pub num_sounds: i32,
	pub num_textures: i32,
	pub num_fonts: i32,
	pub num_collections: i32,
	pub num_materials: i32,
	pub script: String,
	pub materials: HashMap<String, Material>,
	/// Material names in file order.
	pub material_order: Vec<String>,
	script_blob: Option<(u64, usize)>,
}

impl GameData {
	/// Decodes the `GameData` stream.
	pub fn parse(data: &[u8]) -> Result<GameData, FormatError> {
		let mut game_data = GameData::default();
		tag_table().parse(data, 0, &mut game_data)?;
		if let Some((offset, length)) = game_data.script_blob.take() {
			let start = offset as usize;
			let blob = data.get(start..start + length).ok_or_else(|| FormatError::ShortRecord {
				tag: "CODE".to_owned(),
				expected: length,
				actual: data.len().saturating_sub(start),
			})?;
			game_data.script = blob.iter().map(|&b| b as char).collect();
		}
		debug!("[GameData::parse] '{}': {} items, {} textures, {} materials, {} bytes of script.",
			game_data.name, game_data.num_game_items, game_data.num_textures, game_data.materials.len(), game_data.script.len());
		Ok(game_data)
	}

	pub fn material(&self, name: &str) -> Option<&Material> {
		self.materials.get(name)
	}
}

fn view_tags(table: TagTable<GameData>, tags: [&'static str; 10], view: fn(&mut GameData) -> &mut ViewSetup) -> TagTable<GameData> {
	table
		.field(tags[0], move |g, r| { view(g).rotation = r.f32()?; Ok(()) })
		.field(tags[1], move |g, r| { view(g).inclination = r.f32()?; Ok(()) })
		.field(tags[2], move |g, r| { view(g).layback = r.f32()?; Ok(()) })
		.field(tags[3], move |g, r| { view(g).fov = r.f32()?; Ok(()) })
		.field(tags[4], move |g, r| { view(g).offset.x = r.f32()?; Ok(()) })
		.field(tags[5], move |g, r| { view(g).offset.y = r.f32()?; Ok(()) })
		.field(tags[6], move |g, r| { view(g).offset.z = r.f32()?; Ok(()) })
		.field(tags[7], move |g, r| { view(g).scale.x = r.f32()?; Ok(()) })
		.field(tags[8], move |g, r| { view(g).scale.y = r.f32()?; Ok(()) })
		.field(tags[9], move |g, r| { view(g).scale.z = r.f32()?; Ok(()) })
}

fn tag_table() -> TagTable<GameData> {
	let table = TagTable::<GameData>::new("GameData")
		.wide_string("NAME", |g| &mut g.name)
		.f32("LEFT", |g| &mut g.bounds.left)
		.f32("TOPX", |g| &mut g.bounds.top)
		.f32("RGHT", |g| &mut g.bounds.right)
		.f32("BOTM", |g| &mut g.bounds.bottom)
		.f32("GLAS", |g| &mut g.glass_height)
		.f32("TBLH", |g| &mut g.table_height)
		.string("IMAG", |g| &mut g.image)
		.string("BLIM", |g| &mut g.ball_image)
		.color("LZAM", |g| &mut g.lighting.ambient)
		.color("LZDI", |g| &mut g.lighting.light0_emission)
		.f32("LZHI", |g| &mut g.lighting.light_height)
		.f32("LZRA", |g| &mut g.lighting.light_range)
		.f32("LIES", |g| &mut g.lighting.light_emission_scale)
		.f32("ENES", |g| &mut g.lighting.env_emission_scale)
		.f32("GLES", |g| &mut g.lighting.global_emission_scale)
		.f32("AOSC", |g| &mut g.lighting.ao_scale)
		.i32("BREF", |g| &mut g.lighting.ball_reflection)
		.i32("PLST", |g| &mut g.lighting.playfield_reflection)
		.f32("GAVT", |g| &mut g.physics.gravity)
		.f32("FRCT", |g| &mut g.physics.friction)
		.f32("ELAS", |g| &mut g.physics.elasticity)
		.f32("ELFA", |g| &mut g.physics.elasticity_falloff)
		.f32("SCAT", |g| &mut g.physics.scatter)
		.f32("PFSC", |g| &mut g.physics.default_scatter)
		.f32("NDGT", |g| &mut g.physics.nudge_time)
		.i32("PLMD", |g| &mut g.physics.plunger_normalize)
		.i32("SEDT", |g| &mut g.num_game_items)
		.i32("SSND", |g| &mut g.num_sounds)
		.i32("SIMG", |g| &mut g.num_textures)
		.i32("SFNT", |g| &mut g.num_fonts)
		.i32("SCOL", |g| &mut g.num_collections)
		.i32("MASI", |g| &mut g.num_materials)
		.field("MATE", |g, r| {
			for material in parse_materials(r.bytes()?, g.num_materials.max(0) as usize)? {
				g.material_order.push(material.name.clone());
				g.materials.insert(material.name.clone(), material);
			}
			Ok(())
		})
		.field("PHMA", |g, r| apply_physics(&mut g.materials, r.bytes()?, g.num_materials.max(0) as usize))
		.streamed("CODE", |g, r| { g.script_blob = Some((r.offset, r.streamed_len())); Ok(()) });

	let table = view_tags(table, ["ROTA", "INCL", "LAYB", "FOVX", "XLTX", "XLTY", "XLTZ", "SCLX", "SCLY", "SCLZ"], |g| &mut g.desktop);
	let table = view_tags(table, ["ROTF", "INCF", "LAYF", "FOVF", "XLFX", "XLFY", "XLFZ", "SCFX", "SCFY", "SCFZ"], |g| &mut g.fullscreen);
	view_tags(table, ["ROFS", "INCS", "LAYS", "FOVS", "XLXS", "XLYS", "XLZS", "SCXS", "SCYS", "SCZS"], |g| &mut g.full_single_screen)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::table::material::tests::{material_record, physics_record};

	fn record(tag: &str, payload: &[u8]) -> Vec<u8> {
		let mut out = ((payload.len() + 4) as i32).to_le_bytes().to_vec();
		out.extend(tag.as_bytes());
		out.extend(payload);
		out
	}

	fn f32_record(tag: &str, value: f32) -> Vec<u8> {
		record(tag, &value.to_le_bytes())
	}

	fn i32_record(tag: &str, value: i32) -> Vec<u8> {
		record(tag, &value.to_le_bytes())
	}

	fn code_record(script: &str) -> Vec<u8> {
		let mut out = 4i32.to_le_bytes().to_vec();
		out.extend(b"CODE");
		out.extend(&(script.len() as i32).to_le_bytes());
		out.extend(script.as_bytes());
		out
	}

	#[test]
	fn reads_bounds_views_and_script() {
		let mut data = f32_record("LEFT", 0.0);
		data.extend(f32_record("TOPX", 0.0));
		data.extend(f32_record("RGHT", 1000.0));
		data.extend(f32_record("BOTM", 2000.0));
		data.extend(f32_record("INCL", 40.0));
		data.extend(f32_record("SCFY", 1.2));
		data.extend(f32_record("XLZS", -50.0));
		data.extend(f32_record("TBLH", 12.5));
		data.extend(i32_record("SEDT", 3));
		data.extend(i32_record("SIMG", 1));
		data.extend(code_record("Option Explicit\r\n"));
		data.extend(f32_record("GAVT", 1.76));
		data.extend(record("ENDB", &[]));

		let game_data = GameData::parse(&data).unwrap();
		assert_eq!(game_data.bounds.width(), 1000.0);
		assert_eq!(game_data.bounds.length(), 2000.0);
		assert_eq!(game_data.desktop.inclination, 40.0);
		assert_eq!(game_data.fullscreen.scale.y, 1.2);
		assert_eq!(game_data.full_single_screen.offset.z, -50.0);
		assert_eq!(game_data.table_height, 12.5);
		assert_eq!(game_data.num_game_items, 3);
		assert_eq!(game_data.num_textures, 1);
		assert_eq!(game_data.script, "Option Explicit\r\n");
		assert_eq!(game_data.physics.gravity, 1.76);
	}

	#[test]
	fn materials_are_keyed_by_name() {
		let mut mate = material_record("Metal", 0, 0.1);
		mate.extend(material_record("Plastic", 0, 0.9));
		let mut phma = physics_record("Plastic", 0.5, 0.2);
		phma.extend(physics_record("Metal", 0.3, 0.1));

		let mut data = i32_record("MASI", 2);
		data.extend(record("MATE", &mate));
		data.extend(record("PHMA", &phma));
		data.extend(record("ENDB", &[]));

		let game_data = GameData::parse(&data).unwrap();
		assert_eq!(game_data.material_order, vec!["Metal", "Plastic"]);
		assert_eq!(game_data.material("Plastic").map(|m| m.elasticity), Some(0.5));
		assert_eq!(game_data.material("Metal").map(|m| m.roughness), Some(0.1));
	}

	#[test]
	fn truncated_material_table_fails() {
		let mut data = i32_record("MASI", 3);
		data.extend(record("MATE", &material_record("Metal", 0, 0.1)));
		assert!(matches!(GameData::parse(&data), Err(FormatError::MaterialTableTruncated { count: 3, .. })));
	}

	#[test]
	fn unknown_physics_material_fails() {
		let mut data = i32_record("MASI", 1);
		data.extend(record("MATE", &material_record("Metal", 0, 0.1)));
		data.extend(record("PHMA", &physics_record("Wood", 0.1, 0.1)));
		assert!(matches!(GameData::parse(&data), Err(FormatError::MaterialNotFound(_))));
	}
}
