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

//! Loads a whole table from its container and rebuilds the scene.

mod dragpoint;
mod gamedata;
mod info;
mod items;
mod material;
mod primitive;
mod texture;

pub use self::dragpoint::{drag_point_group, HasDragPoints};
pub use self::gamedata::{Bounds, GameData, Lighting, PhysicsDefaults, ViewSetup};
pub use self::info::TableInfo;
pub use self::items::{Bumper, GameItem, ItemTables, ItemType, Light, Ramp, Rubber, Surface};
pub use self::material::{apply_physics, parse_materials, Material, MATERIAL_RECORD_SIZE, PHYSICS_MATERIAL_RECORD_SIZE};
pub use self::primitive::Primitive;
pub use self::texture::{BinaryRef, Texture};

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use log::{debug, info};
use crate::biff::decode::read_i32;
use crate::cfbf::Container;
use crate::error::{ContainerError, Error, Result};
use crate::extrude::{ramp_mesh, rubber_mesh, surface_mesh, SceneParams};
use crate::geometry::Mesh;

/// Caller-chosen settings for mesh generation.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
	/// 0 (coarse) to 10 (fine).
	pub detail_level: f32,
	pub scale_z: f32,
	/// Replaces the playfield height stored in the table.
	pub table_height: Option<f32>,
}

impl Default for SceneConfig {
	fn default() -> SceneConfig {
		SceneConfig { detail_level: 10.0, scale_z: 1.0, table_height: None }
	}
}

/// Everything decoded from a table file.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
	pub version: i32,
	pub info: TableInfo,
	pub game_data: GameData,
	pub items: Vec<GameItem>,
	pub textures: Vec<Texture>,
}

impl Table {
	/// Reads game data, items, textures and metadata. Any error aborts the load.
	pub fn load<R: Read + Seek>(container: &mut Container<R>) -> Result<Table> {
		let version_data = read_declared(container, "GameStg/Version")?;
		let version = read_i32(&version_data, 0).unwrap_or(0);
		debug!("[Table::load] File version {}.", version);

		let game_data = GameData::parse(&read_declared(container, "GameStg/GameData")?)?;

		let tables = ItemTables::new();
		let mut items = Vec::with_capacity(game_data.num_game_items.max(0) as usize);
		for i in 0..game_data.num_game_items.max(0) {
			let data = read_declared(container, &format!("GameStg/GameItem{}", i))?;
			items.push(tables.parse(&data)?);
		}

		let mut textures = Vec::with_capacity(game_data.num_textures.max(0) as usize);
		for i in 0..game_data.num_textures.max(0) {
			let path = format!("GameStg/Image{}", i);
			let data = read_declared(container, &path)?;
			textures.push(Texture::parse(&data, &path)?);
		}

		let info = TableInfo::load(container)?;
		info!("[Table::load] Loaded '{}': {} items, {} textures, {} materials.",
			game_data.name, items.len(), textures.len(), game_data.materials.len());
		Ok(Table { version, info, game_data, items, textures })
	}

	pub fn texture(&self, name: &str) -> Option<&Texture> {
		self.textures.iter().find(|t| t.name.eq_ignore_ascii_case(name))
	}

	/// Table-wide mesh parameters for `config`.
	pub fn scene_params(&self, config: &SceneConfig) -> SceneParams {
		let bounds = &self.game_data.bounds;
		let positive_or_one = |v: f32| if v > 0.0 { v } else { 1.0 };
		SceneParams {
			detail_level: config.detail_level,
			scale_z: config.scale_z,
			table_height: config.table_height.unwrap_or(self.game_data.table_height),
			table_width: positive_or_one(bounds.width()),
			table_length: positive_or_one(bounds.length()),
		}
	}

	/// Generates the meshes of all ramps, rubbers, walls and mesh primitives, in item order.
	pub fn build_scene(&self, config: &SceneConfig) -> Vec<(String, Mesh)> {
		let params = self.scene_params(config);
		let mut scene = Vec::new();
		for (i, item) in self.items.iter().enumerate() {
			let mesh = match item {
				GameItem::Ramp(ramp) => Some(ramp_mesh(&ramp.drag_points, &ramp.shape, &params)),
				GameItem::Rubber(rubber) => Some(rubber_mesh(&rubber.drag_points, &rubber.shape, &params)),
				GameItem::Surface(surface) => Some(surface_mesh(&surface.drag_points, &surface.shape, &params)),
				GameItem::Primitive(primitive) => primitive.world_mesh(&params),
				_ => None,
			};
			if let Some(mesh) = mesh.filter(|m| !m.is_empty()) {
				let name = if item.name().is_empty() { format!("{}{}", item.item_type(), i) } else { item.name().to_owned() };
				debug!("[build_scene] '{}': {} vertices, {} triangles.", name, mesh.vertices.len(), mesh.triangle_count());
				scene.push((name, mesh));
			}
		}
		scene
	}
}

fn read_declared<R: Read + Seek>(container: &mut Container<R>, path: &str) -> Result<Vec<u8>> {
	if !container.has_stream(path) {
		return Err(Error::MissingStream(path.to_owned()));
	}
	Ok(container.read_path(path)?)
}

/// A loaded table together with its open container, for on-demand blob access.
pub struct TableFile<R: Read + Seek> {
	container: Container<R>,
	table: Table,
}

impl TableFile<BufReader<File>> {
	pub fn open<P: AsRef<Path>>(path: P) -> Result<TableFile<BufReader<File>>> {
		TableFile::from_container(Container::open(path)?)
	}
}

impl<R: Read + Seek> TableFile<R> {
	pub fn new(reader: R) -> Result<TableFile<R>> {
		TableFile::from_container(Container::new(reader)?)
	}

	pub fn from_container(mut container: Container<R>) -> Result<TableFile<R>> {
		let table = Table::load(&mut container)?;
		Ok(TableFile { container, table })
	}

	pub fn table(&self) -> &Table {
		&self.table
	}

	pub fn container(&self) -> &Container<R> {
		&self.container
	}

	pub fn into_table(self) -> Table {
		self.table
	}

	/// Reads the embedded image file of `texture`, if it has one.
	pub fn texture_data(&mut self, texture: &Texture) -> Result<Option<Vec<u8>>> {
		let binary = match &texture.binary {
			Some(binary) => binary,
			None => return Ok(None),
		};
		let data = read_declared(&mut self.container, &binary.stream)?;
		let start = binary.offset as usize;
		match data.get(start..start + binary.length) {
			Some(bytes) => Ok(Some(bytes.to_vec())),
			None => Err(ContainerError::SizeMismatch {
				what: "texture data",
				expected: start + binary.length,
				actual: data.len(),
			}.into()),
		}
	}
}
