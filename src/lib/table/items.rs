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

use std::fmt;
use glam::Vec2;
use log::{debug, warn};
use crate::biff::decode::read_i32;
use crate::biff::TagTable;
use crate::error::FormatError;
use crate::extrude::{ImageAlignment, RampShape, RampType, RubberShape, SurfaceShape};
use crate::geometry::DragPoint;
use super::dragpoint::{drag_point_group, HasDragPoints};
use super::primitive::{self, Primitive};

/// The type discriminant at the start of every `GameItem` stream.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ItemType {
	Surface,
	Flipper,
	Timer,
	Plunger,
	Textbox,
	Bumper,
	Trigger,
	Light,
	Kicker,
	Decal,
	Gate,
	Spinner,
	Ramp,
	Table,
	LightCenter,
	DragPoint,
	Collection,
	DispReel,
	LightSeq,
	Primitive,
	Flasher,
	Rubber,
	HitTarget,
	Unknown(i32),
}

impl ItemType {
	pub fn from_i32(value: i32) -> ItemType {
		match value {
			0 => ItemType::Surface,
			1 => ItemType::Flipper,
			2 => ItemType::Timer,
			3 => ItemType::Plunger,
			4 => ItemType::Textbox,
			5 => ItemType::Bumper,
			6 => ItemType::Trigger,
			7 => ItemType::Light,
			8 => ItemType::Kicker,
			9 => ItemType::Decal,
			10 => ItemType::Gate,
			11 => ItemType::Spinner,
			12 => ItemType::Ramp,
			13 => ItemType::Table,
			14 => ItemType::LightCenter,
			15 => ItemType::DragPoint,
			16 => ItemType::Collection,
			17 => ItemType::DispReel,
			18 => ItemType::LightSeq,
			19 => ItemType::Primitive,
			20 => ItemType::Flasher,
			21 => ItemType::Rubber,
			22 => ItemType::HitTarget,
			other => ItemType::Unknown(other),
		}
	}
}

impl fmt::Display for ItemType {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			ItemType::Unknown(value) => write!(f, "Unknown{}", value),
			other => write!(f, "{:?}", other),
		}
	}
}

/// A wall, given by its closed outline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Surface {
	pub name: String,
	pub shape: SurfaceShape,
	pub drag_points: Vec<DragPoint>,
	pub image: String,
	pub side_image: String,
	pub side_material: String,
	pub top_material: String,
	pub slingshot_material: String,
	pub droppable: bool,
	pub flipbook: bool,
	pub is_bottom_solid: bool,
	pub collidable: bool,
	pub top_bottom_visible: bool,
	pub side_visible: bool,
	pub slingshot_force: f32,
	pub slingshot_threshold: f32,
	pub elasticity: f32,
	pub friction: f32,
	pub scatter: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ramp {
	pub name: String,
	pub shape: RampShape,
	pub drag_points: Vec<DragPoint>,
	pub material: String,
	pub image: String,
	pub image_walls: bool,
	pub left_wall_height: f32,
	pub right_wall_height: f32,
	pub visible: bool,
	pub collidable: bool,
	pub elasticity: f32,
	pub friction: f32,
	pub scatter: f32,
	pub timer_enabled: bool,
	pub timer_interval: i32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rubber {
	pub name: String,
	pub shape: RubberShape,
	pub drag_points: Vec<DragPoint>,
	pub hit_height: f32,
	pub material: String,
	pub visible: bool,
	pub static_rendering: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Light {
	pub name: String,
	pub center: Vec2,
	pub drag_points: Vec<DragPoint>,
	pub falloff: f32,
	pub falloff_power: f32,
	pub state: f32,
	/// Colors are `0x00RRGGBB`.
	pub color: u32,
	pub color2: u32,
	pub surface: String,
	pub is_bulb: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bumper {
	pub name: String,
	pub center: Vec2,
	pub radius: f32,
	pub cap_material: String,
	pub base_material: String,
	pub skirt_material: String,
	pub ring_material: String,
	pub surface: String,
	pub height_scale: f32,
	pub orientation: f32,
	pub force: f32,
	pub threshold: f32,
	pub cap_visible: bool,
	pub base_visible: bool,
	pub ring_visible: bool,
	pub skirt_visible: bool,
}

/// An item type whose fields are not decoded.
#[derive(Clone, Debug, Default, PartialEq)]
struct Unparsed {
	name: String,
}

impl HasDragPoints for Surface {
	fn drag_points_mut(&mut self) -> &mut Vec<DragPoint> {
		&mut self.drag_points
	}
}

impl HasDragPoints for Ramp {
	fn drag_points_mut(&mut self) -> &mut Vec<DragPoint> {
		&mut self.drag_points
	}
}

impl HasDragPoints for Rubber {
	fn drag_points_mut(&mut self) -> &mut Vec<DragPoint> {
		&mut self.drag_points
	}
}

impl HasDragPoints for Light {
	fn drag_points_mut(&mut self) -> &mut Vec<DragPoint> {
		&mut self.drag_points
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameItem {
	Surface(Surface),
	Bumper(Bumper),
	Light(Light),
	Ramp(Ramp),
	Primitive(Primitive),
	Rubber(Rubber),
	Other { item_type: ItemType, name: String },
}

impl GameItem {
	pub fn name(&self) -> &str {
		match self {
			GameItem::Surface(item) => &item.name,
			GameItem::Bumper(item) => &item.name,
			GameItem::Light(item) => &item.name,
			GameItem::Ramp(item) => &item.name,
			GameItem::Primitive(item) => &item.name,
			GameItem::Rubber(item) => &item.name,
			GameItem::Other { name, .. } => name,
		}
	}

	pub fn item_type(&self) -> ItemType {
		match self {
			GameItem::Surface(_) => ItemType::Surface,
			GameItem::Bumper(_) => ItemType::Bumper,
			GameItem::Light(_) => ItemType::Light,
			GameItem::Ramp(_) => ItemType::Ramp,
			GameItem::Primitive(_) => ItemType::Primitive,
			GameItem::Rubber(_) => ItemType::Rubber,
			GameItem::Other { item_type, .. } => *item_type,
		}
	}
}

/// The tag tables of all decoded item types, built once per table load.
pub struct ItemTables {
	surface: TagTable<Surface>,
	ramp: TagTable<Ramp>,
	rubber: TagTable<Rubber>,
	light: TagTable<Light>,
	bumper: TagTable<Bumper>,
	primitive: TagTable<Primitive>,
	other: TagTable<Unparsed>,
}

impl Default for ItemTables {
	fn default() -> ItemTables {
		ItemTables::new()
	}
}

impl ItemTables {
	pub fn new() -> ItemTables {
		ItemTables {
			surface: surface_table(),
			ramp: ramp_table(),
			rubber: rubber_table(),
			light: light_table(),
			bumper: bumper_table(),
			primitive: primitive::tag_table(),
			other: TagTable::<Unparsed>::new("item")
				.wide_string("NAME", |i| &mut i.name)
				// followed by a raw font blob
				.terminal("FONT", |_, _| Ok(())),
		}
	}

	/// Decodes a `GameItem` stream: the type discriminant, then the records of that type.
	pub fn parse(&self, data: &[u8]) -> Result<GameItem, FormatError> {
		let raw_type = read_i32(data, 0).ok_or_else(|| FormatError::ShortRecord {
			tag: "item type".to_owned(),
			expected: 4,
			actual: data.len(),
		})?;
		let records = &data[4..];
		let item = match ItemType::from_i32(raw_type) {
			ItemType::Surface => GameItem::Surface(parse_with(&self.surface, records)?),
			ItemType::Ramp => GameItem::Ramp(parse_with(&self.ramp, records)?),
			ItemType::Rubber => GameItem::Rubber(parse_with(&self.rubber, records)?),
			ItemType::Light => GameItem::Light(parse_with(&self.light, records)?),
			ItemType::Bumper => GameItem::Bumper(parse_with(&self.bumper, records)?),
			ItemType::Primitive => {
				let mut item: Primitive = parse_with(&self.primitive, records)?;
				item.decode_mesh()?;
				GameItem::Primitive(item)
			},
			item_type => {
				if let ItemType::Unknown(value) = item_type {
					warn!("[ItemTables::parse] Unknown item type {}, keeping only its name.", value);
				}
				let other: Unparsed = parse_with(&self.other, records)?;
				GameItem::Other { item_type, name: other.name }
			},
		};
		debug!("[ItemTables::parse] {} '{}'.", item.item_type(), item.name());
		Ok(item)
	}
}

fn parse_with<T: Default + 'static>(table: &TagTable<T>, records: &[u8]) -> Result<T, FormatError> {
	let mut item = T::default();
	table.parse(records, 4, &mut item)?;
	Ok(item)
}

fn surface_table() -> TagTable<Surface> {
	TagTable::<Surface>::new("surface")
		.wide_string("NAME", |s| &mut s.name)
		.f32("HTBT", |s| &mut s.shape.height_bottom)
		.f32("HTTP", |s| &mut s.shape.height_top)
		.string("IMAG", |s| &mut s.image)
		.string("SIMG", |s| &mut s.side_image)
		.string("SIMA", |s| &mut s.side_material)
		.string("TOMA", |s| &mut s.top_material)
		.string("SLMA", |s| &mut s.slingshot_material)
		.bool("DROP", |s| &mut s.droppable)
		.bool("FLIP", |s| &mut s.flipbook)
		.bool("ISBM", |s| &mut s.is_bottom_solid)
		.bool("CLDW", |s| &mut s.collidable)
		.bool("VSBL", |s| &mut s.top_bottom_visible)
		.bool("SVBL", |s| &mut s.side_visible)
		.f32("SLGF", |s| &mut s.slingshot_force)
		.f32("SLTH", |s| &mut s.slingshot_threshold)
		.f32("ELAS", |s| &mut s.elasticity)
		.f32("WFCT", |s| &mut s.friction)
		.f32("WSCT", |s| &mut s.scatter)
		.group("DPNT", drag_point_group::<Surface>)
}

fn ramp_table() -> TagTable<Ramp> {
	TagTable::<Ramp>::new("ramp")
		.wide_string("NAME", |r| &mut r.name)
		.f32("HTBT", |r| &mut r.shape.height_bottom)
		.f32("HTTP", |r| &mut r.shape.height_top)
		.f32("WDBT", |r| &mut r.shape.width_bottom)
		.f32("WDTP", |r| &mut r.shape.width_top)
		.f32("WVHL", |r| &mut r.shape.left_wall_height_visible)
		.f32("WVHR", |r| &mut r.shape.right_wall_height_visible)
		.f32("WLHL", |r| &mut r.left_wall_height)
		.f32("WLHR", |r| &mut r.right_wall_height)
		.f32("RADB", |r| &mut r.shape.wire_diameter)
		.f32("RADX", |r| &mut r.shape.wire_distance_x)
		.f32("RADY", |r| &mut r.shape.wire_distance_y)
		.field("TYPE", |r, rec| { r.shape.ramp_type = RampType::from_i32(rec.i32()?); Ok(()) })
		.field("ALGN", |r, rec| { r.shape.image_alignment = ImageAlignment::from_i32(rec.i32()?); Ok(()) })
		.string("MATR", |r| &mut r.material)
		.string("IMAG", |r| &mut r.image)
		.bool("IMGW", |r| &mut r.image_walls)
		.bool("RVIS", |r| &mut r.visible)
		.bool("CLDR", |r| &mut r.collidable)
		.f32("ELAS", |r| &mut r.elasticity)
		.f32("RFCT", |r| &mut r.friction)
		.f32("RSCT", |r| &mut r.scatter)
		.bool("TMON", |r| &mut r.timer_enabled)
		.i32("TMIN", |r| &mut r.timer_interval)
		.group("DPNT", drag_point_group::<Ramp>)
}

fn rubber_table() -> TagTable<Rubber> {
	TagTable::<Rubber>::new("rubber")
		.wide_string("NAME", |r| &mut r.name)
		.f32("HTTP", |r| &mut r.shape.height)
		.f32("HTHI", |r| &mut r.hit_height)
		.i32("WDTP", |r| &mut r.shape.thickness)
		.f32("ROTX", |r| &mut r.shape.rot_x)
		.f32("ROTY", |r| &mut r.shape.rot_y)
		.f32("ROTZ", |r| &mut r.shape.rot_z)
		.string("MATR", |r| &mut r.material)
		.bool("RVIS", |r| &mut r.visible)
		.bool("ESTR", |r| &mut r.static_rendering)
		.group("DPNT", drag_point_group::<Rubber>)
}

fn light_table() -> TagTable<Light> {
	TagTable::<Light>::new("light")
		.wide_string("NAME", |l| &mut l.name)
		.vertex2("VCEN", |l| &mut l.center)
		.f32("RADI", |l| &mut l.falloff)
		.f32("FAPO", |l| &mut l.falloff_power)
		.f32("STAT", |l| &mut l.state)
		.color("COLR", |l| &mut l.color)
		.color("COL2", |l| &mut l.color2)
		.string("SURF", |l| &mut l.surface)
		.bool("BULT", |l| &mut l.is_bulb)
		.group("DPNT", drag_point_group::<Light>)
}

fn bumper_table() -> TagTable<Bumper> {
	TagTable::<Bumper>::new("bumper")
		.wide_string("NAME", |b| &mut b.name)
		.vertex2("VCEN", |b| &mut b.center)
		.f32("RADI", |b| &mut b.radius)
		.string("MATR", |b| &mut b.cap_material)
		.string("BAMA", |b| &mut b.base_material)
		.string("SKMA", |b| &mut b.skirt_material)
		.string("RIMA", |b| &mut b.ring_material)
		.string("SURF", |b| &mut b.surface)
		.f32("HAHE", |b| &mut b.height_scale)
		.f32("ORIN", |b| &mut b.orientation)
		.f32("FORC", |b| &mut b.force)
		.f32("THRS", |b| &mut b.threshold)
		.bool("CAVI", |b| &mut b.cap_visible)
		.bool("BSVS", |b| &mut b.base_visible)
		.bool("RIVS", |b| &mut b.ring_visible)
		.bool("SKVS", |b| &mut b.skirt_visible)
}
