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

//! Meshes swept along tessellated drag point curves: ramps (flat and wire), rubbers and walls.

mod ramp;
mod rubber;
mod stations;
mod surface;
mod tube;

pub use self::ramp::{flat_ramp_mesh, ramp_mesh, wire_ramp_mesh};
pub use self::rubber::rubber_mesh;
pub use self::stations::{ramp_stations, Station};
pub use self::surface::{surface_mesh, triangulate};
pub use self::tube::sweep_tube;

use crate::geometry::accuracy_for_detail;

/// Table-wide values every generated mesh depends on.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SceneParams {
	/// 0 (coarse) to 10 (fine).
	pub detail_level: f32,
	/// Factor applied to every generated Z coordinate.
	pub scale_z: f32,
	/// Playfield height added to item heights.
	pub table_height: f32,
	/// Playfield extent along X, for world-projected texture coordinates.
	pub table_width: f32,
	/// Playfield extent along Y, for world-projected texture coordinates.
	pub table_length: f32,
}

impl Default for SceneParams {
	fn default() -> SceneParams {
		SceneParams { detail_level: 10.0, scale_z: 1.0, table_height: 0.0, table_width: 1000.0, table_length: 2000.0 }
	}
}

impl SceneParams {
	pub fn accuracy(&self) -> f32 {
		accuracy_for_detail(self.detail_level)
	}

	/// Radial divisions of a wire or rubber tube.
	pub fn tube_segments(&self) -> usize {
		if self.detail_level < 5.0 {
			6
		}
		else if self.detail_level < 8.0 {
			8
		}
		else {
			(self.detail_level * 1.3) as usize
		}
	}
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RampType {
	Flat,
	FourWire,
	TwoWire,
	ThreeWireLeft,
	ThreeWireRight,
	OneWire,
}

impl RampType {
	pub fn from_i32(value: i32) -> RampType {
		match value {
			1 => RampType::FourWire,
			2 => RampType::TwoWire,
			3 => RampType::ThreeWireLeft,
			4 => RampType::ThreeWireRight,
			5 => RampType::OneWire,
			_ => RampType::Flat,
		}
	}

	pub fn is_habitrail(self) -> bool {
		self != RampType::Flat
	}
}

impl Default for RampType {
	fn default() -> RampType {
		RampType::Flat
	}
}

/// How the floor texture of a flat ramp is mapped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImageAlignment {
	World,
	Wrap,
}

impl ImageAlignment {
	pub fn from_i32(value: i32) -> ImageAlignment {
		if value == 0 { ImageAlignment::World } else { ImageAlignment::Wrap }
	}
}

impl Default for ImageAlignment {
	fn default() -> ImageAlignment {
		ImageAlignment::World
	}
}

/// Cross-section profile of a ramp.
#[derive(Clone, Debug, PartialEq)]
pub struct RampShape {
	pub height_bottom: f32,
	pub height_top: f32,
	pub width_bottom: f32,
	pub width_top: f32,
	pub left_wall_height_visible: f32,
	pub right_wall_height_visible: f32,
	pub ramp_type: RampType,
	pub image_alignment: ImageAlignment,
	pub wire_diameter: f32,
	pub wire_distance_x: f32,
	pub wire_distance_y: f32,
}

impl Default for RampShape {
	fn default() -> RampShape {
		RampShape {
			height_bottom: 0.0,
			height_top: 50.0,
			width_bottom: 75.0,
			width_top: 60.0,
			left_wall_height_visible: 30.0,
			right_wall_height_visible: 30.0,
			ramp_type: RampType::Flat,
			image_alignment: ImageAlignment::World,
			wire_diameter: 8.0,
			wire_distance_x: 38.0,
			wire_distance_y: 88.0,
		}
	}
}

/// Placement of a rubber ring.
#[derive(Clone, Debug, PartialEq)]
pub struct RubberShape {
	pub height: f32,
	pub thickness: i32,
	pub rot_x: f32,
	pub rot_y: f32,
	pub rot_z: f32,
}

impl Default for RubberShape {
	fn default() -> RubberShape {
		RubberShape { height: 25.0, thickness: 8, rot_x: 0.0, rot_y: 0.0, rot_z: 0.0 }
	}
}

/// Vertical extent of a wall.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceShape {
	pub height_bottom: f32,
	pub height_top: f32,
}

impl Default for SurfaceShape {
	fn default() -> SurfaceShape {
		SurfaceShape { height_bottom: 0.0, height_top: 50.0 }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tube_segments_follow_detail() {
		let mut params = SceneParams::default();
		params.detail_level = 2.0;
		assert_eq!(params.tube_segments(), 6);
		params.detail_level = 7.0;
		assert_eq!(params.tube_segments(), 8);
		params.detail_level = 9.0;
		assert_eq!(params.tube_segments(), 11);
	}

	#[test]
	fn ramp_type_codes() {
		assert_eq!(RampType::from_i32(0), RampType::Flat);
		assert_eq!(RampType::from_i32(5), RampType::OneWire);
		assert_eq!(RampType::from_i32(42), RampType::Flat);
		assert!(RampType::TwoWire.is_habitrail());
		assert_eq!(ImageAlignment::from_i32(1), ImageAlignment::Wrap);
	}
}
