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

use glam::{Vec2, Vec3};
use crate::geometry::{tessellate, DragPoint, RenderVertex};
use super::{RampShape, RampType, SceneParams};

/// Cross-section of a ramp at one tessellated vertex.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Station {
	pub center: Vec2,
	/// Offset direction from the centerline to the left rail.
	pub normal: Vec2,
	pub height: f32,
	pub width: f32,
	/// 1 at the start of the ramp, 0 at its end.
	pub ratio: f32,
	pub left: Vec2,
	pub right: Vec2,
	pub control_point: bool,
}

/// Tessellates the ramp centerline and computes its profile along it.
pub fn ramp_stations(points: &[DragPoint], shape: &RampShape, params: &SceneParams) -> Vec<Station> {
	let curve = tessellate::<Vec3>(points, false, params.accuracy());
	stations_along(&curve, shape, params.table_height)
}

pub(super) fn stations_along(curve: &[RenderVertex<Vec3>], shape: &RampShape, table_height: f32) -> Vec<Station> {
	let count = curve.len();
	let total_length: f32 = curve.windows(2)
		.map(|w| (w[1].point.truncate() - w[0].point.truncate()).length())
		.sum();
	let bottom = shape.height_bottom + table_height;
	let top = shape.height_top + table_height;

	let mut stations = Vec::with_capacity(count);
	let mut current_length = 0.0;
	for i in 0..count {
		let prev = curve[if i > 0 { i - 1 } else { i }].point.truncate();
		let next = curve[if i + 1 < count { i + 1 } else { i }].point.truncate();
		let middle = curve[i].point.truncate();

		let normal = if count < 2 {
			Vec2::ZERO
		}
		else if i == count - 1 {
			Vec2::new(prev.y - middle.y, middle.x - prev.x).normalize_or_zero()
		}
		else if i == 0 {
			Vec2::new(middle.y - next.y, next.x - middle.x).normalize_or_zero()
		}
		else {
			mitre_normal(prev, middle, next)
		};

		current_length += (middle - prev).length();
		let percentage = if total_length > 0.0 { current_length / total_length } else { 0.0 };

		let width = match shape.ramp_type {
			RampType::Flat => percentage * (shape.width_top - shape.width_bottom) + shape.width_bottom,
			RampType::OneWire => shape.wire_diameter,
			_ => shape.wire_distance_x,
		};

		stations.push(Station {
			center: middle,
			normal,
			height: curve[i].point.z + percentage * (top - bottom) + bottom,
			width,
			ratio: 1.0 - percentage,
			left: middle + normal * (width * 0.5),
			right: middle - normal * (width * 0.5),
			control_point: curve[i].control_point,
		});
	}
	stations
}

/// Offset direction at an interior vertex: the edge normal when both edges run parallel,
/// else the direction towards the intersection of both edges shifted out along their normals.
fn mitre_normal(prev: Vec2, middle: Vec2, next: Vec2) -> Vec2 {
	let n1 = Vec2::new(prev.y - middle.y, middle.x - prev.x).normalize_or_zero();
	let n2 = Vec2::new(middle.y - next.y, next.x - middle.x).normalize_or_zero();
	if (n1.x - n2.x).abs() < 1e-4 && (n1.y - n2.y).abs() < 1e-4 {
		return n1;
	}

	// first edge, shifted
	let a = prev.y - middle.y;
	let b = middle.x - prev.x;
	let c = a * (n1.x - prev.x) + b * (n1.y - prev.y);
	// second edge, shifted
	let d = next.y - middle.y;
	let e = middle.x - next.x;
	let f = d * (n2.x - next.x) + e * (n2.y - next.y);

	let det = a * e - b * d;
	let inv_det = if det != 0.0 { 1.0 / det } else { 0.0 };
	let intersection = Vec2::new((b * f - e * c) * inv_det, (c * d - a * f) * inv_det);
	middle - intersection
}
