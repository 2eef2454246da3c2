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

use glam::Vec3;
use log::trace;
use super::catmull::{CatmullCurve, CurvePoint};

/// Subdivision stops at this depth even when a segment is not yet flat.
const MAX_SUBDIVISION_DEPTH: u32 = 16;

/// A user-placed control vertex of a ramp, rubber, surface or light outline.
#[derive(Clone, Debug, PartialEq)]
pub struct DragPoint {
	pub position: Vec3,
	pub smooth: bool,
	pub slingshot: bool,
	pub auto_texture: bool,
	pub texture_coord: f32,
	pub locked: bool,
	pub layer: i32,
}

impl Default for DragPoint {
	fn default() -> DragPoint {
		DragPoint {
			position: Vec3::ZERO,
			smooth: false,
			slingshot: false,
			auto_texture: true,
			texture_coord: 0.0,
			locked: false,
			layer: 0,
		}
	}
}

/// One vertex of a tessellated curve.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderVertex<V> {
	pub point: V,
	pub smooth: bool,
	pub slingshot: bool,
	/// Set when the vertex is one of the original drag points.
	pub control_point: bool,
}

impl<V: CurvePoint> RenderVertex<V> {
	fn from_drag_point(dp: &DragPoint) -> RenderVertex<V> {
		RenderVertex {
			point: V::from_vec3(dp.position),
			smooth: dp.smooth,
			slingshot: dp.slingshot,
			control_point: true,
		}
	}
}

/// Flatness threshold for a detail level between 0 (coarse) and 10 (fine).
pub fn accuracy_for_detail(detail_level: f32) -> f32 {
	4.0 * 10f32.powf((10.0 - detail_level) / 1.5)
}

/// Turns drag points into a polyline. Each span between two drag points is a Catmull-Rom
/// segment split in half until every piece is flat within `accuracy`.
/// Closed curves wrap around; open curves clamp at their ends and also emit the last drag point.
pub fn tessellate<V: CurvePoint>(points: &[DragPoint], closed: bool, accuracy: f32) -> Vec<RenderVertex<V>> {
	let count = points.len();
	let mut vertices = Vec::new();
	if count == 0 {
		return vertices;
	}

	let end = if closed { count } else { count - 1 };
	for i in 0..end {
		let p1 = &points[i];
		let p2 = &points[if i + 1 < count { i + 1 } else { 0 }];
		if p1.position == p2.position {
			continue;
		}

		let mut prev = if p1.smooth { i as isize - 1 } else { i as isize };
		if prev < 0 {
			prev = if closed { count as isize - 1 } else { 0 };
		}
		let mut next = if p2.smooth { i + 2 } else { i + 1 };
		if next >= count {
			next = if closed { next - count } else { count - 1 };
		}

		let curve = CatmullCurve::new(
			V::from_vec3(points[prev as usize].position),
			V::from_vec3(p1.position),
			V::from_vec3(p2.position),
			V::from_vec3(points[next].position),
		);
		let v1 = RenderVertex::from_drag_point(p1);
		let v2 = RenderVertex::from_drag_point(p2);
		subdivide(&curve, 0.0, 1.0, v1, v2, accuracy, 0, &mut vertices);
	}

	if !closed {
		vertices.push(RenderVertex::from_drag_point(&points[count - 1]));
	}
	trace!("[tessellate] {} drag points, closed={}: {} vertices.", count, closed, vertices.len());
	vertices
}

#[allow(clippy::too_many_arguments)]
fn subdivide<V: CurvePoint>(curve: &CatmullCurve<V>, t1: f32, t2: f32, v1: RenderVertex<V>, v2: RenderVertex<V>,
	accuracy: f32, depth: u32, out: &mut Vec<RenderVertex<V>>)
{
	let t_mid = (t1 + t2) * 0.5;
	let mid = RenderVertex {
		point: curve.evaluate(t_mid),
		smooth: true,
		slingshot: false,
		control_point: false,
	};

	if depth >= MAX_SUBDIVISION_DEPTH || V::is_flat(v1.point, v2.point, mid.point, accuracy) {
		out.push(v1);
	}
	else {
		subdivide(curve, t1, t_mid, v1, mid, accuracy, depth + 1, out);
		subdivide(curve, t_mid, t2, mid, v2, accuracy, depth + 1, out);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use glam::Vec2;

	fn point(x: f32, y: f32, smooth: bool) -> DragPoint {
		DragPoint { position: Vec3::new(x, y, 0.0), smooth, ..DragPoint::default() }
	}

	#[test]
	fn accuracy_shrinks_with_detail() {
		assert_eq!(accuracy_for_detail(10.0), 4.0);
		assert!(accuracy_for_detail(0.0) > accuracy_for_detail(5.0));
	}

	#[test]
	fn sharp_open_polyline_keeps_only_drag_points() {
		let points = [point(0.0, 0.0, false), point(100.0, 0.0, false), point(100.0, 100.0, false)];
		let vertices = tessellate::<Vec2>(&points, false, accuracy_for_detail(10.0));
		let positions: Vec<Vec2> = vertices.iter().map(|v| v.point).collect();
		assert_eq!(positions, vec![Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), Vec2::new(100.0, 100.0)]);
		assert!(vertices.iter().all(|v| v.control_point));
	}

	#[test]
	fn smooth_closed_loop_is_subdivided() {
		let points = [
			point(0.0, 0.0, true),
			point(100.0, 0.0, true),
			point(100.0, 100.0, true),
			point(0.0, 100.0, true),
		];
		let vertices = tessellate::<Vec2>(&points, true, accuracy_for_detail(10.0));
		assert!(vertices.len() > points.len());
		assert_eq!(vertices.iter().filter(|v| v.control_point).count(), 4);
		assert_eq!(vertices[0].point, Vec2::new(0.0, 0.0));

		let coarse = tessellate::<Vec2>(&points, true, accuracy_for_detail(0.0));
		assert!(coarse.len() < vertices.len());
	}

	#[test]
	fn coincident_drag_points_are_skipped() {
		let points = [point(0.0, 0.0, false), point(0.0, 0.0, false), point(50.0, 0.0, false)];
		let vertices = tessellate::<Vec2>(&points, false, 4.0);
		assert_eq!(vertices.len(), 2);
	}

	#[test]
	fn degenerate_inputs() {
		assert!(tessellate::<Vec3>(&[], false, 4.0).is_empty());
		assert_eq!(tessellate::<Vec3>(&[point(1.0, 2.0, false)], false, 4.0).len(), 1);
		assert!(tessellate::<Vec3>(&[point(1.0, 2.0, false)], true, 4.0).is_empty());
	}

	#[test]
	fn non_finite_points_terminate() {
		let points = [point(0.0, 0.0, true), point(f32::NAN, 1.0, true), point(5.0, 5.0, true)];
		let vertices = tessellate::<Vec2>(&points, false, 4.0);
		assert!(!vertices.is_empty());
	}
}
