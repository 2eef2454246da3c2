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

use glam::Vec2;
use log::debug;
use crate::geometry::{tessellate, DragPoint, Matrix3D, Mesh};
use super::tube::sweep_tube;
use super::{RubberShape, SceneParams};

/// A closed tube along the rubber outline, rotated about the center of its bounds.
pub fn rubber_mesh(points: &[DragPoint], shape: &RubberShape, params: &SceneParams) -> Mesh {
	let curve = tessellate::<Vec2>(points, true, params.accuracy());
	let centers: Vec<Vec2> = curve.iter().map(|v| v.point).collect();
	let heights = vec![shape.height + params.table_height; centers.len()];
	let mut mesh = sweep_tube(&centers, &heights, shape.thickness as f32, params.tube_segments(), true);
	debug!("[rubber_mesh] {} drag points, {} rings, {} vertices.", points.len(), centers.len(), mesh.vertices.len());

	if let Some((min, max)) = mesh.bounds() {
		let middle = (min + max) * 0.5;
		let rotation = Matrix3D::multiply(&Matrix3D::rotate_y(shape.rot_y.to_radians()), &Matrix3D::rotate_z(shape.rot_z.to_radians()));
		let rotation = Matrix3D::multiply(&Matrix3D::rotate_x(shape.rot_x.to_radians()), &rotation);
		let about_middle = Matrix3D::multiply(&rotation, &Matrix3D::translation(-middle.x, -middle.y, -middle.z));
		let about_middle = Matrix3D::multiply(&Matrix3D::translation(middle.x, middle.y, middle.z), &about_middle);
		mesh.transform(&about_middle);
	}

	for vertex in &mut mesh.vertices {
		vertex.z *= params.scale_z;
	}
	mesh
}

#[cfg(test)]
mod tests {
	use super::*;
	use glam::Vec3;

	fn ring() -> Vec<DragPoint> {
		[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)].iter()
			.map(|&(x, y)| DragPoint { position: Vec3::new(x, y, 0.0), smooth: true, ..DragPoint::default() })
			.collect()
	}

	#[test]
	fn rubber_is_closed_tube_at_height() {
		let params = SceneParams { table_height: 5.0, ..SceneParams::default() };
		let shape = RubberShape { height: 20.0, thickness: 10, ..RubberShape::default() };
		let mesh = rubber_mesh(&ring(), &shape, &params);
		assert!(!mesh.is_empty());
		assert!(mesh.validate().is_ok());
		let (min, max) = mesh.bounds().unwrap();
		assert!(min.z > 19.9 && min.z < 20.1, "min z {}", min.z);
		assert!(max.z > 29.9 && max.z < 30.1, "max z {}", max.z);

		// every ring lies on the circle around its tessellated center
		let centers = tessellate::<Vec2>(&ring(), true, params.accuracy());
		let segments = params.tube_segments();
		assert_eq!(mesh.vertices.len(), centers.len() * segments);
		for (k, vertex) in mesh.vertices.iter().enumerate() {
			let center = centers[k / segments].point.extend(25.0);
			assert!(((vertex.position() - center).length() - 5.0).abs() < 1e-2);
		}
		// closed: every ring contributes a full band of quads
		assert_eq!(mesh.indices.len(), mesh.vertices.len() * 6);
	}

	#[test]
	fn rotation_keeps_center() {
		let unrotated = rubber_mesh(&ring(), &RubberShape::default(), &SceneParams::default());
		let shape = RubberShape { rot_x: 90.0, ..RubberShape::default() };
		let rotated = rubber_mesh(&ring(), &shape, &SceneParams::default());
		let (a_min, a_max) = unrotated.bounds().unwrap();
		let (b_min, b_max) = rotated.bounds().unwrap();
		assert!(((a_min + a_max) * 0.5 - (b_min + b_max) * 0.5).length() < 1e-2);
		// the ring now stands upright
		assert!((b_max.z - b_min.z) > (a_max.z - a_min.z) * 5.0);
	}
}
