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
use log::trace;
use crate::geometry::{Matrix3D, Mesh, Vertex};

/// Sweeps a circle of `diameter` along the centerline `centers`/`heights`.
///
/// The cross-section is oriented by a parallel transport frame: each ring's normal is
/// the previous binormal crossed with the local tangent, so the tube does not twist.
/// Closed tubes connect the last ring back to the first one.
pub fn sweep_tube(centers: &[Vec2], heights: &[f32], diameter: f32, segments: usize, closed: bool) -> Mesh {
	let rings = centers.len().min(heights.len());
	if rings < 2 || segments < 3 {
		return Mesh::default();
	}

	let mut vertices = Vec::with_capacity(rings * segments);
	let mut prev_binormal = Vec3::ZERO;
	for i in 0..rings {
		let last = i == rings - 1;
		let i2 = if !last { i + 1 } else if closed { 0 } else { i };
		let here = centers[i].extend(heights[i]);

		let tangent = if last && !closed {
			here - centers[i - 1].extend(heights[i - 1])
		}
		else {
			centers[i2].extend(heights[i2]) - here
		};

		let (normal, binormal) = if i == 0 {
			let up_z = if closed { heights[i2] + heights[i] } else { heights[i2] - heights[i] };
			let up = (centers[i2] + centers[i]).extend(up_z);
			let normal = bootstrap_normal(tangent, up);
			(normal, tangent.cross(normal))
		}
		else {
			let normal = prev_binormal.cross(tangent);
			(normal, tangent.cross(normal))
		};
		let normal = normal.normalize_or_zero();
		prev_binormal = binormal.normalize_or_zero();

		let u = i as f32 / rings as f32;
		for j in 0..segments {
			let v = (j as f32 + u) / segments as f32;
			let rotation = Matrix3D::rotate_around_axis(tangent, j as f32 * 360.0 / segments as f32);
			let radial = rotation.transform_vector(normal).normalize_or_zero();
			let mut vertex = Vertex::new(here + radial * (diameter * 0.5), u, v);
			vertex.nx = radial.x;
			vertex.ny = radial.y;
			vertex.nz = radial.z;
			vertices.push(vertex);
		}
	}

	let connected = if closed { rings } else { rings - 1 };
	let mut indices = Vec::with_capacity(connected * segments * 6);
	for i in 0..connected {
		let ring = (i * segments) as u32;
		let next_ring = (((i + 1) % rings) * segments) as u32;
		for j in 0..segments {
			let j_next = ((j + 1) % segments) as u32;
			let j = j as u32;
			let q0 = ring + j;
			let q1 = ring + j_next;
			let q2 = next_ring + j;
			let q3 = next_ring + j_next;
			indices.extend_from_slice(&[q0, q1, q2, q3, q2, q1]);
		}
	}

	trace!("[sweep_tube] {} rings x {} segments, closed={}.", rings, segments, closed);
	Mesh::new(vertices, indices)
}

fn bootstrap_normal(tangent: Vec3, up: Vec3) -> Vec3 {
	let normal = tangent.cross(up);
	if normal.length_squared() > 1e-12 {
		return normal;
	}
	let normal = tangent.cross(Vec3::Z);
	if normal.length_squared() > 1e-12 {
		return normal;
	}
	tangent.cross(Vec3::X)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn straight_line() -> (Vec<Vec2>, Vec<f32>) {
		let centers = (0..5).map(|i| Vec2::new(100.0, 50.0 * i as f32)).collect();
		(centers, vec![20.0; 5])
	}

	#[test]
	fn open_tube_counts() {
		let (centers, heights) = straight_line();
		let mesh = sweep_tube(&centers, &heights, 8.0, 8, false);
		assert_eq!(mesh.vertices.len(), 5 * 8);
		assert_eq!(mesh.indices.len(), 4 * 8 * 6);
		assert!(mesh.validate().is_ok());
	}

	#[test]
	fn closed_tube_wraps_last_ring() {
		let centers = vec![Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), Vec2::new(100.0, 100.0), Vec2::new(0.0, 100.0)];
		let heights = vec![25.0; 4];
		let mesh = sweep_tube(&centers, &heights, 8.0, 6, true);
		assert_eq!(mesh.vertices.len(), 24);
		assert_eq!(mesh.indices.len(), 4 * 6 * 6);
		// last ring connects to ring 0
		assert!(mesh.indices[(3 * 6) * 6..].iter().any(|&i| i < 6));
		assert!(mesh.validate().is_ok());
	}

	#[test]
	fn ring_vertices_lie_on_circle() {
		let (centers, heights) = straight_line();
		let mesh = sweep_tube(&centers, &heights, 8.0, 8, false);
		for (k, vertex) in mesh.vertices.iter().enumerate() {
			let ring = k / 8;
			let center = centers[ring].extend(heights[ring]);
			assert!(((vertex.position() - center).length() - 4.0).abs() < 1e-3);
			assert!((vertex.normal().length() - 1.0).abs() < 1e-4);
		}
	}

	#[test]
	fn too_few_rings_give_empty_mesh() {
		assert!(sweep_tube(&[Vec2::ZERO], &[0.0], 8.0, 8, false).is_empty());
	}
}
