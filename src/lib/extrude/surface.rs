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
use log::{debug, warn};
use crate::geometry::{tessellate, DragPoint, Mesh, Vertex};
use super::{SceneParams, SurfaceShape};

/// Side walls along the closed outline, and a flat top.
pub fn surface_mesh(points: &[DragPoint], shape: &SurfaceShape, params: &SceneParams) -> Mesh {
	let outline: Vec<Vec2> = tessellate::<Vec2>(points, true, params.accuracy()).iter().map(|v| v.point).collect();
	let count = outline.len();
	if count < 3 {
		warn!("[surface_mesh] Outline of {} drag points collapses to {} vertices, skipping.", points.len(), count);
		return Mesh::default();
	}

	let bottom = (shape.height_bottom + params.table_height) * params.scale_z;
	let top = (shape.height_top + params.table_height) * params.scale_z;
	let ccw = signed_area(&outline) >= 0.0;

	let perimeter: f32 = (0..count).map(|i| (outline[(i + 1) % count] - outline[i]).length()).sum();
	let inv_perimeter = if perimeter > 0.0 { 1.0 / perimeter } else { 0.0 };

	let mut walls = Mesh::default();
	let mut walked = 0.0;
	for i in 0..count {
		let a = outline[i];
		let b = outline[(i + 1) % count];
		let tu_a = walked * inv_perimeter;
		walked += (b - a).length();
		let tu_b = walked * inv_perimeter;

		let base = walls.vertices.len() as u32;
		walls.vertices.push(Vertex::new(a.extend(bottom), tu_a, 1.0));
		walls.vertices.push(Vertex::new(a.extend(top), tu_a, 0.0));
		walls.vertices.push(Vertex::new(b.extend(top), tu_b, 0.0));
		walls.vertices.push(Vertex::new(b.extend(bottom), tu_b, 1.0));
		// faces point away from the enclosed area
		if ccw {
			walls.indices.extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
		}
		else {
			walls.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
		}
	}

	let top_vertices = outline.iter()
		.map(|p| Vertex::new(p.extend(top), p.x / params.table_width, p.y / params.table_length))
		.collect();
	let mut top_indices = triangulate(&outline);
	if !ccw {
		for triangle in top_indices.chunks_exact_mut(3) {
			triangle.swap(1, 2);
		}
	}

	let mut mesh = walls;
	mesh.append(Mesh::new(top_vertices, top_indices));
	mesh.compute_normals();
	debug!("[surface_mesh] {} outline vertices, {} triangles.", count, mesh.triangle_count());
	mesh
}

/// Ear-clipping triangulation of a simple polygon. Triangles keep the polygon's winding.
pub fn triangulate(polygon: &[Vec2]) -> Vec<u32> {
	if polygon.len() < 3 {
		return Vec::new();
	}

	let ccw = signed_area(polygon) >= 0.0;
	let mut remaining: Vec<usize> = (0..polygon.len()).collect();
	let mut indices = Vec::with_capacity((polygon.len() - 2) * 3);
	while remaining.len() > 3 {
		let count = remaining.len();
		// a self-intersecting outline can run out of ears
		let ear = (0..count).find(|&k| is_ear(polygon, &remaining, k, ccw)).unwrap_or(0);
		let prev = remaining[(ear + count - 1) % count];
		let next = remaining[(ear + 1) % count];
		indices.extend_from_slice(&[prev as u32, remaining[ear] as u32, next as u32]);
		remaining.remove(ear);
	}
	indices.extend(remaining.iter().map(|&i| i as u32));
	indices
}

fn is_ear(polygon: &[Vec2], remaining: &[usize], k: usize, ccw: bool) -> bool {
	let count = remaining.len();
	let ia = remaining[(k + count - 1) % count];
	let ib = remaining[k];
	let ic = remaining[(k + 1) % count];
	let (a, b, c) = (polygon[ia], polygon[ib], polygon[ic]);

	let turn = (b - a).perp_dot(c - a);
	if (ccw && turn <= 0.0) || (!ccw && turn >= 0.0) {
		return false;
	}

	!remaining.iter()
		.filter(|&&i| i != ia && i != ib && i != ic)
		.any(|&i| inside_triangle(polygon[i], a, b, c, ccw))
}

/// Points on an edge count as inside: a reflex vertex on the diagonal blocks the ear.
fn inside_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2, ccw: bool) -> bool {
	let d1 = (b - a).perp_dot(p - a);
	let d2 = (c - b).perp_dot(p - b);
	let d3 = (a - c).perp_dot(p - c);
	if ccw {
		d1 >= 0.0 && d2 >= 0.0 && d3 >= 0.0
	}
	else {
		d1 <= 0.0 && d2 <= 0.0 && d3 <= 0.0
	}
}

fn signed_area(polygon: &[Vec2]) -> f32 {
	let count = polygon.len();
	(0..count).map(|i| polygon[i].perp_dot(polygon[(i + 1) % count])).sum::<f32>() * 0.5
}
