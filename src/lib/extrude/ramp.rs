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
use crate::geometry::{DragPoint, Mesh, Vertex};
use super::stations::{ramp_stations, Station};
use super::tube::sweep_tube;
use super::{ImageAlignment, RampShape, RampType, SceneParams};

/// Builds the mesh of a ramp: a floor with walls, or a set of wires for habitrails.
pub fn ramp_mesh(points: &[DragPoint], shape: &RampShape, params: &SceneParams) -> Mesh {
	let stations = ramp_stations(points, shape, params);
	debug!("[ramp_mesh] {:?} ramp with {} drag points, {} stations.", shape.ramp_type, points.len(), stations.len());
	if shape.ramp_type.is_habitrail() {
		wire_ramp_mesh(&stations, shape, params)
	}
	else {
		flat_ramp_mesh(&stations, shape, params)
	}
}

/// Floor strip plus left and right walls of visible height.
pub fn flat_ramp_mesh(stations: &[Station], shape: &RampShape, params: &SceneParams) -> Mesh {
	if stations.len() < 2 {
		return Mesh::default();
	}

	let inv_width = 1.0 / params.table_width;
	let inv_length = 1.0 / params.table_length;
	let world_uv = |p: Vec2| (p.x * inv_width, p.y * inv_length);

	let mut floor_vertices = Vec::with_capacity(stations.len() * 2);
	for station in stations {
		let z = station.height * params.scale_z;
		let (left_uv, right_uv) = match shape.image_alignment {
			ImageAlignment::World => (world_uv(station.left), world_uv(station.right)),
			ImageAlignment::Wrap => ((1.0, station.ratio), (0.0, station.ratio)),
		};
		floor_vertices.push(Vertex::new(station.left.extend(z), left_uv.0, left_uv.1));
		floor_vertices.push(Vertex::new(station.right.extend(z), right_uv.0, right_uv.1));
	}
	let mut mesh = Mesh::new(floor_vertices, strip_indices(stations.len()));

	if shape.left_wall_height_visible != 0.0 {
		mesh.append(wall(stations, |s| s.left, shape.left_wall_height_visible, shape.image_alignment, params));
	}
	if shape.right_wall_height_visible != 0.0 {
		mesh.append(wall(stations, |s| s.right, shape.right_wall_height_visible, shape.image_alignment, params));
	}

	mesh.compute_normals();
	mesh
}

/// Vertical strip along one rail, from the floor up by `wall_height`.
fn wall<F>(stations: &[Station], rail: F, wall_height: f32, alignment: ImageAlignment, params: &SceneParams) -> Mesh
	where F: Fn(&Station) -> Vec2
{
	let mut vertices = Vec::with_capacity(stations.len() * 2);
	for station in stations {
		let p = rail(station);
		let (tu_base, tu_top, tv) = match alignment {
			ImageAlignment::World => (p.x / params.table_width, p.x / params.table_width, p.y / params.table_length),
			ImageAlignment::Wrap => (0.0, 1.0, station.ratio),
		};
		vertices.push(Vertex::new(p.extend(station.height * params.scale_z), tu_base, tv));
		vertices.push(Vertex::new(p.extend((station.height + wall_height) * params.scale_z), tu_top, tv));
	}
	Mesh::new(vertices, strip_indices(stations.len()))
}

/// Two triangles per pair of consecutive stations, vertices interleaved as `2i`, `2i+1`.
fn strip_indices(stations: usize) -> Vec<u32> {
	let mut indices = Vec::with_capacity((stations - 1) * 6);
	for i in 0..(stations - 1) as u32 {
		indices.extend_from_slice(&[2 * i, 2 * i + 1, 2 * i + 3, 2 * i, 2 * i + 3, 2 * i + 2]);
	}
	indices
}

/// One to four wire tubes following the rails of a habitrail.
pub fn wire_ramp_mesh(stations: &[Station], shape: &RampShape, params: &SceneParams) -> Mesh {
	let segments = params.tube_segments();
	let heights: Vec<f32> = stations.iter().map(|s| s.height).collect();
	let raised: Vec<f32> = heights.iter().map(|h| h + shape.wire_distance_y * 0.5).collect();
	let left: Vec<Vec2> = stations.iter().map(|s| s.left).collect();
	let right: Vec<Vec2> = stations.iter().map(|s| s.right).collect();
	let tube = |centers: &[Vec2], heights: &[f32]| sweep_tube(centers, heights, shape.wire_diameter, segments, false);

	let mut mesh = Mesh::default();
	match shape.ramp_type {
		RampType::OneWire => {
			let centers: Vec<Vec2> = stations.iter().map(|s| s.center).collect();
			mesh.append(tube(&centers, &heights));
		},
		RampType::TwoWire => {
			mesh.append(tube(&left, &heights));
			mesh.append(tube(&right, &heights));
		},
		RampType::ThreeWireLeft => {
			mesh.append(tube(&left, &heights));
			mesh.append(tube(&right, &heights));
			mesh.append(tube(&left, &raised));
		},
		RampType::ThreeWireRight => {
			mesh.append(tube(&left, &heights));
			mesh.append(tube(&right, &heights));
			mesh.append(tube(&right, &raised));
		},
		RampType::FourWire => {
			mesh.append(tube(&left, &heights));
			mesh.append(tube(&right, &heights));
			mesh.append(tube(&left, &raised));
			mesh.append(tube(&right, &raised));
		},
		RampType::Flat => {},
	}

	for vertex in &mut mesh.vertices {
		vertex.z *= params.scale_z;
	}
	mesh
}
