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

use std::io::{Error, Write};
use glam::Vec3;
use super::matrix::Matrix3D;

/// Position, normal and texture coordinate of one mesh vertex.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vertex {
	pub x: f32,
	pub y: f32,
	pub z: f32,
	pub nx: f32,
	pub ny: f32,
	pub nz: f32,
	pub tu: f32,
	pub tv: f32,
}

impl Vertex {
	pub fn new(position: Vec3, tu: f32, tv: f32) -> Vertex {
		Vertex { x: position.x, y: position.y, z: position.z, tu, tv, ..Vertex::default() }
	}

	pub fn position(&self) -> Vec3 {
		Vec3::new(self.x, self.y, self.z)
	}

	pub fn normal(&self) -> Vec3 {
		Vec3::new(self.nx, self.ny, self.nz)
	}

	fn set_position(&mut self, p: Vec3) {
		self.x = p.x;
		self.y = p.y;
		self.z = p.z;
	}

	fn set_normal(&mut self, n: Vec3) {
		self.nx = n.x;
		self.ny = n.y;
		self.nz = n.z;
	}
}

/// An indexed triangle list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
	pub vertices: Vec<Vertex>,
	pub indices: Vec<u32>,
}

impl Mesh {
	pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Mesh {
		Mesh { vertices, indices }
	}

	pub fn is_empty(&self) -> bool {
		self.indices.is_empty()
	}

	pub fn triangle_count(&self) -> usize {
		self.indices.len() / 3
	}

	/// Appends another mesh, shifting its indices past this mesh's vertices.
	pub fn append(&mut self, other: Mesh) {
		let offset = self.vertices.len() as u32;
		self.vertices.extend(other.vertices);
		self.indices.extend(other.indices.into_iter().map(|i| i + offset));
	}

	/// Recomputes smooth vertex normals from the triangles.
	pub fn compute_normals(&mut self) {
		compute_normals(&mut self.vertices, &self.indices);
	}

	/// Applies `matrix` to every position (with translation) and normal (without).
	pub fn transform(&mut self, matrix: &Matrix3D) {
		for vertex in &mut self.vertices {
			let position = matrix.transform_point(vertex.position());
			let normal = matrix.transform_vector(vertex.normal()).normalize_or_zero();
			vertex.set_position(position);
			vertex.set_normal(normal);
		}
	}

	/// Axis-aligned bounds of all vertex positions, or `None` for an empty mesh.
	pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
		let mut positions = self.vertices.iter().map(Vertex::position);
		let first = positions.next()?;
		Some(positions.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
	}

	/// Checks every index against the vertex count.
	pub fn validate(&self) -> Result<(), String> {
		if self.indices.len() % 3 != 0 {
			return Err(format!("{} indices do not form whole triangles", self.indices.len()));
		}
		match self.indices.iter().find(|&&i| i as usize >= self.vertices.len()) {
			Some(i) => Err(format!("index {} out of range for {} vertices", i, self.vertices.len())),
			None => Ok(()),
		}
	}
}

/// Zeroes all normals, accumulates unnormalized face normals onto the corners of
/// every triangle and renormalizes. Vertices no triangle touches keep a zero normal.
pub fn compute_normals(vertices: &mut [Vertex], indices: &[u32]) {
	for vertex in vertices.iter_mut() {
		vertex.set_normal(Vec3::ZERO);
	}

	for triangle in indices.chunks_exact(3) {
		let (a, b, c) = (triangle[0] as usize, triangle[1] as usize, triangle[2] as usize);
		if a >= vertices.len() || b >= vertices.len() || c >= vertices.len() {
			continue;
		}
		let pa = vertices[a].position();
		let e0 = vertices[b].position() - pa;
		let e1 = vertices[c].position() - pa;
		let face = e0.cross(e1);
		for &i in &[a, b, c] {
			let n = vertices[i].normal() + face;
			vertices[i].set_normal(n);
		}
	}

	for vertex in vertices.iter_mut() {
		let n = vertex.normal();
		let length_squared = n.length_squared();
		let n = if length_squared < f32::MIN_POSITIVE { Vec3::ZERO } else { n / length_squared.sqrt() };
		vertex.set_normal(n);
	}
}

/// Writes meshes as Wavefront OBJ objects into one output, keeping the
/// running vertex count so that face indices of later objects stay valid.
pub struct ObjWriter<W: Write> {
	out: W,
	vertex_offset: usize,
}

impl<W: Write> ObjWriter<W> {
	pub fn new(out: W) -> ObjWriter<W> {
		ObjWriter { out, vertex_offset: 0 }
	}

	pub fn write_mesh(&mut self, name: &str, mesh: &Mesh) -> Result<(), Error> {
		writeln!(self.out, "o {}", name)?;
		for v in &mesh.vertices {
			writeln!(self.out, "v {} {} {}", clean(v.x), clean(v.y), clean(-v.z))?;
		}
		for v in &mesh.vertices {
			writeln!(self.out, "vt {} {}", finite_or_zero(v.tu), finite_or_zero(1.0 - v.tv))?;
		}
		for v in &mesh.vertices {
			writeln!(self.out, "vn {} {} {}", finite_or_zero(v.nx), finite_or_zero(v.ny), finite_or_zero(-v.nz))?;
		}
		for triangle in mesh.indices.chunks_exact(3) {
			let a = triangle[2] as usize + 1 + self.vertex_offset;
			let b = triangle[1] as usize + 1 + self.vertex_offset;
			let c = triangle[0] as usize + 1 + self.vertex_offset;
			writeln!(self.out, "f {0}/{0}/{0} {1}/{1}/{1} {2}/{2}/{2}", a, b, c)?;
		}
		self.vertex_offset += mesh.vertices.len();
		Ok(())
	}

	pub fn vertex_offset(&self) -> usize {
		self.vertex_offset
	}

	pub fn into_inner(self) -> W {
		self.out
	}
}

/// Serializes a single mesh to OBJ text.
pub fn to_obj(name: &str, mesh: &Mesh) -> String {
	let mut writer = ObjWriter::new(Vec::new());
	// writing to a Vec cannot fail
	let _ = writer.write_mesh(name, mesh);
	String::from_utf8_lossy(&writer.into_inner()).into_owned()
}

// -0 prints as "-0"
fn clean(v: f32) -> f32 {
	v + 0.0
}

fn finite_or_zero(v: f32) -> f32 {
	if v.is_nan() { 0.0 } else { clean(v) }
}

#[cfg(test)]
mod tests {
	use super::*;

	fn quad() -> Mesh {
		let vertices = vec![
			Vertex::new(Vec3::new(0.0, 0.0, 0.0), 0.0, 0.0),
			Vertex::new(Vec3::new(1.0, 0.0, 0.0), 1.0, 0.0),
			Vertex::new(Vec3::new(1.0, 1.0, 0.0), 1.0, 1.0),
			Vertex::new(Vec3::new(0.0, 1.0, 0.0), 0.0, 1.0),
			// not referenced
			Vertex::new(Vec3::new(5.0, 5.0, 5.0), 0.0, 0.0),
		];
		Mesh::new(vertices, vec![0, 1, 2, 0, 2, 3])
	}

	#[test]
	fn normals_are_unit_or_zero() {
		let mut mesh = quad();
		mesh.compute_normals();
		for v in &mesh.vertices[..4] {
			assert!((v.normal().length() - 1.0).abs() < 1e-5);
			assert!((v.normal() - Vec3::Z).length() < 1e-5);
		}
		assert_eq!(mesh.vertices[4].normal(), Vec3::ZERO);
	}

	#[test]
	fn degenerate_triangle_leaves_zero_normal() {
		let p = Vec3::new(1.0, 1.0, 1.0);
		let mut mesh = Mesh::new(vec![Vertex::new(p, 0.0, 0.0); 3], vec![0, 1, 2]);
		mesh.compute_normals();
		assert!(mesh.vertices.iter().all(|v| v.normal() == Vec3::ZERO));
	}

	#[test]
	fn obj_layout() {
		let mut mesh = Mesh::new(vec![
			Vertex::new(Vec3::new(0.0, 0.0, 2.0), 0.25, 0.0),
			Vertex::new(Vec3::new(1.0, 0.0, 2.0), f32::NAN, 1.0),
			Vertex::new(Vec3::new(0.0, 1.0, 2.0), 0.0, 0.5),
		], vec![0, 1, 2]);
		mesh.compute_normals();
		let text = to_obj("Ramp1", &mesh);
		let lines: Vec<&str> = text.lines().collect();
		assert_eq!(lines, vec![
			"o Ramp1",
			"v 0 0 -2",
			"v 1 0 -2",
			"v 0 1 -2",
			"vt 0.25 1",
			"vt 0 0",
			"vt 0 0.5",
			"vn 0 0 -1",
			"vn 0 0 -1",
			"vn 0 0 -1",
			"f 3/3/3 2/2/2 1/1/1",
		]);
	}

	#[test]
	fn writer_offsets_following_objects() {
		let mut writer = ObjWriter::new(Vec::new());
		writer.write_mesh("a", &quad()).unwrap();
		writer.write_mesh("b", &quad()).unwrap();
		assert_eq!(writer.vertex_offset(), 10);
		let text = String::from_utf8(writer.into_inner()).unwrap();
		assert!(text.contains("o b\n"));
		assert!(text.contains("f 8/8/8 7/7/7 6/6/6"));
	}

	#[test]
	fn append_transform_and_validate() {
		let mut mesh = quad();
		mesh.append(quad());
		assert_eq!(mesh.vertices.len(), 10);
		assert_eq!(&mesh.indices[6..], &[5, 6, 7, 5, 7, 8]);
		assert!(mesh.validate().is_ok());

		mesh.transform(&Matrix3D::translation(0.0, 0.0, 10.0));
		let (min, max) = mesh.bounds().unwrap();
		assert_eq!(min.z, 10.0);
		assert_eq!(max.z, 15.0);

		mesh.indices.push(99);
		assert!(mesh.validate().is_err());
	}
}
