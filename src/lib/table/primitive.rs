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

//! Primitives: items that carry their own triangle mesh.

use glam::Vec3;
use log::debug;
use crate::biff::decode::{decompress, read_f32_array, read_u16_array, read_u32_array};
use crate::biff::TagTable;
use crate::error::FormatError;
use crate::extrude::SceneParams;
use crate::geometry::{Matrix3D, Mesh, Vertex};

/// Floats per stored vertex: position, normal, texture coordinate.
const VERTEX_FLOATS: usize = 8;

/// Meshes with more than this many vertices store 32-bit indices.
const MAX_NARROW_INDEX_VERTICES: usize = 65535;

const ROT_AND_TRA_TAGS: [&str; 9] = ["RTV0", "RTV1", "RTV2", "RTV3", "RTV4", "RTV5", "RTV6", "RTV7", "RTV8"];

#[derive(Clone, Debug, PartialEq)]
pub struct Primitive {
	pub name: String,
	pub position: Vec3,
	pub size: Vec3,
	/// Rotation X/Y/Z, translation X/Y/Z, object rotation X/Y/Z.
	pub rot_and_tra: [f32; 9],
	pub image: String,
	pub material: String,
	pub sides: i32,
	pub visible: bool,
	pub use_3d_mesh: bool,
	pub mesh_file_name: String,
	/// The embedded mesh, in object space.
	pub mesh: Option<Mesh>,
	num_vertices: i32,
	num_indices: i32,
	compressed_vertices_size: i32,
	compressed_indices_size: i32,
	vertex_blob: Option<(Vec<u8>, bool)>,
	index_blob: Option<(Vec<u8>, bool)>,
}

impl Default for Primitive {
	fn default() -> Primitive {
		Primitive {
			name: String::new(),
			position: Vec3::ZERO,
			size: Vec3::new(100.0, 100.0, 100.0),
			rot_and_tra: [0.0; 9],
			image: String::new(),
			material: String::new(),
			sides: 4,
			visible: true,
			use_3d_mesh: false,
			mesh_file_name: String::new(),
			mesh: None,
			num_vertices: 0,
			num_indices: 0,
			compressed_vertices_size: 0,
			compressed_indices_size: 0,
			vertex_blob: None,
			index_blob: None,
		}
	}
}

impl Primitive {
	/// Turns the stored vertex and index blobs into `mesh`.
	pub fn decode_mesh(&mut self) -> Result<(), FormatError> {
		let (vertex_blob, index_blob) = match (self.vertex_blob.take(), self.index_blob.take()) {
			(Some(v), Some(i)) => (v, i),
			(None, None) => return Ok(()),
			_ => return Err(FormatError::BadMesh(self.name.clone(), "vertices and indices must both be present".to_owned())),
		};
		let num_vertices = self.num_vertices.max(0) as usize;
		let num_indices = self.num_indices.max(0) as usize;

		let vertex_bytes = inflate_if(vertex_blob, "M3CX")?;
		let floats = read_f32_array(&vertex_bytes, num_vertices * VERTEX_FLOATS).ok_or_else(|| {
			FormatError::BadMesh(self.name.clone(), format!("{} vertices need {} bytes, found {}",
				num_vertices, num_vertices * VERTEX_FLOATS * 4, vertex_bytes.len()))
		})?;
		let vertices = floats.chunks_exact(VERTEX_FLOATS)
			.map(|f| Vertex { x: f[0], y: f[1], z: f[2], nx: f[3], ny: f[4], nz: f[5], tu: f[6], tv: f[7] })
			.collect();

		let index_bytes = inflate_if(index_blob, "M3CI")?;
		let indices = if num_vertices <= MAX_NARROW_INDEX_VERTICES {
			read_u16_array(&index_bytes, num_indices).map(|v| v.into_iter().map(u32::from).collect())
		}
		else {
			read_u32_array(&index_bytes, num_indices)
		};
		let indices = indices.ok_or_else(|| {
			FormatError::BadMesh(self.name.clone(), format!("{} indices do not fit {} bytes", num_indices, index_bytes.len()))
		})?;

		let mesh = Mesh::new(vertices, indices);
		mesh.validate().map_err(|e| FormatError::BadMesh(self.name.clone(), e))?;
		debug!("[Primitive::decode_mesh] '{}': {} vertices, {} triangles (compressed sizes {}/{}).",
			self.name, mesh.vertices.len(), mesh.triangle_count(), self.compressed_vertices_size, self.compressed_indices_size);
		self.mesh = Some(mesh);
		Ok(())
	}

	/// Object to world transform: scale, then the rotations and translations, then the position.
	pub fn matrix(&self, params: &SceneParams) -> Matrix3D {
		let rt = &self.rot_and_tra;
		let mut rot_tra = Matrix3D::translation(rt[3], rt[4], rt[5]);
		let rotations = [
			Matrix3D::rotate_z(rt[2].to_radians()),
			Matrix3D::rotate_y(rt[1].to_radians()),
			Matrix3D::rotate_x(rt[0].to_radians()),
			Matrix3D::rotate_z(rt[8].to_radians()),
			Matrix3D::rotate_y(rt[7].to_radians()),
			Matrix3D::rotate_x(rt[6].to_radians()),
		];
		for rotation in &rotations {
			rot_tra = Matrix3D::multiply(rotation, &rot_tra);
		}

		let scale = Matrix3D::scaling(self.size.x, self.size.y, self.size.z);
		let translation = Matrix3D::translation(self.position.x, self.position.y, self.position.z + params.table_height);
		let full = Matrix3D::multiply(&rot_tra, &scale);
		let full = Matrix3D::multiply(&translation, &full);
		Matrix3D::multiply(&Matrix3D::scaling(1.0, 1.0, params.scale_z), &full)
	}

	/// The embedded mesh in table space, if there is one.
	pub fn world_mesh(&self, params: &SceneParams) -> Option<Mesh> {
		if !self.use_3d_mesh {
			return None;
		}
		let mut mesh = self.mesh.clone()?;
		mesh.transform(&self.matrix(params));
		Some(mesh)
	}
}

fn inflate_if((bytes, compressed): (Vec<u8>, bool), tag: &str) -> Result<Vec<u8>, FormatError> {
	if compressed {
		decompress(&bytes).map_err(|source| FormatError::Decompress { tag: tag.to_owned(), source })
	}
	else {
		Ok(bytes)
	}
}

pub(crate) fn tag_table() -> TagTable<Primitive> {
	let mut table = TagTable::<Primitive>::new("primitive")
		.wide_string("NAME", |p| &mut p.name)
		.vertex3("VPOS", |p| &mut p.position)
		.vertex3("VSIZ", |p| &mut p.size)
		.string("IMAG", |p| &mut p.image)
		.string("MATR", |p| &mut p.material)
		.i32("SIDS", |p| &mut p.sides)
		.bool("TVIS", |p| &mut p.visible)
		.bool("U3DM", |p| &mut p.use_3d_mesh)
		.string("M3DN", |p| &mut p.mesh_file_name)
		.i32("M3VN", |p| &mut p.num_vertices)
		.i32("M3FN", |p| &mut p.num_indices)
		.i32("M3CY", |p| &mut p.compressed_vertices_size)
		.i32("M3CJ", |p| &mut p.compressed_indices_size)
		.field("M3CX", |p, r| { p.vertex_blob = Some((r.bytes()?.to_vec(), true)); Ok(()) })
		.field("M3DX", |p, r| { p.vertex_blob = Some((r.bytes()?.to_vec(), false)); Ok(()) })
		.field("M3CI", |p, r| { p.index_blob = Some((r.bytes()?.to_vec(), true)); Ok(()) })
		.field("M3DI", |p, r| { p.index_blob = Some((r.bytes()?.to_vec(), false)); Ok(()) });
	for (i, &tag) in ROT_AND_TRA_TAGS.iter().enumerate() {
		table = table.field(tag, move |p, r| { p.rot_and_tra[i] = r.f32()?; Ok(()) });
	}
	table
}
