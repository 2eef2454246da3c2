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

/// 4x4 affine transform, row-major, applied to row vectors.
/// The translation lives in the last row (`m[3][0..3]`).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Matrix3D {
	pub m: [[f32; 4]; 4],
}

impl Default for Matrix3D {
	fn default() -> Matrix3D {
		Matrix3D::IDENTITY
	}
}

impl Matrix3D {
	pub const IDENTITY: Matrix3D = Matrix3D {
		m: [
			[1.0, 0.0, 0.0, 0.0],
			[0.0, 1.0, 0.0, 0.0],
			[0.0, 0.0, 1.0, 0.0],
			[0.0, 0.0, 0.0, 1.0],
		],
	};

	pub fn translation(x: f32, y: f32, z: f32) -> Matrix3D {
		let mut result = Matrix3D::IDENTITY;
		result.m[3][0] = x;
		result.m[3][1] = y;
		result.m[3][2] = z;
		result
	}

	pub fn scaling(x: f32, y: f32, z: f32) -> Matrix3D {
		let mut result = Matrix3D::IDENTITY;
		result.m[0][0] = x;
		result.m[1][1] = y;
		result.m[2][2] = z;
		result
	}

	/// Rotation about the X axis by `angle` radians.
	pub fn rotate_x(angle: f32) -> Matrix3D {
		let (sin, cos) = angle.sin_cos();
		let mut result = Matrix3D::IDENTITY;
		result.m[1][1] = cos;
		result.m[1][2] = sin;
		result.m[2][1] = -sin;
		result.m[2][2] = cos;
		result
	}

	/// Rotation about the Y axis by `angle` radians.
	pub fn rotate_y(angle: f32) -> Matrix3D {
		let (sin, cos) = angle.sin_cos();
		let mut result = Matrix3D::IDENTITY;
		result.m[0][0] = cos;
		result.m[0][2] = -sin;
		result.m[2][0] = sin;
		result.m[2][2] = cos;
		result
	}

	/// Rotation about the Z axis by `angle` radians.
	pub fn rotate_z(angle: f32) -> Matrix3D {
		let (sin, cos) = angle.sin_cos();
		let mut result = Matrix3D::IDENTITY;
		result.m[0][0] = cos;
		result.m[0][1] = sin;
		result.m[1][0] = -sin;
		result.m[1][1] = cos;
		result
	}

	/// Rotation about an arbitrary `axis` by `degrees`.
	pub fn rotate_around_axis(axis: Vec3, degrees: f32) -> Matrix3D {
		let u = axis.normalize_or_zero();
		let (sin, cos) = degrees.to_radians().sin_cos();
		let one_minus_cos = 1.0 - cos;
		let mut result = Matrix3D::IDENTITY;
		result.m[0][0] = u.x * u.x + cos * (1.0 - u.x * u.x);
		result.m[0][1] = u.x * u.y * one_minus_cos - sin * u.z;
		result.m[0][2] = u.x * u.z * one_minus_cos + sin * u.y;
		result.m[1][0] = u.x * u.y * one_minus_cos + sin * u.z;
		result.m[1][1] = u.y * u.y + cos * (1.0 - u.y * u.y);
		result.m[1][2] = u.y * u.z * one_minus_cos - sin * u.x;
		result.m[2][0] = u.x * u.z * one_minus_cos - sin * u.y;
		result.m[2][1] = u.y * u.z * one_minus_cos + sin * u.x;
		result.m[2][2] = u.z * u.z + cos * (1.0 - u.z * u.z);
		result
	}

	/// Concatenation: `result[i][l] = sum_k a[k][l] * b[i][k]`.
	/// With row vectors the result applies `b` first, then `a`.
	pub fn multiply(a: &Matrix3D, b: &Matrix3D) -> Matrix3D {
		let mut result = Matrix3D { m: [[0.0; 4]; 4] };
		for i in 0..4 {
			for l in 0..4 {
				result.m[i][l] = (0..4).map(|k| a.m[k][l] * b.m[i][k]).sum();
			}
		}
		result
	}

	/// Transforms a position: rotation, translation and homogeneous divide.
	pub fn transform_point(&self, v: Vec3) -> Vec3 {
		let m = &self.m;
		let w = v.x * m[0][3] + v.y * m[1][3] + v.z * m[2][3] + m[3][3];
		let inv_w = if w != 0.0 { 1.0 / w } else { 1.0 };
		Vec3::new(
			(v.x * m[0][0] + v.y * m[1][0] + v.z * m[2][0] + m[3][0]) * inv_w,
			(v.x * m[0][1] + v.y * m[1][1] + v.z * m[2][1] + m[3][1]) * inv_w,
			(v.x * m[0][2] + v.y * m[1][2] + v.z * m[2][2] + m[3][2]) * inv_w,
		)
	}

	/// Transforms a direction (e.g. a normal): rotation only, no translation.
	pub fn transform_vector(&self, v: Vec3) -> Vec3 {
		let m = &self.m;
		Vec3::new(
			v.x * m[0][0] + v.y * m[1][0] + v.z * m[2][0],
			v.x * m[0][1] + v.y * m[1][1] + v.z * m[2][1],
			v.x * m[0][2] + v.y * m[1][2] + v.z * m[2][2],
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::f32::consts::FRAC_PI_2;

	fn close(a: Vec3, b: Vec3) -> bool {
		(a - b).length() < 1e-5
	}

	#[test]
	fn identity_is_default() {
		let p = Vec3::new(1.0, -2.0, 3.0);
		assert_eq!(Matrix3D::default().transform_point(p), p);
	}

	#[test]
	fn translation_moves_points_not_vectors() {
		let t = Matrix3D::translation(10.0, 20.0, 30.0);
		let v = Vec3::new(1.0, 1.0, 1.0);
		assert_eq!(t.transform_point(v), Vec3::new(11.0, 21.0, 31.0));
		assert_eq!(t.transform_vector(v), v);
	}

	#[test]
	fn rotate_z_quarter_turn() {
		let r = Matrix3D::rotate_z(FRAC_PI_2);
		assert!(close(r.transform_point(Vec3::X), Vec3::Y));
	}

	#[test]
	fn multiply_applies_right_operand_first() {
		let scale = Matrix3D::scaling(2.0, 2.0, 2.0);
		let translate = Matrix3D::translation(1.0, 0.0, 0.0);
		// scale, then translate
		let m = Matrix3D::multiply(&translate, &scale);
		assert!(close(m.transform_point(Vec3::new(1.0, 0.0, 0.0)), Vec3::new(3.0, 0.0, 0.0)));
		// translate, then scale
		let m = Matrix3D::multiply(&scale, &translate);
		assert!(close(m.transform_point(Vec3::new(1.0, 0.0, 0.0)), Vec3::new(4.0, 0.0, 0.0)));
	}

	#[test]
	fn axis_rotation_keeps_length_and_axis() {
		let axis = Vec3::new(1.0, 2.0, 3.0);
		let r = Matrix3D::rotate_around_axis(axis, 73.0);
		let v = Vec3::new(-4.0, 0.5, 2.0);
		assert!((r.transform_vector(v).length() - v.length()).abs() < 1e-4);
		assert!(close(r.transform_vector(axis), axis));
		assert!(close(Matrix3D::rotate_around_axis(axis, 0.0).transform_vector(v), v));
	}
}
