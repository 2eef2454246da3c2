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

use std::ops::{Add, Mul, Sub};
use glam::{Vec2, Vec3};

/// A point type a curve can be built from: 2D outlines or 3D centerlines.
pub trait CurvePoint: Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f32, Output = Self> {
	fn from_vec3(v: Vec3) -> Self;
	fn to_vec3(self) -> Vec3;
	fn length(self) -> f32;
	/// Whether `mid` deviates from the chord `a`-`b` by less than `accuracy`
	/// (the squared doubled area of the triangle they form).
	fn is_flat(a: Self, b: Self, mid: Self, accuracy: f32) -> bool;
}

impl CurvePoint for Vec2 {
	fn from_vec3(v: Vec3) -> Vec2 {
		v.truncate()
	}

	fn to_vec3(self) -> Vec3 {
		self.extend(0.0)
	}

	fn length(self) -> f32 {
		Vec2::length(self)
	}

	fn is_flat(a: Vec2, b: Vec2, mid: Vec2, accuracy: f32) -> bool {
		let double_area = (mid.x - a.x) * (b.y - a.y) - (b.x - a.x) * (mid.y - a.y);
		double_area * double_area < accuracy
	}
}

impl CurvePoint for Vec3 {
	fn from_vec3(v: Vec3) -> Vec3 {
		v
	}

	fn to_vec3(self) -> Vec3 {
		self
	}

	fn length(self) -> f32 {
		Vec3::length(self)
	}

	fn is_flat(a: Vec3, b: Vec3, mid: Vec3, accuracy: f32) -> bool {
		(mid - a).cross(b - a).length_squared() < accuracy
	}
}

/// Non-uniform Catmull-Rom segment between `p1` and `p2`, in power basis.
#[derive(Copy, Clone, Debug)]
pub struct CatmullCurve<V> {
	c0: V,
	c1: V,
	c2: V,
	c3: V,
}

pub type CatmullCurve2D = CatmullCurve<Vec2>;
pub type CatmullCurve3D = CatmullCurve<Vec3>;

impl<V: CurvePoint> CatmullCurve<V> {
	pub fn new(p0: V, p1: V, p2: V, p3: V) -> CatmullCurve<V> {
		// centripetal spacing
		let mut dt0 = (p1 - p0).length().sqrt();
		let mut dt1 = (p2 - p1).length().sqrt();
		let mut dt2 = (p3 - p2).length().sqrt();

		// repeated control points
		if dt1 < 1e-4 {
			dt1 = 1.0;
		}
		if dt0 < 1e-4 {
			dt0 = dt1;
		}
		if dt2 < 1e-4 {
			dt2 = dt1;
		}

		// tangents at p1 and p2 for the parametrization [t1, t2] ...
		let t1 = (p1 - p0) * (1.0 / dt0) - (p2 - p0) * (1.0 / (dt0 + dt1)) + (p2 - p1) * (1.0 / dt1);
		let t2 = (p2 - p1) * (1.0 / dt1) - (p3 - p1) * (1.0 / (dt1 + dt2)) + (p3 - p2) * (1.0 / dt2);
		// ... rescaled to [0, 1]
		let t1 = t1 * dt1;
		let t2 = t2 * dt1;

		CatmullCurve {
			c0: p1,
			c1: t1,
			c2: p1 * -3.0 + p2 * 3.0 - t1 * 2.0 - t2,
			c3: p1 * 2.0 - p2 * 2.0 + t1 + t2,
		}
	}

	pub fn evaluate(&self, t: f32) -> V {
		let t2 = t * t;
		let t3 = t2 * t;
		self.c3 * t3 + self.c2 * t2 + self.c1 * t + self.c0
	}
}
