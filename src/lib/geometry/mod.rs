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

//! Transforms, splines and triangle meshes.

mod catmull;
mod matrix;
mod mesh;
mod spline;

pub use self::catmull::{CatmullCurve, CatmullCurve2D, CatmullCurve3D, CurvePoint};
pub use self::matrix::Matrix3D;
pub use self::mesh::{compute_normals, to_obj, Mesh, ObjWriter, Vertex};
pub use self::spline::{accuracy_for_detail, tessellate, DragPoint, RenderVertex};
