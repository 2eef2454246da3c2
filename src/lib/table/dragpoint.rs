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

use std::marker::PhantomData;
use log::trace;
use crate::biff::{GroupAccumulator, Record};
use crate::error::FormatError;
use crate::geometry::DragPoint;

/// Items whose outline is given by a list of `DPNT` groups.
pub trait HasDragPoints {
	fn drag_points_mut(&mut self) -> &mut Vec<DragPoint>;
}

/// Builds one drag point from the records of a `DPNT` group and appends it to the item.
struct DragPointGroup<T> {
	point: DragPoint,
	item: PhantomData<T>,
}

impl<T: HasDragPoints> GroupAccumulator<T> for DragPointGroup<T> {
	fn on_tag(&mut self, record: &Record) -> Result<(), FormatError> {
		let point = &mut self.point;
		match record.tag.as_str() {
			"VCEN" => {
				let v = record.vertex2()?;
				point.position.x = v.x;
				point.position.y = v.y;
			},
			"POSZ" => point.position.z = record.f32()?,
			"SMTH" => point.smooth = record.bool()?,
			"SLNG" => point.slingshot = record.bool()?,
			"ATEX" => point.auto_texture = record.bool()?,
			"TEXC" => point.texture_coord = record.f32()?,
			"LOCK" => point.locked = record.bool()?,
			"LAYR" => point.layer = record.i32()?,
			_ => trace!("[DragPointGroup] Ignoring tag '{}' at {:#X}.", record.tag, record.offset),
		}
		Ok(())
	}

	fn on_end(self: Box<Self>, parent: &mut T) -> Result<(), FormatError> {
		parent.drag_points_mut().push(self.point);
		Ok(())
	}
}

/// Group factory to register for the `DPNT` tag.
pub fn drag_point_group<T: HasDragPoints + 'static>() -> Box<dyn GroupAccumulator<T>> {
	Box::new(DragPointGroup { point: DragPoint::default(), item: PhantomData })
}
