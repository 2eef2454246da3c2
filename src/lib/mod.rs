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

//! Reader for Visual Pinball table files.
//!
//! A table is a compound file (`cfbf`) whose streams hold tagged BIFF records (`biff`).
//! The `table` module turns those records into game data, items and textures,
//! and `extrude` rebuilds the 3D meshes of ramps, rubbers and walls on top of `geometry`.

pub mod error;
pub mod io;
pub mod cfbf;
pub mod biff;
pub mod geometry;
pub mod extrude;
pub mod table;

pub use error::{ContainerError, Error, FormatError};
