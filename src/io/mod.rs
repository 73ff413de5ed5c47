/*
Copyright 2026 ancil developers

This file is part of the ancillary processing suite (ancil).

ancil is a free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation; either version 3 of the License, or
(at your option) any later version.

ancil is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with ancil. If not, see https://www.gnu.org/licenses/.
*/

//! Module with the NetCDF boundary of the suite.
//!
//! Inside the library missing data is NaN; the reader maps fill
//! values to NaN on the way in and the writer maps NaN back to a
//! fill value on the way out.

pub mod reader;
pub mod writer;

pub use reader::{read_all_fields, read_field, read_first_field, read_grid};
pub use writer::{write_fields, write_fields_with_staggering};
