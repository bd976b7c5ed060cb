//! Tile footprints as polygons, and their reprojection into the output CRS.

mod builder;
mod spatial_ref;
mod transform;

pub use builder::*;
pub use spatial_ref::*;
pub use transform::*;
