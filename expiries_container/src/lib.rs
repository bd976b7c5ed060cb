//! Output containers for tile footprints.
//!
//! The [`OutputContainerManager`] writes one feature per tile through a [`VectorSink`] and
//! splits the output into `<base>_1`, `<base>_2`, … before any container outgrows the
//! capacity limit of its format.

mod format;
mod manager;
mod options;
mod schema;
mod sink;
mod size;
mod target;

pub use format::*;
pub use manager::*;
pub use options::*;
pub use schema::*;
pub use sink::*;
pub use size::*;
pub use target::*;
