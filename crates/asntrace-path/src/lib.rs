//! AS-path summary building.

pub mod build;

pub use build::build_as_path;
