//! Reading and writing of Tiled tileset manifests (.tsx) for image collection tilesets,
//! along with the plumbing to load them by path or name.
mod asset;
mod config;
mod tileset;
mod util;

pub use asset::*;
pub use config::*;
pub use tileset::*;
pub use util::*;
