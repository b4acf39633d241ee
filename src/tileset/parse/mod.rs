//! Structs defined here mirror those in [`crate::tileset`].
//! The main difference is that they're a 1:1 mapping of the tsx format
//! and have not been validated.
mod tileset;

pub use tileset::*;
