mod error;
mod manifest;
mod resolve;
mod serialize;
mod tile;
pub mod parse;

pub use error::*;
pub use manifest::*;
pub use resolve::*;
pub use tile::*;
