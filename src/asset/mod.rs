mod library;
mod loader;
mod protocol;
mod path_parts;

pub use library::*;
pub use loader::*;
pub use protocol::*;
pub use path_parts::*;
