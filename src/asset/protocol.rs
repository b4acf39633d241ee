use std::sync::Arc;
use anyhow::anyhow;
use crate::{AssetPath, HashMap};

/// Source of manifest bytes, selected by the protocol part of an [`AssetPath`].
pub trait Protocol: Send + Sync + 'static {
    /// The "file" in "file://tile_sets/walls.tsx". Must not change.
    fn name(&self) -> &str;
    fn read(&self, path: &AssetPath) -> anyhow::Result<Vec<u8>>;
}

/// Reads manifests from disk, relative to the working directory unless the library sets a prefix.
#[derive(Copy, Clone, Debug)]
pub struct FileProtocol;
impl Protocol for FileProtocol {
    fn name(&self) -> &str { "file" }
    fn read(&self, path: &AssetPath) -> anyhow::Result<Vec<u8>> {
        Ok(std::fs::read(path.location())?)
    }
}

/// Serves manifests kept in memory, keyed by location.
/// Used by tests and for manifests embedded with `include_str!`.
#[derive(Clone, Default, Debug)]
pub struct RawProtocol {
    files: HashMap<String, Arc<[u8]>>,
}

impl RawProtocol {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a file under its location. IE: "tile_sets/stairs.tsx".
    pub fn with_file(mut self, location: impl Into<String>, bytes: impl AsRef<[u8]>) -> Self {
        self.files.insert(location.into(), Arc::from(bytes.as_ref()));
        self
    }
}

impl Protocol for RawProtocol {
    fn name(&self) -> &str { "raw" }
    fn read(&self, path: &AssetPath) -> anyhow::Result<Vec<u8>> {
        let location = path.location();
        match self.files.get(&location) {
            Some(bytes) => Ok(bytes.to_vec()),
            None => Err(anyhow!("No raw file stored at '{location}'")),
        }
    }
}
