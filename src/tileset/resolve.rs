use std::path::{Path, PathBuf};
use derive_more::*;
use crate::{TileEntry, TilesetManifest};

/// Resolves the image paths of a manifest against a directory on disk.
/// Manifests never touch the file system themselves.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ImageResolver {
    root: PathBuf,
}

impl ImageResolver {

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolver for images relative to the directory a manifest file lives in, as Tiled stores them.
    pub fn beside(manifest_file: impl AsRef<Path>) -> Self {
        let root = manifest_file
            .as_ref()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path the entry's image would be at, whether or not it exists.
    pub fn path_of(&self, entry: &TileEntry) -> PathBuf {
        self.root.join(&entry.image_path)
    }

    /// Path of the entry's image.
    /// Fails if there's no file there.
    pub fn resolve(&self, entry: &TileEntry) -> Result<PathBuf, ResolveError> {
        let path = self.path_of(entry);
        if !path.is_file() {
            return Err(ResolveError::MissingResource { id: entry.id, path });
        }
        Ok(path)
    }

    /// Reads the header of the entry's image and compares it against the entry's dimensions.
    pub fn check_dimensions(&self, entry: &TileEntry) -> Result<PathBuf, ResolveError> {
        let path = self.resolve(entry)?;
        let (width, height) = match image::image_dimensions(&path) {
            Ok(dimensions) => dimensions,
            Err(err) => return Err(ResolveError::Unreadable { id: entry.id, path, reason: err.to_string() }),
        };
        if (width, height) != (entry.width, entry.height) {
            return Err(ResolveError::DimensionMismatch {
                id: entry.id,
                path,
                expected: (entry.width, entry.height),
                actual: (width, height),
            });
        }
        Ok(path)
    }

    /// Checks every image of the manifest.
    /// Returns all problems found in ascending id order. Empty if none were found.
    pub fn verify(&self, manifest: &TilesetManifest) -> Vec<ResolveError> {
        let errors: Vec<ResolveError> = manifest
            .entries()
            .into_iter()
            .filter_map(|entry| self.check_dimensions(entry).err())
            .collect();
        for err in &errors {
            log::warn!("Tileset '{}': {err}", manifest.name);
        }
        errors
    }
}

#[derive(Error, Display, Debug)]
pub enum ResolveError {
    #[display(fmt="Image of tile {id} not found at {}", "path.display()")]
    MissingResource { id: u32, path: PathBuf },
    #[display(fmt="Image of tile {id} at {} could not be read: {reason}", "path.display()")]
    Unreadable { id: u32, path: PathBuf, reason: String },
    #[display(fmt="Image of tile {id} at {} is {}x{}, expected {}x{}", "path.display()", "actual.0", "actual.1", "expected.0", "expected.1")]
    DimensionMismatch { id: u32, path: PathBuf, expected: (u32, u32), actual: (u32, u32) },
}

impl ResolveError {
    pub fn id(&self) -> u32 {
        match self {
            Self::MissingResource { id, .. } => *id,
            Self::Unreadable { id, .. } => *id,
            Self::DimensionMismatch { id, .. } => *id,
        }
    }
}
