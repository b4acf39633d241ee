use std::sync::{Arc, PoisonError, RwLock};
use anyhow::Context;
use derive_more::*;
use rayon::prelude::*;
use crate::{AssetKey, AssetLoader, AssetPath, HashMap, Protocol, TsxLoader};

/// Library of tileset manifests.
pub type ManifestLibrary = AssetLibrary<TsxLoader>;

/// Loads assets through protocols and caches them by path.
/// Loading is synchronous. Independent paths can be loaded in parallel with [`AssetLibrary::load_all`].
pub struct AssetLibrary<L: AssetLoader> {
    loader: L,
    path_prefix: Option<String>,
    protocols: HashMap<String, Arc<dyn Protocol>>,
    default_protocol: Option<String>,
    names: HashMap<String, String>,
    cache: RwLock<HashMap<AssetKey, Arc<L::AssetType>>>,
}

impl<L: AssetLoader + Default> Default for AssetLibrary<L> {
    fn default() -> Self {
        Self::new(L::default())
    }
}

impl<L: AssetLoader> AssetLibrary<L> {

    pub fn new(loader: L) -> Self {
        Self {
            loader,
            path_prefix: None,
            protocols: HashMap::default(),
            default_protocol: None,
            names: HashMap::default(),
            cache: RwLock::new(HashMap::default()),
        }
    }

    /// Directory prepended to every path before it is read.
    pub fn set_path_prefix<S: Into<String>>(&mut self, prefix: Option<S>) {
        self.path_prefix = prefix.map(|s| s.into());
    }

    /// Adds a protocol for use in loading bytes for the loader.
    pub fn add_protocol(&mut self, protocol: impl Protocol, is_default: bool) {
        let name = String::from(protocol.name());
        self.protocols.insert(name.clone(), Arc::new(protocol));
        if is_default {
            self.default_protocol = Some(name);
        }
    }

    /// Protocol used by paths that don't specify one.
    pub fn set_default_protocol<S: Into<String>>(&mut self, protocol: Option<S>) {
        self.default_protocol = protocol.map(|s| s.into());
    }

    /// Associates a name with a path, so that the asset can be loaded with [`AssetLibrary::load_named`].
    /// Returns the path previously registered under that name.
    pub fn register(&mut self, name: impl Into<String>, path: impl Into<String>) -> Option<String> {
        self.names.insert(name.into(), path.into())
    }

    /// Path registered under a name.
    pub fn path_of(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    /// Registered names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    /// Loads the asset at the path specified, or returns the cached one.
    /// Paths that resolve to the same protocol and location share one asset.
    #[tracing::instrument(skip(self))]
    pub fn load(&self, path: &str) -> anyhow::Result<Arc<L::AssetType>> {
        let asset_path = self.resolve(path)?;
        let key = asset_path.key();
        if let Some(asset) = self.cached(key) {
            return Ok(asset);
        }

        let Some(protocol) = self.protocols.get(&asset_path.protocol) else {
            return Err(LoadError::NoSuchProtocol { protocol: asset_path.protocol }.into());
        };
        if !self.loader.extensions().contains(&asset_path.extension()) {
            return Err(LoadError::UnsupportedExtension { extension: String::from(asset_path.extension()) }.into());
        }

        let bytes = protocol
            .read(&asset_path)
            .with_context(|| format!("Failed to read {asset_path}"))?;
        let asset = self.loader
            .load(&bytes, &asset_path)
            .with_context(|| format!("Failed to load {asset_path}"))?;

        // Another thread may have finished first, in which case its asset is kept.
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let asset = cache.entry(key).or_insert_with(|| Arc::new(asset));
        Ok(asset.clone())
    }

    /// Applies the default protocol and path prefix.
    pub fn resolve(&self, path: &str) -> Result<AssetPath, LoadError> {
        let asset_path = AssetPath::parse(path, self.default_protocol.as_deref())?;
        Ok(asset_path.with_prefix(self.path_prefix.as_deref()))
    }

    /// Loads the asset registered under a name.
    pub fn load_named(&self, name: &str) -> anyhow::Result<Arc<L::AssetType>> {
        let Some(path) = self.path_of(name) else {
            return Err(LoadError::UnknownName { name: String::from(name) }.into());
        };
        self.load(path)
    }

    /// Loads several assets in parallel.
    /// Results are in the same order as the paths.
    pub fn load_all<P: AsRef<str> + Sync>(&self, paths: &[P]) -> Vec<anyhow::Result<Arc<L::AssetType>>> {
        paths
            .par_iter()
            .map(|path| self.load(path.as_ref()))
            .collect()
    }

    /// Gets an asset only if it was already loaded.
    pub fn get(&self, path: &str) -> Option<Arc<L::AssetType>> {
        let key = self.resolve(path).ok()?.key();
        self.cached(key)
    }

    /// Forgets a loaded asset. Handles already given out stay valid.
    pub fn evict(&self, path: &str) -> Option<Arc<L::AssetType>> {
        let key = self.resolve(path).ok()?.key();
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.remove(&key)
    }

    pub fn clear(&self) {
        self.cache.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Number of loaded assets.
    pub fn len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cached(&self, key: AssetKey) -> Option<Arc<L::AssetType>> {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        cache.get(&key).cloned()
    }
}

#[derive(Error, Display, Debug)]
pub enum LoadError {
    #[display(fmt="No default protocol")]
    NoDefaultProtocol,
    #[display(fmt="No such protocol '{protocol}'")]
    NoSuchProtocol { protocol: String },
    #[display(fmt="No loader matching extension '{extension}'")]
    UnsupportedExtension { extension: String },
    #[display(fmt="Path missing extension")]
    PathMissingExtension,
    #[display(fmt="No asset registered under name '{name}'")]
    UnknownName { name: String },
}

#[cfg(test)]
mod test {
    use std::sync::Arc;
    use crate::util::init_test_logging;
    use crate::{FileProtocol, LoadError, ManifestError, ManifestLibrary, RawProtocol};

    const STAIRS: &str = include_str!("../../assets/tile_sets/stairs.tsx");
    const WALLS: &str = include_str!("../../assets/tile_sets/walls.tsx");

    fn raw_library() -> ManifestLibrary {
        let protocol = RawProtocol::new()
            .with_file("tile_sets/stairs.tsx", STAIRS)
            .with_file("tile_sets/walls.tsx", WALLS)
            .with_file("tile_sets/broken.tsx", "<tileset name=\"broken\" tilewidth=\"1\"/>")
            .with_file("tile_sets/stairs.png", [0u8; 4]);
        let mut library = ManifestLibrary::default();
        library.add_protocol(protocol, true);
        library
    }

    #[test]
    fn loads_and_caches() {
        init_test_logging();
        let library = raw_library();
        assert!(library.get("tile_sets/stairs.tsx").is_none());

        let stairs = library.load("tile_sets/stairs.tsx").unwrap();
        assert_eq!("stairs", stairs.name);
        assert_eq!(1, library.len());

        let again = library.load("tile_sets/stairs.tsx").unwrap();
        assert!(Arc::ptr_eq(&stairs, &again));
        assert!(Arc::ptr_eq(&stairs, &library.get("tile_sets/stairs.tsx").unwrap()));

        let evicted = library.evict("tile_sets/stairs.tsx").unwrap();
        assert!(Arc::ptr_eq(&stairs, &evicted));
        assert!(library.is_empty());
    }

    #[test]
    fn loads_named() {
        let mut library = raw_library();
        library.register("walls", "tile_sets/walls.tsx");
        let walls = library.load_named("walls").unwrap();
        assert_eq!("walls/wall_W.png", walls.get(63).unwrap().image_path);

        let err = library.load_named("roofs").unwrap_err();
        assert!(matches!(err.downcast_ref::<LoadError>(), Some(LoadError::UnknownName { .. })));
    }

    #[test]
    fn loads_all_in_order() {
        let library = raw_library();
        let results = library.load_all(&[
            "tile_sets/walls.tsx",
            "tile_sets/missing.tsx",
            "tile_sets/stairs.tsx",
            "raw://tile_sets/walls.tsx",
        ]);
        assert_eq!(4, results.len());
        assert_eq!("walls", results[0].as_ref().unwrap().name);
        assert!(results[1].is_err());
        assert_eq!("stairs", results[2].as_ref().unwrap().name);
        assert!(Arc::ptr_eq(results[0].as_ref().unwrap(), results[3].as_ref().unwrap()));
        assert_eq!(2, library.len());
        library.clear();
        assert!(library.is_empty());
    }

    #[test]
    fn explicit_default_protocol_shares_cache() {
        let library = raw_library();
        let implicit = library.load("tile_sets/walls.tsx").unwrap();
        let explicit = library.load("raw://tile_sets/walls.tsx").unwrap();
        assert!(Arc::ptr_eq(&implicit, &explicit));
        assert_eq!(1, library.len());
        assert!(library.evict("raw://tile_sets/walls.tsx").is_some());
        assert!(library.get("tile_sets/walls.tsx").is_none());
    }

    #[test]
    fn malformed_manifest_stays_typed() {
        let library = raw_library();
        let err = library.load("tile_sets/broken.tsx").unwrap_err();
        let manifest_err = err.downcast_ref::<ManifestError>().unwrap();
        assert!(manifest_err.is_malformed());
        assert!(library.get("tile_sets/broken.tsx").is_none());
    }

    #[test]
    fn path_errors() {
        let library = raw_library();
        let err = library.load("tile_sets/stairs.png").unwrap_err();
        assert!(matches!(err.downcast_ref::<LoadError>(), Some(LoadError::UnsupportedExtension { .. })));

        let err = library.load("http://tile_sets/stairs.tsx").unwrap_err();
        assert!(matches!(err.downcast_ref::<LoadError>(), Some(LoadError::NoSuchProtocol { .. })));

        let no_default = ManifestLibrary::default();
        let err = no_default.load("tile_sets/stairs.tsx").unwrap_err();
        assert!(matches!(err.downcast_ref::<LoadError>(), Some(LoadError::NoDefaultProtocol)));
    }

    #[test]
    fn loads_from_file_system() {
        let mut library = ManifestLibrary::default();
        library.add_protocol(FileProtocol, true);
        library.set_path_prefix(Some(env!("CARGO_MANIFEST_DIR")));
        let walls = library.load("assets/tile_sets/walls.tsx").unwrap();
        assert_eq!(24, walls.tile_count);
        assert!(library.load("assets/tile_sets/roofs.tsx").is_err());
    }
}
