use std::collections::BTreeMap;
use std::path::Path;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use crate::{FileProtocol, ManifestLibrary};

/// Configuration of a [`ManifestLibrary`], usually stored as YAML.
///
/// ```yaml
/// asset_root: resources/maps
/// manifests:
///   stairs: tile_sets/stairs.tsx
///   walls: tile_sets/walls.tsx
/// ```
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Directory every manifest path is relative to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_root: Option<String>,
    /// Protocol for paths that don't name one.
    #[serde(default = "default_protocol")]
    pub default_protocol: String,
    /// Manifest paths by name.
    #[serde(default)]
    pub manifests: BTreeMap<String, String>,
}

fn default_protocol() -> String {
    String::from("file")
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            asset_root: None,
            default_protocol: default_protocol(),
            manifests: BTreeMap::new(),
        }
    }
}

impl LibraryConfig {

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Reads configuration from a YAML file.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_yaml(&yaml)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }
}

impl ManifestLibrary {
    /// Library reading from the file system, with every configured manifest registered.
    pub fn from_config(config: &LibraryConfig) -> Self {
        let mut library = Self::default();
        library.add_protocol(FileProtocol, false);
        library.set_default_protocol(Some(config.default_protocol.as_str()));
        library.set_path_prefix(config.asset_root.as_deref());
        for (name, path) in &config.manifests {
            library.register(name.as_str(), path.as_str());
        }
        log::debug!("Configured manifest library with {} manifests", config.manifests.len());
        library
    }
}
