use std::str::FromStr;
use roxmltree::Document;
use crate::tileset::parse;
use crate::{AssetLoader, AssetPath, HashMap, HashSet};
use super::{FillMode, Grid, MalformedDocument, ManifestError, ObjectAlignment, Properties, Record, TileEntry, TileOffset, TileRenderSize};

/// Loader for a .tsx file.
/// Outputs a [`TilesetManifest`].
#[derive(Copy, Clone, Default, Debug)]
pub struct TsxLoader;
impl AssetLoader for TsxLoader {
    type AssetType = TilesetManifest;

    fn load(&self, bytes: &[u8], path: &AssetPath) -> anyhow::Result<TilesetManifest> {
        let manifest = TilesetManifest::parse_bytes(bytes)?;
        log::debug!("Loaded tileset '{}' from {path} with {} tiles", manifest.name, manifest.len());
        Ok(manifest)
    }

    fn extensions(&self) -> &[&str] {
        &["tsx"]
    }
}

/// A validated version of [`parse::Tileset`] where every tile is keyed by its id.
/// Ids may be sparse, and are never re-indexed.
#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct TilesetManifest {
    pub version: Option<String>,
    pub tiled_version: Option<String>,
    pub name: String,
    pub class: Option<String>,
    pub tile_width: u32,
    pub tile_height: u32,
    pub spacing: u32,
    pub margin: u32,
    /// As declared by the document. Not required to match [`Self::len`].
    pub tile_count: u32,
    /// Always 0 for image collection tilesets.
    pub columns: u32,
    pub object_alignment: ObjectAlignment,
    pub tile_render_size: TileRenderSize,
    pub fill_mode: FillMode,
    pub tile_offset: Option<TileOffset>,
    pub grid: Option<Grid>,
    pub properties: Properties,
    entries: HashMap<u32, TileEntry>,
}

impl TilesetManifest {

    pub fn new(name: impl Into<String>, tile_width: u32, tile_height: u32) -> Self {
        Self {
            name: name.into(),
            tile_width,
            tile_height,
            ..Default::default()
        }
    }

    /// Parses the contents of a .tsx document.
    #[tracing::instrument(skip_all)]
    pub fn parse(document: &str) -> Result<Self, ManifestError> {
        let doc = Document::parse(document).map_err(MalformedDocument::Xml)?;
        let parsed_tileset = parse::Tileset::parse_doc(&doc)?;
        let manifest = Self::from_parsed(parsed_tileset)?;
        log::debug!("Parsed tileset '{}' with {} tiles", manifest.name, manifest.len());
        Ok(manifest)
    }

    /// Parses a .tsx document from raw file contents.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, ManifestError> {
        let source = std::str::from_utf8(bytes).map_err(MalformedDocument::NotUtf8)?;
        Self::parse(source.trim_start_matches('\u{feff}'))
    }

    /// Validates a raw tileset.
    /// Fails on the first problem found in document order.
    pub fn from_parsed(parsed_tileset: parse::Tileset) -> Result<Self, ManifestError> {
        let record = Record::Tileset;
        let name = parsed_tileset.name.ok_or(MalformedDocument::MissingAttribute { record, attribute: "name" })?;
        let tile_width = required_dimension(record, "tilewidth", parsed_tileset.tile_width)?;
        let tile_height = required_dimension(record, "tileheight", parsed_tileset.tile_height)?;

        let mut entries = HashMap::default();
        let mut positions: HashMap<u32, usize> = HashMap::default();
        for tile in parsed_tileset.tiles {
            let position = tile.position;
            let tile_record = tile.record();
            let Some(id) = tile.id else {
                return Err(MalformedDocument::MissingAttribute { record: tile_record, attribute: "id" }.into());
            };
            if let Some(first) = positions.insert(id, position) {
                return Err(ManifestError::DuplicateId { id, first, second: position });
            }
            let Some(image) = tile.image else {
                return Err(MalformedDocument::MissingImage { record: tile_record }.into());
            };

            let image_record = Record::Image { position, id: Some(id) };
            let image_path = match image.source {
                Some(source) if !source.is_empty() => source,
                Some(source) => return Err(MalformedDocument::InvalidAttribute {
                    record: image_record,
                    attribute: "source",
                    value: source,
                }.into()),
                None => return Err(MalformedDocument::MissingAttribute {
                    record: image_record,
                    attribute: "source",
                }.into()),
            };
            let width = required_dimension(image_record, "width", Some(image.width.unwrap_or(tile_width)))?;
            let height = required_dimension(image_record, "height", Some(image.height.unwrap_or(tile_height)))?;
            entries.insert(id, TileEntry {
                id,
                image_path,
                width,
                height,
                class: tile.class,
                properties: tile.properties,
            });
        }

        let manifest = Self {
            version: parsed_tileset.version,
            tiled_version: parsed_tileset.tiled_version,
            name,
            class: parsed_tileset.class,
            tile_width,
            tile_height,
            spacing: parsed_tileset.spacing,
            margin: parsed_tileset.margin,
            tile_count: parsed_tileset.tile_count.unwrap_or(entries.len() as u32),
            columns: parsed_tileset.columns,
            object_alignment: parsed_tileset.object_alignment,
            tile_render_size: parsed_tileset.tile_render_size,
            fill_mode: parsed_tileset.fill_mode,
            tile_offset: parsed_tileset.tile_offset,
            grid: parsed_tileset.grid,
            properties: parsed_tileset.properties,
            entries,
        };
        manifest.warn_inconsistencies();
        Ok(manifest)
    }

    fn warn_inconsistencies(&self) {
        if self.tile_count as usize != self.len() {
            log::warn!(
                "Tileset '{}' declares tilecount {} but has {} tiles",
                self.name, self.tile_count, self.len()
            );
        }
        let mut seen: HashSet<&str> = HashSet::default();
        for entry in self.entries() {
            if !seen.insert(&entry.image_path) {
                log::warn!("Tileset '{}' references image '{}' more than once", self.name, entry.image_path);
            }
        }
    }

    /// Inserts an entry keyed by its id, returning the entry it replaced.
    /// Updates [`Self::tile_count`] to match.
    pub fn insert(&mut self, entry: TileEntry) -> Option<TileEntry> {
        let replaced = self.entries.insert(entry.id, entry);
        self.tile_count = self.entries.len() as u32;
        replaced
    }

    pub fn with_entry(mut self, entry: TileEntry) -> Self {
        self.insert(entry);
        self
    }

    pub fn get(&self, id: u32) -> Option<&TileEntry> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &TileEntry> {
        self.entries.values()
    }

    /// Entries sorted by ascending id.
    pub fn entries(&self) -> Vec<&TileEntry> {
        let mut entries: Vec<&TileEntry> = self.entries.values().collect();
        entries.sort_unstable_by_key(|entry| entry.id);
        entries
    }

    /// Ids sorted in ascending order.
    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl FromStr for TilesetManifest {
    type Err = ManifestError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn required_dimension(record: Record, attribute: &'static str, value: Option<u32>) -> Result<u32, MalformedDocument> {
    match value {
        Some(0) => Err(MalformedDocument::InvalidAttribute { record, attribute, value: String::from("0") }),
        Some(value) => Ok(value),
        None => Err(MalformedDocument::MissingAttribute { record, attribute }),
    }
}
