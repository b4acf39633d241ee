use std::str::FromStr;
use roxmltree::{Document, Node};
use crate::tileset::{FillMode, Grid, MalformedDocument, ObjectAlignment, Orientation, Property, Record, TileOffset, TileRenderSize};

/// A 1:1 mapping of the TSX <tileset> element.
/// Attributes the manifest requires are left optional here and checked when converting.
#[derive(Clone, Default, Debug)]
pub struct Tileset {
    pub version: Option<String>,
    pub tiled_version: Option<String>,
    pub name: Option<String>,
    pub class: Option<String>,
    pub tile_width: Option<u32>,
    pub tile_height: Option<u32>,
    pub spacing: u32,
    pub margin: u32,
    pub tile_count: Option<u32>,
    pub columns: u32,
    pub object_alignment: ObjectAlignment,
    pub tile_render_size: TileRenderSize,
    pub fill_mode: FillMode,
    pub tile_offset: Option<TileOffset>,
    pub grid: Option<Grid>,
    pub properties: Vec<Property>,
    pub tiles: Vec<Tile>,
}

impl Tileset {

    pub fn parse_doc(doc: &Document) -> Result<Self, MalformedDocument> {
        let root = doc.root_element();
        let tag_name = root.tag_name().name();
        if tag_name != "tileset" {
            return Err(MalformedDocument::UnexpectedRoot { found: String::from(tag_name) });
        }
        let mut tileset = Tileset::default();
        tileset.parse(root)?;
        Ok(tileset)
    }

    pub fn parse(&mut self, tileset_node: Node) -> Result<(), MalformedDocument> {

        // Parses attributes
        let record = Record::Tileset;
        for attribute in tileset_node.attributes() {
            let value = attribute.value();
            match attribute.name() {
                "version" => self.version = Some(String::from(value)),
                "tiledversion" => self.tiled_version = Some(String::from(value)),
                "name" => self.name = Some(String::from(value)),
                "class" => self.class = Some(String::from(value)),
                "tilewidth" => self.tile_width = Some(parse_number(record, "tilewidth", value)?),
                "tileheight" => self.tile_height = Some(parse_number(record, "tileheight", value)?),
                "spacing" => self.spacing = parse_number(record, "spacing", value)?,
                "margin" => self.margin = parse_number(record, "margin", value)?,
                "tilecount" => self.tile_count = Some(parse_number(record, "tilecount", value)?),
                "columns" => self.columns = parse_number(record, "columns", value)?,
                "objectalignment" => self.object_alignment = parse_enum(record, "objectalignment", value, ObjectAlignment::parse)?,
                "tilerendersize" => self.tile_render_size = parse_enum(record, "tilerendersize", value, TileRenderSize::parse)?,
                "fillmode" => self.fill_mode = parse_enum(record, "fillmode", value, FillMode::parse)?,
                _ => {}
            }
        }

        // Parses children
        for child in tileset_node.children() {
            match child.tag_name().name() {
                "tileoffset" => self.tile_offset = Some(parse_tile_offset(child)?),
                "grid" => self.grid = Some(parse_grid(child)?),
                "properties" => self.properties = parse_properties(child)?,
                "tile" => {
                    let position = self.tiles.len();
                    self.tiles.push(Tile::parse(child, position)?);
                },
                _ => {}
            }
        }
        Ok(())
    }
}

/// A 1:1 mapping of a TSX <tile> element.
#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct Tile {
    /// Index of the <tile> element among its siblings.
    pub position: usize,
    pub id: Option<u32>,
    pub class: Option<String>,
    pub properties: Vec<Property>,
    pub image: Option<Image>,
}

impl Tile {
    pub fn parse(tile_node: Node, position: usize) -> Result<Tile, MalformedDocument> {
        let mut tile = Tile { position, ..Default::default() };

        // Id first so that later errors can name the tile.
        if let Some(value) = tile_node.attribute("id") {
            let record = Record::Tile { position, id: None };
            tile.id = Some(parse_number(record, "id", value)?);
        }
        for attribute in tile_node.attributes() {
            match attribute.name() {
                "type" | "class" => tile.class = Some(String::from(attribute.value())),
                _ => {}
            }
        }

        for child in tile_node.children() {
            match child.tag_name().name() {
                "properties" => tile.properties = parse_properties(child)?,
                "image" => {
                    let record = Record::Image { position, id: tile.id };
                    tile.image = Some(Image::parse(child, record)?);
                },
                _ => {}
            }
        }
        Ok(tile)
    }

    pub fn record(&self) -> Record {
        Record::Tile { position: self.position, id: self.id }
    }
}

/// A 1:1 mapping of a TSX <image> element.
#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct Image {
    pub source: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Image {
    pub fn parse(image_node: Node, record: Record) -> Result<Image, MalformedDocument> {
        let mut image = Image::default();
        for attribute in image_node.attributes() {
            let value = attribute.value();
            match attribute.name() {
                "source" => image.source = Some(String::from(value)),
                "width" => image.width = Some(parse_number(record, "width", value)?),
                "height" => image.height = Some(parse_number(record, "height", value)?),
                _ => {}
            }
        }
        Ok(image)
    }
}

fn parse_tile_offset(node: Node) -> Result<TileOffset, MalformedDocument> {
    let mut offset = TileOffset::default();
    for attribute in node.attributes() {
        let value = attribute.value();
        match attribute.name() {
            "x" => offset.x = parse_number(Record::TileOffset, "x", value)?,
            "y" => offset.y = parse_number(Record::TileOffset, "y", value)?,
            _ => {}
        }
    }
    Ok(offset)
}

fn parse_grid(node: Node) -> Result<Grid, MalformedDocument> {
    let mut grid = Grid::default();
    for attribute in node.attributes() {
        let value = attribute.value();
        match attribute.name() {
            "orientation" => grid.orientation = parse_enum(Record::Grid, "orientation", value, Orientation::parse)?,
            "width" => grid.width = parse_number(Record::Grid, "width", value)?,
            "height" => grid.height = parse_number(Record::Grid, "height", value)?,
            _ => {}
        }
    }
    Ok(grid)
}

fn parse_properties(properties_node: Node) -> Result<Vec<Property>, MalformedDocument> {
    let mut properties = Vec::new();
    let property_nodes = properties_node
        .children()
        .filter(|node| node.tag_name().name() == "property");
    for (index, node) in property_nodes.enumerate() {
        let record = Record::Property { index };
        let name = node
            .attribute("name")
            .ok_or(MalformedDocument::MissingAttribute { record, attribute: "name" })?;

        // Multi-line strings are stored as text instead of an attribute.
        let value = node
            .attribute("value")
            .or_else(|| node.text())
            .unwrap_or_default();
        properties.push(Property {
            name: String::from(name),
            kind: node.attribute("type").map(String::from),
            value: String::from(value),
        });
    }
    Ok(properties)
}

fn parse_number<T: FromStr>(record: Record, attribute: &'static str, value: &str) -> Result<T, MalformedDocument> {
    value.trim().parse().map_err(|_| MalformedDocument::InvalidAttribute {
        record,
        attribute,
        value: String::from(value),
    })
}

fn parse_enum<T>(
    record: Record,
    attribute: &'static str,
    value: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, MalformedDocument> {
    parse(value).ok_or_else(|| MalformedDocument::InvalidAttribute {
        record,
        attribute,
        value: String::from(value),
    })
}
