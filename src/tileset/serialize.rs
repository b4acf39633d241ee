use std::fmt::{self, Write};
use crate::{FillMode, ObjectAlignment, Property, SerializeError, TileRenderSize, TilesetManifest};

impl TilesetManifest {
    /// Writes the manifest as a .tsx document, laid out the way Tiled writes them.
    /// Tiles are written in ascending id order.
    /// Fails if a string holds a character XML 1.0 cannot represent.
    pub fn serialize(&self) -> Result<String, SerializeError> {
        let mut out = String::new();
        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;

        // Tileset attributes, defaults omitted
        out.push_str("<tileset");
        if let Some(version) = &self.version {
            write_attribute(&mut out, "version", version)?;
        }
        if let Some(tiled_version) = &self.tiled_version {
            write_attribute(&mut out, "tiledversion", tiled_version)?;
        }
        write_attribute(&mut out, "name", &self.name)?;
        if let Some(class) = &self.class {
            write_attribute(&mut out, "class", class)?;
        }
        write_attribute(&mut out, "tilewidth", self.tile_width)?;
        write_attribute(&mut out, "tileheight", self.tile_height)?;
        if self.spacing != 0 {
            write_attribute(&mut out, "spacing", self.spacing)?;
        }
        if self.margin != 0 {
            write_attribute(&mut out, "margin", self.margin)?;
        }
        write_attribute(&mut out, "tilecount", self.tile_count)?;
        write_attribute(&mut out, "columns", self.columns)?;
        if self.object_alignment != ObjectAlignment::Unspecified {
            write_attribute(&mut out, "objectalignment", self.object_alignment.as_str())?;
        }
        if self.tile_render_size != TileRenderSize::Tile {
            write_attribute(&mut out, "tilerendersize", self.tile_render_size.as_str())?;
        }
        if self.fill_mode != FillMode::Stretch {
            write_attribute(&mut out, "fillmode", self.fill_mode.as_str())?;
        }

        let has_children = self.tile_offset.is_some()
            || self.grid.is_some()
            || !self.properties.is_empty()
            || !self.is_empty();
        if !has_children {
            out.push_str("/>\n");
            return Ok(out);
        }
        out.push_str(">\n");

        if let Some(offset) = self.tile_offset {
            writeln!(out, r#" <tileoffset x="{}" y="{}"/>"#, offset.x, offset.y)?;
        }
        if let Some(grid) = self.grid {
            writeln!(
                out,
                r#" <grid orientation="{}" width="{}" height="{}"/>"#,
                grid.orientation.as_str(), grid.width, grid.height
            )?;
        }
        write_properties(&mut out, &self.properties, " ")?;

        for entry in self.entries() {
            out.push_str(" <tile");
            write_attribute(&mut out, "id", entry.id)?;
            if let Some(class) = &entry.class {
                write_attribute(&mut out, "type", class)?;
            }
            out.push_str(">\n");
            write_properties(&mut out, &entry.properties, "  ")?;
            out.push_str("  <image");
            write_attribute(&mut out, "width", entry.width)?;
            write_attribute(&mut out, "height", entry.height)?;
            write_attribute(&mut out, "source", &entry.image_path)?;
            out.push_str("/>\n");
            out.push_str(" </tile>\n");
        }
        out.push_str("</tileset>\n");
        Ok(out)
    }
}

fn write_attribute(out: &mut String, name: &str, value: impl fmt::Display) -> Result<(), SerializeError> {
    write!(out, r#" {name}=""#)?;
    write_escaped(out, &value.to_string(), Context::Attribute)?;
    out.push('"');
    Ok(())
}

/// Multi-line values are stored as element text, as Tiled does.
fn write_properties(out: &mut String, properties: &[Property], indent: &str) -> Result<(), SerializeError> {
    if properties.is_empty() {
        return Ok(());
    }
    writeln!(out, "{indent}<properties>")?;
    for property in properties {
        write!(out, "{indent} <property")?;
        write_attribute(out, "name", &property.name)?;
        if let Some(kind) = &property.kind {
            write_attribute(out, "type", kind)?;
        }
        if property.value.contains('\n') {
            out.push('>');
            write_escaped(out, &property.value, Context::Text)?;
            out.push_str("</property>\n");
        }
        else {
            write_attribute(out, "value", &property.value)?;
            out.push_str("/>\n");
        }
    }
    writeln!(out, "{indent}</properties>")?;
    Ok(())
}

#[derive(Copy, Clone, Eq, PartialEq)]
enum Context {
    Attribute,
    Text,
}

/// Whether XML 1.0 can carry the character at all, escaped or not.
pub(crate) fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Escapes a value for use inside a double-quoted attribute or as element text.
/// Whitespace that parsers would normalize becomes a character reference.
fn write_escaped(out: &mut String, value: &str, context: Context) -> Result<(), SerializeError> {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            '"' if context == Context::Attribute => out.push_str("&quot;"),
            '\n' if context == Context::Attribute => out.push_str("&#10;"),
            '\t' if context == Context::Attribute => out.push_str("&#9;"),
            c if !is_xml_char(c) => return Err(SerializeError::InvalidCharacter {
                character: c,
                value: String::from(value),
            }),
            c => out.push(c),
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use quickcheck::{quickcheck, Arbitrary, Gen};
    use crate::{FillMode, Grid, ObjectAlignment, Orientation, Property, SerializeError, TileEntry, TileOffset, TileRenderSize, TilesetManifest};
    use super::is_xml_char;

    const STAIRS: &str = include_str!("../../assets/tile_sets/stairs.tsx");
    const WALLS: &str = include_str!("../../assets/tile_sets/walls.tsx");

    #[test]
    fn reproduces_tiled_output() {
        for source in [STAIRS, WALLS] {
            let manifest = TilesetManifest::parse(source).unwrap();
            assert_eq!(source, manifest.serialize().unwrap());
        }
    }

    #[test]
    fn reproduces_multi_line_properties() {
        let source = r#"<?xml version="1.0" encoding="UTF-8"?>
<tileset version="1.10" tiledversion="1.10.2" name="notes" tilewidth="256" tileheight="512" tilecount="1" columns="0">
 <properties>
  <property name="notes">first line
second &amp; last line</property>
  <property name="short" value="one line"/>
 </properties>
 <tile id="3">
  <properties>
   <property name="script" type="file">a.lua
b.lua</property>
  </properties>
  <image width="256" height="512" source="stairs/stairs_E.png"/>
 </tile>
</tileset>
"#;
        let manifest = TilesetManifest::parse(source).unwrap();
        assert_eq!("first line\nsecond & last line", manifest.properties[0].value);
        assert_eq!(source, manifest.serialize().unwrap());
    }

    #[test]
    fn round_trip_fixtures() {
        for source in [STAIRS, WALLS] {
            let manifest = TilesetManifest::parse(source).unwrap();
            let reparsed = TilesetManifest::parse(&manifest.serialize().unwrap()).unwrap();
            assert_eq!(manifest, reparsed);
        }
    }

    #[test]
    fn round_trip_everything_set() {
        let mut manifest = TilesetManifest::new(r#"odd "name" & <co>"#, 64, 128)
            .with_entry(TileEntry::new(90, "props/barrel.png", 64, 128)
                .with_class("Prop")
                .with_property(Property::typed("weight", "float", "12.5")))
            .with_entry(TileEntry::new(1, "props/crate's lid.png", 32, 32))
            .with_entry(TileEntry::new(17, "props/tab\there.png", 64, 128));
        manifest.version = Some(String::from("1.10"));
        manifest.class = Some(String::from("Props"));
        manifest.spacing = 2;
        manifest.margin = 1;
        manifest.object_alignment = ObjectAlignment::BottomLeft;
        manifest.fill_mode = FillMode::PreserveAspectFit;
        manifest.tile_offset = Some(TileOffset { x: -3, y: 7 });
        manifest.grid = Some(Grid { orientation: Orientation::Isometric, width: 64, height: 32 });
        manifest.properties.push(Property::new("notes", "first line\r\nsecond line"));
        manifest.properties.push(Property::typed("visible", "bool", "true"));

        let document = manifest.serialize().unwrap();
        let reparsed = TilesetManifest::parse(&document).unwrap();
        assert_eq!(manifest, reparsed);
        assert_eq!("first line\r\nsecond line", reparsed.properties[0].value);
    }

    #[test]
    fn rejects_characters_xml_cannot_hold() {
        let manifest = TilesetManifest::new("bad\u{1}name", 1, 1)
            .with_entry(TileEntry::new(1, "a.png", 1, 1));
        match manifest.serialize() {
            Err(SerializeError::InvalidCharacter { character, value }) => {
                assert_eq!('\u{1}', character);
                assert_eq!("bad\u{1}name", value);
            },
            other => panic!("Unexpected result {other:?}"),
        }

        let manifest = TilesetManifest::new("fine", 1, 1)
            .with_entry(TileEntry::new(1, "a.png", 1, 1)
                .with_property(Property::new("notes", "nul\u{0}\nbyte")));
        assert!(manifest.serialize().is_err());

        let manifest = TilesetManifest::new("fine", 1, 1)
            .with_entry(TileEntry::new(1, "a\u{FFFF}.png", 1, 1));
        assert!(manifest.serialize().is_err());
    }

    #[test]
    fn empty_tileset() {
        let manifest = TilesetManifest::new("empty", 16, 16);
        let document = manifest.serialize().unwrap();
        assert!(document.ends_with("columns=\"0\"/>\n"));
        assert_eq!(manifest, TilesetManifest::parse(&document).unwrap());
    }

    #[test]
    fn tiles_written_in_id_order() {
        let manifest = TilesetManifest::new("order", 8, 8)
            .with_entry(TileEntry::new(30, "c.png", 8, 8))
            .with_entry(TileEntry::new(3, "a.png", 8, 8))
            .with_entry(TileEntry::new(12, "b.png", 8, 8));
        let document = manifest.serialize().unwrap();
        let a = document.find("a.png").unwrap();
        let b = document.find("b.png").unwrap();
        let c = document.find("c.png").unwrap();
        assert!(a < b && b < c);
    }

    /// Any manifest the model allows, restricted to strings XML can carry.
    #[derive(Clone, Debug)]
    struct ValidManifest(TilesetManifest);

    fn xml_string(g: &mut Gen) -> String {
        String::arbitrary(g).chars().filter(|c| is_xml_char(*c)).collect()
    }

    fn optional_xml_string(g: &mut Gen) -> Option<String> {
        match bool::arbitrary(g) {
            true => Some(xml_string(g)),
            false => None,
        }
    }

    fn dimension(g: &mut Gen) -> u32 {
        u32::arbitrary(g).max(1)
    }

    fn properties(g: &mut Gen) -> Vec<Property> {
        let count = usize::arbitrary(g) % 4;
        (0..count)
            .map(|_| {
                let mut value = xml_string(g);
                if bool::arbitrary(g) {
                    value.push('\n');
                    value.push_str(&xml_string(g));
                }
                Property {
                    name: xml_string(g),
                    kind: g.choose(&[None, Some("int"), Some("file"), Some("")]).copied().flatten().map(String::from),
                    value,
                }
            })
            .collect()
    }

    impl Arbitrary for ValidManifest {
        fn arbitrary(g: &mut Gen) -> Self {
            let mut manifest = TilesetManifest::new(xml_string(g), dimension(g), dimension(g));
            manifest.version = optional_xml_string(g);
            manifest.tiled_version = optional_xml_string(g);
            manifest.class = optional_xml_string(g);
            manifest.spacing = u32::arbitrary(g);
            manifest.margin = u32::arbitrary(g);
            manifest.object_alignment = *g.choose(&[ObjectAlignment::Unspecified, ObjectAlignment::Top, ObjectAlignment::BottomRight]).unwrap();
            manifest.tile_render_size = *g.choose(&[TileRenderSize::Tile, TileRenderSize::Grid]).unwrap();
            manifest.fill_mode = *g.choose(&[FillMode::Stretch, FillMode::PreserveAspectFit]).unwrap();
            if bool::arbitrary(g) {
                manifest.tile_offset = Some(TileOffset { x: i32::arbitrary(g), y: i32::arbitrary(g) });
            }
            if bool::arbitrary(g) {
                let orientation = *g.choose(&[Orientation::Orthogonal, Orientation::Isometric]).unwrap();
                manifest.grid = Some(Grid { orientation, width: u32::arbitrary(g), height: u32::arbitrary(g) });
            }
            manifest.properties = properties(g);

            // Sparse ids, the same id twice keeps the last entry.
            let ids: Vec<u32> = Arbitrary::arbitrary(g);
            for id in ids {
                let mut image_path = xml_string(g);
                if image_path.is_empty() {
                    image_path.push_str("tile.png");
                }
                let mut entry = TileEntry::new(id, image_path, dimension(g), dimension(g));
                entry.class = optional_xml_string(g);
                entry.properties = properties(g);
                manifest.insert(entry);
            }
            manifest.tile_count = u32::arbitrary(g);
            ValidManifest(manifest)
        }
    }

    quickcheck! {
        fn serialized_manifests_parse_back(manifest: ValidManifest) -> bool {
            let Ok(document) = manifest.0.serialize() else {
                return false
            };
            match TilesetManifest::parse(&document) {
                Ok(reparsed) => reparsed == manifest.0,
                Err(_) => false,
            }
        }
    }
}
