/// A single addressable tile of a [`crate::TilesetManifest`], backed by its own image.
#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct TileEntry {
    /// ID of tile local to its tileset. Not necessarily contiguous or zero-based.
    pub id: u32,
    /// Path of the image, relative to the manifest's directory.
    pub image_path: String,
    pub width: u32,
    pub height: u32,
    /// Tiled's tile "type".
    pub class: Option<String>,
    pub properties: Properties,
}

impl TileEntry {
    pub fn new(id: u32, image_path: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id,
            image_path: image_path.into(),
            width,
            height,
            class: None,
            properties: Properties::default(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }
}

/// Custom properties in document order.
pub type Properties = Vec<Property>;

/// A custom property attached to a tileset or tile.
#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct Property {
    pub name: String,
    /// Tiled's "type" attribute. IE: int, float, bool, color, file.
    /// Absent means string.
    pub kind: Option<String>,
    pub value: String,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            value: value.into(),
        }
    }

    pub fn typed(name: impl Into<String>, kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: Some(kind.into()),
            value: value.into(),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum Orientation {
    #[default]
    Orthogonal,
    Isometric,
}

impl Orientation {
    pub fn parse(str: &str) -> Option<Self> {
        match str {
            "orthogonal" => Some(Self::Orthogonal),
            "isometric" => Some(Self::Isometric),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Orthogonal => "orthogonal",
            Self::Isometric => "isometric",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum ObjectAlignment {
    #[default]
    Unspecified,
    TopLeft,
    Top,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl ObjectAlignment {
    pub fn parse(str: &str) -> Option<Self> {
        match str {
            "unspecified" => Some(Self::Unspecified),
            "topleft" => Some(Self::TopLeft),
            "top" => Some(Self::Top),
            "topright" => Some(Self::TopRight),
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            "bottomleft" => Some(Self::BottomLeft),
            "bottom" => Some(Self::Bottom),
            "bottomright" => Some(Self::BottomRight),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "unspecified",
            Self::TopLeft => "topleft",
            Self::Top => "top",
            Self::TopRight => "topright",
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::BottomLeft => "bottomleft",
            Self::Bottom => "bottom",
            Self::BottomRight => "bottomright",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum TileRenderSize {
    #[default]
    Tile,
    Grid,
}

impl TileRenderSize {
    pub fn parse(str: &str) -> Option<Self> {
        match str {
            "tile" => Some(Self::Tile),
            "grid" => Some(Self::Grid),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tile => "tile",
            Self::Grid => "grid",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum FillMode {
    #[default]
    Stretch,
    PreserveAspectFit,
}

impl FillMode {
    pub fn parse(str: &str) -> Option<Self> {
        match str {
            "stretch" => Some(Self::Stretch),
            "preserve-aspect-fit" => Some(Self::PreserveAspectFit),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stretch => "stretch",
            Self::PreserveAspectFit => "preserve-aspect-fit",
        }
    }
}

/// Offset in pixels applied when drawing tiles of the set.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct TileOffset { pub x: i32, pub y: i32 }

/// Grid used by Tiled when displaying tile overlays.
/// Carried through unchanged.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Grid {
    pub orientation: Orientation,
    pub width: u32,
    pub height: u32,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            orientation: Orientation::Orthogonal,
            width: 1,
            height: 1,
        }
    }
}
