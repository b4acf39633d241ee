use std::fmt;
use std::str::Utf8Error;
use derive_more::*;

/// Failure to turn a document into a [`crate::TilesetManifest`].
/// No manifest is produced when one of these is returned.
#[derive(Error, Display, From, Debug)]
pub enum ManifestError {
    #[display(fmt="Malformed tileset document: {_0}")]
    Malformed(MalformedDocument),
    #[display(fmt="Duplicate tile id {id} (tile #{first} and tile #{second})")]
    #[from(ignore)]
    DuplicateId { id: u32, first: usize, second: usize },
}

impl ManifestError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}

/// Structural problems with a tileset document.
#[derive(Error, Display, From, Debug)]
pub enum MalformedDocument {
    #[display(fmt="{_0}")]
    NotUtf8(Utf8Error),
    #[display(fmt="{_0}")]
    Xml(roxmltree::Error),
    #[display(fmt="Expected root <tileset>, found <{found}>")]
    #[from(ignore)]
    UnexpectedRoot { found: String },
    #[display(fmt="{record} is missing attribute '{attribute}'")]
    #[from(ignore)]
    MissingAttribute { record: Record, attribute: &'static str },
    #[display(fmt="{record} has invalid value '{value}' for attribute '{attribute}'")]
    #[from(ignore)]
    InvalidAttribute { record: Record, attribute: &'static str, value: String },
    #[display(fmt="{record} has no <image>")]
    #[from(ignore)]
    MissingImage { record: Record },
}

/// Locates the element an error refers to.
/// Tile positions count <tile> elements from 0 in document order.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Record {
    Tileset,
    TileOffset,
    Grid,
    Property { index: usize },
    Tile { position: usize, id: Option<u32> },
    Image { position: usize, id: Option<u32> },
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Tileset => write!(f, "<tileset>"),
            Record::TileOffset => write!(f, "<tileoffset>"),
            Record::Grid => write!(f, "<grid>"),
            Record::Property { index } => write!(f, "<property> #{index}"),
            Record::Tile { position, id: Some(id) } => write!(f, "<tile> #{position} (id {id})"),
            Record::Tile { position, id: None } => write!(f, "<tile> #{position}"),
            Record::Image { position, id: Some(id) } => write!(f, "<image> of tile #{position} (id {id})"),
            Record::Image { position, id: None } => write!(f, "<image> of tile #{position}"),
        }
    }
}

/// Failure to write a [`crate::TilesetManifest`] as a document.
#[derive(Error, Display, From, Debug)]
pub enum SerializeError {
    #[display(fmt="Character {character:?} of {value:?} cannot be written to XML")]
    #[from(ignore)]
    InvalidCharacter { character: char, value: String },
    #[display(fmt="{_0}")]
    Fmt(fmt::Error),
}
