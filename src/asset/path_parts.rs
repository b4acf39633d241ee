use std::fmt;
use crate::LoadError;

/// Where a manifest is read from: the protocol that serves the bytes and the path it serves them under.
/// The extension is guaranteed to be present.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct AssetPath {
    pub protocol: String,
    /// Directory the path is relative to, if any.
    pub prefix: Option<String>,
    path: String,
    extension_start: usize,
}

impl AssetPath {

    /// Splits "protocol://dir/name.ext". Paths without a protocol use the default one.
    pub fn parse(path: &str, default_protocol: Option<&str>) -> Result<Self, LoadError> {
        let (protocol, path) = match path.split_once("://") {
            Some((protocol, path)) => (protocol, path),
            None => match default_protocol {
                Some(protocol) => (protocol, path),
                None => return Err(LoadError::NoDefaultProtocol),
            },
        };

        // Dots in directory names are not extensions.
        let file_name_start = path.rfind('/').map_or(0, |slash| slash + 1);
        let extension_start = match path[file_name_start..].rfind('.') {
            Some(0) | None => return Err(LoadError::PathMissingExtension),
            Some(dot) if file_name_start + dot + 1 == path.len() => return Err(LoadError::PathMissingExtension),
            Some(dot) => file_name_start + dot + 1,
        };

        Ok(Self {
            protocol: String::from(protocol),
            prefix: None,
            path: String::from(path),
            extension_start,
        })
    }

    pub fn with_prefix(mut self, prefix: Option<&str>) -> Self {
        self.prefix = prefix.map(String::from);
        self
    }

    /// Path as given, without protocol or prefix.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn extension(&self) -> &str {
        &self.path[self.extension_start..]
    }

    /// Path the protocol reads from: prefix and path joined.
    pub fn location(&self) -> String {
        match self.prefix.as_deref() {
            Some(prefix) => format!("{prefix}/{}", self.path),
            None => self.path.clone(),
        }
    }

    /// Cache key. Equal for spellings that read the same bytes, IE: with or without the default protocol.
    pub fn key(&self) -> AssetKey {
        AssetKey(fxhash::hash64(&(self.protocol.as_str(), self.location())))
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.location())
    }
}

/// Hash of a protocol and location.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct AssetKey(pub u64);
