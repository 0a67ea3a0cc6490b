//! NetrunnerDB routes and the keys the cache files them under.

use std::fmt;
use std::path::PathBuf;

/// Extension of every cache file.
pub const CACHE_EXTENSION: &str = "json";

/// The entity kinds the public API exposes. Each has a list route (`cards`)
/// and a get-by-code route (`card`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Card,
    Cycle,
    Faction,
    Pack,
    Side,
    Type,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Card,
        Collection::Cycle,
        Collection::Faction,
        Collection::Pack,
        Collection::Side,
        Collection::Type,
    ];

    pub fn list_route(self) -> &'static str {
        match self {
            Self::Card => "cards",
            Self::Cycle => "cycles",
            Self::Faction => "factions",
            Self::Pack => "packs",
            Self::Side => "sides",
            Self::Type => "types",
        }
    }

    pub fn get_route(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Cycle => "cycle",
            Self::Faction => "faction",
            Self::Pack => "pack",
            Self::Side => "side",
            Self::Type => "type",
        }
    }
}

/// A route plus its parameters, e.g. `packs` or `pack/core`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    route: &'static str,
    params: Vec<String>,
}

impl CacheKey {
    pub fn list(collection: Collection) -> Self {
        Self {
            route: collection.list_route(),
            params: Vec::new(),
        }
    }

    pub fn get(collection: Collection, id: &str) -> Self {
        Self {
            route: collection.get_route(),
            params: vec![id.to_string()],
        }
    }

    pub fn route(&self) -> &'static str {
        self.route
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// The id of a get route.
    pub fn id(&self) -> Option<&str> {
        self.params.first().map(String::as_str)
    }

    /// Path of the cache file relative to the cache root: `route[/param...].json`.
    ///
    /// Parameters are percent-encoded: every byte outside `[A-Za-z0-9-]`
    /// becomes `%XX`, so distinct ids get distinct files and none can escape
    /// the cache root. An empty id is stored as a lone `%`.
    pub fn relative_path(&self) -> PathBuf {
        let mut path = PathBuf::from(self.route);
        for param in &self.params {
            path.push(encode_param(param));
        }
        path.set_extension(CACHE_EXTENSION);
        path
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.route)?;
        for param in &self.params {
            write!(f, "/{param}")?;
        }
        Ok(())
    }
}

fn encode_param(param: &str) -> String {
    if param.is_empty() {
        return "%".to_string();
    }
    let mut encoded = String::with_capacity(param.len());
    for byte in param.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

/// Inverse of the file-name encoding, for displaying cached keys.
/// Malformed escapes are kept as written.
pub(crate) fn decode_param(name: &str) -> String {
    if name == "%" {
        return String::new();
    }
    let bytes = name.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = name
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(byte) = byte {
                decoded.push(byte);
                i += 3;
                continue;
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&decoded).into_owned()
}
