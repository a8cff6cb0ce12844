//! Dynamically typed values exchanged with the remote daemon.
//!
//! Every property and method argument crossing the bus is represented as a
//! [`RemoteValue`]. Narrowing a value to the shape a caller expects happens in
//! exactly one place, the property decoder.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use crate::types::constants::bus;

/// String-keyed map of dynamically typed values (D-Bus `a{sv}`).
pub type PropertyMap = HashMap<String, RemoteValue>;

/// Opaque path naming a remote object (interface, network profile or BSS).
///
/// A handle is only meaningful to the daemon; it may disappear at any time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectHandle(String);

impl ObjectHandle {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The root object of the daemon.
    pub fn root() -> Self {
        Self(bus::ROOT_PATH.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the `"/"` placeholder meaning "no object".
    pub fn is_none_path(&self) -> bool {
        self.0 == bus::NONE_PATH
    }
}

impl Display for ObjectHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectHandle {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// Tagged union over every value shape the object model uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RemoteValue {
    Bool(bool),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Bytes(Vec<u8>),
    Str(String),
    StrList(Vec<String>),
    ObjectPath(ObjectHandle),
    ObjectPathList(Vec<ObjectHandle>),
    Map(PropertyMap),
    /// A signal or reply value outside the object model, kept as its
    /// rendered text.
    Other(String),
}

impl RemoteValue {
    /// Short name of the carried shape, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int16(_) => "int16",
            Self::UInt16(_) => "uint16",
            Self::Int32(_) => "int32",
            Self::UInt32(_) => "uint32",
            Self::Bytes(_) => "bytes",
            Self::Str(_) => "string",
            Self::StrList(_) => "string list",
            Self::ObjectPath(_) => "object path",
            Self::ObjectPathList(_) => "object path list",
            Self::Map(_) => "map",
            Self::Other(_) => "other",
        }
    }
}

impl Display for RemoteValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::UInt16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::Bytes(b) => f.write_str(&crate::util::utils::format_hex(b)),
            Self::Str(s) => f.write_str(s),
            Self::StrList(list) => write!(f, "[{}]", list.join(" ")),
            Self::ObjectPath(p) => write!(f, "{p}"),
            Self::ObjectPathList(list) => {
                let paths: Vec<&str> = list.iter().map(ObjectHandle::as_str).collect();
                write!(f, "[{}]", paths.join(" "))
            }
            Self::Map(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                let entries: Vec<String> = keys
                    .into_iter()
                    .map(|k| format!("{k}: {}", map[k]))
                    .collect();
                write!(f, "{{{}}}", entries.join(", "))
            }
            Self::Other(text) => f.write_str(text),
        }
    }
}

impl From<bool> for RemoteValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u32> for RemoteValue {
    fn from(v: u32) -> Self {
        Self::UInt32(v)
    }
}

impl From<&str> for RemoteValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for RemoteValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<u8>> for RemoteValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<ObjectHandle> for RemoteValue {
    fn from(v: ObjectHandle) -> Self {
        Self::ObjectPath(v)
    }
}

impl From<PropertyMap> for RemoteValue {
    fn from(v: PropertyMap) -> Self {
        Self::Map(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_path_detection() {
        assert!(ObjectHandle::new("/").is_none_path());
        assert!(!ObjectHandle::root().is_none_path());
    }

    #[test]
    fn display_sorts_map_keys() {
        let mut map = PropertyMap::new();
        map.insert("b".into(), RemoteValue::UInt32(2));
        map.insert("a".into(), RemoteValue::Str("x".into()));
        assert_eq!(RemoteValue::Map(map).to_string(), "{a: x, b: 2}");
    }

    #[test]
    fn display_bytes_as_hex() {
        let v = RemoteValue::Bytes(vec![0xde, 0xad]);
        assert_eq!(v.to_string(), "de:ad");
    }
}
