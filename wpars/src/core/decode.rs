//! Property decoding.
//!
//! The object model's property shapes are fixed by wpa_supplicant's published
//! schema, so every narrowing from [`RemoteValue`] to a concrete type happens
//! here. A value of the wrong shape is a defect and is reported as
//! [`SupplicantError::DecodeShapeMismatch`]; an absent key or a `"/"` object
//! path decodes to `None`.

use log::error;
use std::fmt::{Display, Formatter};

use crate::Result;
use crate::api::models::{SecurityInfo, SignalInfo, SupplicantError};
use crate::types::value::{ObjectHandle, PropertyMap, RemoteValue};
use crate::util::utils::{decode_ssid, format_hex};

/// Shape a caller expects a property to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Bool,
    UInt16,
    UInt32,
    Int16,
    Int32,
    /// Raw bytes, consumed programmatically.
    Bytes,
    /// Bytes rendered as `aa:bb:cc`.
    Hex,
    /// UTF-8 text, from a string or from bytes.
    Text,
    StrList,
    ObjectPath,
    ObjectPathList,
    Map,
}

impl Display for Shape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Bytes => "bytes",
            Self::Hex => "bytes (hex)",
            Self::Text => "text",
            Self::StrList => "string list",
            Self::ObjectPath => "object path",
            Self::ObjectPathList => "object path list",
            Self::Map => "map",
        };
        f.write_str(name)
    }
}

/// A value narrowed to its expected shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// Key absent, or an object path of `"/"`.
    None,
    Bool(bool),
    UInt16(u16),
    UInt32(u32),
    Int16(i16),
    Int32(i32),
    Bytes(Vec<u8>),
    Text(String),
    StrList(Vec<String>),
    ObjectPath(ObjectHandle),
    ObjectPathList(Vec<ObjectHandle>),
    Map(PropertyMap),
}

fn mismatch(property: &str, expected: Shape, found: &RemoteValue) -> SupplicantError {
    error!(
        "Property {property} has shape {} but the object model documents {expected}",
        found.kind()
    );
    SupplicantError::DecodeShapeMismatch {
        property: property.to_string(),
        expected: expected.to_string(),
        found: found.kind().to_string(),
    }
}

/// Narrows `raw` to `shape`. `property` names the value in diagnostics.
pub fn decode(raw: Option<&RemoteValue>, shape: Shape, property: &str) -> Result<Decoded> {
    let Some(raw) = raw else {
        return Ok(Decoded::None);
    };

    let decoded = match (shape, raw) {
        (Shape::Bool, RemoteValue::Bool(v)) => Decoded::Bool(*v),
        (Shape::UInt16, RemoteValue::UInt16(v)) => Decoded::UInt16(*v),
        (Shape::UInt32, RemoteValue::UInt32(v)) => Decoded::UInt32(*v),
        (Shape::Int16, RemoteValue::Int16(v)) => Decoded::Int16(*v),
        (Shape::Int32, RemoteValue::Int32(v)) => Decoded::Int32(*v),
        (Shape::Bytes, RemoteValue::Bytes(b)) => Decoded::Bytes(b.clone()),
        (Shape::Hex, RemoteValue::Bytes(b)) => Decoded::Text(format_hex(b)),
        (Shape::Text, RemoteValue::Str(s)) => Decoded::Text(s.clone()),
        (Shape::Text, RemoteValue::Bytes(b)) => Decoded::Text(decode_ssid(b).into_owned()),
        (Shape::StrList, RemoteValue::StrList(list)) => Decoded::StrList(list.clone()),
        (Shape::ObjectPath, RemoteValue::ObjectPath(p)) if p.is_none_path() => Decoded::None,
        (Shape::ObjectPath, RemoteValue::ObjectPath(p)) => Decoded::ObjectPath(p.clone()),
        (Shape::ObjectPathList, RemoteValue::ObjectPathList(list)) => {
            Decoded::ObjectPathList(list.clone())
        }
        (Shape::Map, RemoteValue::Map(map)) => Decoded::Map(map.clone()),
        (shape, found) => return Err(mismatch(property, shape, found)),
    };

    Ok(decoded)
}

// Typed accessors. Each returns `None` only where `decode` yields
// `Decoded::None`; any other variant here would be a bug in `decode`.

macro_rules! typed {
    ($(#[$doc:meta])* $name:ident, $shape:ident, $variant:ident, $ty:ty) => {
        $(#[$doc])*
        pub fn $name(raw: Option<&RemoteValue>, property: &str) -> Result<Option<$ty>> {
            match decode(raw, Shape::$shape, property)? {
                Decoded::$variant(v) => Ok(Some(v)),
                _ => Ok(None),
            }
        }
    };
}

typed!(decode_bool, Bool, Bool, bool);
typed!(decode_u16, UInt16, UInt16, u16);
typed!(decode_u32, UInt32, UInt32, u32);
typed!(decode_i16, Int16, Int16, i16);
typed!(decode_i32, Int32, Int32, i32);
typed!(decode_bytes, Bytes, Bytes, Vec<u8>);
typed!(
    /// Text from a string, or from bytes decoded as (lossy) UTF-8.
    decode_text, Text, Text, String
);
typed!(decode_str_list, StrList, StrList, Vec<String>);
typed!(
    /// An object reference; `"/"` decodes to `None`.
    decode_path, ObjectPath, ObjectPath, ObjectHandle
);
typed!(decode_path_list, ObjectPathList, ObjectPathList, Vec<ObjectHandle>);
typed!(decode_map, Map, Map, PropertyMap);

/// Looks up `key` in a nested map.
pub fn field<'a>(map: &'a PropertyMap, key: &str) -> Option<&'a RemoteValue> {
    map.get(key)
}

/// Decodes a `RSN` / `WPA` negotiation map.
///
/// `KeyMgmt` and `Pairwise` are string lists, `Group` a string; each key is
/// decoded independently and absent keys leave the field empty.
pub fn decode_security(map: &PropertyMap, property: &str) -> Result<SecurityInfo> {
    Ok(SecurityInfo {
        key_mgmt: decode_str_list(field(map, "KeyMgmt"), &format!("{property}.KeyMgmt"))?
            .unwrap_or_default(),
        pairwise: decode_str_list(field(map, "Pairwise"), &format!("{property}.Pairwise"))?
            .unwrap_or_default(),
        group: decode_text(field(map, "Group"), &format!("{property}.Group"))?,
    })
}

/// Decodes the `SignalPoll` reply.
///
/// `frequency` is reported as uint32 by wpa_supplicant; the rest are int32.
pub fn decode_signal_info(map: PropertyMap) -> Result<SignalInfo> {
    Ok(SignalInfo {
        rssi: decode_i32(field(&map, "rssi"), "rssi")?,
        linkspeed: decode_i32(field(&map, "linkspeed"), "linkspeed")?,
        noise: decode_i32(field(&map, "noise"), "noise")?,
        frequency: decode_u32(field(&map, "frequency"), "frequency")?,
        width: decode_text(field(&map, "width"), "width")?,
        center_frq1: decode_i32(field(&map, "center-frq1"), "center-frq1")?,
        center_frq2: decode_i32(field(&map, "center-frq2"), "center-frq2")?,
        raw: map,
    })
}

/// Reads a profile's `disabled` setting.
///
/// wpa_supplicant reports network settings as strings (`"0"` / `"1"`).
pub fn decode_disabled(map: &PropertyMap) -> Result<Option<bool>> {
    Ok(decode_text(field(map, "disabled"), "disabled")?.map(|v| v.trim() != "0"))
}
