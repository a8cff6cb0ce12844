//! Conversions between zvariant values and [`RemoteValue`].

use log::debug;
use std::collections::HashMap;
use zbus::message::Message;
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::Result;
use crate::api::models::SupplicantError;
use crate::types::value::{ObjectHandle, PropertyMap, RemoteValue};

fn unsupported(found: impl Into<String>) -> SupplicantError {
    SupplicantError::DecodeShapeMismatch {
        property: "<wire value>".into(),
        expected: "a type of the wpa_supplicant object model".into(),
        found: found.into(),
    }
}

fn handle(path: &ObjectPath<'_>) -> ObjectHandle {
    ObjectHandle::new(path.as_str())
}

/// Parses a handle into a D-Bus object path.
pub(crate) fn object_path(handle: &ObjectHandle) -> Result<ObjectPath<'static>> {
    ObjectPath::try_from(handle.as_str().to_owned())
        .map_err(|_| SupplicantError::InvalidObjectPath(handle.to_string()))
}

fn map_from_owned(map: HashMap<String, OwnedValue>) -> Result<PropertyMap> {
    map.into_iter()
        .map(|(key, value)| Ok((key, from_zvariant(&value)?)))
        .collect()
}

/// Converts a received value into a [`RemoteValue`].
pub(crate) fn from_zvariant(value: &Value<'_>) -> Result<RemoteValue> {
    Ok(match value {
        Value::Bool(v) => RemoteValue::Bool(*v),
        Value::U8(v) => RemoteValue::UInt16(u16::from(*v)),
        Value::I16(v) => RemoteValue::Int16(*v),
        Value::U16(v) => RemoteValue::UInt16(*v),
        Value::I32(v) => RemoteValue::Int32(*v),
        Value::U32(v) => RemoteValue::UInt32(*v),
        Value::Str(s) => RemoteValue::Str(s.to_string()),
        Value::ObjectPath(p) => RemoteValue::ObjectPath(handle(p)),
        Value::Value(inner) => from_zvariant(inner)?,
        Value::Array(array) => {
            let element = array.element_signature().to_string();
            let owned = value.try_clone().map_err(zbus::Error::from)?;
            match element.as_str() {
                "y" => RemoteValue::Bytes(Vec::<u8>::try_from(owned).map_err(zbus::Error::from)?),
                "s" => RemoteValue::StrList(
                    Vec::<String>::try_from(owned).map_err(zbus::Error::from)?,
                ),
                "o" => {
                    let paths = Vec::<OwnedObjectPath>::try_from(owned).map_err(zbus::Error::from)?;
                    RemoteValue::ObjectPathList(paths.iter().map(|p| handle(p)).collect())
                }
                other => return Err(unsupported(format!("array of {other}"))),
            }
        }
        Value::Dict(_) => {
            let owned = value.try_clone().map_err(zbus::Error::from)?;
            let map =
                HashMap::<String, OwnedValue>::try_from(owned).map_err(zbus::Error::from)?;
            RemoteValue::Map(map_from_owned(map)?)
        }
        other => return Err(unsupported(other.value_signature().to_string())),
    })
}

/// Like [`from_zvariant`], but never fails: a value outside the object model
/// (e.g. the `au` of a BSS's `Rates`) becomes [`RemoteValue::Other`].
/// Dictionary entries are converted one by one.
pub(crate) fn from_zvariant_lossy(value: &Value<'_>) -> RemoteValue {
    match value {
        Value::Value(inner) => from_zvariant_lossy(inner),
        Value::Dict(_) => value
            .try_clone()
            .ok()
            .and_then(|owned| HashMap::<String, OwnedValue>::try_from(owned).ok())
            .map(|map| RemoteValue::Map(map_from_owned_lossy(map)))
            .unwrap_or_else(|| RemoteValue::Other(value.to_string())),
        _ => from_zvariant(value).unwrap_or_else(|_| RemoteValue::Other(value.to_string())),
    }
}

fn map_from_owned_lossy(map: HashMap<String, OwnedValue>) -> PropertyMap {
    map.into_iter()
        .map(|(key, value)| {
            let converted = from_zvariant_lossy(&value);
            (key, converted)
        })
        .collect()
}

/// Converts a [`RemoteValue`] into a zvariant value for sending.
pub(crate) fn to_zvariant(value: &RemoteValue) -> Result<Value<'static>> {
    Ok(match value {
        RemoteValue::Bool(v) => Value::from(*v),
        RemoteValue::Int16(v) => Value::from(*v),
        RemoteValue::UInt16(v) => Value::from(*v),
        RemoteValue::Int32(v) => Value::from(*v),
        RemoteValue::UInt32(v) => Value::from(*v),
        RemoteValue::Bytes(b) => Value::from(b.clone()),
        RemoteValue::Str(s) => Value::from(s.clone()),
        RemoteValue::StrList(list) => Value::from(list.clone()),
        RemoteValue::ObjectPath(p) => Value::from(object_path(p)?),
        RemoteValue::ObjectPathList(list) => {
            let paths = list.iter().map(object_path).collect::<Result<Vec<_>>>()?;
            Value::from(paths)
        }
        RemoteValue::Map(map) => Value::from(to_dict(map)?),
        RemoteValue::Other(text) => {
            return Err(SupplicantError::UnsupportedArguments(format!(
                "cannot send unmodelled value {text}"
            )));
        }
    })
}

/// Converts a property map into an `a{sv}` dictionary.
pub(crate) fn to_dict(map: &PropertyMap) -> Result<HashMap<String, Value<'static>>> {
    map.iter()
        .map(|(key, value)| Ok((key.clone(), to_zvariant(value)?)))
        .collect()
}

/// Decodes the arguments of a reply or signal body.
///
/// Only the body signatures the wpa_supplicant API uses are understood;
/// anything else yields no arguments. Values inside variants and
/// dictionaries are converted losslessly; narrowing them is left to the
/// property decoder.
pub(crate) fn body_args(msg: &Message) -> Result<Vec<RemoteValue>> {
    let body = msg.body();
    let signature = body.signature().to_string();
    let signature = signature
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(&signature);

    let args = match signature {
        "" => Vec::new(),
        "b" => vec![RemoteValue::Bool(body.deserialize::<bool>()?)],
        "s" => vec![RemoteValue::Str(body.deserialize::<String>()?)],
        "u" => vec![RemoteValue::UInt32(body.deserialize::<u32>()?)],
        "i" => vec![RemoteValue::Int32(body.deserialize::<i32>()?)],
        "o" => {
            let path: OwnedObjectPath = body.deserialize()?;
            vec![RemoteValue::ObjectPath(handle(&path))]
        }
        "ay" => vec![RemoteValue::Bytes(body.deserialize::<Vec<u8>>()?)],
        "ao" => {
            let paths: Vec<OwnedObjectPath> = body.deserialize()?;
            vec![RemoteValue::ObjectPathList(
                paths.iter().map(|p| handle(p)).collect(),
            )]
        }
        "v" => {
            let value: OwnedValue = body.deserialize()?;
            vec![from_zvariant_lossy(&value)]
        }
        "a{sv}" => {
            let map: HashMap<String, OwnedValue> = body.deserialize()?;
            vec![RemoteValue::Map(map_from_owned_lossy(map))]
        }
        "oa{sv}" => {
            let (path, map): (OwnedObjectPath, HashMap<String, OwnedValue>) =
                body.deserialize()?;
            vec![
                RemoteValue::ObjectPath(handle(&path)),
                RemoteValue::Map(map_from_owned_lossy(map)),
            ]
        }
        "sa{sv}" => {
            let (name, map): (String, HashMap<String, OwnedValue>) = body.deserialize()?;
            vec![RemoteValue::Str(name), RemoteValue::Map(map_from_owned_lossy(map))]
        }
        other => {
            debug!("Ignoring body with unhandled signature {other}");
            Vec::new()
        }
    };

    Ok(args)
}
