//! Named binary blobs attached to an interface (certificates, keys).

use log::debug;

use crate::Result;
use crate::core::decode::{decode_bytes, decode_map};
use crate::core::interface::resolve;
use crate::dbus::BusSession;
use crate::types::constants::{iface, iface_method, iface_prop};
use crate::types::value::RemoteValue;

/// Lists the interface's blobs, sorted by name.
pub(crate) async fn list(bus: &dyn BusSession, name: &str) -> Result<Vec<(String, Vec<u8>)>> {
    let iface_ref = resolve(bus, name).await?;
    let raw = bus
        .get_property(&iface_ref.handle, iface::INTERFACE, iface_prop::BLOBS)
        .await?;

    let mut blobs = Vec::new();
    for (blob, value) in decode_map(Some(&raw), iface_prop::BLOBS)?.unwrap_or_default() {
        let data = decode_bytes(Some(&value), &blob)?.unwrap_or_default();
        blobs.push((blob, data));
    }
    blobs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(blobs)
}

pub(crate) async fn add(bus: &dyn BusSession, name: &str, blob: &str, data: Vec<u8>) -> Result<()> {
    let iface_ref = resolve(bus, name).await?;
    let len = data.len();
    bus.invoke(
        &iface_ref.handle,
        iface::INTERFACE,
        iface_method::ADD_BLOB,
        vec![RemoteValue::from(blob), RemoteValue::Bytes(data)],
    )
    .await?;
    debug!("Added blob {blob} ({len} bytes) on {name}");
    Ok(())
}

pub(crate) async fn remove(bus: &dyn BusSession, name: &str, blob: &str) -> Result<()> {
    let iface_ref = resolve(bus, name).await?;
    bus.invoke(
        &iface_ref.handle,
        iface::INTERFACE,
        iface_method::REMOVE_BLOB,
        vec![RemoteValue::from(blob)],
    )
    .await?;
    Ok(())
}

/// Fetches a blob's contents.
pub(crate) async fn get(bus: &dyn BusSession, name: &str, blob: &str) -> Result<Vec<u8>> {
    let iface_ref = resolve(bus, name).await?;
    let reply = bus
        .invoke(
            &iface_ref.handle,
            iface::INTERFACE,
            iface_method::GET_BLOB,
            vec![RemoteValue::from(blob)],
        )
        .await?;
    Ok(decode_bytes(reply.as_ref(), iface_method::GET_BLOB)?.unwrap_or_default())
}
