//! Stored network profile management.
//!
//! Profiles are addressed by their position in the interface's `Networks`
//! list. Every operation re-reads that list, so an ordinal is only meaningful
//! against the list the caller last saw; there is no locking between the read
//! and the action.

use log::{debug, warn};

use crate::Result;
use crate::api::builders::NetworkFields;
use crate::api::models::{InterfaceRef, NetworkEntry, SupplicantError};
use crate::core::decode::{decode_disabled, decode_map, decode_path, decode_path_list, decode_text, field};
use crate::core::interface::resolve;
use crate::dbus::BusSession;
use crate::types::constants::{iface, iface_method, iface_prop, network_prop};
use crate::types::value::{ObjectHandle, RemoteValue};
use crate::util::utils::unquote;

/// Reads the interface's profile list fresh from the daemon.
async fn profile_handles(bus: &dyn BusSession, iface_ref: &InterfaceRef) -> Result<Vec<ObjectHandle>> {
    let raw = bus
        .get_property(&iface_ref.handle, iface::INTERFACE, iface_prop::NETWORKS)
        .await?;
    Ok(decode_path_list(Some(&raw), iface_prop::NETWORKS)?.unwrap_or_default())
}

async fn read_entry(bus: &dyn BusSession, ordinal: usize, handle: ObjectHandle) -> Result<NetworkEntry> {
    let raw = bus
        .get_property(&handle, iface::NETWORK, network_prop::PROPERTIES)
        .await?;
    let properties = decode_map(Some(&raw), network_prop::PROPERTIES)?.unwrap_or_default();

    Ok(NetworkEntry {
        ordinal,
        ssid: decode_text(field(&properties, "ssid"), "ssid")?,
        disabled: decode_disabled(&properties)?,
        handle,
        properties,
    })
}

/// Maps a stale-handle failure to `Ok(false)`.
fn tolerate_stale(result: Result<()>, what: &str, handle: &ObjectHandle) -> Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.is_stale_handle() => {
            warn!("{what}: profile {handle} is already gone ({e})");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Lists the profiles of an interface in the daemon's order.
pub(crate) async fn list(bus: &dyn BusSession, name: &str) -> Result<Vec<NetworkEntry>> {
    let iface_ref = resolve(bus, name).await?;
    let handles = profile_handles(bus, &iface_ref).await?;

    let mut entries = Vec::with_capacity(handles.len());
    for (ordinal, handle) in handles.into_iter().enumerate() {
        entries.push(read_entry(bus, ordinal, handle).await?);
    }
    Ok(entries)
}

/// Adds a profile and returns the daemon's handle for it.
pub(crate) async fn add(bus: &dyn BusSession, name: &str, fields: &NetworkFields) -> Result<ObjectHandle> {
    let iface_ref = resolve(bus, name).await?;
    let reply = bus
        .invoke(
            &iface_ref.handle,
            iface::INTERFACE,
            iface_method::ADD_NETWORK,
            vec![RemoteValue::Map(fields.to_property_map())],
        )
        .await?;

    let handle = decode_path(reply.as_ref(), iface_method::ADD_NETWORK)?.ok_or_else(|| {
        SupplicantError::remote(
            iface_ref.handle.as_str(),
            iface_method::ADD_NETWORK,
            None,
            "daemon returned no network object",
        )
    })?;
    debug!("Added network profile {handle} on {name}");
    Ok(handle)
}

async fn remove_handle(bus: &dyn BusSession, iface_ref: &InterfaceRef, handle: &ObjectHandle) -> Result<bool> {
    let result = bus
        .invoke(
            &iface_ref.handle,
            iface::INTERFACE,
            iface_method::REMOVE_NETWORK,
            vec![RemoteValue::ObjectPath(handle.clone())],
        )
        .await
        .map(|_| ());
    tolerate_stale(result, "remove", handle)
}

/// Removes the profile at `ordinal`.
///
/// Returns `Ok(false)` without any method call if the ordinal is out of
/// range, and `Ok(false)` if the profile disappeared before removal.
pub(crate) async fn remove(bus: &dyn BusSession, name: &str, ordinal: usize) -> Result<bool> {
    let iface_ref = resolve(bus, name).await?;
    let handles = profile_handles(bus, &iface_ref).await?;

    let Some(handle) = handles.get(ordinal) else {
        debug!("No profile at position {ordinal} on {name}");
        return Ok(false);
    };
    remove_handle(bus, &iface_ref, handle).await
}

/// Removes every profile whose `ssid` matches, quoted or not.
///
/// Returns the number of profiles removed.
pub(crate) async fn remove_by_ssid(bus: &dyn BusSession, name: &str, ssid: &str) -> Result<usize> {
    let iface_ref = resolve(bus, name).await?;
    let wanted = unquote(ssid);
    let mut removed = 0;

    for (ordinal, handle) in profile_handles(bus, &iface_ref).await?.into_iter().enumerate() {
        let entry = match read_entry(bus, ordinal, handle.clone()).await {
            Ok(entry) => entry,
            Err(e) if e.is_stale_handle() => {
                warn!("remove by ssid: profile {handle} is already gone ({e})");
                continue;
            }
            Err(e) => return Err(e),
        };
        let matches = entry.ssid.as_deref().is_some_and(|s| unquote(s) == wanted);
        if matches && remove_handle(bus, &iface_ref, &entry.handle).await? {
            removed += 1;
        }
    }

    debug!("Removed {removed} profile(s) for SSID {wanted} on {name}");
    Ok(removed)
}

/// Removes all profiles of the interface.
pub(crate) async fn remove_all(bus: &dyn BusSession, name: &str) -> Result<()> {
    let iface_ref = resolve(bus, name).await?;
    bus.invoke(
        &iface_ref.handle,
        iface::INTERFACE,
        iface_method::REMOVE_ALL_NETWORKS,
        Vec::new(),
    )
    .await?;
    Ok(())
}

/// Enables or disables the profile at `ordinal`, leaving the others alone.
pub(crate) async fn set_enabled(
    bus: &dyn BusSession,
    name: &str,
    ordinal: usize,
    enabled: bool,
) -> Result<bool> {
    let iface_ref = resolve(bus, name).await?;
    let handles = profile_handles(bus, &iface_ref).await?;

    let Some(handle) = handles.get(ordinal) else {
        debug!("No profile at position {ordinal} on {name}");
        return Ok(false);
    };
    let result = bus
        .set_property(handle, iface::NETWORK, network_prop::ENABLED, RemoteValue::Bool(enabled))
        .await;
    tolerate_stale(result, "set enabled", handle)
}

/// Selects the profile at `ordinal`; the daemon disables all others.
pub(crate) async fn select_exclusive(bus: &dyn BusSession, name: &str, ordinal: usize) -> Result<bool> {
    let iface_ref = resolve(bus, name).await?;
    let handles = profile_handles(bus, &iface_ref).await?;

    let Some(handle) = handles.get(ordinal) else {
        debug!("No profile at position {ordinal} on {name}");
        return Ok(false);
    };
    let result = bus
        .invoke(
            &iface_ref.handle,
            iface::INTERFACE,
            iface_method::SELECT_NETWORK,
            vec![RemoteValue::ObjectPath(handle.clone())],
        )
        .await
        .map(|_| ());
    tolerate_stale(result, "select", handle)
}
