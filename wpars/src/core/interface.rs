//! Interface resolution and interface-level operations.
//!
//! Maps interface names to daemon objects through the root object's
//! `GetInterface` method, enumerates managed interfaces, and wraps the
//! simple per-interface methods and property writes.

use log::debug;

use crate::Result;
use crate::api::models::{CreateInterfaceArgs, InterfaceRef, InterfaceSummary, SupplicantError};
use crate::core::decode::{decode_path, decode_path_list, decode_text};
use crate::dbus::BusSession;
use crate::types::constants::{INTERFACE_UNKNOWN, iface, iface_prop, root_method, root_prop};
use crate::types::value::{ObjectHandle, PropertyMap, RemoteValue};

/// Resolves an interface name to its daemon object.
///
/// Returns `SupplicantError::NotManaged` if the daemon has no interface of
/// that name registered.
pub(crate) async fn resolve(bus: &dyn BusSession, name: &str) -> Result<InterfaceRef> {
    let reply = bus
        .invoke(
            &ObjectHandle::root(),
            iface::ROOT,
            root_method::GET_INTERFACE,
            vec![RemoteValue::from(name)],
        )
        .await
        .map_err(|e| match e.remote_name() {
            Some(INTERFACE_UNKNOWN) => SupplicantError::NotManaged(name.to_string()),
            _ => e,
        })?;

    let handle = decode_path(reply.as_ref(), root_method::GET_INTERFACE)?
        .ok_or_else(|| SupplicantError::NotManaged(name.to_string()))?;
    debug!("Resolved interface {name} to {handle}");

    Ok(InterfaceRef {
        name: name.to_string(),
        handle,
    })
}

/// Lists every interface currently managed by the daemon, in the daemon's
/// order.
pub(crate) async fn list_managed(bus: &dyn BusSession) -> Result<Vec<InterfaceSummary>> {
    let raw = bus
        .get_property(&ObjectHandle::root(), iface::ROOT, root_prop::INTERFACES)
        .await?;
    let handles = decode_path_list(Some(&raw), root_prop::INTERFACES)?.unwrap_or_default();

    let mut interfaces = Vec::with_capacity(handles.len());
    for handle in handles {
        let name = bus
            .get_property(&handle, iface::INTERFACE, iface_prop::IFNAME)
            .await?;
        let state = bus
            .get_property(&handle, iface::INTERFACE, iface_prop::STATE)
            .await?;

        interfaces.push(InterfaceSummary {
            name: decode_text(Some(&name), iface_prop::IFNAME)?.unwrap_or_default(),
            state: decode_text(Some(&state), iface_prop::STATE)?
                .as_deref()
                .unwrap_or("unknown")
                .into(),
            handle,
        });
    }

    Ok(interfaces)
}

/// Brings an interface under supplicant management.
///
/// Only the optional arguments that were supplied are sent.
pub(crate) async fn create(bus: &dyn BusSession, args: &CreateInterfaceArgs) -> Result<ObjectHandle> {
    let mut fields = PropertyMap::new();
    fields.insert("Ifname".into(), RemoteValue::from(args.ifname.as_str()));
    if let Some(config) = &args.config_file {
        fields.insert("ConfigFile".into(), RemoteValue::from(config.as_str()));
    }
    if let Some(driver) = args.driver.as_deref().filter(|d| !d.is_empty()) {
        fields.insert("Driver".into(), RemoteValue::from(driver));
    }
    if let Some(bridge) = args.bridge_ifname.as_deref().filter(|b| !b.is_empty()) {
        fields.insert("BridgeIfname".into(), RemoteValue::from(bridge));
    }

    let reply = bus
        .invoke(
            &ObjectHandle::root(),
            iface::ROOT,
            root_method::CREATE_INTERFACE,
            vec![RemoteValue::Map(fields)],
        )
        .await?;

    let handle = decode_path(reply.as_ref(), root_method::CREATE_INTERFACE)?.ok_or_else(|| {
        SupplicantError::remote(
            ObjectHandle::root().as_str(),
            root_method::CREATE_INTERFACE,
            None,
            "daemon returned no interface object",
        )
    })?;
    debug!("Interface {} now managed as {handle}", args.ifname);
    Ok(handle)
}

/// Removes an interface from supplicant management.
pub(crate) async fn remove(bus: &dyn BusSession, name: &str) -> Result<()> {
    let iface_ref = resolve(bus, name).await?;
    bus.invoke(
        &ObjectHandle::root(),
        iface::ROOT,
        root_method::REMOVE_INTERFACE,
        vec![RemoteValue::ObjectPath(iface_ref.handle)],
    )
    .await?;
    debug!("Interface {name} no longer managed");
    Ok(())
}

/// Invokes a zero-argument method on the interface object
/// (`Reconnect`, `Disconnect`, `Reassociate`, `Reattach`, ...).
pub(crate) async fn call_simple(bus: &dyn BusSession, name: &str, method: &str) -> Result<()> {
    let iface_ref = resolve(bus, name).await?;
    bus.invoke(&iface_ref.handle, iface::INTERFACE, method, Vec::new())
        .await?;
    Ok(())
}

/// Writes a property on the interface object.
pub(crate) async fn set_property(
    bus: &dyn BusSession,
    name: &str,
    property: &str,
    value: RemoteValue,
) -> Result<()> {
    let iface_ref = resolve(bus, name).await?;
    bus.set_property(&iface_ref.handle, iface::INTERFACE, property, value)
        .await
}
