//! Interface status and link measurements.

use log::debug;

use crate::Result;
use crate::api::models::{InterfaceStatus, SignalInfo};
use crate::core::decode::{decode_map, decode_path, decode_signal_info, decode_text};
use crate::core::interface::resolve;
use crate::core::properties::read_optional;
use crate::core::scan::read_bss;
use crate::dbus::BusSession;
use crate::types::constants::{iface, iface_method, iface_prop};

/// Reads the association state of an interface.
///
/// A `CurrentBSS` of `"/"` means the interface is not associated, in which
/// case `current_bss` is `None`.
pub(crate) async fn status(bus: &dyn BusSession, name: &str) -> Result<InterfaceStatus> {
    let iface_ref = resolve(bus, name).await?;
    let handle = &iface_ref.handle;

    let state = bus
        .get_property(handle, iface::INTERFACE, iface_prop::STATE)
        .await?;
    let auth_mode = read_optional(bus, handle, iface::INTERFACE, iface_prop::CURRENT_AUTH_MODE).await?;
    let current_bss = bus
        .get_property(handle, iface::INTERFACE, iface_prop::CURRENT_BSS)
        .await?;
    let current_network =
        read_optional(bus, handle, iface::INTERFACE, iface_prop::CURRENT_NETWORK).await?;

    let current_bss = match decode_path(Some(&current_bss), iface_prop::CURRENT_BSS)? {
        Some(bss) => Some(read_bss(bus, &bss).await?),
        None => {
            debug!("{name} is not associated");
            None
        }
    };

    Ok(InterfaceStatus {
        state: decode_text(Some(&state), iface_prop::STATE)?
            .as_deref()
            .unwrap_or("unknown")
            .into(),
        auth_mode: decode_text(auth_mode.as_ref(), iface_prop::CURRENT_AUTH_MODE)?,
        current_bss,
        current_network: decode_path(current_network.as_ref(), iface_prop::CURRENT_NETWORK)?,
        name: iface_ref.name,
        handle: iface_ref.handle,
    })
}

/// Polls the driver for signal parameters of the current link.
pub(crate) async fn signal_poll(bus: &dyn BusSession, name: &str) -> Result<SignalInfo> {
    let iface_ref = resolve(bus, name).await?;
    let reply = bus
        .invoke(
            &iface_ref.handle,
            iface::INTERFACE,
            iface_method::SIGNAL_POLL,
            Vec::new(),
        )
        .await?;
    decode_signal_info(decode_map(reply.as_ref(), iface_method::SIGNAL_POLL)?.unwrap_or_default())
}
