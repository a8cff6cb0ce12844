//! Wi-Fi scanning and scan result collection.
//!
//! A scan is driven in three steps: trigger the interface's `Scan` method,
//! await completion (see [`crate::core::scan_wait`]), then read the `BSSs`
//! list and decode every entry. Results keep the daemon's order.

use log::{debug, warn};
use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::api::models::{
    Bss, InterfaceRef, ScanOutcome, ScanRequest, ScanState, ScanWait, SecurityInfo,
};
use crate::core::decode::{
    decode_bool, decode_bytes, decode_i16, decode_map, decode_path_list, decode_security,
    decode_text, decode_u16, decode_u32,
};
use crate::core::interface::resolve;
use crate::core::properties::read_optional;
use crate::core::scan_wait::{poll_until_idle, read_scan_state, wait_for_scan_done};
use crate::dbus::BusSession;
use crate::types::constants::{bss_prop, iface, iface_method, iface_prop, iface_signal};
use crate::types::value::{ObjectHandle, PropertyMap, RemoteValue};
use crate::util::utils::decode_ssid;

/// Requests a scan on a resolved interface.
///
/// A rejection by the daemon (e.g. a scan already running on some drivers)
/// is returned as-is.
pub(crate) async fn trigger(
    bus: &dyn BusSession,
    iface_ref: &InterfaceRef,
    request: &ScanRequest,
) -> Result<()> {
    let mut args = PropertyMap::new();
    args.insert("Type".into(), RemoteValue::from(request.scan_type.as_str()));
    args.insert("AllowRoam".into(), RemoteValue::Bool(request.allow_roam));

    bus.invoke(
        &iface_ref.handle,
        iface::INTERFACE,
        iface_method::SCAN,
        vec![RemoteValue::Map(args)],
    )
    .await?;
    debug!(
        "Triggered {} scan on {}",
        request.scan_type, iface_ref.name
    );
    Ok(())
}

/// Triggers a scan without waiting for it.
pub(crate) async fn scan_networks(
    bus: &dyn BusSession,
    name: &str,
    request: &ScanRequest,
) -> Result<()> {
    let iface_ref = resolve(bus, name).await?;
    trigger(bus, &iface_ref, request).await
}

/// Triggers a scan, waits for it to finish and returns the results.
///
/// With [`ScanWait::Events`] the `ScanDone` subscription is set up before the
/// scan is triggered so the signal cannot be missed; it is released on every
/// exit path when the stream is dropped.
pub(crate) async fn scan_and_collect<F>(
    bus: &dyn BusSession,
    name: &str,
    request: &ScanRequest,
    wait: ScanWait,
    poll_interval: std::time::Duration,
    token: &CancellationToken,
    on_tick: F,
) -> Result<Vec<Bss>>
where
    F: FnMut(usize),
{
    let iface_ref = resolve(bus, name).await?;

    let outcome = match wait {
        ScanWait::Events => {
            let mut events = bus
                .subscribe(&iface_ref.handle, iface::INTERFACE, iface_signal::SCAN_DONE)
                .await?;
            trigger(bus, &iface_ref, request).await?;
            wait_for_scan_done(&mut events, token).await?
        }
        ScanWait::Poll => {
            trigger(bus, &iface_ref, request).await?;
            poll_until_idle(bus, &iface_ref.handle, poll_interval, token, on_tick).await?
        }
    };
    log_outcome(&iface_ref, &outcome);

    collect(bus, &iface_ref.handle).await
}

/// Whether the interface is scanning right now.
pub(crate) async fn scan_state(bus: &dyn BusSession, name: &str) -> Result<ScanState> {
    let iface_ref = resolve(bus, name).await?;
    read_scan_state(bus, &iface_ref.handle).await
}

/// Returns the current results, first waiting out any scan in progress.
///
/// Always polls the `Scanning` property, since there may be no scan of ours
/// to receive a `ScanDone` for.
pub(crate) async fn scan_results<F>(
    bus: &dyn BusSession,
    name: &str,
    poll_interval: std::time::Duration,
    token: &CancellationToken,
    on_tick: F,
) -> Result<Vec<Bss>>
where
    F: FnMut(usize),
{
    let iface_ref = resolve(bus, name).await?;
    let outcome = poll_until_idle(bus, &iface_ref.handle, poll_interval, token, on_tick).await?;
    log_outcome(&iface_ref, &outcome);
    collect(bus, &iface_ref.handle).await
}

fn log_outcome(iface_ref: &InterfaceRef, outcome: &ScanOutcome) {
    if outcome.success {
        debug!(
            "Scan on {} finished ({:?}) after {} poll(s)",
            iface_ref.name, outcome.state, outcome.polls
        );
    } else {
        warn!(
            "Scan on {} reported failure; returning cached results",
            iface_ref.name
        );
    }
}

/// Reads and decodes every BSS of the interface.
///
/// Any failed read aborts the whole collection; partial results are never
/// returned.
pub(crate) async fn collect(bus: &dyn BusSession, iface_handle: &ObjectHandle) -> Result<Vec<Bss>> {
    let raw = bus
        .get_property(iface_handle, iface::INTERFACE, iface_prop::BSSS)
        .await?;
    let paths = decode_path_list(Some(&raw), iface_prop::BSSS)?.unwrap_or_default();
    debug!("Collecting {} scan results", paths.len());

    let mut results = Vec::with_capacity(paths.len());
    for path in paths {
        results.push(read_bss(bus, &path).await?);
    }
    Ok(results)
}

/// Reads and decodes a single BSS object.
pub(crate) async fn read_bss(bus: &dyn BusSession, path: &ObjectHandle) -> Result<Bss> {
    let get = |name: &'static str| bus.get_property(path, iface::BSS, name);

    let ssid_raw = get(bss_prop::SSID).await?;
    let bssid_raw = get(bss_prop::BSSID).await?;
    let frequency_raw = get(bss_prop::FREQUENCY).await?;
    let signal_raw = get(bss_prop::SIGNAL).await?;
    let age_raw = get(bss_prop::AGE).await?;
    let rsn_raw = get(bss_prop::RSN).await?;

    let mode_raw = read_optional(bus, path, iface::BSS, bss_prop::MODE).await?;
    let privacy_raw = read_optional(bus, path, iface::BSS, bss_prop::PRIVACY).await?;
    let wpa_raw = read_optional(bus, path, iface::BSS, bss_prop::WPA).await?;

    let ssid_bytes = decode_bytes(Some(&ssid_raw), bss_prop::SSID)?.unwrap_or_default();
    let rsn = match decode_map(Some(&rsn_raw), bss_prop::RSN)? {
        Some(map) => decode_security(&map, bss_prop::RSN)?,
        None => SecurityInfo::default(),
    };
    let wpa = match decode_map(wpa_raw.as_ref(), bss_prop::WPA)? {
        Some(map) => Some(decode_security(&map, bss_prop::WPA)?),
        None => None,
    };

    Ok(Bss {
        handle: path.clone(),
        ssid: decode_ssid(&ssid_bytes).into_owned(),
        ssid_bytes,
        bssid: decode_bytes(Some(&bssid_raw), bss_prop::BSSID)?.unwrap_or_default(),
        frequency: decode_u16(Some(&frequency_raw), bss_prop::FREQUENCY)?.unwrap_or_default(),
        signal: decode_i16(Some(&signal_raw), bss_prop::SIGNAL)?.unwrap_or_default(),
        age: decode_u32(Some(&age_raw), bss_prop::AGE)?.unwrap_or_default(),
        mode: decode_text(mode_raw.as_ref(), bss_prop::MODE)?,
        privacy: decode_bool(privacy_raw.as_ref(), bss_prop::PRIVACY)?,
        rsn,
        wpa,
    })
}

/// Drops cached BSS entries older than `max_age` seconds (0 drops all).
pub(crate) async fn flush_bss(bus: &dyn BusSession, name: &str, max_age: u32) -> Result<()> {
    let iface_ref = resolve(bus, name).await?;
    bus.invoke(
        &iface_ref.handle,
        iface::INTERFACE,
        iface_method::FLUSH_BSS,
        vec![RemoteValue::UInt32(max_age)],
    )
    .await?;
    debug!("Flushed BSS entries older than {max_age}s on {name}");
    Ok(())
}
