//! Raw signal monitoring for all managed interfaces.
//!
//! Subscribes to every `fi.w1.wpa_supplicant1.Interface` signal, on any
//! interface object, and hands each one to a callback. Useful for watching
//! scans, state changes and property updates as the daemon emits them.

use futures::{FutureExt, StreamExt, select};
use log::debug;
use std::pin::pin;
use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::api::models::SupplicantError;
use crate::dbus::{BusSession, RemoteEvent};
use crate::types::constants::iface;

/// Delivers interface signals to `callback` until `token` is cancelled.
///
/// Cancellation ends the monitor with `Ok(())`. If the daemon closes the
/// subscription, `SupplicantError::EventStreamEnded` is returned.
///
/// # Example
///
/// ```ignore
/// let wpa = WpaSupplicant::new().await?;
/// let token = CancellationToken::new();
/// wpa.monitor(|event| println!("{} {}", event.path, event.member), &token).await?;
/// ```
pub(crate) async fn monitor<F>(bus: &dyn BusSession, mut callback: F, token: &CancellationToken) -> Result<()>
where
    F: FnMut(RemoteEvent),
{
    let mut events = bus.subscribe_all(iface::INTERFACE).await?;
    debug!("Monitoring all {} signals", iface::INTERFACE);

    let mut cancelled = pin!(token.cancelled().fuse());
    let mut delivered = 0usize;

    loop {
        select! {
            _ = cancelled => {
                debug!("Monitor stopped after {delivered} event(s)");
                return Ok(());
            }
            event = events.next().fuse() => {
                match event {
                    Some(event) => {
                        delivered += 1;
                        callback(event);
                    }
                    None => return Err(SupplicantError::EventStreamEnded),
                }
            }
        }
    }
}
