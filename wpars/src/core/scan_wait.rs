//! Scan completion waits.
//!
//! Two strategies are supported:
//!
//! - `ScanDone` signal: the caller subscribes *before* triggering the scan,
//!   then hands the stream to [`wait_for_scan_done`].
//! - Polling: [`poll_until_idle`] reads the interface's `Scanning` property
//!   at a fixed interval until it reports `false`.
//!
//! Neither wait has a built-in deadline. Both observe a
//! [`CancellationToken`] at every tick or event boundary and return
//! `SupplicantError::Cancelled` once it fires.

use futures::{FutureExt, StreamExt, select};
use futures_timer::Delay;
use log::{debug, warn};
use std::pin::pin;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::api::models::{ScanOutcome, ScanState, SupplicantError};
use crate::core::decode::decode_bool;
use crate::dbus::{BusSession, EventStream};
use crate::types::constants::{iface, iface_prop, iface_signal};
use crate::types::value::ObjectHandle;

/// Waits for a `ScanDone` event on an already-established subscription.
///
/// An unsuccessful scan still completes the wait: the outcome carries
/// `success: false` and a warning is logged.
pub(crate) async fn wait_for_scan_done(
    events: &mut EventStream,
    token: &CancellationToken,
) -> Result<ScanOutcome> {
    let mut cancelled = pin!(token.cancelled().fuse());

    loop {
        select! {
            _ = cancelled => {
                debug!("Scan wait cancelled");
                return Err(SupplicantError::Cancelled);
            }
            event = events.next().fuse() => {
                match event {
                    Some(event) if event.member == iface_signal::SCAN_DONE => {
                        let success = decode_bool(event.args.first(), iface_signal::SCAN_DONE)?
                            .unwrap_or(false);
                        if !success {
                            warn!("ScanDone reported an unsuccessful scan on {}", event.path);
                        }
                        return Ok(ScanOutcome {
                            state: ScanState::Completed,
                            success,
                            polls: 0,
                        });
                    }
                    Some(event) => {
                        debug!("Ignoring {} while waiting for ScanDone", event.member);
                    }
                    None => {
                        return Err(SupplicantError::EventStreamEnded);
                    }
                }
            }
        }
    }
}

/// Reads the interface's `Scanning` property once.
pub(crate) async fn read_scan_state(bus: &dyn BusSession, handle: &ObjectHandle) -> Result<ScanState> {
    let raw = bus
        .get_property(handle, iface::INTERFACE, iface_prop::SCANNING)
        .await?;
    Ok(ScanState::from(
        decode_bool(Some(&raw), iface_prop::SCANNING)?.unwrap_or(false),
    ))
}

/// Polls the `Scanning` property until it reads `false`.
///
/// Returns on the first `false` read, so a sequence of `true, true, false`
/// costs exactly three reads. `on_tick` is called with the poll count after
/// every `true` read, before sleeping for `interval`.
pub(crate) async fn poll_until_idle<F>(
    bus: &dyn BusSession,
    handle: &ObjectHandle,
    interval: Duration,
    token: &CancellationToken,
    mut on_tick: F,
) -> Result<ScanOutcome>
where
    F: FnMut(usize),
{
    let mut cancelled = pin!(token.cancelled().fuse());
    let mut polls = 0usize;

    loop {
        let state = read_scan_state(bus, handle).await?;
        polls += 1;

        if state != ScanState::Scanning {
            return Ok(ScanOutcome {
                state,
                success: true,
                polls,
            });
        }

        debug!("Scan still in progress on {handle} (poll {polls})");
        on_tick(polls);

        select! {
            _ = cancelled => {
                debug!("Scan poll cancelled after {polls} read(s)");
                return Err(SupplicantError::Cancelled);
            }
            _ = Delay::new(interval).fuse() => {}
        }
    }
}
