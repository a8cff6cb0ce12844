//! A Rust library for controlling wpa_supplicant over D-Bus.
//!
//! This crate provides a high-level async API over wpa_supplicant's
//! `fi.w1.wpa_supplicant1` object model:
//!
//! - Listing and resolving managed interfaces, bringing interfaces up and down
//! - Triggering scans and collecting scan results
//! - Managing stored network profiles (add, remove, enable, select)
//! - Reading interface status and link measurements
//! - Managing blobs and watching daemon signals
//!
//! # Example
//!
//! ```no_run
//! use tokio_util::sync::CancellationToken;
//! use wpars::{ScanRequest, WpaSupplicant};
//!
//! # async fn example() -> wpars::Result<()> {
//! let wpa = WpaSupplicant::new().await?;
//!
//! let token = CancellationToken::new();
//! let results = wpa
//!     .scan_and_wait("wlan0", &ScanRequest::default(), &token)
//!     .await?;
//! for bss in &results {
//!     println!("{} {} MHz {} dBm", bss.ssid, bss.frequency, bss.signal);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All operations return `Result<T, SupplicantError>`. A name the daemon does
//! not manage yields `SupplicantError::NotManaged`; a call the daemon rejects
//! yields `SupplicantError::RemoteCall` carrying the D-Bus error name.
//!
//! # Waiting for Scans
//!
//! Scan completion is detected either from the `ScanDone` signal or by
//! polling the `Scanning` property (see [`ScanWait`]). Waits have no deadline
//! of their own; pass a `CancellationToken` and cancel it to give up.
//!
//! # Logging
//!
//! This crate uses the [`log`](https://docs.rs/log) facade for logging. To see
//! log output, add a logging implementation like `env_logger`. For example:
//!
//! ```no_run,ignore
//! env_logger::init();
//! // ...
//! ```

// Internal implementation modules
mod core;
mod monitoring;
mod types;
mod util;

// Public API modules
pub mod api;
pub mod dbus;

// Re-exported public API
pub use crate::api::{builders, models};
pub use crate::api::models::{
    Bss, CreateInterfaceArgs, InterfaceRef, InterfaceState, InterfaceStatus, InterfaceSummary,
    NetworkEntry, ScanOutcome, ScanRequest, ScanState, ScanType, ScanWait, SecurityInfo,
    SessionConfig, SignalInfo, SupplicantError,
};
pub use crate::api::supplicant::WpaSupplicant;
pub use crate::core::decode::{Decoded, Shape, decode};
pub use crate::dbus::{BusSession, EventStream, RemoteEvent, ZbusSession};
pub use crate::types::value::{ObjectHandle, PropertyMap, RemoteValue};
pub use crate::util::utils::{channel_from_freq, format_hex};

/// A specialized `Result` type for wpa_supplicant operations.
pub type Result<T> = std::result::Result<T, SupplicantError>;
