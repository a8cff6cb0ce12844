use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::api::builders::NetworkFields;
use crate::api::models::{
    Bss, CreateInterfaceArgs, InterfaceRef, InterfaceStatus, InterfaceSummary, NetworkEntry,
    ScanRequest, ScanState, SessionConfig, SignalInfo,
};
use crate::core::{blob, interface, network, scan, status};
use crate::dbus::{BusSession, RemoteEvent, ZbusSession};
use crate::monitoring::events;
use crate::types::constants::{iface_method, iface_prop};
use crate::types::value::{ObjectHandle, RemoteValue};

/// High-level interface to wpa_supplicant over D-Bus.
///
/// This is the main entry point. Interfaces are addressed by their kernel
/// name (`wlan0`); each call resolves the name afresh, so nothing here goes
/// stale when the daemon re-registers an interface.
///
/// # Creating an Instance
///
/// ```no_run
/// use wpars::WpaSupplicant;
///
/// # async fn example() -> wpars::Result<()> {
/// let wpa = WpaSupplicant::new().await?;
/// for iface in wpa.list_interfaces().await? {
///     println!("{} {}", iface.name, iface.state);
/// }
/// # Ok(())
/// # }
/// ```
///
/// # Scanning
///
/// ```no_run
/// use tokio_util::sync::CancellationToken;
/// use wpars::{ScanRequest, WpaSupplicant};
///
/// # async fn example() -> wpars::Result<()> {
/// let wpa = WpaSupplicant::new().await?;
/// let token = CancellationToken::new();
///
/// let results = wpa
///     .scan_and_wait("wlan0", &ScanRequest::default(), &token)
///     .await?;
/// for bss in &results {
///     println!("{:32} {} {} dBm", bss.ssid, bss.bssid_hex(), bss.signal);
/// }
/// # Ok(())
/// # }
/// ```
///
/// # Profiles
///
/// ```no_run
/// use wpars::WpaSupplicant;
/// use wpars::builders::NetworkFields;
///
/// # async fn example() -> wpars::Result<()> {
/// let wpa = WpaSupplicant::new().await?;
///
/// wpa.add_network("wlan0", &NetworkFields::new().ssid("Home").psk("secret123"))
///     .await?;
/// for entry in wpa.list_networks("wlan0").await? {
///     println!("{} {:?} {:?}", entry.ordinal, entry.ssid, entry.disabled);
/// }
/// wpa.select_network("wlan0", 0).await?;
/// # Ok(())
/// # }
/// ```
///
/// # Thread Safety
///
/// `WpaSupplicant` is `Clone`; clones share the same bus session.
#[derive(Clone)]
pub struct WpaSupplicant {
    session: Arc<dyn BusSession>,
    config: SessionConfig,
}

impl fmt::Debug for WpaSupplicant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WpaSupplicant")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl WpaSupplicant {
    /// Connects to wpa_supplicant on the system bus with default settings.
    pub async fn new() -> Result<Self> {
        Self::with_config(SessionConfig::default()).await
    }

    /// Connects to wpa_supplicant on the system bus.
    pub async fn with_config(config: SessionConfig) -> Result<Self> {
        let session = ZbusSession::system().await?;
        Ok(Self::with_session(Arc::new(session), config))
    }

    /// Uses an existing bus session.
    pub fn with_session(session: Arc<dyn BusSession>, config: SessionConfig) -> Self {
        Self { session, config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Closes the bus session.
    pub async fn close(self) -> Result<()> {
        self.session.close().await
    }

    fn bus(&self) -> &dyn BusSession {
        self.session.as_ref()
    }

    /// Lists the interfaces the daemon manages.
    pub async fn list_interfaces(&self) -> Result<Vec<InterfaceSummary>> {
        interface::list_managed(self.bus()).await
    }

    /// Resolves an interface name to its daemon object.
    ///
    /// # Errors
    ///
    /// Returns `SupplicantError::NotManaged` if no such interface is
    /// registered with the daemon.
    pub async fn interface(&self, name: &str) -> Result<InterfaceRef> {
        interface::resolve(self.bus(), name).await
    }

    /// Brings an interface under supplicant management.
    pub async fn create_interface(&self, args: &CreateInterfaceArgs) -> Result<ObjectHandle> {
        interface::create(self.bus(), args).await
    }

    /// Releases an interface from supplicant management.
    pub async fn remove_interface(&self, name: &str) -> Result<()> {
        interface::remove(self.bus(), name).await
    }

    /// Sets the AP scanning/selection mode (0, 1 or 2).
    pub async fn set_ap_scan(&self, name: &str, ap_scan: u32) -> Result<()> {
        interface::set_property(self.bus(), name, iface_prop::AP_SCAN, RemoteValue::UInt32(ap_scan))
            .await
    }

    /// Sets the ISO/IEC alpha2 country code.
    pub async fn set_country(&self, name: &str, country: &str) -> Result<()> {
        interface::set_property(self.bus(), name, iface_prop::COUNTRY, RemoteValue::from(country))
            .await
    }

    /// Reads the association state of an interface.
    pub async fn status(&self, name: &str) -> Result<InterfaceStatus> {
        status::status(self.bus(), name).await
    }

    /// Reconnects, only if the interface is currently disconnected.
    pub async fn reconnect(&self, name: &str) -> Result<()> {
        interface::call_simple(self.bus(), name, iface_method::RECONNECT).await
    }

    /// Disconnects and stays disconnected until told to reassociate.
    pub async fn disconnect(&self, name: &str) -> Result<()> {
        interface::call_simple(self.bus(), name, iface_method::DISCONNECT).await
    }

    /// Forces a reassociation.
    pub async fn reassociate(&self, name: &str) -> Result<()> {
        interface::call_simple(self.bus(), name, iface_method::REASSOCIATE).await
    }

    /// Forces a reassociation with the current BSS.
    pub async fn reattach(&self, name: &str) -> Result<()> {
        interface::call_simple(self.bus(), name, iface_method::REATTACH).await
    }

    /// Reads signal parameters of the current link.
    pub async fn signal_poll(&self, name: &str) -> Result<SignalInfo> {
        status::signal_poll(self.bus(), name).await
    }

    /// Triggers a scan and returns without waiting for it.
    pub async fn scan(&self, name: &str, request: &ScanRequest) -> Result<()> {
        scan::scan_networks(self.bus(), name, request).await
    }

    /// Triggers a scan, waits for completion and returns the results.
    ///
    /// The wait strategy comes from [`SessionConfig::scan_wait`]. There is no
    /// built-in deadline; cancel `token` to stop waiting.
    pub async fn scan_and_wait(
        &self,
        name: &str,
        request: &ScanRequest,
        token: &CancellationToken,
    ) -> Result<Vec<Bss>> {
        self.scan_and_wait_with_progress(name, request, token, |_| {})
            .await
    }

    /// Like [`scan_and_wait`](Self::scan_and_wait), calling `on_tick` with
    /// the poll count each time a poll finds the scan still running.
    pub async fn scan_and_wait_with_progress<F>(
        &self,
        name: &str,
        request: &ScanRequest,
        token: &CancellationToken,
        on_tick: F,
    ) -> Result<Vec<Bss>>
    where
        F: FnMut(usize),
    {
        scan::scan_and_collect(
            self.bus(),
            name,
            request,
            self.config.scan_wait,
            self.config.scan_poll_interval,
            token,
            on_tick,
        )
        .await
    }

    /// Reads the interface's `Scanning` property without waiting.
    pub async fn scan_state(&self, name: &str) -> Result<ScanState> {
        scan::scan_state(self.bus(), name).await
    }

    /// Returns the latest scan results, waiting out a scan in progress.
    pub async fn scan_results(&self, name: &str, token: &CancellationToken) -> Result<Vec<Bss>> {
        self.scan_results_with_progress(name, token, |_| {}).await
    }

    /// Like [`scan_results`](Self::scan_results), with a poll callback.
    pub async fn scan_results_with_progress<F>(
        &self,
        name: &str,
        token: &CancellationToken,
        on_tick: F,
    ) -> Result<Vec<Bss>>
    where
        F: FnMut(usize),
    {
        scan::scan_results(
            self.bus(),
            name,
            self.config.scan_poll_interval,
            token,
            on_tick,
        )
        .await
    }

    /// Drops BSS entries older than `max_age` seconds from the cache.
    pub async fn flush_bss(&self, name: &str, max_age: u32) -> Result<()> {
        scan::flush_bss(self.bus(), name, max_age).await
    }

    /// Lists stored profiles, addressed by position.
    pub async fn list_networks(&self, name: &str) -> Result<Vec<NetworkEntry>> {
        network::list(self.bus(), name).await
    }

    /// Adds a profile and returns its object handle.
    pub async fn add_network(&self, name: &str, fields: &NetworkFields) -> Result<ObjectHandle> {
        network::add(self.bus(), name, fields).await
    }

    /// Removes the profile at `ordinal`.
    ///
    /// Returns `false` if there is no such profile.
    pub async fn remove_network(&self, name: &str, ordinal: usize) -> Result<bool> {
        network::remove(self.bus(), name, ordinal).await
    }

    /// Removes every profile for `ssid`; returns how many were removed.
    pub async fn remove_network_by_ssid(&self, name: &str, ssid: &str) -> Result<usize> {
        network::remove_by_ssid(self.bus(), name, ssid).await
    }

    pub async fn remove_all_networks(&self, name: &str) -> Result<()> {
        network::remove_all(self.bus(), name).await
    }

    /// Enables or disables a single profile.
    ///
    /// Unlike [`select_network`](Self::select_network) this leaves the other
    /// profiles untouched.
    pub async fn set_network_enabled(&self, name: &str, ordinal: usize, enabled: bool) -> Result<bool> {
        network::set_enabled(self.bus(), name, ordinal, enabled).await
    }

    /// Selects a profile; the daemon disables every other profile.
    pub async fn select_network(&self, name: &str, ordinal: usize) -> Result<bool> {
        network::select_exclusive(self.bus(), name, ordinal).await
    }

    /// Lists blobs by name, with their contents.
    pub async fn list_blobs(&self, name: &str) -> Result<Vec<(String, Vec<u8>)>> {
        blob::list(self.bus(), name).await
    }

    pub async fn add_blob(&self, name: &str, blob: &str, data: Vec<u8>) -> Result<()> {
        blob::add(self.bus(), name, blob, data).await
    }

    pub async fn remove_blob(&self, name: &str, blob: &str) -> Result<()> {
        blob::remove(self.bus(), name, blob).await
    }

    pub async fn get_blob(&self, name: &str, blob: &str) -> Result<Vec<u8>> {
        blob::get(self.bus(), name, blob).await
    }

    /// Delivers every interface signal to `callback` until `token` fires.
    pub async fn monitor<F>(&self, callback: F, token: &CancellationToken) -> Result<()>
    where
        F: FnMut(RemoteEvent),
    {
        events::monitor(self.bus(), callback, token).await
    }
}
