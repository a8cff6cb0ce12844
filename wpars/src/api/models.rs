use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::time::Duration;
use thiserror::Error;

use crate::types::constants::{stale_errors, timeouts};
use crate::types::value::{ObjectHandle, PropertyMap};
use crate::util::utils::{channel_from_freq, format_hex};

/// wpa_supplicant interface state, as reported by the `State` property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterfaceState {
    /// The interface is disconnected.
    Disconnected,
    /// No enabled networks are configured.
    Inactive,
    /// The interface is scanning for networks.
    Scanning,
    /// Authentication with the chosen BSS is in progress.
    Authenticating,
    /// Association with the chosen BSS is in progress.
    Associating,
    /// Association completed.
    Associated,
    /// WPA 4-way key handshake in progress.
    FourWayHandshake,
    /// WPA group key handshake in progress.
    GroupHandshake,
    /// All authentication completed.
    Completed,
    /// The interface is disabled.
    InterfaceDisabled,
    /// The daemon reported `unknown`.
    Unknown,
    /// A state label not mapped to a specific variant.
    Other(String),
}

impl From<&str> for InterfaceState {
    fn from(label: &str) -> Self {
        match label {
            "disconnected" => Self::Disconnected,
            "inactive" => Self::Inactive,
            "scanning" => Self::Scanning,
            "authenticating" => Self::Authenticating,
            "associating" => Self::Associating,
            "associated" => Self::Associated,
            "4way_handshake" => Self::FourWayHandshake,
            "group_handshake" => Self::GroupHandshake,
            "completed" => Self::Completed,
            "interface_disabled" => Self::InterfaceDisabled,
            "unknown" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Display for InterfaceState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Inactive => write!(f, "inactive"),
            Self::Scanning => write!(f, "scanning"),
            Self::Authenticating => write!(f, "authenticating"),
            Self::Associating => write!(f, "associating"),
            Self::Associated => write!(f, "associated"),
            Self::FourWayHandshake => write!(f, "4way_handshake"),
            Self::GroupHandshake => write!(f, "group_handshake"),
            Self::Completed => write!(f, "completed"),
            Self::InterfaceDisabled => write!(f, "interface_disabled"),
            Self::Unknown => write!(f, "unknown"),
            Self::Other(label) => write!(f, "{label}"),
        }
    }
}

/// A network interface name paired with its daemon object.
///
/// Resolved on demand for every operation and never cached, since the
/// daemon may add or remove interfaces at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRef {
    pub name: String,
    pub handle: ObjectHandle,
}

/// One entry of the managed interface listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceSummary {
    /// Kernel interface name, e.g. `wlan0`.
    pub name: String,
    /// Current supplicant state.
    pub state: InterfaceState,
    /// Daemon object path of the interface.
    pub handle: ObjectHandle,
}

/// Arguments for bringing an interface under supplicant management.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateInterfaceArgs {
    pub ifname: String,
    /// Configuration file the daemon should read for this interface.
    pub config_file: Option<String>,
    /// Driver backend, e.g. `nl80211` or `wired`.
    pub driver: Option<String>,
    /// Bridge interface to control, e.g. `br0`.
    pub bridge_ifname: Option<String>,
}

impl CreateInterfaceArgs {
    pub fn new(ifname: impl Into<String>) -> Self {
        Self {
            ifname: ifname.into(),
            ..Default::default()
        }
    }

    pub fn with_config_file(mut self, path: impl Into<String>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = Some(driver.into());
        self
    }

    pub fn with_bridge(mut self, bridge: impl Into<String>) -> Self {
        self.bridge_ifname = Some(bridge.into());
        self
    }
}

/// Kind of scan to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScanType {
    /// Probe requests are sent.
    #[default]
    Active,
    /// Only listen for beacons.
    Passive,
}

impl ScanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Passive => "passive",
        }
    }
}

impl Display for ScanType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScanType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "passive" => Ok(Self::Passive),
            other => Err(format!("unknown scan type '{other}'")),
        }
    }
}

/// Configuration record passed to the interface's `Scan` method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub scan_type: ScanType,
    /// Whether the daemon may make a roaming decision from the results.
    pub allow_roam: bool,
}

impl Default for ScanRequest {
    fn default() -> Self {
        Self {
            scan_type: ScanType::Active,
            allow_roam: true,
        }
    }
}

/// How to detect the end of a triggered scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanWait {
    /// Wait for the interface's `ScanDone` signal.
    #[default]
    Events,
    /// Poll the `Scanning` property until it clears.
    Poll,
}

/// Scan state of an interface, inferred from `Scanning` or `ScanDone`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Scanning,
    Completed,
}

impl From<bool> for ScanState {
    fn from(scanning: bool) -> Self {
        if scanning { Self::Scanning } else { Self::Idle }
    }
}

/// Result of waiting for a scan to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOutcome {
    /// `Completed` after a `ScanDone` event, `Idle` after a poll-driven wait.
    pub state: ScanState,
    /// Success flag carried by `ScanDone`; always `true` for poll-driven waits.
    pub success: bool,
    /// Number of `Scanning` reads performed (zero for event-driven waits).
    pub polls: usize,
}

/// Cipher and key management negotiation fields of a BSS (`RSN` / `WPA`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityInfo {
    /// Key management suites, e.g. `wpa-psk`, `sae`.
    pub key_mgmt: Vec<String>,
    /// Pairwise (unicast) ciphers, e.g. `ccmp`.
    pub pairwise: Vec<String>,
    /// Group cipher.
    pub group: Option<String>,
}

impl SecurityInfo {
    /// Returns `true` if the element advertised nothing at all.
    pub fn is_empty(&self) -> bool {
        self.key_mgmt.is_empty() && self.pairwise.is_empty() && self.group.is_none()
    }
}

/// A single discovered BSS (one scan result entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bss {
    /// Daemon object path of this BSS.
    pub handle: ObjectHandle,
    /// SSID decoded as UTF-8 (lossily when the bytes are not UTF-8).
    pub ssid: String,
    /// Raw SSID octets.
    pub ssid_bytes: Vec<u8>,
    /// BSSID octets (6 bytes).
    pub bssid: Vec<u8>,
    /// Operating frequency in MHz.
    pub frequency: u16,
    /// Signal level in dBm.
    pub signal: i16,
    /// Seconds since the BSS was last seen.
    pub age: u32,
    /// `infrastructure` or `ad-hoc`; `None` if not reported.
    pub mode: Option<String>,
    /// Whether the BSS requires encryption; `None` if not reported.
    pub privacy: Option<bool>,
    pub rsn: SecurityInfo,
    /// WPA (version 1) information element; `None` if not reported.
    pub wpa: Option<SecurityInfo>,
}

impl Bss {
    /// BSSID formatted as `aa:bb:cc:dd:ee:ff`.
    pub fn bssid_hex(&self) -> String {
        format_hex(&self.bssid)
    }

    /// Channel number derived from the frequency.
    pub fn channel(&self) -> Option<u16> {
        channel_from_freq(u32::from(self.frequency))
    }
}

/// A stored network profile, addressed by its current position.
///
/// The ordinal is recomputed on every read; it is not a stable identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkEntry {
    pub ordinal: usize,
    pub handle: ObjectHandle,
    /// The `ssid` setting as reported by the daemon (usually quoted).
    pub ssid: Option<String>,
    /// The `disabled` setting; `None` if the daemon did not report it.
    pub disabled: Option<bool>,
    /// Every setting the daemon reported for this profile.
    pub properties: PropertyMap,
}

/// Association and security state of an interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceStatus {
    pub name: String,
    pub handle: ObjectHandle,
    pub state: InterfaceState,
    /// Authentication mode of the current association; `None` if unsupported.
    pub auth_mode: Option<String>,
    /// The BSS the interface is associated with, if any.
    pub current_bss: Option<Bss>,
    /// The profile in use, if any.
    pub current_network: Option<ObjectHandle>,
}

/// Link measurements returned by `SignalPoll`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalInfo {
    /// RSSI in dBm.
    pub rssi: Option<i32>,
    /// Link speed in Mbps.
    pub linkspeed: Option<i32>,
    /// Noise level in dBm.
    pub noise: Option<i32>,
    /// Frequency in MHz.
    pub frequency: Option<u32>,
    /// Channel width label, e.g. `80 MHz`.
    pub width: Option<String>,
    /// Center frequency of the first segment, in MHz.
    pub center_frq1: Option<i32>,
    /// Center frequency of the second segment, in MHz.
    pub center_frq2: Option<i32>,
    /// Every value the daemon reported.
    pub raw: PropertyMap,
}

/// Session-wide settings.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use wpars::{ScanWait, SessionConfig};
///
/// let config = SessionConfig::new()
///     .with_scan_poll_interval(Duration::from_millis(500))
///     .with_scan_wait(ScanWait::Poll);
/// assert_eq!(config.scan_wait, ScanWait::Poll);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Interval between `Scanning` property reads in poll-driven waits.
    pub scan_poll_interval: Duration,
    /// Strategy used to await a scan this session triggered.
    pub scan_wait: ScanWait,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scan_poll_interval: timeouts::scan_poll_interval(),
            scan_wait: ScanWait::Events,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scan_poll_interval(mut self, interval: Duration) -> Self {
        self.scan_poll_interval = interval;
        self
    }

    pub fn with_scan_wait(mut self, wait: ScanWait) -> Self {
        self.scan_wait = wait;
        self
    }
}

/// Errors that can occur while talking to wpa_supplicant.
///
/// # Examples
///
/// ```no_run
/// use wpars::{SupplicantError, WpaSupplicant};
///
/// # async fn example() -> wpars::Result<()> {
/// let wpa = WpaSupplicant::new().await?;
///
/// match wpa.interface("wlan0").await {
///     Ok(iface) => println!("{} is {}", iface.name, iface.handle),
///     Err(SupplicantError::NotManaged(name)) => {
///         eprintln!("{name} is not managed, try `wpactl up {name}`");
///     }
///     Err(e) => return Err(e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Error)]
pub enum SupplicantError {
    /// A D-Bus communication error occurred outside a specific call.
    #[error("D-Bus error: {0}")]
    Dbus(#[from] zbus::Error),

    /// The named interface is not registered with the daemon.
    #[error("interface {0} is not managed by wpa_supplicant")]
    NotManaged(String),

    /// A remote method call or property access was rejected.
    #[error("{member} on {path} failed: {message}")]
    RemoteCall {
        path: String,
        member: String,
        /// D-Bus error name, when the daemon supplied one.
        name: Option<String>,
        message: String,
    },

    /// A remote value did not have the shape the object model documents.
    #[error("property {property}: expected {expected}, found {found}")]
    DecodeShapeMismatch {
        property: String,
        expected: String,
        found: String,
    },

    /// A string could not be used as a D-Bus object path.
    #[error("invalid object path: {0}")]
    InvalidObjectPath(String),

    /// A method was invoked with an argument list the session cannot encode.
    #[error("unsupported argument list: {0}")]
    UnsupportedArguments(String),

    /// A wait was aborted through its cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// A signal subscription ended before the awaited event arrived.
    #[error("event stream ended")]
    EventStreamEnded,
}

impl SupplicantError {
    /// Builds a `RemoteCall` error for the given object and member.
    pub fn remote(
        path: impl Into<String>,
        member: impl Into<String>,
        name: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::RemoteCall {
            path: path.into(),
            member: member.into(),
            name,
            message: message.into(),
        }
    }

    /// The D-Bus error name of a rejected remote call.
    pub fn remote_name(&self) -> Option<&str> {
        match self {
            Self::RemoteCall { name, .. } => name.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` if the error means the addressed object is already gone.
    pub fn is_stale_handle(&self) -> bool {
        matches!(
            self.remote_name(),
            Some(
                stale_errors::NETWORK_UNKNOWN
                    | stale_errors::BLOB_UNKNOWN
                    | stale_errors::UNKNOWN_OBJECT
                    | stale_errors::UNKNOWN_METHOD
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interface_state_from_label() {
        assert_eq!(InterfaceState::from("completed"), InterfaceState::Completed);
        assert_eq!(
            InterfaceState::from("4way_handshake"),
            InterfaceState::FourWayHandshake
        );
        assert_eq!(
            InterfaceState::from("interface_disabled"),
            InterfaceState::InterfaceDisabled
        );
        assert_eq!(
            InterfaceState::from("mesh"),
            InterfaceState::Other("mesh".into())
        );
    }

    #[test]
    fn interface_state_display_round_trips_label() {
        for label in ["disconnected", "scanning", "group_handshake", "weird"] {
            assert_eq!(InterfaceState::from(label).to_string(), label);
        }
    }

    #[test]
    fn scan_type_parsing() {
        assert_eq!("active".parse::<ScanType>(), Ok(ScanType::Active));
        assert_eq!("passive".parse::<ScanType>(), Ok(ScanType::Passive));
        assert!("aggressive".parse::<ScanType>().is_err());
    }

    #[test]
    fn scan_request_defaults_to_active_roaming() {
        let req = ScanRequest::default();
        assert_eq!(req.scan_type, ScanType::Active);
        assert!(req.allow_roam);
    }

    #[test]
    fn session_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.scan_poll_interval, Duration::from_secs(2));
        assert_eq!(config.scan_wait, ScanWait::Events);
    }

    #[test]
    fn stale_handle_classification() {
        let gone = SupplicantError::remote(
            "/fi/w1/wpa_supplicant1/Interfaces/0",
            "RemoveNetwork",
            Some(stale_errors::NETWORK_UNKNOWN.into()),
            "no such network",
        );
        assert!(gone.is_stale_handle());

        let busy = SupplicantError::remote(
            "/fi/w1/wpa_supplicant1/Interfaces/0",
            "Scan",
            Some("fi.w1.wpa_supplicant1.Interface.ScanError".into()),
            "scan request rejected",
        );
        assert!(!busy.is_stale_handle());
        assert!(!SupplicantError::Cancelled.is_stale_handle());
    }

    #[test]
    fn remote_call_error_names_path_and_member() {
        let err = SupplicantError::remote("/obj", "Scan", None, "busy");
        assert_eq!(err.to_string(), "Scan on /obj failed: busy");
    }

    #[test]
    fn bss_helpers() {
        let bss = Bss {
            handle: ObjectHandle::new("/bss/1"),
            ssid: "Net".into(),
            ssid_bytes: b"Net".to_vec(),
            bssid: vec![0, 0x11, 0x22, 0x33, 0x44, 0x55],
            frequency: 2437,
            signal: -60,
            age: 3,
            mode: None,
            privacy: None,
            rsn: SecurityInfo::default(),
            wpa: None,
        };
        assert_eq!(bss.bssid_hex(), "00:11:22:33:44:55");
        assert_eq!(bss.channel(), Some(6));
        assert!(bss.rsn.is_empty());
    }
}
