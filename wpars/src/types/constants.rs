//! Constants for the wpa_supplicant D-Bus object model.
//!
//! These correspond to the service name, object paths, interface names,
//! member names and numeric defaults published by wpa_supplicant's
//! D-Bus API (`fi.w1.wpa_supplicant1`).

/// Bus names and well-known object paths.
pub mod bus {
    pub const SERVICE: &str = "fi.w1.wpa_supplicant1";
    pub const ROOT_PATH: &str = "/fi/w1/wpa_supplicant1";
    /// Object path conventionally meaning "no object referenced".
    pub const NONE_PATH: &str = "/";
}

/// D-Bus interface names, one per object kind.
pub mod iface {
    pub const ROOT: &str = "fi.w1.wpa_supplicant1";
    pub const INTERFACE: &str = "fi.w1.wpa_supplicant1.Interface";
    pub const NETWORK: &str = "fi.w1.wpa_supplicant1.Network";
    pub const BSS: &str = "fi.w1.wpa_supplicant1.BSS";
}

/// Methods on the root object.
pub mod root_method {
    pub const GET_INTERFACE: &str = "GetInterface";
    pub const CREATE_INTERFACE: &str = "CreateInterface";
    pub const REMOVE_INTERFACE: &str = "RemoveInterface";
}

/// Properties on the root object.
pub mod root_prop {
    pub const INTERFACES: &str = "Interfaces";
}

/// Methods on an Interface object.
pub mod iface_method {
    pub const SCAN: &str = "Scan";
    pub const RECONNECT: &str = "Reconnect";
    pub const DISCONNECT: &str = "Disconnect";
    pub const REASSOCIATE: &str = "Reassociate";
    pub const REATTACH: &str = "Reattach";
    pub const SIGNAL_POLL: &str = "SignalPoll";
    pub const FLUSH_BSS: &str = "FlushBSS";
    pub const ADD_NETWORK: &str = "AddNetwork";
    pub const REMOVE_NETWORK: &str = "RemoveNetwork";
    pub const REMOVE_ALL_NETWORKS: &str = "RemoveAllNetworks";
    pub const SELECT_NETWORK: &str = "SelectNetwork";
    pub const ADD_BLOB: &str = "AddBlob";
    pub const REMOVE_BLOB: &str = "RemoveBlob";
    pub const GET_BLOB: &str = "GetBlob";
}

/// Properties on an Interface object.
pub mod iface_prop {
    pub const IFNAME: &str = "Ifname";
    pub const STATE: &str = "State";
    pub const SCANNING: &str = "Scanning";
    pub const BSSS: &str = "BSSs";
    pub const NETWORKS: &str = "Networks";
    pub const CURRENT_BSS: &str = "CurrentBSS";
    pub const CURRENT_NETWORK: &str = "CurrentNetwork";
    pub const CURRENT_AUTH_MODE: &str = "CurrentAuthMode";
    pub const BLOBS: &str = "Blobs";
    pub const AP_SCAN: &str = "ApScan";
    pub const COUNTRY: &str = "Country";
}

/// Signals emitted on an Interface object.
pub mod iface_signal {
    pub const SCAN_DONE: &str = "ScanDone";
}

/// Properties on a Network (profile) object.
pub mod network_prop {
    pub const PROPERTIES: &str = "Properties";
    pub const ENABLED: &str = "Enabled";
}

/// Properties on a BSS (scan result) object.
pub mod bss_prop {
    pub const SSID: &str = "SSID";
    pub const BSSID: &str = "BSSID";
    pub const FREQUENCY: &str = "Frequency";
    pub const SIGNAL: &str = "Signal";
    pub const AGE: &str = "Age";
    pub const MODE: &str = "Mode";
    pub const PRIVACY: &str = "Privacy";
    pub const RSN: &str = "RSN";
    pub const WPA: &str = "WPA";
}

/// D-Bus error names that mean "the referenced object no longer exists".
pub mod stale_errors {
    pub const NETWORK_UNKNOWN: &str = "fi.w1.wpa_supplicant1.NetworkUnknown";
    pub const BLOB_UNKNOWN: &str = "fi.w1.wpa_supplicant1.BlobUnknown";
    pub const UNKNOWN_OBJECT: &str = "org.freedesktop.DBus.Error.UnknownObject";
    pub const UNKNOWN_METHOD: &str = "org.freedesktop.DBus.Error.UnknownMethod";
}

/// D-Bus error names meaning "this backend does not expose the property".
pub mod absent_property_errors {
    pub const INVALID_ARGS: &str = "org.freedesktop.DBus.Error.InvalidArgs";
    pub const UNKNOWN_PROPERTY: &str = "org.freedesktop.DBus.Error.UnknownProperty";
}

/// Error name reported by `GetInterface` for unregistered interfaces.
pub const INTERFACE_UNKNOWN: &str = "fi.w1.wpa_supplicant1.InterfaceUnknown";

/// Defaults applied to `AddNetwork` field maps.
pub mod network_defaults {
    /// `MGMT_FRAME_PROTECTION_DEFAULT`: follow the global `pmf` setting.
    pub const IEEE80211W: u32 = 3;
    pub const PRIORITY: u32 = 0;
    /// 0 = infrastructure, 1 = IBSS, 2 = AP.
    pub const MODE: u32 = 0;
}

/// Timing constants for scan completion waits.
pub mod timeouts {
    use std::time::Duration;

    /// Interval between reads of the `Scanning` property (2 seconds).
    const SCAN_POLL_SECS: u64 = 2;

    /// Returns the default scan poll interval.
    pub fn scan_poll_interval() -> Duration {
        Duration::from_secs(SCAN_POLL_SECS)
    }
}

/// WiFi frequency constants (MHz)
pub mod frequency {
    pub const BAND_2_4_START: u32 = 2412;
    pub const BAND_2_4_END: u32 = 2472;
    pub const BAND_2_4_CH14: u32 = 2484;
    pub const BAND_5_START: u32 = 5150;
    pub const BAND_5_END: u32 = 5925;
    pub const BAND_6_START: u32 = 5955;
    pub const BAND_6_END: u32 = 7115;
    pub const CHANNEL_SPACING: u32 = 5;
}
