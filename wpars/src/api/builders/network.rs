//! Field map builder for new network profiles.
//!
//! wpa_supplicant's `AddNetwork` takes a `a{sv}` of network block settings.
//! [`NetworkFields`] collects those settings and renders the map, applying the
//! daemon-facing defaults for the numeric fields.
//!
//! # Example
//!
//! ```rust
//! use wpars::builders::NetworkFields;
//!
//! let fields = NetworkFields::new()
//!     .ssid("HomeNetwork")
//!     .psk("hunter22")
//!     .priority(5);
//!
//! let map = fields.to_property_map();
//! assert!(map.contains_key("ssid"));
//! assert!(!map.contains_key("frequency"));
//! ```

use serde::{Deserialize, Serialize};

use crate::types::constants::network_defaults;
use crate::types::value::{PropertyMap, RemoteValue};

/// Settings for a network profile to be added with `AddNetwork`.
///
/// Text settings are sent only when set to a non-empty value.
/// `ieee80211w`, `priority` and `mode` are always sent; `frequency` only when
/// positive; `disabled` only when explicitly set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkFields {
    pub ssid: Option<String>,
    pub psk: Option<String>,
    pub bssid: Option<String>,
    /// Accepted protocols, e.g. `RSN`.
    pub proto: Option<String>,
    pub key_mgmt: Option<String>,
    pub pairwise: Option<String>,
    /// Space-separated EAP methods.
    pub eap: Option<String>,
    pub identity: Option<String>,
    pub client_cert: Option<String>,
    pub private_key: Option<String>,
    pub private_key_passwd: Option<String>,
    pub sae_password: Option<String>,
    /// Management frame protection: 0 disabled, 1 optional, 2 required,
    /// 3 follow the global setting.
    pub ieee80211w: u32,
    pub priority: u32,
    /// 0 = infrastructure, 1 = IBSS, 2 = AP.
    pub mode: u32,
    /// Channel frequency in MHz; 0 leaves it unset.
    pub frequency: u32,
    pub disabled: Option<bool>,
}

impl Default for NetworkFields {
    fn default() -> Self {
        Self {
            ssid: None,
            psk: None,
            bssid: None,
            proto: None,
            key_mgmt: None,
            pairwise: None,
            eap: None,
            identity: None,
            client_cert: None,
            private_key: None,
            private_key_passwd: None,
            sae_password: None,
            ieee80211w: network_defaults::IEEE80211W,
            priority: network_defaults::PRIORITY,
            mode: network_defaults::MODE,
            frequency: 0,
            disabled: None,
        }
    }
}

macro_rules! text_setter {
    ($($name:ident),* $(,)?) => {
        $(
            #[must_use]
            pub fn $name(mut self, value: impl Into<String>) -> Self {
                self.$name = Some(value.into());
                self
            }
        )*
    };
}

impl NetworkFields {
    pub fn new() -> Self {
        Self::default()
    }

    text_setter!(
        ssid,
        psk,
        bssid,
        proto,
        key_mgmt,
        pairwise,
        eap,
        identity,
        client_cert,
        private_key,
        private_key_passwd,
        sae_password,
    );

    #[must_use]
    pub fn ieee80211w(mut self, value: u32) -> Self {
        self.ieee80211w = value;
        self
    }

    #[must_use]
    pub fn priority(mut self, value: u32) -> Self {
        self.priority = value;
        self
    }

    #[must_use]
    pub fn mode(mut self, value: u32) -> Self {
        self.mode = value;
        self
    }

    #[must_use]
    pub fn frequency(mut self, mhz: u32) -> Self {
        self.frequency = mhz;
        self
    }

    /// Sets the initial enabled state of the profile.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }

    /// Renders the `AddNetwork` argument map.
    pub fn to_property_map(&self) -> PropertyMap {
        let mut map = PropertyMap::new();

        let text = [
            ("ssid", &self.ssid),
            ("psk", &self.psk),
            ("bssid", &self.bssid),
            ("proto", &self.proto),
            ("key_mgmt", &self.key_mgmt),
            ("pairwise", &self.pairwise),
            ("eap", &self.eap),
            ("identity", &self.identity),
            ("client_cert", &self.client_cert),
            ("private_key", &self.private_key),
            ("private_key_passwd", &self.private_key_passwd),
            ("sae_password", &self.sae_password),
        ];
        for (key, value) in text {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                map.insert(key.to_string(), RemoteValue::from(v));
            }
        }

        map.insert("ieee80211w".into(), RemoteValue::UInt32(self.ieee80211w));
        map.insert("priority".into(), RemoteValue::UInt32(self.priority));
        map.insert("mode".into(), RemoteValue::UInt32(self.mode));
        if self.frequency > 0 {
            map.insert("frequency".into(), RemoteValue::UInt32(self.frequency));
        }
        if let Some(disabled) = self.disabled {
            map.insert("disabled".into(), RemoteValue::UInt32(u32::from(disabled)));
        }

        map
    }
}
