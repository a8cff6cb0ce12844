//! Command line definitions for `wpactl`.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use wpars::ScanType;

#[derive(Parser, Debug)]
#[command(name = "wpactl")]
#[command(about = "Control WPA supplicant through its D-Bus interface", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// An interface name, the common positional argument.
#[derive(Args, Debug, Clone)]
pub struct Ifname {
    /// Network interface name, e.g. wlan0
    pub ifname: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Managed network interfaces
    #[command(subcommand)]
    Interface(InterfaceCommand),

    /// Show the current WPA/EAPOL/EAP status of an interface
    #[command(visible_alias = "st")]
    Status {
        #[command(flatten)]
        iface: Ifname,

        /// Print the status again every SECONDS
        #[arg(long = "loop", value_name = "SECONDS")]
        repeat: Option<f64>,
    },

    /// Put an interface under WPA supplicant management
    Up {
        #[command(flatten)]
        iface: Ifname,

        /// Configuration file path
        #[arg(long, default_value = "/dev/null")]
        config: PathBuf,

        /// Driver the interface uses, e.g. nl80211 or wired
        #[arg(long)]
        driver: Option<String>,

        /// Name of the bridge interface to control, e.g. br0
        #[arg(long)]
        bridge: Option<String>,
    },

    /// Release an interface from WPA supplicant management
    #[command(visible_alias = "dn")]
    Down(Ifname),

    /// Search for wireless networks on an interface
    #[command(visible_alias = "sc")]
    Scan {
        #[command(flatten)]
        iface: Ifname,

        /// Scan type: active or passive
        #[arg(short = 't', long = "type", default_value = "active")]
        scan_type: ScanType,

        /// Allow a roaming decision based on the results of this scan
        #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
        allow_roam: bool,

        /// Wait for the scan and show its results
        #[arg(short, long)]
        results: bool,
    },

    /// Show the results of the last scan
    #[command(visible_aliases = ["sr", "scr"])]
    ScanResults(Ifname),

    /// Reconnect, only if currently disconnected
    #[command(visible_alias = "rc")]
    Reconnect(Ifname),

    /// Disconnect and wait for reassociate or reconnect
    #[command(visible_alias = "dc")]
    Disconnect(Ifname),

    /// Force reassociation
    #[command(visible_alias = "ra")]
    Reassociate(Ifname),

    /// Force reassociation back to the same BSS
    #[command(visible_alias = "rat")]
    Reattach(Ifname),

    /// Show signal parameters of the current link
    #[command(alias = "signal_poll")]
    SignalPoll(Ifname),

    /// Flush BSS entries from the cache
    #[command(alias = "flush_bss")]
    FlushBss {
        #[command(flatten)]
        iface: Ifname,

        /// Maximum age in seconds of entries to keep (0 removes all)
        #[arg(long, default_value_t = 0)]
        age: u32,
    },

    /// Operations on configured networks
    #[command(subcommand)]
    Networks(NetworkCommand),

    /// Manage blobs
    #[command(subcommand)]
    Blob(BlobCommand),

    /// Dump D-Bus signals of all managed interfaces
    Monitor,
}

#[derive(Subcommand, Debug)]
pub enum InterfaceCommand {
    /// List managed interfaces
    List,

    /// Set interface properties
    Set {
        #[command(flatten)]
        iface: Ifname,

        /// AP scanning/selection: 0, 1 or 2
        #[arg(long = "ap-scan", alias = "ap_scan", value_parser = clap::value_parser!(u32).range(0..=2))]
        ap_scan: Option<u32>,

        /// ISO/IEC alpha2 country code
        #[arg(long)]
        country: Option<String>,
    },
}

/// Flags shared by the profile commands that modify the list.
#[derive(Args, Debug, Clone, Copy)]
pub struct ShowResults {
    /// Show the resulting network list
    #[arg(short, long)]
    pub results: bool,
}

#[derive(Subcommand, Debug)]
pub enum NetworkCommand {
    /// List configured networks
    List {
        #[command(flatten)]
        iface: Ifname,

        /// Use a long listing format
        #[arg(long)]
        long: bool,
    },

    /// Add a network entry
    Add {
        #[command(flatten)]
        iface: Ifname,

        #[command(flatten)]
        fields: NetworkArgs,

        #[command(flatten)]
        show: ShowResults,
    },

    /// Remove network entries
    #[command(group(clap::ArgGroup::new("target").required(true).args(["id", "ssid", "all"])))]
    Remove {
        #[command(flatten)]
        iface: Ifname,

        /// Id number of the network to remove
        #[arg(short, long)]
        id: Option<usize>,

        /// Remove every network with this SSID
        #[arg(long)]
        ssid: Option<String>,

        /// Remove all configured networks
        #[arg(long)]
        all: bool,

        #[command(flatten)]
        show: ShowResults,
    },

    /// Enable a network entry
    Enable {
        #[command(flatten)]
        iface: Ifname,

        /// Id number of the network to enable
        #[arg(short, long)]
        id: usize,

        #[command(flatten)]
        show: ShowResults,
    },

    /// Disable a network entry
    Disable {
        #[command(flatten)]
        iface: Ifname,

        /// Id number of the network to disable
        #[arg(short, long)]
        id: usize,

        #[command(flatten)]
        show: ShowResults,
    },

    /// Select a network entry and disable the others
    Select {
        #[command(flatten)]
        iface: Ifname,

        /// Id number of the network to select
        #[arg(short, long)]
        id: usize,

        #[command(flatten)]
        show: ShowResults,

        /// Show the interface status afterwards
        #[arg(short, long)]
        status: bool,
    },
}

/// Settings for `networks add`.
#[derive(Args, Debug, Clone, Default)]
pub struct NetworkArgs {
    /// SSID of the entry
    #[arg(long)]
    pub ssid: Option<String>,

    /// BSSID of the entry
    #[arg(long)]
    pub bssid: Option<String>,

    /// Preshared key (aka. password)
    #[arg(long)]
    pub psk: Option<String>,

    /// SAE password
    #[arg(long = "sae-password", alias = "sae_password")]
    pub sae_password: Option<String>,

    /// List of accepted protocols
    #[arg(long)]
    pub proto: Option<String>,

    /// Key management method
    #[arg(long = "key-mgmt", alias = "key_mgmt")]
    pub key_mgmt: Option<String>,

    /// List of accepted pairwise (unicast) ciphers
    #[arg(long)]
    pub pairwise: Option<String>,

    /// Space-separated list of accepted EAP methods
    #[arg(long)]
    pub eap: Option<String>,

    /// Identity string for EAP
    #[arg(long)]
    pub identity: Option<String>,

    /// Path to the client certificate file (PEM/DER)
    #[arg(long = "client-cert", alias = "client_cert")]
    pub client_cert: Option<String>,

    /// Path to the client private key file (PEM/DER/PFX)
    #[arg(long = "private-key", alias = "private_key")]
    pub private_key: Option<String>,

    /// Password for the private key file
    #[arg(long = "private-key-passwd", alias = "private_key_passwd")]
    pub private_key_passwd: Option<String>,

    /// Channel frequency in MHz
    #[arg(long, default_value_t = 0)]
    pub frequency: u32,

    /// IEEE 802.11 operation mode: 0=infrastructure, 1=IBSS, 2=AP
    #[arg(long, default_value_t = 0)]
    pub mode: u32,

    /// Management frame protection (0 disabled, 1 optional, 2 required, 3 default)
    #[arg(long, default_value_t = 3)]
    pub ieee80211w: u32,

    /// Priority group
    #[arg(long, default_value_t = 0)]
    pub prio: u32,

    /// Add the entry disabled
    #[arg(long)]
    pub disabled: bool,
}

#[derive(Subcommand, Debug)]
pub enum BlobCommand {
    /// Show the blobs of an interface
    List {
        #[command(flatten)]
        iface: Ifname,

        /// Do not show headers
        #[arg(long)]
        no_legend: bool,
    },

    /// Add a blob read from a file
    Add {
        #[command(flatten)]
        iface: Ifname,

        /// Identifier of the blob
        #[arg(long)]
        name: String,

        /// File containing the data
        #[arg(long)]
        data: PathBuf,
    },

    /// Remove a blob
    Remove {
        #[command(flatten)]
        iface: Ifname,

        /// Identifier of the blob
        #[arg(long)]
        name: String,
    },

    /// Write a blob's data to a file
    Get {
        #[command(flatten)]
        iface: Ifname,

        /// Identifier of the blob
        #[arg(long)]
        name: String,

        /// Output file name
        #[arg(long)]
        output: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definitions_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn scan_defaults() {
        let cli = Cli::try_parse_from(["wpactl", "scan", "wlan0"]).unwrap();
        let Some(Command::Scan {
            iface,
            scan_type,
            allow_roam,
            results,
        }) = cli.command
        else {
            panic!("expected scan");
        };
        assert_eq!(iface.ifname, "wlan0");
        assert_eq!(scan_type, ScanType::Active);
        assert!(allow_roam);
        assert!(!results);
    }

    #[test]
    fn scan_flags() {
        let cli = Cli::try_parse_from([
            "wpactl", "sc", "wlan0", "-t", "passive", "--allow-roam", "false", "-r",
        ])
        .unwrap();
        let Some(Command::Scan {
            scan_type,
            allow_roam,
            results,
            ..
        }) = cli.command
        else {
            panic!("expected scan");
        };
        assert_eq!(scan_type, ScanType::Passive);
        assert!(!allow_roam);
        assert!(results);
    }

    #[test]
    fn remove_needs_a_target() {
        assert!(Cli::try_parse_from(["wpactl", "networks", "remove", "wlan0"]).is_err());
        assert!(Cli::try_parse_from(["wpactl", "networks", "remove", "wlan0", "--all"]).is_ok());
    }

    #[test]
    fn bare_invocation_has_no_command() {
        let cli = Cli::try_parse_from(["wpactl"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn add_defaults_match_daemon_defaults() {
        let cli = Cli::try_parse_from(["wpactl", "networks", "add", "wlan0", "--ssid", "Home"])
            .unwrap();
        let Some(Command::Networks(NetworkCommand::Add { fields, .. })) = cli.command else {
            panic!("expected networks add");
        };
        assert_eq!(fields.ieee80211w, 3);
        assert_eq!(fields.prio, 0);
        assert_eq!(fields.frequency, 0);
        assert!(!fields.disabled);
    }
}
