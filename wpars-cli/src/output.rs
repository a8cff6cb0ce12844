//! Terminal rendering of supplicant data.

use std::fmt::Write as _;

use wpars::{
    Bss, InterfaceStatus, InterfaceSummary, NetworkEntry, RemoteEvent, SignalInfo,
};

const RULE: &str = "================================================================";

fn label(out: &mut String, key: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "{key:<16} {value}");
}

pub fn interfaces(list: &[InterfaceSummary]) -> String {
    let mut out = String::from("====== Managed interfaces ======\n");
    for (i, iface) in list.iter().enumerate() {
        let _ = writeln!(out, "{i} {:<20} {}", iface.name, iface.state);
    }
    out.push_str("\tHint: use command `up` or `down` to integrate or disintegrate a link\n");
    out
}

pub fn scan_results(results: &[Bss]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<32} {:<17} {:>4} {:>4} {:>3} Flags",
        "SSID", "BSSID", "Freq", "Sig", "Age"
    );
    let _ = writeln!(out, "{RULE}");
    for bss in results {
        let _ = writeln!(
            out,
            "{:<32} {} {:>4} {:>4} {:>3} [{}] [{}]",
            bss.ssid,
            bss.bssid_hex(),
            bss.frequency,
            bss.signal,
            bss.age,
            bss.rsn.key_mgmt.join(" "),
            bss.rsn.pairwise.join(" ")
        );
    }
    out
}

pub fn networks(entries: &[NetworkEntry], long: bool) -> String {
    let mut out = String::new();
    if long {
        let _ = writeln!(out, "Id {:<32} Dis [dbus-obj-path]", "SSID");
    } else {
        let _ = writeln!(out, "Id {:<32} Dis", "SSID");
    }
    let _ = writeln!(out, "{RULE}");
    for entry in entries {
        let ssid = entry.ssid.as_deref().unwrap_or("");
        let disabled = match entry.disabled {
            Some(true) => "1",
            Some(false) => "0",
            None => "?",
        };
        if long {
            let _ = writeln!(
                out,
                "{:>2} {ssid:<32} {disabled:<3} {}",
                entry.ordinal, entry.handle
            );
        } else {
            let _ = writeln!(out, "{:>2} {ssid:<32} {disabled:<3}", entry.ordinal);
        }
    }
    out
}

pub fn status(status: &InterfaceStatus) -> String {
    let mut out = String::from("Interface status\n================\n");
    label(&mut out, "interface", &status.name);
    label(&mut out, "dbus interface", &status.handle);
    label(&mut out, "state", &status.state);
    if let Some(mode) = &status.auth_mode {
        label(&mut out, "auth mode", mode);
    }

    if let Some(bss) = &status.current_bss {
        label(&mut out, "bssid", bss.bssid_hex());
        label(&mut out, "freq", bss.frequency);
        label(&mut out, "ssid", &bss.ssid);
        if let Some(mode) = &bss.mode {
            label(&mut out, "mode", mode);
        }
        label(&mut out, "pairwise cipher", bss.rsn.pairwise.join(" "));
        label(&mut out, "group cipher", bss.rsn.group.as_deref().unwrap_or(""));
        label(&mut out, "key mgmt", bss.rsn.key_mgmt.join(" "));
        label(&mut out, "signal", bss.signal);
        if let Some(privacy) = bss.privacy {
            label(&mut out, "privacy", privacy);
        }
        label(&mut out, "age", format!("{}s", bss.age));
    }

    if let Some(network) = &status.current_network {
        label(&mut out, "network", network);
    }
    out
}

pub fn signal(info: &SignalInfo) -> String {
    let mut keys: Vec<&String> = info.raw.keys().collect();
    keys.sort();
    let mut out = String::new();
    for key in keys {
        let _ = writeln!(out, "{key:<10} {}", info.raw[key]);
    }
    out
}

pub fn blobs(list: &[(String, Vec<u8>)], legend: bool) -> String {
    let mut out = String::new();
    if legend {
        let _ = writeln!(out, "{:<32} Length", "Name");
        let _ = writeln!(out, "========================================");
    }
    for (name, data) in list {
        if legend {
            let _ = writeln!(out, "{name:<32} {}", data.len());
        } else {
            let _ = writeln!(out, "{name}");
        }
    }
    out
}

pub fn event(event: &RemoteEvent) -> String {
    let args: Vec<String> = event.args.iter().map(ToString::to_string).collect();
    format!(
        "{} {}.{} {}",
        event.path,
        event.interface,
        event.member,
        args.join(" ")
    )
    .trim_end()
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wpars::{InterfaceState, ObjectHandle, PropertyMap, RemoteValue, SecurityInfo};

    fn bss() -> Bss {
        Bss {
            handle: ObjectHandle::new("/fi/w1/wpa_supplicant1/Interfaces/0/BSSs/0"),
            ssid: "MyNet".into(),
            ssid_bytes: b"MyNet".to_vec(),
            bssid: vec![0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff],
            frequency: 2412,
            signal: -42,
            age: 3,
            mode: Some("infrastructure".into()),
            privacy: Some(true),
            rsn: SecurityInfo {
                key_mgmt: vec!["wpa-psk".into()],
                pairwise: vec!["ccmp".into()],
                group: Some("ccmp".into()),
            },
            wpa: None,
        }
    }

    #[test]
    fn scan_table_lists_each_bss() {
        let table = scan_results(&[bss()]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("SSID"));
        assert!(lines[2].starts_with("MyNet"));
        assert!(lines[2].contains("aa:bb:cc:dd:ee:ff"));
        assert!(lines[2].ends_with("[wpa-psk] [ccmp]"));
    }

    #[test]
    fn long_network_listing_shows_paths() {
        let entry = NetworkEntry {
            ordinal: 0,
            handle: ObjectHandle::new("/fi/w1/wpa_supplicant1/Interfaces/0/Networks/4"),
            ssid: Some("\"Home\"".into()),
            disabled: Some(false),
            properties: PropertyMap::new(),
        };
        let short = networks(std::slice::from_ref(&entry), false);
        assert!(!short.contains("Networks/4"));
        let long = networks(&[entry], true);
        assert!(long.lines().nth(2).is_some_and(|l| l.ends_with("Networks/4")));
    }

    #[test]
    fn status_omits_bss_block_when_unassociated() {
        let text = status(&InterfaceStatus {
            name: "wlan0".into(),
            handle: ObjectHandle::new("/fi/w1/wpa_supplicant1/Interfaces/0"),
            state: InterfaceState::Disconnected,
            auth_mode: None,
            current_bss: None,
            current_network: None,
        });
        assert!(text.contains("state            disconnected"));
        assert!(!text.contains("bssid"));
    }

    #[test]
    fn status_prints_current_bss() {
        let text = status(&InterfaceStatus {
            name: "wlan0".into(),
            handle: ObjectHandle::new("/fi/w1/wpa_supplicant1/Interfaces/0"),
            state: InterfaceState::Completed,
            auth_mode: Some("WPA2-PSK".into()),
            current_bss: Some(bss()),
            current_network: None,
        });
        assert!(text.contains("bssid            aa:bb:cc:dd:ee:ff"));
        assert!(text.contains("age              3s"));
    }

    #[test]
    fn blob_listing_without_legend_is_names_only() {
        let list = vec![("ca-cert".to_string(), vec![0u8; 12])];
        assert_eq!(blobs(&list, false), "ca-cert\n");
        assert!(blobs(&list, true).contains("ca-cert                          12"));
    }

    #[test]
    fn event_line_joins_arguments() {
        let line = event(&RemoteEvent {
            path: ObjectHandle::new("/fi/w1/wpa_supplicant1/Interfaces/0"),
            interface: "fi.w1.wpa_supplicant1.Interface".into(),
            member: "ScanDone".into(),
            args: vec![RemoteValue::Bool(true)],
        });
        assert_eq!(
            line,
            "/fi/w1/wpa_supplicant1/Interfaces/0 fi.w1.wpa_supplicant1.Interface.ScanDone true"
        );
    }
}
