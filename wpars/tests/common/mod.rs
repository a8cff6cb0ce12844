//! In-memory stand-in for wpa_supplicant's D-Bus object model.
//!
//! `FakeBus` keeps a tiny model of the daemon (interfaces, profiles,
//! scripted properties) and records every call so tests can assert exact
//! call counts and ordering.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::channel::mpsc::{UnboundedSender, unbounded};
use wpars::{BusSession, EventStream, ObjectHandle, PropertyMap, RemoteEvent, RemoteValue, SupplicantError};

pub const ROOT: &str = "/fi/w1/wpa_supplicant1";
pub const IFACE: &str = "fi.w1.wpa_supplicant1.Interface";
pub const NETWORK: &str = "fi.w1.wpa_supplicant1.Network";
pub const BSS: &str = "fi.w1.wpa_supplicant1.BSS";

pub const INTERFACE_UNKNOWN: &str = "fi.w1.wpa_supplicant1.InterfaceUnknown";
pub const NETWORK_UNKNOWN: &str = "fi.w1.wpa_supplicant1.NetworkUnknown";
pub const UNKNOWN_PROPERTY: &str = "org.freedesktop.DBus.Error.UnknownProperty";
pub const UNKNOWN_OBJECT: &str = "org.freedesktop.DBus.Error.UnknownObject";

/// One recorded bus call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Invoke {
        path: String,
        method: String,
        args: Vec<RemoteValue>,
    },
    Get {
        path: String,
        name: String,
    },
    Set {
        path: String,
        name: String,
        value: RemoteValue,
    },
    Subscribe {
        path: Option<String>,
        member: Option<String>,
    },
}

struct Subscriber {
    path: Option<String>,
    interface: String,
    member: Option<String>,
    tx: UnboundedSender<RemoteEvent>,
}

#[derive(Default)]
struct State {
    interfaces: Vec<(String, String)>,
    properties: HashMap<(String, String), VecDeque<RemoteValue>>,
    networks: HashMap<String, Vec<String>>,
    network_props: HashMap<String, PropertyMap>,
    next_network: usize,
    replies: HashMap<String, RemoteValue>,
    errors: HashMap<String, String>,
    scan_done: Option<bool>,
    pending_events: Vec<RemoteEvent>,
    subscribers: Vec<Subscriber>,
    drop_after_list: Option<(String, usize)>,
    calls: Vec<Call>,
}

#[derive(Default)]
pub struct FakeBus {
    state: Mutex<State>,
}

pub fn iface_path(index: usize) -> String {
    format!("{ROOT}/Interfaces/{index}")
}

pub fn bss_path(iface: usize, index: usize) -> String {
    format!("{}/BSSs/{index}", iface_path(iface))
}

fn remote_error(path: &str, member: &str, name: &str) -> SupplicantError {
    SupplicantError::remote(path, member, Some(name.to_string()), format!("{name} from fake bus"))
}

fn quoted(key: &str, value: &RemoteValue) -> RemoteValue {
    let text = match value {
        RemoteValue::Str(s) if matches!(key, "ssid" | "psk") => format!("\"{s}\""),
        RemoteValue::Str(s) => s.clone(),
        RemoteValue::UInt32(n) => n.to_string(),
        RemoteValue::Int32(n) => n.to_string(),
        RemoteValue::Bool(b) => u8::from(*b).to_string(),
        other => other.to_string(),
    };
    RemoteValue::Str(text)
}

impl FakeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an interface at `Interfaces/<index in registration order>`.
    pub fn with_interface(self, name: &str, state: &str) -> Self {
        let path = {
            let st = self.state.lock().unwrap();
            iface_path(st.interfaces.len())
        };
        {
            let mut guard = self.state.lock().unwrap();
            let st = &mut *guard;
            st.interfaces.push((name.to_string(), path.clone()));
            st.networks.insert(path.clone(), Vec::new());
        }
        self.with_property(&path, "Ifname", RemoteValue::from(name))
            .with_property(&path, "State", RemoteValue::from(state))
            .with_property(&path, "Scanning", RemoteValue::Bool(false))
            .with_property(&path, "BSSs", RemoteValue::ObjectPathList(Vec::new()))
    }

    pub fn with_property(self, path: &str, name: &str, value: RemoteValue) -> Self {
        self.with_property_sequence(path, name, vec![value])
    }

    /// Each read returns the next value; the last one repeats.
    pub fn with_property_sequence(self, path: &str, name: &str, values: Vec<RemoteValue>) -> Self {
        self.state
            .lock()
            .unwrap()
            .properties
            .insert((path.to_string(), name.to_string()), values.into());
        self
    }

    /// Adds a BSS object and appends it to the interface's `BSSs`.
    pub fn with_bss(self, iface: usize, index: usize, props: &[(&str, RemoteValue)]) -> Self {
        let path = bss_path(iface, index);
        let list_key = (iface_path(iface), "BSSs".to_string());
        {
            let mut guard = self.state.lock().unwrap();
            let st = &mut *guard;
            let entry = st.properties.entry(list_key).or_default();
            let mut list = match entry.front() {
                Some(RemoteValue::ObjectPathList(list)) => list.clone(),
                _ => Vec::new(),
            };
            list.push(ObjectHandle::new(path.clone()));
            *entry = VecDeque::from(vec![RemoteValue::ObjectPathList(list)]);
        }
        props
            .iter()
            .fold(self, |bus, (name, value)| bus.with_property(&path, name, value.clone()))
    }

    /// Adds a stored profile with the given `ssid` and `disabled` settings.
    pub fn with_network(self, iface: usize, ssid: &str, disabled: bool) -> Self {
        {
            let mut guard = self.state.lock().unwrap();
            let st = &mut *guard;
            let mut props = PropertyMap::new();
            props.insert("ssid".into(), RemoteValue::Str(format!("\"{ssid}\"")));
            props.insert("disabled".into(), RemoteValue::from(if disabled { "1" } else { "0" }));
            add_network(st, &iface_path(iface), props);
        }
        self
    }

    pub fn with_reply(self, method: &str, value: RemoteValue) -> Self {
        self.state
            .lock()
            .unwrap()
            .replies
            .insert(method.to_string(), value);
        self
    }

    /// Makes every call of `method`, or every write of the property of that
    /// name, fail with the D-Bus error `name`.
    pub fn with_error(self, method: &str, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .errors
            .insert(method.to_string(), name.to_string());
        self
    }

    /// Emits `ScanDone(success)` to current subscribers whenever `Scan` is
    /// invoked.
    pub fn with_scan_done(self, success: bool) -> Self {
        self.state.lock().unwrap().scan_done = Some(success);
        self
    }

    /// Queues an event for the next `subscribe_all`.
    pub fn with_pending_event(self, event: RemoteEvent) -> Self {
        self.state.lock().unwrap().pending_events.push(event);
        self
    }

    /// Removes the profile at `ordinal` right after the next `Networks`
    /// read, so the caller holds a handle that is already gone.
    pub fn drop_network_after_list(&self, iface: usize, ordinal: usize) {
        self.state.lock().unwrap().drop_after_list = Some((iface_path(iface), ordinal));
    }

    /// Subscriptions whose stream is still held by the client.
    pub fn live_subscribers(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .subscribers
            .iter()
            .filter(|sub| !sub.tx.is_closed())
            .count()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn invocations(&self, method: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Invoke { method: m, .. } if m == method))
            .count()
    }

    pub fn reads(&self, path: &str, name: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Get { path: p, name: n } if p == path && n == name))
            .count()
    }

    pub fn invoked_args(&self, method: &str) -> Vec<Vec<RemoteValue>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Invoke { method: m, args, .. } if m == method => Some(args),
                _ => None,
            })
            .collect()
    }

    pub fn network_paths(&self, iface: usize) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .networks
            .get(&iface_path(iface))
            .cloned()
            .unwrap_or_default()
    }

    /// Removes a profile behind the client's back.
    pub fn drop_network(&self, iface: usize, ordinal: usize) {
        let mut guard = self.state.lock().unwrap();
        let st = &mut *guard;
        if let Some(list) = st.networks.get_mut(&iface_path(iface)) {
            let path = list.remove(ordinal);
            st.network_props.remove(&path);
        }
    }
}

fn add_network(st: &mut State, iface: &str, props: PropertyMap) -> String {
    let path = format!("{iface}/Networks/{}", st.next_network);
    st.next_network += 1;
    st.networks
        .entry(iface.to_string())
        .or_default()
        .push(path.clone());
    st.network_props.insert(path.clone(), props);
    path
}

fn set_disabled(st: &mut State, path: &str, disabled: bool) {
    if let Some(props) = st.network_props.get_mut(path) {
        props.insert(
            "disabled".into(),
            RemoteValue::from(if disabled { "1" } else { "0" }),
        );
    }
}

fn emit(st: &mut State, event: RemoteEvent) {
    st.subscribers.retain(|sub| {
        let matches = sub.interface == event.interface
            && sub.path.as_deref().is_none_or(|p| p == event.path.as_str())
            && sub.member.as_deref().is_none_or(|m| m == event.member);
        !matches || sub.tx.unbounded_send(event.clone()).is_ok()
    });
}

fn path_arg(args: &[RemoteValue]) -> Option<String> {
    match args.first() {
        Some(RemoteValue::ObjectPath(p)) => Some(p.as_str().to_string()),
        _ => None,
    }
}

#[async_trait]
impl BusSession for FakeBus {
    async fn invoke(
        &self,
        path: &ObjectHandle,
        _interface: &str,
        method: &str,
        args: Vec<RemoteValue>,
    ) -> wpars::Result<Option<RemoteValue>> {
        let mut guard = self.state.lock().unwrap();
        let st = &mut *guard;
        st.calls.push(Call::Invoke {
            path: path.as_str().to_string(),
            method: method.to_string(),
            args: args.clone(),
        });

        if let Some(name) = st.errors.get(method) {
            return Err(remote_error(path.as_str(), method, name));
        }

        match method {
            "GetInterface" => {
                let wanted = match args.first() {
                    Some(RemoteValue::Str(s)) => s.clone(),
                    _ => String::new(),
                };
                st.interfaces
                    .iter()
                    .find(|(name, _)| *name == wanted)
                    .map(|(_, p)| Some(RemoteValue::ObjectPath(ObjectHandle::new(p.clone()))))
                    .ok_or_else(|| remote_error(path.as_str(), method, INTERFACE_UNKNOWN))
            }
            "AddNetwork" => {
                let props = match args.into_iter().next() {
                    Some(RemoteValue::Map(map)) => map
                        .iter()
                        .map(|(k, v)| (k.clone(), quoted(k, v)))
                        .collect(),
                    _ => PropertyMap::new(),
                };
                let created = add_network(st, path.as_str(), props);
                Ok(Some(RemoteValue::ObjectPath(ObjectHandle::new(created))))
            }
            "RemoveNetwork" => {
                let target = path_arg(&args).unwrap_or_default();
                let list = st.networks.entry(path.as_str().to_string()).or_default();
                match list.iter().position(|p| *p == target) {
                    Some(pos) => {
                        list.remove(pos);
                        st.network_props.remove(&target);
                        Ok(None)
                    }
                    None => Err(remote_error(path.as_str(), method, NETWORK_UNKNOWN)),
                }
            }
            "RemoveAllNetworks" => {
                let removed = st
                    .networks
                    .insert(path.as_str().to_string(), Vec::new())
                    .unwrap_or_default();
                for p in removed {
                    st.network_props.remove(&p);
                }
                Ok(None)
            }
            "SelectNetwork" => {
                let target = path_arg(&args).unwrap_or_default();
                let list = st
                    .networks
                    .get(path.as_str())
                    .cloned()
                    .unwrap_or_default();
                if !list.contains(&target) {
                    return Err(remote_error(path.as_str(), method, NETWORK_UNKNOWN));
                }
                for p in list {
                    let disabled = p != target;
                    set_disabled(st, &p, disabled);
                }
                Ok(None)
            }
            "Scan" => {
                if let Some(success) = st.scan_done {
                    let event = RemoteEvent {
                        path: path.clone(),
                        interface: IFACE.to_string(),
                        member: "ScanDone".to_string(),
                        args: vec![RemoteValue::Bool(success)],
                    };
                    emit(st, event);
                }
                Ok(None)
            }
            _ => Ok(st.replies.get(method).cloned()),
        }
    }

    async fn get_property(
        &self,
        path: &ObjectHandle,
        _interface: &str,
        name: &str,
    ) -> wpars::Result<RemoteValue> {
        let mut guard = self.state.lock().unwrap();
        let st = &mut *guard;
        st.calls.push(Call::Get {
            path: path.as_str().to_string(),
            name: name.to_string(),
        });

        if path.as_str() == ROOT && name == "Interfaces" {
            let list = st
                .interfaces
                .iter()
                .map(|(_, p)| ObjectHandle::new(p.clone()))
                .collect();
            return Ok(RemoteValue::ObjectPathList(list));
        }
        if name == "Networks" {
            if let Some(list) = st.networks.get(path.as_str()).cloned() {
                if let Some((iface, ordinal)) = st.drop_after_list.take_if(|(p, _)| p.as_str() == path.as_str()) {
                    if let Some(gone) = st.networks.get_mut(&iface).map(|l| l.remove(ordinal)) {
                        st.network_props.remove(&gone);
                    }
                }
                return Ok(RemoteValue::ObjectPathList(
                    list.into_iter().map(ObjectHandle::new).collect(),
                ));
            }
        }
        if name == "Properties" {
            return st
                .network_props
                .get(path.as_str())
                .cloned()
                .map(RemoteValue::Map)
                .ok_or_else(|| remote_error(path.as_str(), name, UNKNOWN_OBJECT));
        }

        let key = (path.as_str().to_string(), name.to_string());
        match st.properties.get_mut(&key) {
            Some(values) if values.len() > 1 => Ok(values.pop_front().unwrap()),
            Some(values) => Ok(values.front().cloned().unwrap()),
            None => Err(remote_error(path.as_str(), name, UNKNOWN_PROPERTY)),
        }
    }

    async fn set_property(
        &self,
        path: &ObjectHandle,
        _interface: &str,
        name: &str,
        value: RemoteValue,
    ) -> wpars::Result<()> {
        let mut guard = self.state.lock().unwrap();
        let st = &mut *guard;
        st.calls.push(Call::Set {
            path: path.as_str().to_string(),
            name: name.to_string(),
            value: value.clone(),
        });

        if let Some(error) = st.errors.get(name) {
            return Err(remote_error(path.as_str(), name, error));
        }
        if name == "Enabled" {
            if !st.network_props.contains_key(path.as_str()) {
                return Err(remote_error(path.as_str(), name, NETWORK_UNKNOWN));
            }
            if let RemoteValue::Bool(enabled) = value {
                set_disabled(st, path.as_str(), !enabled);
            }
            return Ok(());
        }

        st.properties
            .insert((path.as_str().to_string(), name.to_string()), VecDeque::from(vec![value]));
        Ok(())
    }

    async fn subscribe(
        &self,
        path: &ObjectHandle,
        interface: &str,
        member: &str,
    ) -> wpars::Result<EventStream> {
        let mut guard = self.state.lock().unwrap();
        let st = &mut *guard;
        st.calls.push(Call::Subscribe {
            path: Some(path.as_str().to_string()),
            member: Some(member.to_string()),
        });

        let (tx, rx) = unbounded();
        st.subscribers.push(Subscriber {
            path: Some(path.as_str().to_string()),
            interface: interface.to_string(),
            member: Some(member.to_string()),
            tx,
        });
        Ok(Box::pin(rx))
    }

    async fn subscribe_all(&self, interface: &str) -> wpars::Result<EventStream> {
        let mut guard = self.state.lock().unwrap();
        let st = &mut *guard;
        st.calls.push(Call::Subscribe {
            path: None,
            member: None,
        });

        let (tx, rx) = unbounded();
        for event in std::mem::take(&mut st.pending_events) {
            let _ = tx.unbounded_send(event);
        }
        st.subscribers.push(Subscriber {
            path: None,
            interface: interface.to_string(),
            member: None,
            tx,
        });
        Ok(Box::pin(rx))
    }
}
