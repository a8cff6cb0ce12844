//! System bus implementation of [`BusSession`].

use async_trait::async_trait;
use futures::StreamExt;
use futures::future;
use log::{debug, warn};
use zbus::message::{Message, Type as MessageType};
use zbus::proxy::CacheProperties;
use zbus::{Connection, MatchRule, MessageStream};
use zvariant::OwnedValue;

use super::convert::{body_args, from_zvariant, object_path, to_dict, to_zvariant};
use super::{BusSession, EventStream, RemoteEvent};
use crate::Result;
use crate::api::models::SupplicantError;
use crate::types::constants::bus;
use crate::types::value::{ObjectHandle, RemoteValue};

const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";

/// A [`BusSession`] backed by a zbus connection to the system bus.
///
/// Cloning shares the underlying connection. The connection is released when
/// the last clone is dropped, or explicitly through [`BusSession::close`].
#[derive(Debug, Clone)]
pub struct ZbusSession {
    conn: Connection,
}

impl ZbusSession {
    /// Connects to the system bus.
    pub async fn system() -> Result<Self> {
        let conn = Connection::system().await?;
        Ok(Self { conn })
    }

    /// Wraps an existing connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Helper to create a wpa_supplicant proxy for a given path and interface.
    ///
    /// Property caching is disabled: every read must hit the daemon.
    async fn proxy(&self, path: &ObjectHandle, interface: &str) -> Result<zbus::Proxy<'static>> {
        Ok(zbus::proxy::Builder::new(&self.conn)
            .destination(bus::SERVICE)?
            .path(object_path(path)?)?
            .interface(interface.to_owned())?
            .cache_properties(CacheProperties::No)
            .build()
            .await?)
    }
}

/// Maps a failed call to an error naming the object and member.
fn remote_error(path: &ObjectHandle, member: &str, err: zbus::Error) -> SupplicantError {
    match err {
        zbus::Error::MethodError(name, message, _) => SupplicantError::remote(
            path.as_str(),
            member,
            Some(name.to_string()),
            message.unwrap_or_else(|| name.to_string()),
        ),
        other => SupplicantError::remote(path.as_str(), member, None, other.to_string()),
    }
}

fn describe(args: &[RemoteValue]) -> String {
    let kinds: Vec<&str> = args.iter().map(RemoteValue::kind).collect();
    format!("({})", kinds.join(", "))
}

fn event_from_message(msg: &Message) -> Option<RemoteEvent> {
    let header = msg.header();
    let path = header.path()?.as_str().to_owned();
    let interface = header.interface()?.to_string();
    let member = header.member()?.to_string();

    let args = body_args(msg).unwrap_or_else(|e| {
        warn!("Failed to decode {interface}.{member} signal from {path}, delivering it without arguments: {e}");
        Vec::new()
    });

    Some(RemoteEvent {
        path: ObjectHandle::new(path),
        interface,
        member,
        args,
    })
}

async fn event_stream(conn: &Connection, rule: MatchRule<'static>) -> Result<EventStream> {
    let stream = MessageStream::for_match_rule(rule, conn, None).await?;
    Ok(Box::pin(stream.filter_map(|msg| {
        future::ready(match msg {
            Ok(msg) => event_from_message(&msg),
            Err(e) => {
                warn!("Signal stream error: {e}");
                None
            }
        })
    })))
}

#[async_trait]
impl BusSession for ZbusSession {
    async fn invoke(
        &self,
        path: &ObjectHandle,
        interface: &str,
        method: &str,
        args: Vec<RemoteValue>,
    ) -> Result<Option<RemoteValue>> {
        debug!("Invoking {interface}.{method} on {path}");
        let proxy = self.proxy(path, interface).await?;

        // The daemon's methods take at most two arguments; each supported
        // argument list is encoded with its exact wire signature.
        let reply = match args.as_slice() {
            [] => proxy.call_method(method, &()).await,
            [RemoteValue::Str(s)] => proxy.call_method(method, &(s.as_str(),)).await,
            [RemoteValue::UInt32(n)] => proxy.call_method(method, &(*n,)).await,
            [RemoteValue::ObjectPath(p)] => {
                proxy.call_method(method, &(object_path(p)?,)).await
            }
            [RemoteValue::Map(m)] => proxy.call_method(method, &(to_dict(m)?,)).await,
            [RemoteValue::Str(s), RemoteValue::Bytes(b)] => {
                proxy
                    .call_method(method, &(s.as_str(), b.as_slice()))
                    .await
            }
            other => {
                return Err(SupplicantError::UnsupportedArguments(format!(
                    "{method}{}",
                    describe(other)
                )));
            }
        }
        .map_err(|e| remote_error(path, method, e))?;

        Ok(body_args(&reply)?.into_iter().next())
    }

    async fn get_property(
        &self,
        path: &ObjectHandle,
        interface: &str,
        name: &str,
    ) -> Result<RemoteValue> {
        debug!("Reading {interface}.{name} on {path}");
        let proxy = self.proxy(path, PROPERTIES_INTERFACE).await?;
        let reply = proxy
            .call_method("Get", &(interface, name))
            .await
            .map_err(|e| remote_error(path, name, e))?;
        let value: OwnedValue = reply.body().deserialize()?;
        from_zvariant(&value)
    }

    async fn set_property(
        &self,
        path: &ObjectHandle,
        interface: &str,
        name: &str,
        value: RemoteValue,
    ) -> Result<()> {
        debug!("Writing {interface}.{name} on {path}");
        let proxy = self.proxy(path, PROPERTIES_INTERFACE).await?;
        let value = to_zvariant(&value)?;
        proxy
            .call_method("Set", &(interface, name, value))
            .await
            .map_err(|e| remote_error(path, name, e))?;
        Ok(())
    }

    async fn subscribe(
        &self,
        path: &ObjectHandle,
        interface: &str,
        member: &str,
    ) -> Result<EventStream> {
        let rule = MatchRule::builder()
            .msg_type(MessageType::Signal)
            .path(object_path(path)?)?
            .interface(interface.to_owned())?
            .member(member.to_owned())?
            .build();
        debug!("Subscribed to {interface}.{member} on {path}");
        event_stream(&self.conn, rule).await
    }

    async fn subscribe_all(&self, interface: &str) -> Result<EventStream> {
        let rule = MatchRule::builder()
            .msg_type(MessageType::Signal)
            .interface(interface.to_owned())?
            .build();
        debug!("Subscribed to all {interface} signals");
        event_stream(&self.conn, rule).await
    }

    async fn close(&self) -> Result<()> {
        debug!("Closing bus connection");
        self.conn.clone().close().await?;
        Ok(())
    }
}
