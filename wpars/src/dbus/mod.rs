//! Remote object bus access.
//!
//! Every interaction with wpa_supplicant goes through [`BusSession`]: method
//! invocation, property reads and writes, and signal subscriptions, each keyed
//! by object path, interface name and member name. The production
//! implementation is [`ZbusSession`] on the system bus; the trait is the seam
//! used to inject a different bus (e.g. an in-memory one in tests).

mod convert;
mod session;

use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;

use crate::Result;
use crate::types::value::{ObjectHandle, RemoteValue};

pub use session::ZbusSession;

/// A signal delivered by a subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteEvent {
    /// Object that emitted the signal.
    pub path: ObjectHandle,
    /// Interface the signal belongs to.
    pub interface: String,
    /// Signal name, e.g. `ScanDone`.
    pub member: String,
    /// Signal arguments in order.
    pub args: Vec<RemoteValue>,
}

/// Stream of events from one subscription.
///
/// Dropping the stream removes the underlying match rule.
pub type EventStream = Pin<Box<dyn Stream<Item = RemoteEvent> + Send>>;

/// A session with the remote object bus.
#[async_trait]
pub trait BusSession: Send + Sync {
    /// Invokes `method` on `interface` of the object at `path`.
    ///
    /// Returns the first reply argument, or `None` for methods without a
    /// return value.
    async fn invoke(
        &self,
        path: &ObjectHandle,
        interface: &str,
        method: &str,
        args: Vec<RemoteValue>,
    ) -> Result<Option<RemoteValue>>;

    /// Reads a property. Never served from a local cache.
    async fn get_property(
        &self,
        path: &ObjectHandle,
        interface: &str,
        name: &str,
    ) -> Result<RemoteValue>;

    /// Writes a property.
    async fn set_property(
        &self,
        path: &ObjectHandle,
        interface: &str,
        name: &str,
        value: RemoteValue,
    ) -> Result<()>;

    /// Subscribes to signal `member` of `interface` emitted by `path`.
    async fn subscribe(
        &self,
        path: &ObjectHandle,
        interface: &str,
        member: &str,
    ) -> Result<EventStream>;

    /// Subscribes to every signal of `interface`, on any object.
    async fn subscribe_all(&self, interface: &str) -> Result<EventStream>;

    /// Releases the connection. Later calls on the session fail.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
