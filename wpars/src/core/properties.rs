//! Property read helpers shared by the core modules.

use crate::Result;
use crate::dbus::BusSession;
use crate::types::constants::absent_property_errors;
use crate::types::value::{ObjectHandle, RemoteValue};

/// Reads a property that may not exist on every backend.
///
/// A daemon answering "no such property" yields `None`; any other failure
/// propagates.
pub(crate) async fn read_optional(
    bus: &dyn BusSession,
    path: &ObjectHandle,
    interface: &str,
    name: &str,
) -> Result<Option<RemoteValue>> {
    match bus.get_property(path, interface, name).await {
        Ok(value) => Ok(Some(value)),
        Err(e)
            if matches!(
                e.remote_name(),
                Some(
                    absent_property_errors::INVALID_ARGS
                        | absent_property_errors::UNKNOWN_PROPERTY
                )
            ) =>
        {
            log::debug!("{interface}.{name} not available on {path}: {e}");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
