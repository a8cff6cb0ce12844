//! Real-time monitoring of daemon signals.

pub(crate) mod events;
