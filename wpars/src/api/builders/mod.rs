//! Argument builders for daemon methods.
//!
//! - [`NetworkFields`] renders the `AddNetwork` settings map.
//! - [`CreateInterfaceArgs`](crate::CreateInterfaceArgs) covers
//!   `CreateInterface` and lives with the other models.

pub mod network;

pub use network::NetworkFields;
