//! Core internal logic for talking to wpa_supplicant.
//!
//! This module contains the implementation behind [`crate::WpaSupplicant`]:
//! interface resolution, scanning and scan waits, profile management, status
//! reads, blobs and property decoding.

pub(crate) mod blob;
pub(crate) mod decode;
pub(crate) mod interface;
pub(crate) mod network;
pub(crate) mod properties;
pub(crate) mod scan;
pub(crate) mod scan_wait;
pub(crate) mod status;
