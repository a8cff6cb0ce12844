//! Type definitions and constants.
//!
//! This module contains wpa_supplicant constants and the dynamically typed
//! value representation shared by every other module.

pub(crate) mod constants;
pub mod value;
