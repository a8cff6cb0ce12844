//! Utility functions for Wi-Fi data conversion and display.
//!
//! Provides helpers for converting between Wi-Fi data representations:
//! frequency to channel, raw bytes to hex strings, SSID bytes to strings.

use log::warn;
use std::borrow::Cow;
use std::str;

use crate::types::constants::frequency;

/// Converts a Wi-Fi frequency in MHz to a channel number.
///
/// Supports 2.4GHz (channels 1-14), 5GHz, and 6GHz bands.
/// Returns `None` for frequencies outside known Wi-Fi bands.
pub fn channel_from_freq(mhz: u32) -> Option<u16> {
    match mhz {
        frequency::BAND_2_4_START..=frequency::BAND_2_4_END => {
            Some(((mhz - frequency::BAND_2_4_START) / frequency::CHANNEL_SPACING + 1) as u16)
        }
        frequency::BAND_2_4_CH14 => Some(14),
        frequency::BAND_5_START..=frequency::BAND_5_END => {
            Some(((mhz - 5000) / frequency::CHANNEL_SPACING) as u16)
        }
        frequency::BAND_6_START..=frequency::BAND_6_END => {
            Some(((mhz - frequency::BAND_6_START) / frequency::CHANNEL_SPACING + 1) as u16)
        }
        _ => None,
    }
}

/// Renders bytes as lowercase, colon separated hex (`aa:bb:cc`).
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// Decode SSID bytes as UTF-8.
///
/// Invalid sequences are replaced rather than rejected: SSIDs are arbitrary
/// octets and a name that is not UTF-8 must still be displayable.
pub fn decode_ssid(bytes: &[u8]) -> Cow<'_, str> {
    match str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(e) => {
            warn!("Invalid UTF-8 in SSID, decoding lossily: {e}");
            String::from_utf8_lossy(bytes)
        }
    }
}

/// Strips the double quotes wpa_supplicant puts around string-typed
/// network settings (`"Home"` becomes `Home`).
pub fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_from_freq_2_4ghz() {
        assert_eq!(channel_from_freq(2412), Some(1));
        assert_eq!(channel_from_freq(2437), Some(6));
        assert_eq!(channel_from_freq(2472), Some(13));
        assert_eq!(channel_from_freq(2484), Some(14));
    }

    #[test]
    fn test_channel_from_freq_5ghz() {
        assert_eq!(channel_from_freq(5180), Some(36));
        assert_eq!(channel_from_freq(5500), Some(100));
    }

    #[test]
    fn test_channel_from_freq_6ghz() {
        assert_eq!(channel_from_freq(5955), Some(1));
        assert_eq!(channel_from_freq(6115), Some(33));
    }

    #[test]
    fn test_channel_from_freq_invalid() {
        assert_eq!(channel_from_freq(1000), None);
        assert_eq!(channel_from_freq(9999), None);
    }

    #[test]
    fn test_format_hex() {
        assert_eq!(
            format_hex(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
            "aa:bb:cc:dd:ee:ff"
        );
        assert_eq!(format_hex(&[0x01]), "01");
        assert_eq!(format_hex(&[]), "");
    }

    #[test]
    fn test_decode_ssid() {
        assert_eq!(decode_ssid(b"MyNetwork"), "MyNetwork");
        assert_eq!(decode_ssid(b""), "");
        assert_eq!(decode_ssid("café".as_bytes()), "café");
        // Invalid UTF-8 is replaced, not rejected
        assert_eq!(decode_ssid(&[b'a', 0xff, b'b']), "a\u{fffd}b");
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"Home\""), "Home");
        assert_eq!(unquote("Home"), "Home");
        assert_eq!(unquote("\""), "\"");
        assert_eq!(unquote("\"\""), "");
    }
}
