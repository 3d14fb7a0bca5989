//! Packed RGBA color and hex parsing.

use std::fmt;

use crate::error::Error;

/// A packed 32-bit color.
///
/// Bytes are stored little-endian in the order they are parsed from a hex
/// string: red in the low byte, then green, blue, and alpha. A 3-byte hex
/// string gets a zero alpha byte appended, so `#1a2b3c` round-trips to the
/// bytes `[0x1a, 0x2b, 0x3c, 0x00]`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    /// Fully transparent black. The initial inherited background color.
    pub const TRANSPARENT: Color = Color(0);

    /// Build a color from individual channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color(u32::from_le_bytes([r, g, b, a]))
    }

    /// Parse a hex color string. The `#` prefix is optional; 3-byte
    /// (`rrggbb`) and 4-byte (`rrggbbaa`) forms are accepted.
    pub fn from_hex(hex: &str) -> Result<Self, Error> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 && digits.len() != 8 {
            return Err(Error::InvalidColor(hex.to_owned()));
        }

        let mut bytes = [0u8; 4];
        for (i, chunk) in digits.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .ok()
                .and_then(|s| u8::from_str_radix(s, 16).ok());
            match pair {
                Some(b) => bytes[i] = b,
                None => return Err(Error::InvalidColor(hex.to_owned())),
            }
        }

        Ok(Color(u32::from_le_bytes(bytes)))
    }

    /// The four channel bytes `[r, g, b, a]`.
    pub const fn bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    pub const fn r(self) -> u8 {
        self.bytes()[0]
    }

    pub const fn g(self) -> u8 {
        self.bytes()[1]
    }

    pub const fn b(self) -> u8 {
        self.bytes()[2]
    }

    pub const fn a(self) -> u8 {
        self.bytes()[3]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.bytes();
        write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}
