// Copyright (c) 2023 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

/// Errors about invalid UTF-8 string fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringError {
    /// Byte length exceeds 65535.
    TooLong,

    /// Not well formed UTF-8.
    NonUtf8,

    /// Contains U+0000 or a noncharacter code point.
    InvalidChar,
}

/// Generate a random alphanumeric string with `len` chars.
#[must_use]
pub fn random_string(len: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Check that `s` is acceptable as a string field in a packet.
///
/// The character data MUST NOT include an encoding of the null character
/// U+0000 [MQTT-1.5.3-2], and noncharacter code points are treated as
/// malformed as well. Byte length is limited by the two byte length prefix.
///
/// # Errors
///
/// Returns error if `s` is too long or contains forbidden code points.
pub fn validate_utf8_string(s: &str) -> Result<(), StringError> {
    if s.len() > u16::MAX as usize {
        return Err(StringError::TooLong);
    }
    for c in s.chars() {
        if c == '\u{0000}' || is_noncharacter(c) {
            return Err(StringError::InvalidChar);
        }
    }
    Ok(())
}

/// Convert raw bytes into a validated string field.
///
/// # Errors
///
/// Returns error if bytes are not well formed UTF-8 or violate
/// [`validate_utf8_string`] rules.
pub fn to_utf8_string(bytes: &[u8]) -> Result<String, StringError> {
    let s = String::from_utf8(bytes.to_vec()).map_err(|_err| StringError::NonUtf8)?;
    validate_utf8_string(&s)?;
    Ok(s)
}

// U+FDD0..=U+FDEF plus the last two code points of every plane.
const fn is_noncharacter(c: char) -> bool {
    let v = c as u32;
    (v >= 0xfdd0 && v <= 0xfdef) || (v & 0xfffe) == 0xfffe
}
