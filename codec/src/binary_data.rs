// Copyright (c) 2023 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use byteorder::{BigEndian, WriteBytesExt};
use std::io::Write;

use crate::{ByteReader, DecodeError, DecodePacket, EncodeError, EncodePacket};

/// Binary Data is represented by a two byte big-endian length which
/// indicates the number of data bytes, followed by that number of bytes:
///
/// ```text
/// +-------------------+
/// | Binary Length     |
/// |                   |
/// +-------------------+
/// | Bytes ...         |
/// +-------------------+
/// ```
///
/// Thus the length of Binary Data is limited to the range of 0 to 65535
/// bytes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BinaryData(Vec<u8>);

impl BinaryData {
    /// Create an empty binary field.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Convert a byte slice into a binary field.
    ///
    /// # Errors
    ///
    /// Returns error if `data` is longer than 65535 bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, EncodeError> {
        if data.len() > u16::MAX as usize {
            return Err(EncodeError::TooManyData);
        }
        Ok(Self(data.to_vec()))
    }

    /// Get byte length used in packet, including the length prefix.
    #[must_use]
    pub fn bytes(&self) -> usize {
        2 + self.0.len()
    }

    /// Returns true if the inner buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for BinaryData {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl DecodePacket for BinaryData {
    fn decode(reader: &mut ByteReader) -> Result<Self, DecodeError> {
        let len = reader.read_u16()?;
        let data = reader.read_bytes(len as usize)?;
        Ok(Self(data.to_vec()))
    }
}

impl EncodePacket for BinaryData {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        #[allow(clippy::cast_possible_truncation)]
        let len = self.0.len() as u16;
        buf.write_u16::<BigEndian>(len)?;
        buf.write_all(&self.0)?;
        Ok(self.bytes())
    }
}
