// Copyright (c) 2023 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use byteorder::{BigEndian, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;

use crate::{ByteReader, DecodeError, EncodeError};

/// Protocol name used by MQTT v3.1.1.
pub const PROTOCOL_NAME_V311: &str = "MQTT";

/// Protocol name used by MQTT v3.1.
pub const PROTOCOL_NAME_V31: &str = "MQIsdp";

/// Convert a packet, or part of a packet, into bytes appended to `buf`.
pub trait EncodePacket {
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns error if any field violates the wire format rules.
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError>;
}

/// Parse a packet, or part of a packet, from a byte stream.
pub trait DecodePacket: Sized {
    /// Advances `reader` past the bytes consumed.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes do not form a valid value.
    fn decode(reader: &mut ByteReader) -> Result<Self, DecodeError>;
}

/// Quality of service level of a Publish message.
#[repr(u8)]
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum QoS {
    /// At most once delivery.
    #[default]
    AtMostOnce = 0,

    /// At least once delivery.
    AtLeastOnce = 1,

    /// Exactly once delivery.
    ExactOnce = 2,
}

impl QoS {
    /// Get byte length used in packet.
    #[must_use]
    #[inline]
    pub const fn bytes() -> usize {
        1
    }
}

impl TryFrom<u8> for QoS {
    type Error = DecodeError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::AtMostOnce),
            1 => Ok(Self::AtLeastOnce),
            2 => Ok(Self::ExactOnce),
            _ => Err(DecodeError::InvalidQoS),
        }
    }
}

/// Version of the protocol spoken on the wire.
///
/// The level byte in the Connect packet variable header is paired with the
/// protocol name: level 4 goes with `"MQTT"`, level 3 with `"MQIsdp"`.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolLevel {
    /// MQTT v3.1
    V31 = 3,

    /// MQTT v3.1.1
    #[default]
    V311 = 4,
}

impl ProtocolLevel {
    /// Get byte length used in packet.
    #[must_use]
    #[inline]
    pub const fn bytes() -> usize {
        1
    }

    /// Protocol name string paired with this level.
    #[must_use]
    pub const fn protocol_name(&self) -> &'static str {
        match self {
            Self::V31 => PROTOCOL_NAME_V31,
            Self::V311 => PROTOCOL_NAME_V311,
        }
    }
}

impl TryFrom<u8> for ProtocolLevel {
    type Error = DecodeError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            3 => Ok(Self::V31),
            4 => Ok(Self::V311),
            _ => Err(DecodeError::InvalidProtocolLevel),
        }
    }
}

impl EncodePacket for ProtocolLevel {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        buf.push(*self as u8);
        Ok(1)
    }
}

/// Packet identifier, a two byte integer used to correlate acknowledgements
/// with the packet that requested them.
///
/// Value 0 is reserved; packets which require an identifier must carry a
/// non-zero one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PacketId(u16);

impl PacketId {
    /// Create a new `PacketId`.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Get inner u16 value.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.0
    }

    /// Get byte length used in packet.
    #[must_use]
    #[inline]
    pub const fn bytes() -> usize {
        2
    }
}

impl fmt::Display for PacketId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for PacketId {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl DecodePacket for PacketId {
    fn decode(reader: &mut ByteReader) -> Result<Self, DecodeError> {
        let value = reader.read_u16()?;
        Ok(Self(value))
    }
}

impl EncodePacket for PacketId {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        buf.write_u16::<BigEndian>(self.0)?;
        Ok(Self::bytes())
    }
}
