// Copyright (c) 2023 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use std::convert::TryFrom;

use crate::{
    ByteReader, DecodeError, DecodePacket, EncodeError, EncodePacket, QoS, RemainingLength,
};

/// Control packet type, stored in the high nibble of the first byte.
///
/// Publish carries its dup/`QoS`/retain flags in the low nibble; for every
/// other type the low nibble holds a fixed reserved value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    /// Request to connect to broker
    #[default]
    Connect,

    /// Broker reply to connect request
    ConnectAck,

    /// Publish message
    Publish { dup: bool, qos: QoS, retain: bool },

    /// Publish acknowledgement
    PublishAck,

    /// Publish received
    PublishReceived,

    /// Publish release
    PublishRelease,

    /// Publish complete
    PublishComplete,

    /// Client subscribe request
    Subscribe,

    /// Subscribe acknowledgement
    SubscribeAck,

    /// Unsubscribe request
    Unsubscribe,

    /// Unsubscribe acknowledgement
    UnsubscribeAck,

    /// Client ping request
    PingRequest,

    /// Server ping response
    PingResponse,

    /// Client is disconnecting
    Disconnect,
}

impl PacketType {
    /// Get byte length used in packet.
    #[must_use]
    #[inline]
    pub const fn bytes() -> usize {
        1
    }

    const fn type_bits(self) -> u8 {
        match self {
            Self::Connect => 1,
            Self::ConnectAck => 2,
            Self::Publish { .. } => 3,
            Self::PublishAck => 4,
            Self::PublishReceived => 5,
            Self::PublishRelease => 6,
            Self::PublishComplete => 7,
            Self::Subscribe => 8,
            Self::SubscribeAck => 9,
            Self::Unsubscribe => 10,
            Self::UnsubscribeAck => 11,
            Self::PingRequest => 12,
            Self::PingResponse => 13,
            Self::Disconnect => 14,
        }
    }

    const fn flags_bits(self) -> u8 {
        match self {
            Self::Publish { dup, qos, retain } => {
                let dup = if dup { 0b0000_1000 } else { 0b0000_0000 };
                let qos = match qos {
                    QoS::AtMostOnce => 0b0000_0000,
                    QoS::AtLeastOnce => 0b0000_0010,
                    QoS::ExactOnce => 0b0000_0100,
                };
                let retain = if retain { 0b0000_0001 } else { 0b0000_0000 };
                dup | qos | retain
            }
            // Bits 3,2,1 and 0 of the fixed header in PUBREL, SUBSCRIBE and
            // UNSUBSCRIBE packets are reserved and MUST be set to 0,0,1,0
            // [MQTT-3.6.1-1, MQTT-3.8.1-1, MQTT-3.10.1-1].
            Self::PublishRelease | Self::Subscribe | Self::Unsubscribe => 0b0000_0010,
            _ => 0b0000_0000,
        }
    }
}

impl From<PacketType> for u8 {
    fn from(packet_type: PacketType) -> Self {
        (packet_type.type_bits() << 4) | packet_type.flags_bits()
    }
}

impl TryFrom<u8> for PacketType {
    type Error = DecodeError;

    /// Parse packet type and flag bits from the first byte.
    ///
    /// Where a flag bit is marked as reserved it MUST be set to the listed
    /// value [MQTT-2.2.2-1]; if invalid flags are received, the receiver
    /// MUST close the network connection [MQTT-2.2.2-2].
    ///
    /// # Errors
    ///
    /// Returns `InvalidPacketFlags` if the reserved bits do not match, and
    /// `InvalidPacketType` for type values 0 and 15.
    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        let type_bits = (byte & 0b1111_0000) >> 4;
        let flags = byte & 0b0000_1111;

        if type_bits == 3 {
            let dup = flags & 0b0000_1000 == 0b0000_1000;
            let retain = flags & 0b0000_0001 == 0b0000_0001;
            let qos = match flags & 0b0000_0110 {
                0b0000_0000 => QoS::AtMostOnce,
                0b0000_0010 => QoS::AtLeastOnce,
                0b0000_0100 => QoS::ExactOnce,
                _ => return Err(DecodeError::InvalidPacketFlags),
            };
            return Ok(Self::Publish { dup, qos, retain });
        }

        let packet_type = match type_bits {
            1 => Self::Connect,
            2 => Self::ConnectAck,
            4 => Self::PublishAck,
            5 => Self::PublishReceived,
            6 => Self::PublishRelease,
            7 => Self::PublishComplete,
            8 => Self::Subscribe,
            9 => Self::SubscribeAck,
            10 => Self::Unsubscribe,
            11 => Self::UnsubscribeAck,
            12 => Self::PingRequest,
            13 => Self::PingResponse,
            14 => Self::Disconnect,
            t => {
                log::error!("header: invalid packet type bits: {t:#b}");
                return Err(DecodeError::InvalidPacketType);
            }
        };

        if flags != packet_type.flags_bits() {
            log::error!("header: invalid flags {flags:#b} for {packet_type:?}");
            return Err(DecodeError::InvalidPacketFlags);
        }
        Ok(packet_type)
    }
}

/// Fixed header part of an MQTT control packet. It consists of at least two
/// bytes:
///
/// ```text
///  7 6 5 4 3 2 1 0
/// +-------+-------+
/// | Type  | Flags |
/// +-------+-------+
/// | Remaining Len |
/// +-------+-------+
/// ```
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FixedHeader {
    packet_type: PacketType,
    remaining_length: RemainingLength,
}

impl FixedHeader {
    /// Create a new fixed header with `packet_type` and `remaining_length`.
    ///
    /// # Errors
    ///
    /// Returns error if `remaining_length` is out of range.
    pub fn new(packet_type: PacketType, remaining_length: usize) -> Result<Self, EncodeError> {
        let remaining_length = RemainingLength::new(remaining_length)?;
        Ok(Self {
            packet_type,
            remaining_length,
        })
    }

    #[must_use]
    pub const fn packet_type(&self) -> PacketType {
        self.packet_type
    }

    #[must_use]
    pub const fn remaining_length(&self) -> usize {
        self.remaining_length.value()
    }

    /// Get byte length used in packet.
    #[must_use]
    pub const fn bytes(&self) -> usize {
        PacketType::bytes() + self.remaining_length.bytes()
    }
}

impl DecodePacket for FixedHeader {
    fn decode(reader: &mut ByteReader) -> Result<Self, DecodeError> {
        let byte = reader.read_byte()?;
        let packet_type = PacketType::try_from(byte)?;
        let remaining_length = RemainingLength::decode(reader)?;

        Ok(Self {
            packet_type,
            remaining_length,
        })
    }
}

impl EncodePacket for FixedHeader {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        buf.push(self.packet_type.into());
        let len_bytes = self.remaining_length.encode(buf)?;
        Ok(PacketType::bytes() + len_bytes)
    }
}
