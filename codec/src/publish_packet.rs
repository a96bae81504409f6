// Copyright (c) 2023 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use bytes::BytesMut;
use std::io::Write;

use crate::{
    ByteReader, DecodeError, DecodePacket, EncodeError, EncodePacket, FixedHeader, Message,
    PacketId, PacketType, PubTopic, QoS,
};

/// A Publish packet transports an application message from the client to
/// the server, or from the server to the client.
///
/// Basic structure of the packet:
///
/// ```txt
///  7                     0
/// +-----------------------+
/// | Fixed header          |
/// |                       |
/// +-----------------------+
/// | Topic name length     |
/// |                       |
/// +-----------------------+
/// | Topic name ...        |
/// +-----------------------+
/// | Packet Identifier     |
/// |                       |
/// +-----------------------+
/// | Msg payload ...       |
/// +-----------------------+
/// ```
///
/// The packet identifier is only present in `QoS` 1 and `QoS` 2 packets,
/// and must be non-zero there. The expected response is nothing for `QoS`
/// 0, a PublishAck for `QoS` 1 and a PublishReceived for `QoS` 2.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PublishPacket {
    /// False on the first delivery attempt of this packet; true on a
    /// re-delivery. Must be false when `QoS` is 0 [MQTT-3.3.1-2].
    dup: bool,

    /// Level of assurance for delivery of this message.
    qos: QoS,

    /// Whether the server shall keep this message and hand it to future
    /// subscribers of the topic.
    retain: bool,

    /// Topic name; must not contain wildcard characters.
    topic: PubTopic,

    /// Unused when `QoS` is 0.
    packet_id: PacketId,

    msg: BytesMut,
}

impl PublishPacket {
    /// Create a new publish packet.
    ///
    /// # Errors
    ///
    /// Returns error if `topic` is invalid or `msg` is too large.
    pub fn new(topic: &str, qos: QoS, msg: &[u8]) -> Result<Self, EncodeError> {
        let topic = PubTopic::new(topic)?;
        Ok(Self {
            qos,
            topic,
            msg: BytesMut::from(msg),
            ..Self::default()
        })
    }

    /// Update `dup` flag.
    ///
    /// # Errors
    ///
    /// Returns error if `dup` is set on a `QoS` 0 packet [MQTT-3.3.1-2].
    pub fn set_dup(&mut self, dup: bool) -> Result<&mut Self, EncodeError> {
        if dup && self.qos == QoS::AtMostOnce {
            return Err(EncodeError::InvalidData);
        }
        self.dup = dup;
        Ok(self)
    }

    #[must_use]
    pub const fn dup(&self) -> bool {
        self.dup
    }

    pub fn set_retain(&mut self, retain: bool) -> &mut Self {
        self.retain = retain;
        self
    }

    #[must_use]
    pub const fn retain(&self) -> bool {
        self.retain
    }

    #[must_use]
    pub const fn qos(&self) -> QoS {
        self.qos
    }

    /// The packet identifier field is only meaningful where the `QoS` level
    /// is 1 or 2.
    pub fn set_packet_id(&mut self, packet_id: PacketId) -> &mut Self {
        self.packet_id = packet_id;
        self
    }

    #[must_use]
    pub const fn packet_id(&self) -> PacketId {
        self.packet_id
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        self.topic.as_ref()
    }

    #[must_use]
    pub fn message(&self) -> &[u8] {
        &self.msg
    }

    /// Convert into the application level message value.
    #[must_use]
    pub fn to_message(&self) -> Message {
        Message {
            topic: self.topic.as_ref().to_string(),
            payload: self.msg.to_vec(),
            qos: self.qos,
            retain: self.retain,
            dup: self.dup,
        }
    }

    /// Build a publish packet from an application level message.
    ///
    /// # Errors
    ///
    /// Returns error if the message topic is invalid.
    pub fn from_message(message: &Message) -> Result<Self, EncodeError> {
        let mut packet = Self::new(&message.topic, message.qos, &message.payload)?;
        packet.set_retain(message.retain);
        if message.dup {
            packet.set_dup(true)?;
        }
        Ok(packet)
    }

    fn fixed_header(&self) -> Result<FixedHeader, EncodeError> {
        let mut remaining_length = self.topic.bytes() + self.msg.len();
        if self.qos != QoS::AtMostOnce {
            remaining_length += PacketId::bytes();
        }
        let packet_type = PacketType::Publish {
            dup: self.dup,
            qos: self.qos,
            retain: self.retain,
        };
        FixedHeader::new(packet_type, remaining_length)
    }

    /// Get byte length of the whole packet.
    ///
    /// # Errors
    ///
    /// Returns error if the packet is too large.
    pub fn bytes(&self) -> Result<usize, EncodeError> {
        let fixed_header = self.fixed_header()?;
        Ok(fixed_header.bytes() + fixed_header.remaining_length())
    }
}

impl DecodePacket for PublishPacket {
    fn decode(reader: &mut ByteReader) -> Result<Self, DecodeError> {
        let fixed_header = FixedHeader::decode(reader)?;

        let PacketType::Publish { dup, qos, retain } = fixed_header.packet_type() else {
            return Err(DecodeError::InvalidPacketType);
        };

        // The DUP flag MUST be set to 0 for all QoS 0 messages
        // [MQTT-3.3.1-2].
        if dup && qos == QoS::AtMostOnce {
            return Err(DecodeError::InvalidPacketFlags);
        }

        let topic = PubTopic::decode(reader)?;

        // The packet identifier field is only present where the QoS level
        // is 1 or 2, and MUST be non-zero there [MQTT-2.3.1-1].
        let packet_id = if qos == QoS::AtMostOnce {
            PacketId::new(0)
        } else {
            let packet_id = PacketId::decode(reader)?;
            if packet_id.value() == 0 {
                return Err(DecodeError::InvalidPacketId);
            }
            packet_id
        };

        // It is valid for a Publish packet to contain a zero length
        // payload.
        let mut used = topic.bytes();
        if qos != QoS::AtMostOnce {
            used += PacketId::bytes();
        }
        if fixed_header.remaining_length() < used {
            return Err(DecodeError::InvalidRemainingLength);
        }
        let msg_len = fixed_header.remaining_length() - used;
        let msg = BytesMut::from(reader.read_bytes(msg_len)?);

        Ok(Self {
            dup,
            qos,
            retain,
            topic,
            packet_id,
            msg,
        })
    }
}

impl EncodePacket for PublishPacket {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        let old_len = buf.len();

        let fixed_header = self.fixed_header()?;
        fixed_header.encode(buf)?;

        // Variable header
        self.topic.encode(buf)?;
        if self.qos != QoS::AtMostOnce {
            self.packet_id.encode(buf)?;
        }

        // Payload
        buf.write_all(&self.msg)?;

        Ok(buf.len() - old_len)
    }
}
