// Copyright (c) 2023 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use crate::{
    ByteReader, ConnectAckPacket, ConnectPacket, DecodeError, DecodePacket, DisconnectPacket,
    EncodeError, EncodePacket, FixedHeader, PacketId, PacketType, PingRequestPacket,
    PingResponsePacket, PublishAckPacket, PublishCompletePacket, PublishPacket,
    PublishReceivedPacket, PublishReleasePacket, QoS, SubscribeAckPacket, SubscribePacket,
    UnsubscribeAckPacket, UnsubscribePacket,
};

/// Tagged variant over all control packet shapes.
///
/// Used wherever code has to handle "any packet": framing a byte stream,
/// storing unacknowledged packets in a session, dispatching inbound
/// traffic.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Connect(ConnectPacket),
    ConnectAck(ConnectAckPacket),
    Publish(PublishPacket),
    PublishAck(PublishAckPacket),
    PublishReceived(PublishReceivedPacket),
    PublishRelease(PublishReleasePacket),
    PublishComplete(PublishCompletePacket),
    Subscribe(SubscribePacket),
    SubscribeAck(SubscribeAckPacket),
    Unsubscribe(UnsubscribePacket),
    UnsubscribeAck(UnsubscribeAckPacket),
    PingRequest(PingRequestPacket),
    PingResponse(PingResponsePacket),
    Disconnect(DisconnectPacket),
}

impl Packet {
    /// Parse one packet from the front of `buf`.
    ///
    /// Returns the packet and the number of bytes consumed; any trailing
    /// bytes belong to the next packet.
    ///
    /// # Errors
    ///
    /// Returns error if the buffer does not hold a complete, well formed
    /// packet.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), DecodeError> {
        let mut header_reader = ByteReader::new(buf);
        let fixed_header = FixedHeader::decode(&mut header_reader)?;
        if header_reader.remaining_bytes() < fixed_header.remaining_length() {
            return Err(DecodeError::OutOfRange);
        }

        let mut reader = ByteReader::new(buf);
        let packet = match fixed_header.packet_type() {
            PacketType::Connect => Self::Connect(ConnectPacket::decode(&mut reader)?),
            PacketType::ConnectAck => Self::ConnectAck(ConnectAckPacket::decode(&mut reader)?),
            PacketType::Publish { .. } => Self::Publish(PublishPacket::decode(&mut reader)?),
            PacketType::PublishAck => Self::PublishAck(PublishAckPacket::decode(&mut reader)?),
            PacketType::PublishReceived => {
                Self::PublishReceived(PublishReceivedPacket::decode(&mut reader)?)
            }
            PacketType::PublishRelease => {
                Self::PublishRelease(PublishReleasePacket::decode(&mut reader)?)
            }
            PacketType::PublishComplete => {
                Self::PublishComplete(PublishCompletePacket::decode(&mut reader)?)
            }
            PacketType::Subscribe => Self::Subscribe(SubscribePacket::decode(&mut reader)?),
            PacketType::SubscribeAck => {
                Self::SubscribeAck(SubscribeAckPacket::decode(&mut reader)?)
            }
            PacketType::Unsubscribe => Self::Unsubscribe(UnsubscribePacket::decode(&mut reader)?),
            PacketType::UnsubscribeAck => {
                Self::UnsubscribeAck(UnsubscribeAckPacket::decode(&mut reader)?)
            }
            PacketType::PingRequest => Self::PingRequest(PingRequestPacket::decode(&mut reader)?),
            PacketType::PingResponse => {
                Self::PingResponse(PingResponsePacket::decode(&mut reader)?)
            }
            PacketType::Disconnect => Self::Disconnect(DisconnectPacket::decode(&mut reader)?),
        };

        Ok((packet, reader.offset()))
    }

    /// Get type and flags of this packet.
    #[must_use]
    pub fn packet_type(&self) -> PacketType {
        match self {
            Self::Connect(_) => PacketType::Connect,
            Self::ConnectAck(_) => PacketType::ConnectAck,
            Self::Publish(p) => PacketType::Publish {
                dup: p.dup(),
                qos: p.qos(),
                retain: p.retain(),
            },
            Self::PublishAck(_) => PacketType::PublishAck,
            Self::PublishReceived(_) => PacketType::PublishReceived,
            Self::PublishRelease(_) => PacketType::PublishRelease,
            Self::PublishComplete(_) => PacketType::PublishComplete,
            Self::Subscribe(_) => PacketType::Subscribe,
            Self::SubscribeAck(_) => PacketType::SubscribeAck,
            Self::Unsubscribe(_) => PacketType::Unsubscribe,
            Self::UnsubscribeAck(_) => PacketType::UnsubscribeAck,
            Self::PingRequest(_) => PacketType::PingRequest,
            Self::PingResponse(_) => PacketType::PingResponse,
            Self::Disconnect(_) => PacketType::Disconnect,
        }
    }

    /// Get the packet identifier, if this packet shape carries one.
    ///
    /// A `QoS` 0 Publish returns `None`.
    #[must_use]
    pub fn packet_id(&self) -> Option<PacketId> {
        match self {
            Self::Publish(p) => {
                if p.qos() == QoS::AtMostOnce {
                    None
                } else {
                    Some(p.packet_id())
                }
            }
            Self::PublishAck(p) => Some(p.packet_id()),
            Self::PublishReceived(p) => Some(p.packet_id()),
            Self::PublishRelease(p) => Some(p.packet_id()),
            Self::PublishComplete(p) => Some(p.packet_id()),
            Self::Subscribe(p) => Some(p.packet_id()),
            Self::SubscribeAck(p) => Some(p.packet_id()),
            Self::Unsubscribe(p) => Some(p.packet_id()),
            Self::UnsubscribeAck(p) => Some(p.packet_id()),
            Self::Connect(_)
            | Self::ConnectAck(_)
            | Self::PingRequest(_)
            | Self::PingResponse(_)
            | Self::Disconnect(_) => None,
        }
    }
}

impl EncodePacket for Packet {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        match self {
            Self::Connect(p) => p.encode(buf),
            Self::ConnectAck(p) => p.encode(buf),
            Self::Publish(p) => p.encode(buf),
            Self::PublishAck(p) => p.encode(buf),
            Self::PublishReceived(p) => p.encode(buf),
            Self::PublishRelease(p) => p.encode(buf),
            Self::PublishComplete(p) => p.encode(buf),
            Self::Subscribe(p) => p.encode(buf),
            Self::SubscribeAck(p) => p.encode(buf),
            Self::Unsubscribe(p) => p.encode(buf),
            Self::UnsubscribeAck(p) => p.encode(buf),
            Self::PingRequest(p) => p.encode(buf),
            Self::PingResponse(p) => p.encode(buf),
            Self::Disconnect(p) => p.encode(buf),
        }
    }
}

impl From<PublishPacket> for Packet {
    fn from(packet: PublishPacket) -> Self {
        Self::Publish(packet)
    }
}

impl From<SubscribePacket> for Packet {
    fn from(packet: SubscribePacket) -> Self {
        Self::Subscribe(packet)
    }
}

impl From<UnsubscribePacket> for Packet {
    fn from(packet: UnsubscribePacket) -> Self {
        Self::Unsubscribe(packet)
    }
}
