// Copyright (c) 2023 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! Encoder/decoder for MQTT v3.1 and v3.1.1 control packets.
//!
//! Each packet shape lives in its own module and implements
//! [`EncodePacket`] and [`DecodePacket`]; the [`Packet`] enum covers
//! contexts which have to handle any packet, like framing a byte stream.

mod base;
mod binary_data;
mod byte_reader;
mod connect_ack_packet;
mod connect_flags;
mod connect_packet;
mod disconnect_packet;
mod error;
mod header;
mod message;
mod packet;
mod ping_request_packet;
mod ping_response_packet;
mod publish_ack_packet;
mod publish_complete_packet;
mod publish_packet;
mod publish_received_packet;
mod publish_release_packet;
mod remaining_length;
mod subscribe_ack_packet;
mod subscribe_packet;
mod topic;
mod unsubscribe_ack_packet;
mod unsubscribe_packet;
mod utf8_string;
pub mod utils;

pub use base::{
    DecodePacket, EncodePacket, PacketId, ProtocolLevel, QoS, PROTOCOL_NAME_V31,
    PROTOCOL_NAME_V311,
};
pub use binary_data::BinaryData;
pub use byte_reader::ByteReader;
pub use connect_ack_packet::{ConnectAckPacket, ConnectReturnCode};
pub use connect_flags::ConnectFlags;
pub use connect_packet::ConnectPacket;
pub use disconnect_packet::DisconnectPacket;
pub use error::{DecodeError, EncodeError};
pub use header::{FixedHeader, PacketType};
pub use message::Message;
pub use packet::Packet;
pub use ping_request_packet::PingRequestPacket;
pub use ping_response_packet::PingResponsePacket;
pub use publish_ack_packet::PublishAckPacket;
pub use publish_complete_packet::PublishCompletePacket;
pub use publish_packet::PublishPacket;
pub use publish_received_packet::PublishReceivedPacket;
pub use publish_release_packet::PublishReleasePacket;
pub use remaining_length::{RemainingLength, MAX_REMAINING_LENGTH};
pub use subscribe_ack_packet::{SubscribeAck, SubscribeAckPacket};
pub use subscribe_packet::{SubscribePacket, SubscribeTopic};
pub use topic::{PubTopic, SubTopic};
pub use unsubscribe_ack_packet::UnsubscribeAckPacket;
pub use unsubscribe_packet::UnsubscribePacket;
pub use utf8_string::Utf8String;
