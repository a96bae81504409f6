// Copyright (c) 2023 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use byteorder::{BigEndian, WriteBytesExt};
use std::convert::TryFrom;

use crate::{
    BinaryData, ByteReader, ConnectFlags, DecodeError, DecodePacket, EncodeError, EncodePacket,
    FixedHeader, PacketType, ProtocolLevel, PubTopic, QoS, Utf8String,
};

/// The first packet sent from the client to the server once the network
/// connection is established.
///
/// Basic structure of the packet:
///
/// ```txt
///  7                          0
/// +----------------------------+
/// | Fixed header               |
/// |                            |
/// +----------------------------+
/// | Protocol name length       |
/// |                            |
/// +----------------------------+
/// | Protocol name ...          |
/// +----------------------------+
/// | Protocol level             |
/// +----------------------------+
/// | Connect flags              |
/// +----------------------------+
/// | Keep alive                 |
/// |                            |
/// +----------------------------+
/// | Client id length           |
/// |                            |
/// +----------------------------+
/// | Client id string ...       |
/// +----------------------------+
/// | Will topic length          |
/// |                            |
/// +----------------------------+
/// | Will topic string ...      |
/// +----------------------------+
/// | Will message length        |
/// |                            |
/// +----------------------------+
/// | Will message bytes ...     |
/// +----------------------------+
/// | Username length            |
/// |                            |
/// +----------------------------+
/// | Username string ...        |
/// +----------------------------+
/// | Password length            |
/// |                            |
/// +----------------------------+
/// | Password bytes ...         |
/// +----------------------------+
/// ```
///
/// Will topic and will message are present iff the will flag is set;
/// username and password likewise follow their flags.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConnectPacket {
    /// Version of the protocol; also selects the protocol name string
    /// (`"MQTT"` for 3.1.1, `"MQIsdp"` for 3.1).
    protocol_level: ProtocolLevel,

    connect_flags: ConnectFlags,

    /// Maximum interval in seconds between two packets sent by the client.
    /// The client must send a PingRequest packet before it elapses; a value
    /// of zero disables the keep alive mechanism.
    keep_alive: u16,

    /// Identifies the session on the server side. May only be empty if
    /// clean-session is set, in which case the server assigns one
    /// [MQTT-3.1.3-7].
    client_id: Utf8String,

    /// Topic of the will message, present iff the will flag is set.
    will_topic: Option<PubTopic>,

    /// Payload of the will message, present iff the will flag is set.
    will_message: BinaryData,

    username: Utf8String,

    password: BinaryData,
}

impl ConnectPacket {
    /// Create a new connect packet with `client_id`.
    ///
    /// # Errors
    ///
    /// Returns error if `client_id` is too long.
    pub fn new(client_id: &str) -> Result<Self, EncodeError> {
        let client_id = Utf8String::from(client_id)?;
        Ok(Self {
            keep_alive: 60,
            client_id,
            ..Self::default()
        })
    }

    pub fn set_protocol_level(&mut self, level: ProtocolLevel) -> &mut Self {
        self.protocol_level = level;
        self
    }

    #[must_use]
    #[inline]
    pub const fn protocol_level(&self) -> ProtocolLevel {
        self.protocol_level
    }

    #[must_use]
    #[inline]
    pub const fn connect_flags(&self) -> &ConnectFlags {
        &self.connect_flags
    }

    pub fn set_clean_session(&mut self, clean_session: bool) -> &mut Self {
        self.connect_flags.set_clean_session(clean_session);
        self
    }

    #[must_use]
    pub const fn clean_session(&self) -> bool {
        self.connect_flags.clean_session()
    }

    /// Update keep alive value in seconds.
    pub fn set_keep_alive(&mut self, keep_alive: u16) -> &mut Self {
        self.keep_alive = keep_alive;
        self
    }

    #[must_use]
    #[inline]
    pub const fn keep_alive(&self) -> u16 {
        self.keep_alive
    }

    /// Update client id.
    ///
    /// # Errors
    ///
    /// Returns error if `client_id` is too long.
    pub fn set_client_id(&mut self, client_id: &str) -> Result<&mut Self, EncodeError> {
        self.client_id = Utf8String::from(client_id)?;
        Ok(self)
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        self.client_id.as_ref()
    }

    /// Update username value and the matching connect flag.
    ///
    /// # Errors
    ///
    /// Returns error if `username` is too long.
    pub fn set_username(&mut self, username: &str) -> Result<&mut Self, EncodeError> {
        self.username = Utf8String::from(username)?;
        self.connect_flags.set_has_username(!username.is_empty());
        Ok(self)
    }

    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_ref()
    }

    /// Update password value and the matching connect flag.
    ///
    /// # Errors
    ///
    /// Returns error if `password` is too long.
    pub fn set_password(&mut self, password: &[u8]) -> Result<&mut Self, EncodeError> {
        self.password = BinaryData::from_slice(password)?;
        self.connect_flags.set_has_password(!password.is_empty());
        Ok(self)
    }

    #[must_use]
    pub fn password(&self) -> &[u8] {
        self.password.as_ref()
    }

    /// Install a will message with its delivery parameters, updating the
    /// will related connect flags.
    ///
    /// # Errors
    ///
    /// Returns error if `topic` is invalid or `message` is too long.
    pub fn set_will(
        &mut self,
        topic: &str,
        message: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<&mut Self, EncodeError> {
        self.will_topic = Some(PubTopic::new(topic)?);
        self.will_message = BinaryData::from_slice(message)?;
        self.connect_flags
            .set_will(true)
            .set_will_qos(qos)
            .set_will_retain(retain);
        Ok(self)
    }

    #[must_use]
    pub fn will_topic(&self) -> Option<&str> {
        self.will_topic.as_ref().map(AsRef::as_ref)
    }

    #[must_use]
    pub fn will_message(&self) -> &[u8] {
        self.will_message.as_ref()
    }

    fn protocol_name(&self) -> Utf8String {
        // Both protocol name constants are short and valid.
        Utf8String::from(self.protocol_level.protocol_name()).unwrap_or_default()
    }

    fn remaining_length(&self) -> usize {
        let mut len = self.protocol_name().bytes()
            + ProtocolLevel::bytes()
            + ConnectFlags::bytes()
            + 2 // keep alive
            + self.client_id.bytes();

        if self.connect_flags.will() {
            if let Some(will_topic) = &self.will_topic {
                len += will_topic.bytes();
            }
            len += self.will_message.bytes();
        }
        if self.connect_flags.has_username() {
            len += self.username.bytes();
        }
        if self.connect_flags.has_password() {
            len += self.password.bytes();
        }
        len
    }

    /// Get byte length of the whole packet.
    ///
    /// # Errors
    ///
    /// Returns error if the packet is too large.
    pub fn bytes(&self) -> Result<usize, EncodeError> {
        let fixed_header = FixedHeader::new(PacketType::Connect, self.remaining_length())?;
        Ok(fixed_header.bytes() + fixed_header.remaining_length())
    }
}

impl EncodePacket for ConnectPacket {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        let old_len = buf.len();

        let fixed_header = FixedHeader::new(PacketType::Connect, self.remaining_length())?;
        fixed_header.encode(buf)?;

        // Variable header
        self.protocol_name().encode(buf)?;
        self.protocol_level.encode(buf)?;
        self.connect_flags.encode(buf)?;
        buf.write_u16::<BigEndian>(self.keep_alive)?;

        // Payload
        self.client_id.encode(buf)?;
        if self.connect_flags.will() {
            if let Some(will_topic) = &self.will_topic {
                will_topic.encode(buf)?;
            }
            self.will_message.encode(buf)?;
        }
        if self.connect_flags.has_username() {
            self.username.encode(buf)?;
        }
        if self.connect_flags.has_password() {
            self.password.encode(buf)?;
        }

        Ok(buf.len() - old_len)
    }
}

impl DecodePacket for ConnectPacket {
    fn decode(reader: &mut ByteReader) -> Result<Self, DecodeError> {
        let fixed_header = FixedHeader::decode(reader)?;
        if fixed_header.packet_type() != PacketType::Connect {
            return Err(DecodeError::InvalidPacketType);
        }

        let protocol_name = Utf8String::decode(reader)?;
        let protocol_level = ProtocolLevel::try_from(reader.read_byte()?)?;
        // The protocol name string is paired with the level byte; a level 4
        // packet announcing "MQIsdp" is malformed and vice versa.
        if protocol_name.as_ref() != protocol_level.protocol_name() {
            return Err(DecodeError::InvalidProtocolName);
        }

        let connect_flags = ConnectFlags::decode(reader)?;
        let keep_alive = reader.read_u16()?;

        let client_id = Utf8String::decode(reader)?;
        // A zero-byte client id requires clean-session to be set
        // [MQTT-3.1.3-7]; otherwise the server answers with return code 2
        // and closes the connection [MQTT-3.1.3-8].
        if client_id.is_empty() && !connect_flags.clean_session() {
            return Err(DecodeError::InvalidClientId);
        }

        let will_topic = if connect_flags.will() {
            Some(PubTopic::decode(reader)?)
        } else {
            None
        };
        let will_message = if connect_flags.will() {
            BinaryData::decode(reader)?
        } else {
            BinaryData::new()
        };

        let username = if connect_flags.has_username() {
            Utf8String::decode(reader)?
        } else {
            Utf8String::new()
        };
        let password = if connect_flags.has_password() {
            BinaryData::decode(reader)?
        } else {
            BinaryData::new()
        };

        Ok(Self {
            protocol_level,
            connect_flags,
            keep_alive,
            client_id,
            will_topic,
            will_message,
            username,
            password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        let buf: Vec<u8> = vec![
            16, 20, 0, 4, 77, 81, 84, 84, 4, 2, 0, 60, 0, 8, 119, 118, 80, 84, 88, 99, 67, 119,
        ];
        let mut reader = ByteReader::new(&buf);
        let packet = ConnectPacket::decode(&mut reader).unwrap();
        assert_eq!(packet.protocol_level(), ProtocolLevel::V311);
        assert_eq!(packet.client_id(), "wvPTXcCw");
        assert_eq!(packet.keep_alive(), 60);
        assert!(packet.clean_session());
    }

    #[test]
    fn test_encode_round_trip() {
        let mut packet = ConnectPacket::new("fengbo-test").unwrap();
        packet.set_keep_alive(30);
        packet.set_username("grace").unwrap();
        packet.set_password(b"hopper").unwrap();
        packet
            .set_will("status/offline", b"gone", QoS::AtLeastOnce, true)
            .unwrap();

        let mut buf = Vec::new();
        let written = packet.encode(&mut buf).unwrap();
        assert_eq!(written, buf.len());
        assert_eq!(written, packet.bytes().unwrap());

        let mut reader = ByteReader::new(&buf);
        let decoded = ConnectPacket::decode(&mut reader).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn test_decode_v31_protocol_name() {
        let mut packet = ConnectPacket::new("legacy").unwrap();
        packet.set_protocol_level(ProtocolLevel::V31);
        let mut buf = Vec::new();
        packet.encode(&mut buf).unwrap();
        assert_eq!(&buf[2..10], &[0, 6, 77, 81, 73, 115, 100, 112]);

        let mut reader = ByteReader::new(&buf);
        let decoded = ConnectPacket::decode(&mut reader).unwrap();
        assert_eq!(decoded.protocol_level(), ProtocolLevel::V31);
    }

    #[test]
    fn test_decode_mismatched_name_and_level() {
        // Level byte 3 but protocol name "MQTT".
        let buf: Vec<u8> = vec![
            16, 16, 0, 4, 77, 81, 84, 84, 3, 2, 0, 60, 0, 4, 116, 101, 115, 116,
        ];
        let mut reader = ByteReader::new(&buf);
        assert_eq!(
            ConnectPacket::decode(&mut reader),
            Err(DecodeError::InvalidProtocolName)
        );
    }

    #[test]
    fn test_decode_empty_client_id_without_clean_session() {
        let buf: Vec<u8> = vec![16, 12, 0, 4, 77, 81, 84, 84, 4, 0, 0, 60, 0, 0];
        let mut reader = ByteReader::new(&buf);
        assert_eq!(
            ConnectPacket::decode(&mut reader),
            Err(DecodeError::InvalidClientId)
        );
    }
}
