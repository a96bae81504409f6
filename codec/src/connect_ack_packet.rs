// Copyright (c) 2023 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use std::convert::TryFrom;

use crate::{
    ByteReader, DecodeError, DecodePacket, EncodeError, EncodePacket, FixedHeader, PacketType,
};

/// Return code in the ConnectAck variable header. If the server replies
/// with a non-zero code it MUST close the network connection afterwards.
#[repr(u8)]
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
pub enum ConnectReturnCode {
    /// Connection accepted.
    #[default]
    Accepted = 0,

    /// The server does not support the protocol level requested by the
    /// client.
    UnacceptedProtocol = 1,

    /// The client identifier is well formed but not allowed by the server.
    IdentifierRejected = 2,

    /// The network connection has been made but the MQTT service is
    /// unavailable.
    ServerUnavailable = 3,

    /// The data in the username or password is malformed.
    MalformedUsernamePassword = 4,

    /// The client is not authorized to connect.
    Unauthorized = 5,
}

impl TryFrom<u8> for ConnectReturnCode {
    type Error = DecodeError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Accepted),
            1 => Ok(Self::UnacceptedProtocol),
            2 => Ok(Self::IdentifierRejected),
            3 => Ok(Self::ServerUnavailable),
            4 => Ok(Self::MalformedUsernamePassword),
            5 => Ok(Self::Unauthorized),
            // 6-255 are reserved.
            _ => Err(DecodeError::InvalidReturnCode),
        }
    }
}

/// The packet sent by the server in response to a Connect packet. It must
/// be the first packet sent from the server to the client.
///
/// Basic structure of the packet:
///
/// ```txt
///  7                       0
/// +-------------------------+
/// | Fixed header            |
/// |                         |
/// +-------------------------+
/// | Ack flags               |
/// +-------------------------+
/// | Return code             |
/// +-------------------------+
/// ```
///
/// This packet does not contain a payload.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConnectAckPacket {
    /// Bit 0 of the ack flags byte. Set when the server resumed stored
    /// session state for this client id; bits 7-1 are reserved and must
    /// be zero.
    session_present: bool,

    return_code: ConnectReturnCode,
}

impl ConnectAckPacket {
    /// Create a new connect ack packet.
    ///
    /// A non-zero return code forces session-present to false
    /// [MQTT-3.2.2-4].
    #[must_use]
    pub fn new(session_present: bool, return_code: ConnectReturnCode) -> Self {
        Self {
            session_present: session_present && return_code == ConnectReturnCode::Accepted,
            return_code,
        }
    }

    #[must_use]
    pub const fn session_present(&self) -> bool {
        self.session_present
    }

    #[must_use]
    pub const fn return_code(&self) -> ConnectReturnCode {
        self.return_code
    }

    /// Get byte length of the whole packet.
    #[must_use]
    pub const fn bytes() -> usize {
        // type + len + ack flags + return code
        4
    }
}

impl DecodePacket for ConnectAckPacket {
    fn decode(reader: &mut ByteReader) -> Result<Self, DecodeError> {
        let fixed_header = FixedHeader::decode(reader)?;
        if fixed_header.packet_type() != PacketType::ConnectAck {
            return Err(DecodeError::InvalidPacketType);
        }
        if fixed_header.remaining_length() != 2 {
            return Err(DecodeError::InvalidRemainingLength);
        }

        let ack_flags = reader.read_byte()?;
        if ack_flags & 0b1111_1110 != 0 {
            return Err(DecodeError::InvalidPacketFlags);
        }
        let session_present = ack_flags & 0b0000_0001 == 0b0000_0001;
        let return_code = ConnectReturnCode::try_from(reader.read_byte()?)?;

        // A non-zero return code forces session-present to 0
        // [MQTT-3.2.2-4].
        Ok(Self {
            session_present: session_present && return_code == ConnectReturnCode::Accepted,
            return_code,
        })
    }
}

impl EncodePacket for ConnectAckPacket {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        let old_len = buf.len();
        let fixed_header = FixedHeader::new(PacketType::ConnectAck, 2)?;
        fixed_header.encode(buf)?;

        buf.push(u8::from(self.session_present));
        buf.push(self.return_code as u8);

        Ok(buf.len() - old_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        let buf: Vec<u8> = vec![0x20, 0x02, 0x00, 0x00];
        let mut reader = ByteReader::new(&buf);
        let packet = ConnectAckPacket::decode(&mut reader).unwrap();
        assert!(!packet.session_present());
        assert_eq!(packet.return_code(), ConnectReturnCode::Accepted);
    }

    #[test]
    fn test_decode_session_present_forced_off() {
        // Session present set together with return code 5.
        let buf: Vec<u8> = vec![0x20, 0x02, 0x01, 0x05];
        let mut reader = ByteReader::new(&buf);
        let packet = ConnectAckPacket::decode(&mut reader).unwrap();
        assert!(!packet.session_present());
        assert_eq!(packet.return_code(), ConnectReturnCode::Unauthorized);
    }

    #[test]
    fn test_decode_reserved_ack_flags() {
        let buf: Vec<u8> = vec![0x20, 0x02, 0x02, 0x00];
        let mut reader = ByteReader::new(&buf);
        assert_eq!(
            ConnectAckPacket::decode(&mut reader),
            Err(DecodeError::InvalidPacketFlags)
        );
    }

    #[test]
    fn test_decode_reserved_return_code() {
        let buf: Vec<u8> = vec![0x20, 0x02, 0x00, 0x06];
        let mut reader = ByteReader::new(&buf);
        assert_eq!(
            ConnectAckPacket::decode(&mut reader),
            Err(DecodeError::InvalidReturnCode)
        );
    }

    #[test]
    fn test_encode() {
        let packet = ConnectAckPacket::new(true, ConnectReturnCode::Accepted);
        let mut buf = Vec::new();
        packet.encode(&mut buf).unwrap();
        assert_eq!(&buf, &[0x20, 0x02, 0x01, 0x00]);
    }
}
