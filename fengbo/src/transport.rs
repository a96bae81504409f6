// Copyright (c) 2023 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use std::fmt;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::{Mutex, MutexGuard, PoisonError};

use codec::{DecodeError, EncodePacket, Packet};

use crate::error::{Error, ErrorKind};

/// Network stream the engine talks over.
///
/// TLS and WebSocket streams are produced by external dialers; plain TCP
/// is built in.
pub enum Stream {
    Tcp(TcpStream),
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(..) => f.write_str("Tcp"),
        }
    }
}

impl Stream {
    fn try_clone(&self) -> Result<Self, Error> {
        match self {
            Self::Tcp(stream) => Ok(Self::Tcp(stream.try_clone()?)),
        }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        match self {
            Self::Tcp(stream) => stream.read_exact(buf).map_err(Into::into),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<(), Error> {
        match self {
            Self::Tcp(stream) => stream.write_all(buf).map_err(Into::into),
        }
    }

    fn shutdown(&self) {
        match self {
            // Also unblocks a reader parked in read_exact().
            Self::Tcp(stream) => {
                let _ = stream.shutdown(Shutdown::Both);
            }
        }
    }
}

struct ReadHalf {
    stream: Stream,

    /// Grow-only scratch buffer, sized to the largest packet seen so far.
    buf: Vec<u8>,
}

/// Frames a byte stream into packets and packets into atomic writes.
///
/// The read side belongs to the single reader task; the write side is
/// shared and serialised by a mutex, so concurrent senders never
/// interleave packet bytes on the wire.
pub struct Transport {
    reader: Mutex<ReadHalf>,
    writer: Mutex<Stream>,
    shutdown_handle: Stream,
}

impl Transport {
    /// Wrap a connected stream.
    ///
    /// # Errors
    ///
    /// Returns error if the stream cannot be cloned into read and write
    /// halves.
    pub fn new(stream: Stream) -> Result<Self, Error> {
        let writer = stream.try_clone()?;
        let shutdown_handle = stream.try_clone()?;
        Ok(Self {
            reader: Mutex::new(ReadHalf {
                stream,
                buf: Vec::new(),
            }),
            writer: Mutex::new(writer),
            shutdown_handle,
        })
    }

    /// Serialize `packet` and write it out as one atomic chunk.
    ///
    /// # Errors
    ///
    /// Returns error if encoding fails or the socket write fails.
    pub fn send(&self, packet: &Packet) -> Result<(), Error> {
        let mut buf = Vec::new();
        packet.encode(&mut buf)?;
        let mut writer = lock(&self.writer);
        writer.write_all(&buf)
    }

    /// Read exactly one packet from the stream.
    ///
    /// First reads the fixed header byte and the remaining length varint,
    /// then exactly the advertised number of body bytes, and only then
    /// hands the frame to the codec.
    ///
    /// # Errors
    ///
    /// Returns error on socket failure or a malformed packet.
    pub fn receive(&self) -> Result<Packet, Error> {
        let mut reader = lock(&self.reader);
        let ReadHalf { stream, buf } = &mut *reader;

        buf.clear();
        let mut byte = [0u8; 1];
        stream.read_exact(&mut byte)?;
        buf.push(byte[0]);

        // Remaining length is one to four bytes; a fourth byte with its
        // continuation bit set is malformed.
        let mut remaining: usize = 0;
        let mut multiplier: usize = 1;
        let mut complete = false;
        for _ in 0..4 {
            stream.read_exact(&mut byte)?;
            buf.push(byte[0]);
            remaining += (byte[0] as usize & 0x7f) * multiplier;
            multiplier *= 128;
            if byte[0] & 0x80 == 0 {
                complete = true;
                break;
            }
        }
        if !complete {
            return Err(DecodeError::InvalidRemainingLength.into());
        }

        let header_len = buf.len();
        buf.resize(header_len + remaining, 0);
        stream.read_exact(&mut buf[header_len..])?;

        let (packet, _consumed) = Packet::decode(buf)?;
        Ok(packet)
    }

    /// Close both directions of the stream, unblocking the reader.
    pub fn shutdown(&self) {
        self.shutdown_handle.shutdown();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl From<TcpStream> for Stream {
    fn from(stream: TcpStream) -> Self {
        Self::Tcp(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codec::{ConnectReturnCode, PacketId, PublishAckPacket, PublishPacket, QoS};
    use std::net::TcpListener;
    use std::thread;

    fn transport_pair() -> (Transport, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || listener.accept().unwrap().0);
        let client = TcpStream::connect(addr).unwrap();
        let peer = handle.join().unwrap();
        (Transport::new(Stream::Tcp(client)).unwrap(), peer)
    }

    #[test]
    fn test_send_and_receive() {
        let (transport, mut peer) = transport_pair();

        let packet = Packet::PublishAck(PublishAckPacket::new(PacketId::new(3)));
        transport.send(&packet).unwrap();

        let mut buf = [0u8; 4];
        peer.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, &[0x40, 0x02, 0x00, 0x03]);

        // Echo a ConnectAck back, split across two writes.
        peer.write_all(&[0x20, 0x02]).unwrap();
        peer.write_all(&[0x00, 0x00]).unwrap();
        let received = transport.receive().unwrap();
        match received {
            Packet::ConnectAck(ack) => {
                assert_eq!(ack.return_code(), ConnectReturnCode::Accepted);
            }
            other => panic!("unexpected packet: {other:?}"),
        }
    }

    #[test]
    fn test_receive_multibyte_remaining_length() {
        let (transport, mut peer) = transport_pair();

        let payload = vec![0x61u8; 200];
        let mut publish = PublishPacket::new("big/one", QoS::AtLeastOnce, &payload).unwrap();
        publish.set_packet_id(PacketId::new(10));
        let mut frame = Vec::new();
        Packet::Publish(publish.clone()).encode(&mut frame).unwrap();
        // 211 bytes of remaining length needs a two byte varint.
        assert_eq!(frame[1] & 0x80, 0x80);
        peer.write_all(&frame).unwrap();

        let received = transport.receive().unwrap();
        assert_eq!(received, Packet::Publish(publish));
    }

    #[test]
    fn test_receive_after_close_is_error() {
        let (transport, peer) = transport_pair();
        drop(peer);
        assert!(transport.receive().is_err());
    }
}
