// Copyright (c) 2023 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! A scripted broker for driving the client through exact packet
//! exchanges on a real socket.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use fengbo::QoS;
use codec::{EncodePacket, Packet};

/// One step of a broker script.
pub enum Step {
    /// Read one packet and assert it equals the expectation.
    Receive(Packet),

    /// Write one packet.
    Send(Packet),

    /// Sleep before the next step.
    Pause(Duration),

    /// Close the socket right away.
    Close,

    /// Expect the client to close the connection.
    End,
}

/// A single-connection broker executing a fixed script on its own thread.
///
/// Any mismatch panics in the broker thread; [`FakeBroker::join`] surfaces
/// the panic in the test.
pub struct FakeBroker {
    port: u16,
    handle: JoinHandle<()>,
}

impl FakeBroker {
    pub fn start(steps: Vec<Step>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind broker listener");
        let port = listener.local_addr().expect("local addr").port();
        let handle = thread::spawn(move || {
            let (mut stream, _addr) = listener.accept().expect("accept client");
            stream
                .set_read_timeout(Some(Duration::from_secs(5)))
                .expect("set read timeout");
            run_script(&mut stream, steps);
        });
        Self { port, handle }
    }

    pub fn url(&self) -> String {
        format!("tcp://localhost:{}", self.port)
    }

    /// Wait for the script to finish; panics if any step failed.
    pub fn join(self) {
        self.handle.join().expect("broker script failed");
    }
}

fn run_script(stream: &mut TcpStream, steps: Vec<Step>) {
    for step in steps {
        match step {
            Step::Receive(expected) => {
                let packet = read_packet(stream);
                assert_eq!(packet, expected, "unexpected packet from client");
            }
            Step::Send(packet) => {
                let mut buf = Vec::new();
                packet.encode(&mut buf).expect("encode broker packet");
                stream.write_all(&buf).expect("write broker packet");
            }
            Step::Pause(duration) => thread::sleep(duration),
            Step::Close => {
                let _ = stream.shutdown(Shutdown::Both);
                return;
            }
            Step::End => {
                let mut byte = [0u8; 1];
                match stream.read(&mut byte) {
                    Ok(0) => {}
                    Ok(_) => panic!("expected client to close, got more bytes"),
                    // Reset by peer counts as closed too.
                    Err(_) => {}
                }
                return;
            }
        }
    }
}

/// Read one complete packet: header byte, remaining length varint, body.
fn read_packet(stream: &mut TcpStream) -> Packet {
    let mut frame = Vec::new();
    let mut byte = [0u8; 1];
    stream.read_exact(&mut byte).expect("read header byte");
    frame.push(byte[0]);

    let mut remaining: usize = 0;
    let mut multiplier: usize = 1;
    loop {
        stream.read_exact(&mut byte).expect("read length byte");
        frame.push(byte[0]);
        remaining += (byte[0] as usize & 0x7f) * multiplier;
        multiplier *= 128;
        if byte[0] & 0x80 == 0 {
            break;
        }
    }

    let body_start = frame.len();
    frame.resize(body_start + remaining, 0);
    stream
        .read_exact(&mut frame[body_start..])
        .expect("read packet body");

    let (packet, _consumed) = Packet::decode(&frame).expect("decode client packet");
    packet
}

/// Expected Connect packet for [`test_options`].
pub fn connect_packet(client_id: &str, keep_alive: u16, clean_session: bool) -> Packet {
    let mut packet = codec::ConnectPacket::new(client_id).expect("connect packet");
    packet.set_keep_alive(keep_alive);
    packet.set_clean_session(clean_session);
    Packet::Connect(packet)
}

pub fn connack_packet() -> Packet {
    Packet::ConnectAck(codec::ConnectAckPacket::new(
        false,
        codec::ConnectReturnCode::Accepted,
    ))
}

pub fn disconnect_packet() -> Packet {
    Packet::Disconnect(codec::DisconnectPacket::new())
}

pub fn publish_packet(topic: &str, payload: &[u8], qos: QoS, id: u16) -> Packet {
    let mut packet = codec::PublishPacket::new(topic, qos, payload).expect("publish packet");
    if qos != QoS::AtMostOnce {
        packet.set_packet_id(codec::PacketId::new(id));
    }
    Packet::Publish(packet)
}

pub fn puback_packet(id: u16) -> Packet {
    Packet::PublishAck(codec::PublishAckPacket::new(codec::PacketId::new(id)))
}

pub fn pubrec_packet(id: u16) -> Packet {
    Packet::PublishReceived(codec::PublishReceivedPacket::new(codec::PacketId::new(id)))
}

pub fn pubrel_packet(id: u16) -> Packet {
    Packet::PublishRelease(codec::PublishReleasePacket::new(codec::PacketId::new(id)))
}

pub fn pubcomp_packet(id: u16) -> Packet {
    Packet::PublishComplete(codec::PublishCompletePacket::new(codec::PacketId::new(id)))
}

pub fn subscribe_packet(topic: &str, qos: QoS, id: u16) -> Packet {
    Packet::Subscribe(
        codec::SubscribePacket::new(topic, qos, codec::PacketId::new(id)).expect("subscribe"),
    )
}

pub fn suback_packet(id: u16, acks: Vec<codec::SubscribeAck>) -> Packet {
    Packet::SubscribeAck(codec::SubscribeAckPacket::with_vec(
        codec::PacketId::new(id),
        acks,
    ))
}

pub fn unsubscribe_packet(topic: &str, id: u16) -> Packet {
    Packet::Unsubscribe(
        codec::UnsubscribePacket::new(topic, codec::PacketId::new(id)).expect("unsubscribe"),
    )
}

pub fn unsuback_packet(id: u16) -> Packet {
    Packet::UnsubscribeAck(codec::UnsubscribeAckPacket::new(codec::PacketId::new(id)))
}

pub fn pingreq_packet() -> Packet {
    Packet::PingRequest(codec::PingRequestPacket::new())
}

pub fn pingresp_packet() -> Packet {
    Packet::PingResponse(codec::PingResponsePacket::new())
}
