// Copyright (c) 2023 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! MQTT v3.1/v3.1.1 client library.
//!
//! The engine is thread based: a reader thread owns the transport read
//! side, a keep alive timer drives pings, and every request which expects
//! an acknowledgement hands back a [`Future`] the caller can `wait()` on
//! with a timeout.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use fengbo::{Client, ConnectOptions, QoS};
//!
//! let client = Client::new();
//! client.set_callback(|msg, err| {
//!     if let Some(msg) = msg {
//!         println!("{}: {:?}", msg.topic, msg.payload);
//!     } else if let Some(err) = err {
//!         eprintln!("connection lost: {err}");
//!     }
//!     Ok(())
//! });
//!
//! let connected = client.connect(ConnectOptions::new("mqtt://localhost:1883"))?;
//! connected.wait(Duration::from_secs(1)).unwrap();
//!
//! client.subscribe("pond/#", QoS::AtLeastOnce)?;
//! client.publish("pond/depth", b"3m", QoS::AtLeastOnce, false)?;
//! client.disconnect()?;
//! # Ok::<(), fengbo::Error>(())
//! ```

mod client;
mod connect_options;
mod dialer;
mod error;
mod future;
mod session;
mod status;
mod transport;

pub use client::{Client, ConnectReply, MessageCallback, PacketLogger};
pub use connect_options::{ConnectOptions, DEFAULT_CONNECT_TIMEOUT};
pub use dialer::{BrokerAddress, Dialer, Scheme, TcpDialer};
pub use error::{Error, ErrorKind};
pub use future::{Future, WaitError};
pub use session::{Direction, MemorySession, SessionStore};
pub use status::ClientStatus;
pub use transport::{Stream, Transport};

// The codec types a client application touches directly.
pub use codec::{Message, ProtocolLevel, QoS, SubscribeAck};
