// Copyright (c) 2023 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use codec::{Packet, PacketId};

use crate::error::Error;

mod memory;

pub use memory::MemorySession;

/// Which half of the session a packet belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Packets received from the server, currently only half-acknowledged
    /// `QoS` 2 publishes waiting for their PublishRelease.
    Incoming,

    /// Packets sent by the client which still await an acknowledgement.
    Outgoing,
}

/// Storage for the client side session state.
///
/// The store keeps, per direction, an insertion ordered table of packets
/// keyed by packet identifier, plus the identifier allocation cursor. With
/// clean-session unset this state carries across reconnects and drives
/// retransmission, so implementations may persist it anywhere; the trait
/// is the only contract. All operations must be atomic with respect to
/// each other.
pub trait SessionStore: Send + Sync {
    /// Allocate the next free packet identifier.
    ///
    /// Identifiers are handed out from a wrapping cursor over
    /// `[1, 65535]`; 0 and identifiers currently stored in either
    /// direction are skipped. If the whole space is in use the call
    /// blocks until an identifier is freed.
    fn next_id(&self) -> PacketId;

    /// Insert `packet` into the table of `direction`, replacing any entry
    /// stored under the same identifier while keeping its position.
    ///
    /// # Errors
    ///
    /// Returns error if `packet` carries no identifier, or on a backend
    /// failure.
    fn save(&self, direction: Direction, packet: Packet) -> Result<(), Error>;

    /// Get a copy of the packet stored under `id`, if any.
    ///
    /// # Errors
    ///
    /// Returns error on a backend failure.
    fn lookup(&self, direction: Direction, id: PacketId) -> Result<Option<Packet>, Error>;

    /// Remove the entry stored under `id`. Removing an absent entry is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns error on a backend failure.
    fn delete(&self, direction: Direction, id: PacketId) -> Result<(), Error>;

    /// Get all packets of `direction` in insertion order.
    ///
    /// The order is what retransmission on session resumption replays, so
    /// it must be stable.
    ///
    /// # Errors
    ///
    /// Returns error on a backend failure.
    fn all_packets(&self, direction: Direction) -> Result<Vec<Packet>, Error>;

    /// Drop all stored packets and reset the identifier cursor.
    ///
    /// # Errors
    ///
    /// Returns error on a backend failure.
    fn reset(&self) -> Result<(), Error>;
}
