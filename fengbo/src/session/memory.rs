// Copyright (c) 2023 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use std::collections::HashMap;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use codec::{Packet, PacketId};

use crate::error::{Error, ErrorKind};
use crate::session::{Direction, SessionStore};

/// Packet table of one direction, insertion ordered.
#[derive(Debug, Default)]
struct Table {
    packets: HashMap<u16, Packet>,
    order: Vec<u16>,
}

impl Table {
    fn save(&mut self, id: u16, packet: Packet) {
        // A replaced entry keeps its position in the order list, so the
        // QoS 2 upgrade from Publish to PublishRelease does not reorder
        // retransmissions.
        if self.packets.insert(id, packet).is_none() {
            self.order.push(id);
        }
    }

    fn delete(&mut self, id: u16) {
        if self.packets.remove(&id).is_some() {
            self.order.retain(|stored| *stored != id);
        }
    }

    fn contains(&self, id: u16) -> bool {
        self.packets.contains_key(&id)
    }

    fn all(&self) -> Vec<Packet> {
        self.order
            .iter()
            .filter_map(|id| self.packets.get(id).cloned())
            .collect()
    }

    fn len(&self) -> usize {
        self.packets.len()
    }

    fn clear(&mut self) {
        self.packets.clear();
        self.order.clear();
    }
}

#[derive(Debug, Default)]
struct Inner {
    incoming: Table,
    outgoing: Table,

    /// Last identifier handed out; the next allocation starts after it.
    cursor: u16,
}

/// In-memory reference implementation of [`SessionStore`].
#[derive(Debug, Default)]
pub struct MemorySession {
    inner: Mutex<Inner>,
    freed: Condvar,
}

impl MemorySession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Inner {
    fn table(&self, direction: Direction) -> &Table {
        match direction {
            Direction::Incoming => &self.incoming,
            Direction::Outgoing => &self.outgoing,
        }
    }

    fn table_mut(&mut self, direction: Direction) -> &mut Table {
        match direction {
            Direction::Incoming => &mut self.incoming,
            Direction::Outgoing => &mut self.outgoing,
        }
    }

    fn in_use(&self, id: u16) -> bool {
        self.incoming.contains(id) || self.outgoing.contains(id)
    }
}

impl SessionStore for MemorySession {
    fn next_id(&self) -> PacketId {
        let mut inner = self.lock();
        loop {
            // Walk the id space once, starting just past the cursor and
            // skipping 0 and ids stored in either direction.
            let mut candidate = inner.cursor;
            for _ in 0..usize::from(u16::MAX) {
                candidate = candidate.wrapping_add(1);
                if candidate == 0 {
                    candidate = 1;
                }
                if !inner.in_use(candidate) {
                    inner.cursor = candidate;
                    return PacketId::new(candidate);
                }
            }

            // All 65535 ids are taken; block until one is freed.
            inner = self
                .freed
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn save(&self, direction: Direction, packet: Packet) -> Result<(), Error> {
        let Some(id) = packet.packet_id() else {
            return Err(Error::from_string(
                ErrorKind::SessionError,
                format!("Packet has no id: {:?}", packet.packet_type()),
            ));
        };
        let mut inner = self.lock();
        inner.table_mut(direction).save(id.value(), packet);
        Ok(())
    }

    fn lookup(&self, direction: Direction, id: PacketId) -> Result<Option<Packet>, Error> {
        let inner = self.lock();
        Ok(inner.table(direction).packets.get(&id.value()).cloned())
    }

    fn delete(&self, direction: Direction, id: PacketId) -> Result<(), Error> {
        let mut inner = self.lock();
        inner.table_mut(direction).delete(id.value());
        self.freed.notify_all();
        Ok(())
    }

    fn all_packets(&self, direction: Direction) -> Result<Vec<Packet>, Error> {
        let inner = self.lock();
        Ok(inner.table(direction).all())
    }

    fn reset(&self) -> Result<(), Error> {
        let mut inner = self.lock();
        inner.incoming.clear();
        inner.outgoing.clear();
        inner.cursor = 0;
        self.freed.notify_all();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codec::{PublishPacket, QoS};

    fn publish(id: u16) -> Packet {
        let mut packet = PublishPacket::new("pond/depth", QoS::AtLeastOnce, b"3m").unwrap();
        packet.set_packet_id(PacketId::new(id));
        Packet::Publish(packet)
    }

    #[test]
    fn test_next_id_is_sequential() {
        let session = MemorySession::new();
        assert_eq!(session.next_id(), PacketId::new(1));
        assert_eq!(session.next_id(), PacketId::new(2));
        assert_eq!(session.next_id(), PacketId::new(3));
    }

    #[test]
    fn test_next_id_skips_stored_ids() {
        let session = MemorySession::new();
        session.save(Direction::Outgoing, publish(1)).unwrap();
        session.save(Direction::Incoming, publish(2)).unwrap();
        assert_eq!(session.next_id(), PacketId::new(3));
    }

    #[test]
    fn test_next_id_wraps() {
        let session = MemorySession::new();
        {
            let mut inner = session.lock();
            inner.cursor = u16::MAX - 1;
        }
        assert_eq!(session.next_id(), PacketId::new(u16::MAX));
        // 0 is reserved; the cursor wraps to 1.
        assert_eq!(session.next_id(), PacketId::new(1));
    }

    #[test]
    fn test_freed_id_reissued_after_wrap() {
        let session = MemorySession::new();
        session.save(Direction::Outgoing, publish(1)).unwrap();
        assert_eq!(session.next_id(), PacketId::new(2));
        session
            .delete(Direction::Outgoing, PacketId::new(1))
            .unwrap();
        {
            let mut inner = session.lock();
            inner.cursor = u16::MAX;
        }
        assert_eq!(session.next_id(), PacketId::new(1));
    }

    #[test]
    fn test_save_lookup_delete() {
        let session = MemorySession::new();
        let packet = publish(7);
        session.save(Direction::Outgoing, packet.clone()).unwrap();
        assert_eq!(
            session.lookup(Direction::Outgoing, PacketId::new(7)).unwrap(),
            Some(packet)
        );
        assert_eq!(
            session.lookup(Direction::Incoming, PacketId::new(7)).unwrap(),
            None
        );

        session
            .delete(Direction::Outgoing, PacketId::new(7))
            .unwrap();
        assert_eq!(
            session.lookup(Direction::Outgoing, PacketId::new(7)).unwrap(),
            None
        );
        // Deleting again is a no-op.
        session
            .delete(Direction::Outgoing, PacketId::new(7))
            .unwrap();
    }

    #[test]
    fn test_save_without_id_fails() {
        let session = MemorySession::new();
        let packet = Packet::Publish(
            PublishPacket::new("pond/depth", QoS::AtMostOnce, b"3m").unwrap(),
        );
        assert!(session.save(Direction::Outgoing, packet).is_err());
    }

    #[test]
    fn test_all_packets_keeps_insertion_order() {
        let session = MemorySession::new();
        for id in [5, 2, 9] {
            session.save(Direction::Outgoing, publish(id)).unwrap();
        }
        let ids: Vec<u16> = session
            .all_packets(Direction::Outgoing)
            .unwrap()
            .iter()
            .filter_map(Packet::packet_id)
            .map(|id| id.value())
            .collect();
        assert_eq!(ids, vec![5, 2, 9]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let session = MemorySession::new();
        session.save(Direction::Outgoing, publish(5)).unwrap();
        session.save(Direction::Outgoing, publish(2)).unwrap();

        let release = Packet::PublishRelease(codec::PublishReleasePacket::new(PacketId::new(5)));
        session.save(Direction::Outgoing, release.clone()).unwrap();

        let packets = session.all_packets(Direction::Outgoing).unwrap();
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0], release);
    }

    #[test]
    fn test_reset() {
        let session = MemorySession::new();
        session.save(Direction::Outgoing, publish(1)).unwrap();
        session.save(Direction::Incoming, publish(2)).unwrap();
        session.next_id();

        session.reset().unwrap();
        assert!(session.all_packets(Direction::Outgoing).unwrap().is_empty());
        assert!(session.all_packets(Direction::Incoming).unwrap().is_empty());
        assert_eq!(session.next_id(), PacketId::new(1));
    }
}
