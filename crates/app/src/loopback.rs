//! In-process stand-in for the network link between two instances.
//!
//! Each packet carries the sender's network id for the viewer plus the wire
//! bytes of one zoom snapshot. Packets are framed with bitcode and delivered
//! in send order on the next `drain`.

use std::collections::VecDeque;

use bevy::ecs::event::EventCursor;
use bevy::prelude::*;
use bevy::utils::HashMap;
use bitcode::{Decode, Encode};

use view_zoom::{InboundZoomSnapshot, OutboundZoomSnapshot, ZoomError, ZoomSnapshot};

/// Process-independent id shared by both copies of a replicated viewer.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetId(pub u32);

#[derive(Encode, Decode, Debug, Clone, PartialEq)]
struct Packet {
    net_id: u32,
    payload: Vec<u8>,
}

#[derive(Default)]
pub struct Loopback {
    in_flight: VecDeque<Vec<u8>>,
    outbound: EventCursor<OutboundZoomSnapshot>,
    sent: u64,
    rejected: u64,
}

impl Loopback {
    /// Frame this update's outbound snapshots from the authority.
    pub fn collect(&mut self, authority: &World) {
        let events = authority.resource::<Events<OutboundZoomSnapshot>>();
        let mut frames = Vec::new();
        for out in self.outbound.read(events) {
            let Some(net_id) = authority.get::<NetId>(out.entity) else {
                warn!("Outbound zoom snapshot for {:?} has no NetId", out.entity);
                continue;
            };
            frames.push((net_id.0, out.snapshot.to_bytes()));
        }
        for (net_id, payload) in frames {
            self.push(net_id, payload);
        }
    }

    /// Queue raw payload bytes for `net_id`.
    pub fn push(&mut self, net_id: u32, payload: Vec<u8>) {
        self.in_flight
            .push_back(bitcode::encode(&Packet { net_id, payload }));
        self.sent += 1;
    }

    /// Decode every queued packet and hand it to the observer as an
    /// `InboundZoomSnapshot`. Returns how many were delivered.
    pub fn drain(&mut self, observer: &mut World) -> usize {
        let index: HashMap<u32, Entity> = {
            let mut q = observer.query::<(Entity, &NetId)>();
            q.iter(observer).map(|(e, id)| (id.0, e)).collect()
        };

        let mut delivered = 0;
        while let Some(frame) = self.in_flight.pop_front() {
            match decode_frame(&frame) {
                Ok((net_id, snapshot)) => match index.get(&net_id) {
                    Some(&entity) => {
                        observer.send_event(InboundZoomSnapshot { entity, snapshot });
                        delivered += 1;
                    }
                    None => debug!("No local viewer for net id {}", net_id),
                },
                Err(e) => {
                    self.rejected += 1;
                    warn!("Dropping zoom packet: {}", e);
                }
            }
        }
        delivered
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

fn decode_frame(frame: &[u8]) -> Result<(u32, ZoomSnapshot), ZoomError> {
    let packet: Packet = bitcode::decode(frame)?;
    let snapshot = ZoomSnapshot::from_bytes(&packet.payload)?;
    Ok((packet.net_id, snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observer_with(net_id: u32) -> (World, Entity) {
        let mut world = World::new();
        world.init_resource::<Events<InboundZoomSnapshot>>();
        let e = world.spawn(NetId(net_id)).id();
        (world, e)
    }

    #[test]
    fn test_packet_reaches_mapped_entity() {
        let (mut world, e) = observer_with(7);
        let mut link = Loopback::default();
        let snapshot = ZoomSnapshot {
            target: Vec2::splat(1.2),
            max_zoom: Vec2::splat(2.0),
        };
        link.push(7, snapshot.to_bytes());
        assert_eq!(link.drain(&mut world), 1);

        let events = world.resource::<Events<InboundZoomSnapshot>>();
        let got: Vec<_> = events.get_cursor().read(events).copied().collect();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].entity, e);
        assert_eq!(got[0].snapshot, snapshot);
    }

    #[test]
    fn test_bad_payload_is_counted_not_delivered() {
        let (mut world, _) = observer_with(1);
        let mut link = Loopback::default();
        link.push(1, vec![0xde, 0xad]);
        assert_eq!(link.drain(&mut world), 0);
        assert_eq!(link.rejected(), 1);
        assert_eq!(link.sent(), 1);
    }

    #[test]
    fn test_unknown_net_id_is_skipped() {
        let (mut world, _) = observer_with(1);
        let mut link = Loopback::default();
        let snapshot = ZoomSnapshot {
            target: Vec2::ONE,
            max_zoom: Vec2::ONE,
        };
        link.push(99, snapshot.to_bytes());
        assert_eq!(link.drain(&mut world), 0);
        assert_eq!(link.rejected(), 0);
    }
}
