//! Gossip store shared by every peer session.
//!
//! Channels are keyed by short channel id and keep their announcement plus
//! the newest `channel_update` per direction. Nodes keep their newest
//! `node_announcement`. Every entry keeps the message as received, trailing
//! bytes included, and that message is what gets relayed.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use gossipwire_core::error::Result;
use gossipwire_core::protocol::typed::{
    ChannelAnnouncement, ChannelUpdate, GossipTimestampFilter, NodeAnnouncement, TypedMessage,
};
use gossipwire_core::protocol::types::{Point, ShortChannelId};
use gossipwire_core::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Accepted,
    /// Already known, or older than what is stored.
    Stale,
    /// Update for a channel that was never announced.
    UnknownChannel,
}

/// A typed view next to the message it was read from.
#[derive(Debug, Clone)]
pub struct Stored<T> {
    pub view: T,
    pub message: Message,
}

impl<T: TypedMessage> Stored<T> {
    pub fn from_message(message: Message) -> Result<Self> {
        Ok(Self {
            view: message.to_typed()?,
            message,
        })
    }
}

#[derive(Debug, Clone)]
struct ChannelRecord {
    announcement: Stored<ChannelAnnouncement>,
    updates: [Option<Stored<ChannelUpdate>>; 2],
}

#[derive(Default)]
pub struct GossipStore {
    channels: DashMap<ShortChannelId, ChannelRecord>,
    nodes: DashMap<Point, Stored<NodeAnnouncement>>,
}

impl GossipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_channel(&self, announcement: Stored<ChannelAnnouncement>) -> StoreOutcome {
        match self.channels.entry(announcement.view.short_channel_id) {
            Entry::Occupied(_) => StoreOutcome::Stale,
            Entry::Vacant(v) => {
                v.insert(ChannelRecord {
                    announcement,
                    updates: [None, None],
                });
                StoreOutcome::Accepted
            }
        }
    }

    pub fn insert_update(&self, update: Stored<ChannelUpdate>) -> StoreOutcome {
        let Some(mut rec) = self.channels.get_mut(&update.view.short_channel_id) else {
            return StoreOutcome::UnknownChannel;
        };
        let slot = &mut rec.updates[usize::from(update.view.direction())];
        if let Some(cur) = slot {
            if cur.view.timestamp >= update.view.timestamp {
                return StoreOutcome::Stale;
            }
        }
        *slot = Some(update);
        StoreOutcome::Accepted
    }

    pub fn insert_node(&self, node: Stored<NodeAnnouncement>) -> StoreOutcome {
        match self.nodes.entry(node.view.node_id) {
            Entry::Occupied(mut cur) => {
                if cur.get().view.timestamp >= node.view.timestamp {
                    return StoreOutcome::Stale;
                }
                cur.insert(node);
                StoreOutcome::Accepted
            }
            Entry::Vacant(v) => {
                v.insert(node);
                StoreOutcome::Accepted
            }
        }
    }

    pub fn channel(&self, scid: ShortChannelId) -> Option<ChannelAnnouncement> {
        self.channels.get(&scid).map(|r| r.announcement.view.clone())
    }

    /// Stored updates of a channel, direction 0 first.
    pub fn updates(&self, scid: ShortChannelId) -> Vec<ChannelUpdate> {
        self.channels
            .get(&scid)
            .map(|r| r.updates.iter().flatten().map(|u| u.view.clone()).collect())
            .unwrap_or_default()
    }

    pub fn node(&self, node_id: &Point) -> Option<NodeAnnouncement> {
        self.nodes.get(node_id).map(|r| r.view.clone())
    }

    pub fn announcement_message(&self, scid: ShortChannelId) -> Option<Message> {
        self.channels.get(&scid).map(|r| r.announcement.message.clone())
    }

    pub fn node_message(&self, node_id: &Point) -> Option<Message> {
        self.nodes.get(node_id).map(|r| r.message.clone())
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Sorted ids of channels whose funding block is in `[first, end)`.
    pub fn scids_in_blocks(&self, first: u32, end: u64) -> Vec<ShortChannelId> {
        let mut ids: Vec<ShortChannelId> = self
            .channels
            .iter()
            .map(|r| *r.key())
            .filter(|id| id.block_height() >= first && u64::from(id.block_height()) < end)
            .collect();
        ids.sort();
        ids
    }

    /// Announcement and stored updates of one channel, in send order.
    pub fn channel_messages(&self, scid: ShortChannelId) -> Vec<Message> {
        let Some(rec) = self.channels.get(&scid) else {
            return Vec::new();
        };
        let mut out = vec![rec.announcement.message.clone()];
        out.extend(rec.updates.iter().flatten().map(|u| u.message.clone()));
        out
    }

    /// Gossip a peer asked for with `gossip_timestamp_filter`.
    ///
    /// A channel is sent when at least one of its updates matches; its
    /// announcement goes first, followed by the matching updates. Matching
    /// node announcements come last.
    pub fn gossip_matching(&self, filter: &GossipTimestampFilter) -> Vec<Message> {
        let mut scids: Vec<ShortChannelId> = self.channels.iter().map(|r| *r.key()).collect();
        scids.sort();

        let mut out = Vec::new();
        for scid in scids {
            let Some(rec) = self.channels.get(&scid) else { continue };
            let matching: Vec<Message> = rec
                .updates
                .iter()
                .flatten()
                .filter(|u| filter.matches(u.view.timestamp))
                .map(|u| u.message.clone())
                .collect();
            if matching.is_empty() {
                continue;
            }
            out.push(rec.announcement.message.clone());
            out.extend(matching);
        }

        let mut nodes: Vec<(Point, Message)> = self
            .nodes
            .iter()
            .filter(|r| filter.matches(r.view.timestamp))
            .map(|r| (*r.key(), r.message.clone()))
            .collect();
        nodes.sort_by_key(|(id, _)| *id);
        out.extend(nodes.into_iter().map(|(_, m)| m));
        out
    }
}
