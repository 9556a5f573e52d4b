//! Variant catalogue: type id, name and schema of every supported message.

use std::fmt;

use crate::protocol::schema::{self, VariantSchema};

/// A catalogued message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variant {
    Init,
    Ping,
    Pong,
    ChannelAnnouncement,
    NodeAnnouncement,
    ChannelUpdate,
    QueryShortChannelIds,
    ReplyShortChannelIds,
    QueryChannelRange,
    ReplyChannelRange,
    GossipTimestampFilter,
}

impl Variant {
    pub const ALL: [Variant; 11] = [
        Variant::Init,
        Variant::Ping,
        Variant::Pong,
        Variant::ChannelAnnouncement,
        Variant::NodeAnnouncement,
        Variant::ChannelUpdate,
        Variant::QueryShortChannelIds,
        Variant::ReplyShortChannelIds,
        Variant::QueryChannelRange,
        Variant::ReplyChannelRange,
        Variant::GossipTimestampFilter,
    ];

    /// Wire discriminator.
    pub const fn id(self) -> u16 {
        match self {
            Variant::Init => 16,
            Variant::Ping => 18,
            Variant::Pong => 19,
            Variant::ChannelAnnouncement => 256,
            Variant::NodeAnnouncement => 257,
            Variant::ChannelUpdate => 258,
            Variant::QueryShortChannelIds => 261,
            Variant::ReplyShortChannelIds => 262,
            Variant::QueryChannelRange => 263,
            Variant::ReplyChannelRange => 264,
            Variant::GossipTimestampFilter => 265,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Variant::Init => "init",
            Variant::Ping => "ping",
            Variant::Pong => "pong",
            Variant::ChannelAnnouncement => "channel_announcement",
            Variant::NodeAnnouncement => "node_announcement",
            Variant::ChannelUpdate => "channel_update",
            Variant::QueryShortChannelIds => "query_short_channel_ids",
            Variant::ReplyShortChannelIds => "reply_short_channel_ids",
            Variant::QueryChannelRange => "query_channel_range",
            Variant::ReplyChannelRange => "reply_channel_range",
            Variant::GossipTimestampFilter => "gossip_timestamp_filter",
        }
    }

    pub const fn schema(self) -> VariantSchema {
        match self {
            Variant::Init => schema::INIT,
            Variant::Ping => schema::PING,
            Variant::Pong => schema::PONG,
            Variant::ChannelAnnouncement => schema::CHANNEL_ANNOUNCEMENT,
            Variant::NodeAnnouncement => schema::NODE_ANNOUNCEMENT,
            Variant::ChannelUpdate => schema::CHANNEL_UPDATE,
            Variant::QueryShortChannelIds => schema::QUERY_SHORT_CHANNEL_IDS,
            Variant::ReplyShortChannelIds => schema::REPLY_SHORT_CHANNEL_IDS,
            Variant::QueryChannelRange => schema::QUERY_CHANNEL_RANGE,
            Variant::ReplyChannelRange => schema::REPLY_CHANNEL_RANGE,
            Variant::GossipTimestampFilter => schema::GOSSIP_TIMESTAMP_FILTER,
        }
    }

    pub fn from_id(id: u16) -> Option<Variant> {
        Variant::ALL.into_iter().find(|v| v.id() == id)
    }

    pub fn from_name(name: &str) -> Option<Variant> {
        Variant::ALL.into_iter().find(|v| v.name() == name)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
