//! gossipwire: BOLT gossip message codec plus a small gossip node.
//!
//! `wire` is the schema-driven codec, `node` the config/dispatch/services
//! stack built on it. The prelude pulls in what most callers need:
//!
//! ```
//! use gossipwire::prelude::*;
//!
//! let ping = Ping::create(4, vec![0u8; 2]).unwrap();
//! let msg = decode(Message::from(ping).encode()).unwrap();
//! assert_eq!(msg.variant(), Some(Variant::Ping));
//! ```

pub mod wire {
    pub use gossipwire_core::*;
}

pub mod node {
    pub use gossipwire_node::*;
}

pub mod prelude {
    pub use gossipwire_core::protocol::typed::{
        ChannelAnnouncement, ChannelUpdate, GossipTimestampFilter, Init, NodeAnnouncement, Ping,
        Pong, QueryChannelRange, QueryShortChannelIds, ReplyChannelRange,
        ReplyShortChannelIds, TypedMessage,
    };
    pub use gossipwire_core::protocol::types::{ChainHash, ShortChannelId};
    pub use gossipwire_core::{
        decode, decode_known, decode_with_schema, ErrorCode, GossipWireError, Message, Result,
        Variant,
    };
    pub use gossipwire_node::app_state::AppState;
    pub use gossipwire_node::config::NodeConfig;
}
