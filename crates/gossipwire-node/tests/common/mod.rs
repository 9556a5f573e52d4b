//! Fixtures shared by the node integration tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use gossipwire_core::protocol::typed::{
    ChannelAnnouncement, ChannelUpdate, NodeAnnouncement, TypedMessage,
};
use gossipwire_core::protocol::types::{
    Alias, ChainHash, Point, RgbColor, ShortChannelId, Signature, VarBytes,
};
use gossipwire_node::app_state::AppState;
use gossipwire_node::config;
use gossipwire_node::session::Stored;

pub fn state() -> AppState {
    state_with("version: 1\n")
}

pub fn state_with(yaml: &str) -> AppState {
    AppState::new(config::load_from_str(yaml).unwrap()).unwrap()
}

pub fn node_id(n: u8) -> Point {
    let mut b = [n; 33];
    b[0] = 0x02;
    Point(b)
}

pub fn scid(block: u32, tx: u32) -> ShortChannelId {
    ShortChannelId::new(block, tx, 0).unwrap()
}

pub fn channel(chain: ChainHash, id: ShortChannelId) -> ChannelAnnouncement {
    ChannelAnnouncement {
        node_signature_1: Signature([1; 64]),
        node_signature_2: Signature([2; 64]),
        bitcoin_signature_1: Signature([3; 64]),
        bitcoin_signature_2: Signature([4; 64]),
        channel_features: VarBytes::empty(),
        chain_hash: chain,
        short_channel_id: id,
        node_id_1: node_id(1),
        node_id_2: node_id(2),
        bitcoin_key_1: node_id(3),
        bitcoin_key_2: node_id(4),
    }
}

pub fn update(chain: ChainHash, id: ShortChannelId, direction: u8, timestamp: u32) -> ChannelUpdate {
    ChannelUpdate {
        signature: Signature([9; 64]),
        chain_hash: chain,
        short_channel_id: id,
        timestamp,
        message_flags: 1,
        channel_flags: direction,
        cltv_expiry_delta: 144,
        htlc_minimum_msat: 1_000,
        fee_base_msat: 1_000,
        fee_proportional_millionths: 1,
        htlc_maximum_msat: 990_000_000,
    }
}

pub fn node(n: u8, timestamp: u32) -> NodeAnnouncement {
    let mut alias = [0u8; 32];
    alias[..4].copy_from_slice(b"node");
    NodeAnnouncement {
        signature: Signature([7; 64]),
        features: VarBytes::empty(),
        timestamp,
        node_id: node_id(n),
        rgb_color: RgbColor([1, 2, 3]),
        alias: Alias(alias),
        // ipv4 127.0.0.1:9735
        addresses: VarBytes::new(vec![1u8, 127, 0, 0, 1, 0x26, 0x07]).unwrap(),
    }
}

pub fn stored<T: TypedMessage>(view: T) -> Stored<T> {
    Stored::from_message(view.into()).unwrap()
}
