//! Dispatcher and built-in services driven through a peer session.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use bytes::{BufMut, Bytes, BytesMut};
use tokio::sync::mpsc;

use gossipwire_core::protocol::typed::{
    GossipTimestampFilter, Init, Ping, Pong, QueryChannelRange, QueryShortChannelIds,
    ReplyChannelRange, ReplyShortChannelIds, PONG_FILLER,
};
use gossipwire_core::protocol::types::{ChainHash, VarBytes};
use gossipwire_core::{decode, Message, Variant};
use gossipwire_node::dispatch::Dispatched;
use gossipwire_node::session::StoreOutcome;

mod common;
use common::{channel, node, scid, state, state_with, stored, update};

fn drain(rx: &mut mpsc::Receiver<Message>) -> Vec<Message> {
    let mut out = Vec::new();
    while let Ok(m) = rx.try_recv() {
        out.push(m);
    }
    out
}

#[tokio::test]
async fn ping_is_answered_with_pong() {
    let st = state();
    let (peer, mut rx) = st.open_peer("p1");

    let ping = Ping::create(5, Bytes::from_static(b"abc")).unwrap();
    let res = st.dispatcher().dispatch(peer.clone(), ping.into()).await.unwrap();
    assert_eq!(res, Dispatched::Handled);

    let out = drain(&mut rx);
    assert_eq!(out.len(), 1);
    let pong = out[0].to_typed::<Pong>().unwrap();
    assert_eq!(pong.pong_bytes.as_bytes().as_ref(), &[PONG_FILLER; 5]);
    assert_eq!(st.metrics().messages_out.get(&[("type", "pong")]), 1);
}

#[tokio::test]
async fn oversized_or_disabled_pings_are_not_answered() {
    let st = state_with("version: 1\ngossip:\n  max_pong_bytes: 10\n");
    let (peer, mut rx) = st.open_peer("p1");
    let ping = Ping::create(11, Bytes::new()).unwrap();
    st.dispatcher().dispatch(peer, ping.into()).await.unwrap();
    assert!(drain(&mut rx).is_empty());

    let st = state_with("version: 1\ngossip:\n  answer_pings: false\n");
    let (peer, mut rx) = st.open_peer("p1");
    let ping = Ping::create(1, Bytes::new()).unwrap();
    st.dispatcher().dispatch(peer, ping.into()).await.unwrap();
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn pongs_and_init_are_recorded() {
    let st = state();
    let (peer, _rx) = st.open_peer("p1");
    let pong = Pong::create_from_ping(&Ping::create(3, Bytes::new()).unwrap());
    st.dispatcher().dispatch(peer.clone(), pong.into()).await.unwrap();
    assert_eq!(peer.pongs_received(), 1);

    let init = Init::create(VarBytes::empty(), VarBytes::new(vec![0x08u8, 0x00]).unwrap());
    st.dispatcher().dispatch(peer.clone(), init.clone().into()).await.unwrap();
    assert_eq!(peer.remote_init().await, Some(init));
}

#[tokio::test]
async fn unknown_types_follow_parity_rule() {
    let st = state();
    let (peer, _rx) = st.open_peer("p1");

    let odd = decode(Bytes::from_static(&[0x80, 0x01, 0xff])).unwrap();
    let res = st.dispatcher().dispatch(peer.clone(), odd).await.unwrap();
    assert_eq!(res, Dispatched::Ignored);

    let even = decode(Bytes::from_static(&[0x80, 0x02, 0xff])).unwrap();
    let err = st.dispatcher().dispatch(peer, even).await.unwrap_err();
    assert_eq!(err.code().as_str(), "UNKNOWN_DISCRIMINATOR");
}

#[tokio::test]
async fn every_variant_has_a_service() {
    let st = state();
    assert_eq!(st.dispatcher().registered(), Variant::ALL.to_vec());
}

#[tokio::test]
async fn store_keeps_newest_update_per_direction() {
    let st = state();
    let (peer, _rx) = st.open_peer("p1");
    let chain = ChainHash::BITCOIN;
    let id = scid(600_000, 1);
    let d = st.dispatcher();

    // Update before announcement is dropped.
    d.dispatch(peer.clone(), update(chain, id, 0, 10).into()).await.unwrap();
    assert!(st.store().updates(id).is_empty());

    d.dispatch(peer.clone(), channel(chain, id).into()).await.unwrap();
    d.dispatch(peer.clone(), update(chain, id, 0, 10).into()).await.unwrap();
    d.dispatch(peer.clone(), update(chain, id, 1, 20).into()).await.unwrap();
    d.dispatch(peer.clone(), update(chain, id, 0, 5).into()).await.unwrap();

    let ups = st.store().updates(id);
    assert_eq!(ups.len(), 2);
    assert_eq!((ups[0].direction(), ups[0].timestamp), (0, 10));
    assert_eq!((ups[1].direction(), ups[1].timestamp), (1, 20));

    assert_eq!(st.store().insert_update(stored(update(chain, id, 0, 11))), StoreOutcome::Accepted);
    assert_eq!(st.store().insert_channel(stored(channel(chain, id))), StoreOutcome::Stale);

    // Other chains are ignored.
    let other = scid(600_001, 1);
    d.dispatch(peer, channel(ChainHash::REGTEST, other).into()).await.unwrap();
    assert!(st.store().channel(other).is_none());
    assert_eq!(st.store().channel_count(), 1);
}

#[tokio::test]
async fn node_announcements_keep_newest() {
    let st = state();
    let (peer, _rx) = st.open_peer("p1");
    let d = st.dispatcher();
    d.dispatch(peer.clone(), node(1, 100).into()).await.unwrap();
    d.dispatch(peer.clone(), node(1, 50).into()).await.unwrap();
    assert_eq!(st.store().node_count(), 1);
    assert_eq!(st.store().node(&common::node_id(1)).unwrap().timestamp, 100);
}

#[tokio::test]
async fn query_channel_range_is_chunked() {
    let st = state_with("version: 1\ngossip:\n  max_reply_ids: 2\n");
    let chain = ChainHash::BITCOIN;
    for (b, t) in [(100, 0), (101, 0), (102, 0), (300, 0)] {
        st.store().insert_channel(stored(channel(chain, scid(b, t))));
    }

    let (peer, mut rx) = st.open_peer("p1");
    let q = QueryChannelRange::create(chain, 100, 100);
    st.dispatcher().dispatch(peer, q.into()).await.unwrap();

    let replies: Vec<ReplyChannelRange> = drain(&mut rx)
        .iter()
        .map(|m| m.to_typed().unwrap())
        .collect();
    assert_eq!(replies.len(), 2);
    assert_eq!((replies[0].first_block_num, replies[0].number_of_blocks), (100, 2));
    assert_eq!((replies[1].first_block_num, replies[1].number_of_blocks), (102, 98));
    let ids: Vec<_> = replies
        .iter()
        .flat_map(|r| r.encoded_short_channel_ids.short_channel_ids().unwrap())
        .collect();
    assert_eq!(ids, vec![scid(100, 0), scid(101, 0), scid(102, 0)]);
}

#[tokio::test]
async fn query_for_other_chain_gets_incomplete_reply() {
    let st = state();
    let (peer, mut rx) = st.open_peer("p1");
    let q = QueryChannelRange::create(ChainHash::REGTEST, 0, 10);
    st.dispatcher().dispatch(peer.clone(), q.into()).await.unwrap();
    let r = drain(&mut rx)[0].to_typed::<ReplyChannelRange>().unwrap();
    assert_eq!(r.sync_complete, 0);
    assert_eq!(r.chain_hash, ChainHash::REGTEST);

    let q = QueryShortChannelIds::create(ChainHash::REGTEST, &[scid(1, 1)]).unwrap();
    st.dispatcher().dispatch(peer, q.into()).await.unwrap();
    let end = drain(&mut rx)[0].to_typed::<ReplyShortChannelIds>().unwrap();
    assert_eq!(end.full_information, 0);
}

#[tokio::test]
async fn query_short_channel_ids_sends_gossip_then_end() {
    let st = state();
    let chain = ChainHash::BITCOIN;
    let id = scid(700_000, 3);
    st.store().insert_channel(stored(channel(chain, id)));
    st.store().insert_update(stored(update(chain, id, 1, 42)));
    st.store().insert_node(stored(node(1, 1)));

    let (peer, mut rx) = st.open_peer("p1");
    let q = QueryShortChannelIds::create(chain, &[id, scid(1, 1)]).unwrap();
    st.dispatcher().dispatch(peer, q.into()).await.unwrap();

    let names: Vec<&str> = drain(&mut rx).iter().map(|m| m.type_name()).collect();
    assert_eq!(
        names,
        vec![
            "channel_announcement",
            "channel_update",
            "node_announcement",
            "reply_short_channel_ids"
        ]
    );
}

#[tokio::test]
async fn zlib_query_is_a_service_error() {
    let st = state();
    let (peer, _rx) = st.open_peer("p1");
    // query_short_channel_ids with a zlib-encoded (1) id list.
    let mut raw = vec![0x01, 0x05];
    raw.extend_from_slice(ChainHash::BITCOIN.as_bytes());
    raw.extend_from_slice(&[0x00, 0x03, 0x01, 0x78, 0x9c]);
    let msg = decode(Bytes::from(raw)).unwrap();
    let err = st.dispatcher().dispatch(peer, msg).await.unwrap_err();
    assert_eq!(err.code().as_str(), "UNSUPPORTED_ENCODING");
}

#[tokio::test]
async fn timestamp_filter_replays_matching_gossip() {
    let st = state();
    let chain = ChainHash::BITCOIN;
    let old = scid(500_000, 1);
    let new = scid(500_001, 1);
    st.store().insert_channel(stored(channel(chain, old)));
    st.store().insert_channel(stored(channel(chain, new)));
    st.store().insert_update(stored(update(chain, old, 0, 100)));
    st.store().insert_update(stored(update(chain, new, 0, 1_000)));
    st.store().insert_node(stored(node(1, 1_500)));

    let (peer, mut rx) = st.open_peer("p1");
    let f = GossipTimestampFilter::create(chain, 900, 1_000);
    st.dispatcher().dispatch(peer.clone(), f.clone().into()).await.unwrap();
    assert_eq!(peer.timestamp_filter().await, Some(f));

    let out = drain(&mut rx);
    let names: Vec<&str> = out.iter().map(|m| m.type_name()).collect();
    assert_eq!(names, vec!["channel_announcement", "channel_update", "node_announcement"]);
    let ann: gossipwire_core::protocol::typed::ChannelAnnouncement = out[0].to_typed().unwrap();
    assert_eq!(ann.short_channel_id, new);
}

fn with_trailing(msg: Message, extra: &[u8]) -> Message {
    let mut raw = BytesMut::new();
    msg.encode_into(&mut raw);
    raw.put_slice(extra);
    decode(raw.freeze()).unwrap()
}

#[tokio::test]
async fn stored_gossip_is_sent_back_with_trailing_bytes() {
    let st = state();
    let chain = ChainHash::BITCOIN;
    let id = scid(710_000, 2);
    let ann = with_trailing(channel(chain, id).into(), &[0xca, 0xfe, 0x01]);
    let upd = with_trailing(update(chain, id, 0, 77).into(), &[0x00, 0x00, 0x2a]);
    assert!(ann.remainder().is_some() && upd.remainder().is_some());

    let (peer, mut rx) = st.open_peer("p1");
    let d = st.dispatcher();
    d.dispatch(peer.clone(), ann.clone()).await.unwrap();
    d.dispatch(peer.clone(), upd.clone()).await.unwrap();

    let q = QueryShortChannelIds::create(chain, &[id]).unwrap();
    d.dispatch(peer, q.into()).await.unwrap();

    let out = drain(&mut rx);
    assert_eq!(out.len(), 3);
    assert_eq!(out[0].encode(), ann.encode());
    assert_eq!(out[1].encode(), upd.encode());
    assert_eq!(out[2].type_name(), "reply_short_channel_ids");

    // Typed reads still see the schema fields.
    assert_eq!(st.store().updates(id)[0].timestamp, 77);
}

#[tokio::test]
async fn fresh_gossip_is_relayed_to_filtering_peers() {
    let st = state();
    let chain = ChainHash::BITCOIN;
    let id = scid(720_000, 5);

    let (a, mut rx_a) = st.open_peer("a");
    let (b, mut rx_b) = st.open_peer("b");
    let (_c, mut rx_c) = st.open_peer("c");
    assert_eq!(st.peers().len(), 3);

    let d = st.dispatcher();
    let f = GossipTimestampFilter::create(chain, 1_000, 1_000);
    d.dispatch(b.clone(), f.into()).await.unwrap();
    assert!(drain(&mut rx_b).is_empty());

    let upd = with_trailing(update(chain, id, 1, 1_500).into(), &[0xee]);
    d.dispatch(a.clone(), channel(chain, id).into()).await.unwrap();
    d.dispatch(a.clone(), upd.clone()).await.unwrap();
    // Outside b's window.
    d.dispatch(a.clone(), update(chain, id, 0, 5_000).into()).await.unwrap();
    // Stale updates are not relayed again.
    d.dispatch(a.clone(), upd.clone()).await.unwrap();
    d.dispatch(a.clone(), node(1, 1_200).into()).await.unwrap();

    let got = drain(&mut rx_b);
    let names: Vec<&str> = got.iter().map(|m| m.type_name()).collect();
    assert_eq!(names, vec!["channel_announcement", "channel_update", "node_announcement"]);
    assert_eq!(got[1].encode(), upd.encode());

    assert!(drain(&mut rx_a).is_empty());
    assert!(drain(&mut rx_c).is_empty());

    st.close_peer("b");
    assert_eq!(st.peers().len(), 2);
    d.dispatch(a, node(1, 1_300).into()).await.unwrap();
    assert!(drain(&mut rx_b).is_empty());
}
