#![allow(clippy::unwrap_used)]

use bytes::Bytes;

use gossipwire::node::{config, transport::replay};
use gossipwire::prelude::*;

#[tokio::test]
async fn facade_reaches_codec_and_node() {
    let q = QueryChannelRange::create(ChainHash::BITCOIN, 1, 2);
    let frame = Message::from(q.clone()).encode();
    let back = decode_with_schema(frame.clone(), Variant::QueryChannelRange).unwrap();
    assert_eq!(QueryChannelRange::from_message(&back).unwrap(), q);

    let st = AppState::new(config::load_from_str("version: 1\n").unwrap()).unwrap();
    let input = format!("{}\n", hex::encode(&frame));
    let (stats, out) = replay::run(&st, "facade", input.as_bytes(), Vec::new()).await.unwrap();
    assert_eq!(stats.replies, 1);

    let reply = hex::decode(String::from_utf8(out).unwrap().trim()).unwrap();
    let reply = decode_known(Bytes::from(reply)).unwrap();
    assert_eq!(reply.variant(), Some(Variant::ReplyChannelRange));
}
