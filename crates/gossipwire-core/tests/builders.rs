//! Typed messages and explicit constructors.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use bytes::Bytes;

use gossipwire_core::protocol::typed::{
    ChannelAnnouncement, ChannelUpdate, GossipTimestampFilter, Init, NodeAnnouncement, Ping,
    Pong, QueryChannelRange, QueryShortChannelIds, ReplyChannelRange, ReplyShortChannelIds,
    TypedMessage, PONG_FILLER,
};
use gossipwire_core::protocol::types::{ChainHash, ShortChannelId, VarBytes};
use gossipwire_core::{decode, GossipWireError, Message, Variant};

use vector_loader::load;

#[test]
fn query_channel_range_wire_bytes() {
    let q = QueryChannelRange::create(ChainHash([0; 32]), 500_000, 1000);
    let bytes = Message::from(q).encode();

    let mut expected = vec![0x01, 0x07];
    expected.extend_from_slice(&[0u8; 32]);
    expected.extend_from_slice(&[0x00, 0x07, 0xa1, 0x20]);
    expected.extend_from_slice(&[0x00, 0x00, 0x03, 0xe8]);
    assert_eq!(bytes.as_ref(), expected.as_slice());
}

#[test]
fn pong_from_ping_has_requested_length() {
    for n in [1u16, 4, 1000] {
        let ping = Ping::create(n, vec![0u8; 3]).unwrap();
        let pong = Pong::create_from_ping(&ping);
        assert_eq!(pong.num_bytes(), usize::from(n));
        assert!(pong.pong_bytes.as_bytes().iter().all(|b| *b == PONG_FILLER));

        let msg = Message::from(pong);
        assert_eq!(msg.type_id(), 19);
        assert_eq!(msg.type_name(), "pong");
        assert_eq!(msg.encoded_len(), 2 + 2 + usize::from(n));
    }
}

#[test]
fn pong_from_zero_ping_is_empty() {
    let ping = Ping::create(0, Bytes::from_static(b"hello")).unwrap();
    let pong = Pong::create_from_ping(&ping);
    assert!(pong.pong_bytes.is_empty());
    assert_eq!(Message::from(pong).encode().as_ref(), &[0x00, 0x13, 0x00, 0x00]);
}

#[test]
fn ping_length_is_independent_of_payload() {
    let ping = Ping::create(65_531, Bytes::new()).unwrap();
    let bytes = Message::from(ping).encode();
    assert_eq!(bytes.as_ref(), &[0x00, 0x12, 0xff, 0xfb, 0x00, 0x00]);
}

#[test]
fn oversized_ping_payload_is_rejected() {
    let err = Ping::create(0, vec![0u8; 70_000]).unwrap_err();
    assert_eq!(err.code().as_str(), "MALFORMED");
}

#[test]
fn typed_views_roundtrip_every_vector() {
    let cases: [(&str, Variant); 11] = [
        ("init.json", Variant::Init),
        ("ping.json", Variant::Ping),
        ("pong.json", Variant::Pong),
        ("channel_announcement.json", Variant::ChannelAnnouncement),
        ("node_announcement.json", Variant::NodeAnnouncement),
        ("channel_update.json", Variant::ChannelUpdate),
        ("query_short_channel_ids.json", Variant::QueryShortChannelIds),
        ("reply_short_channel_ids.json", Variant::ReplyShortChannelIds),
        ("query_channel_range.json", Variant::QueryChannelRange),
        ("reply_channel_range.json", Variant::ReplyChannelRange),
        ("gossip_timestamp_filter.json", Variant::GossipTimestampFilter),
    ];

    for (file, variant) in cases {
        let raw = load(file).frame.decode();
        let msg = decode(Bytes::from(raw.clone())).unwrap();
        assert_eq!(msg.variant(), Some(variant), "vector={file}");

        let rebuilt: Message = match variant {
            Variant::Init => msg.to_typed::<Init>().unwrap().into(),
            Variant::Ping => msg.to_typed::<Ping>().unwrap().into(),
            Variant::Pong => msg.to_typed::<Pong>().unwrap().into(),
            Variant::ChannelAnnouncement => msg.to_typed::<ChannelAnnouncement>().unwrap().into(),
            Variant::NodeAnnouncement => msg.to_typed::<NodeAnnouncement>().unwrap().into(),
            Variant::ChannelUpdate => msg.to_typed::<ChannelUpdate>().unwrap().into(),
            Variant::QueryShortChannelIds => {
                msg.to_typed::<QueryShortChannelIds>().unwrap().into()
            }
            Variant::ReplyShortChannelIds => {
                msg.to_typed::<ReplyShortChannelIds>().unwrap().into()
            }
            Variant::QueryChannelRange => msg.to_typed::<QueryChannelRange>().unwrap().into(),
            Variant::ReplyChannelRange => msg.to_typed::<ReplyChannelRange>().unwrap().into(),
            Variant::GossipTimestampFilter => {
                msg.to_typed::<GossipTimestampFilter>().unwrap().into()
            }
        };
        assert_eq!(rebuilt, msg, "vector={file}");
        assert_eq!(rebuilt.encode().as_ref(), raw.as_slice(), "vector={file}");
    }
}

#[test]
fn typed_fields_read_back() {
    let msg = decode(Bytes::from(load("channel_update.json").frame.decode())).unwrap();
    let cu = ChannelUpdate::try_from(&msg).unwrap();
    assert_eq!(cu.chain_hash, ChainHash::BITCOIN);
    assert_eq!(cu.short_channel_id, "539268x845x1".parse::<ShortChannelId>().unwrap());
    assert_eq!(cu.cltv_expiry_delta, 144);
    assert_eq!(cu.htlc_maximum_msat, 990_000_000);
    assert_eq!(cu.direction(), 0);

    let msg = decode(Bytes::from(load("node_announcement.json").frame.decode())).unwrap();
    let na = NodeAnnouncement::try_from(&msg).unwrap();
    assert_eq!(na.alias.to_string_lossy(), "gossipwire");
    assert_eq!(na.addresses().unwrap().len(), 1);
}

#[test]
fn typed_view_of_wrong_variant_fails() {
    let msg = Message::from(Pong::create_from_ping(&Ping::create(2, Bytes::new()).unwrap()));
    let err = msg.to_typed::<Ping>().unwrap_err();
    assert_eq!(
        err,
        GossipWireError::WrongVariant {
            expected: "ping",
            found: "pong"
        }
    );
    assert_eq!(Ping::VARIANT, Variant::Ping);
}

#[test]
fn scid_builders_expand_back() {
    let ids = vec![
        ShortChannelId::new(600_000, 1, 0).unwrap(),
        ShortChannelId::new(600_001, 7, 1).unwrap(),
    ];
    let q = QueryShortChannelIds::create(ChainHash::BITCOIN, &ids).unwrap();
    let msg = Message::from(q);
    let back = QueryShortChannelIds::try_from(&decode(msg.encode()).unwrap()).unwrap();
    assert_eq!(back.encoded_short_channel_ids.short_channel_ids().unwrap(), ids);

    let r = ReplyChannelRange::create(ChainHash::BITCOIN, 600_000, 10, true, &ids).unwrap();
    let msg = Message::from(r.clone());
    assert_eq!(decode(msg.encode()).unwrap().to_typed::<ReplyChannelRange>().unwrap(), r);

    let end = ReplyShortChannelIds::create(ChainHash::REGTEST, true);
    assert_eq!(end.full_information, 1);
}

#[test]
fn init_builder_encodes_features() {
    let init = Init::create(VarBytes::empty(), VarBytes::new(vec![0x08u8, 0x00]).unwrap());
    assert!(init.local_features.has_feature_bit(11));
    assert_eq!(
        Message::from(init).encode().as_ref(),
        &[0x00, 0x10, 0x00, 0x00, 0x00, 0x02, 0x08, 0x00]
    );
}
