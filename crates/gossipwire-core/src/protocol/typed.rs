//! Typed views of catalogued messages.
//!
//! Each struct lists its fields in the same order as its schema table, so
//! conversion to and from [`Message`] is a straight in-order walk. Field
//! access on these structs is checked at compile time.
//!
//! Views hold schema fields only. Trailing bytes stay on the [`Message`];
//! anything that forwards a received message must keep the `Message`.

use std::net::{Ipv4Addr, Ipv6Addr};

use bytes::{Buf, Bytes};

use crate::error::{GossipWireError, Result};
use crate::protocol::element::FieldValue;
use crate::protocol::message::Message;
use crate::protocol::types::{
    Alias, ChainHash, EncodedShortChannelIds, Point, RgbColor, ShortChannelId, Signature,
    VarBytes,
};
use crate::protocol::variant::Variant;

/// A message type with a fixed catalogue entry.
pub trait TypedMessage: Sized + Into<Message> {
    const VARIANT: Variant;

    /// Read the fields of `msg`; fails with `WrongVariant` for other types.
    fn from_message(msg: &Message) -> Result<Self>;
}

impl Message {
    /// Convert to the typed view `T`.
    pub fn to_typed<T: TypedMessage>(&self) -> Result<T> {
        T::from_message(self)
    }
}

macro_rules! typed_message {
    (
        $(#[$meta:meta])*
        $name:ident => $variant:ident {
            $($(#[$fmeta:meta])* $field:ident: $ty:ty,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            $($(#[$fmeta])* pub $field: $ty,)*
        }

        impl TypedMessage for $name {
            const VARIANT: Variant = Variant::$variant;

            fn from_message(msg: &Message) -> Result<Self> {
                let mut r = msg.reader(Variant::$variant)?;
                Ok(Self {
                    $($field: r.next()?,)*
                })
            }
        }

        impl TryFrom<&Message> for $name {
            type Error = GossipWireError;

            fn try_from(msg: &Message) -> Result<Self> {
                Self::from_message(msg)
            }
        }

        impl From<$name> for Message {
            fn from(m: $name) -> Self {
                Message::assemble(Variant::$variant, vec![$(m.$field.into_value()),*])
            }
        }
    };
}

typed_message! {
    /// `init` (16): feature negotiation, first message on a connection.
    Init => Init {
        global_features: VarBytes,
        local_features: VarBytes,
    }
}

typed_message! {
    /// `ping` (18).
    Ping => Ping {
        /// How many bytes the pong payload must carry.
        num_pong_bytes: u16,
        ping_bytes: VarBytes,
    }
}

typed_message! {
    /// `pong` (19).
    Pong => Pong {
        pong_bytes: VarBytes,
    }
}

typed_message! {
    /// `channel_announcement` (256).
    ChannelAnnouncement => ChannelAnnouncement {
        node_signature_1: Signature,
        node_signature_2: Signature,
        bitcoin_signature_1: Signature,
        bitcoin_signature_2: Signature,
        channel_features: VarBytes,
        chain_hash: ChainHash,
        short_channel_id: ShortChannelId,
        node_id_1: Point,
        node_id_2: Point,
        bitcoin_key_1: Point,
        bitcoin_key_2: Point,
    }
}

typed_message! {
    /// `node_announcement` (257).
    NodeAnnouncement => NodeAnnouncement {
        signature: Signature,
        features: VarBytes,
        timestamp: u32,
        node_id: Point,
        rgb_color: RgbColor,
        alias: Alias,
        /// Raw address descriptors, see [`NodeAnnouncement::addresses`].
        addresses: VarBytes,
    }
}

typed_message! {
    /// `channel_update` (258).
    ChannelUpdate => ChannelUpdate {
        signature: Signature,
        chain_hash: ChainHash,
        short_channel_id: ShortChannelId,
        timestamp: u32,
        message_flags: u8,
        channel_flags: u8,
        cltv_expiry_delta: u16,
        htlc_minimum_msat: u64,
        fee_base_msat: u32,
        fee_proportional_millionths: u32,
        htlc_maximum_msat: u64,
    }
}

typed_message! {
    /// `query_short_channel_ids` (261).
    QueryShortChannelIds => QueryShortChannelIds {
        chain_hash: ChainHash,
        encoded_short_channel_ids: EncodedShortChannelIds,
    }
}

typed_message! {
    /// `reply_short_channel_ids` (262).
    ReplyShortChannelIds => ReplyShortChannelIds {
        chain_hash: ChainHash,
        full_information: u8,
    }
}

typed_message! {
    /// `query_channel_range` (263).
    QueryChannelRange => QueryChannelRange {
        chain_hash: ChainHash,
        first_block_num: u32,
        number_of_blocks: u32,
    }
}

typed_message! {
    /// `reply_channel_range` (264).
    ReplyChannelRange => ReplyChannelRange {
        chain_hash: ChainHash,
        first_block_num: u32,
        number_of_blocks: u32,
        sync_complete: u8,
        encoded_short_channel_ids: EncodedShortChannelIds,
    }
}

typed_message! {
    /// `gossip_timestamp_filter` (265).
    GossipTimestampFilter => GossipTimestampFilter {
        chain_hash: ChainHash,
        first_timestamp: u32,
        timestamp_range: u32,
    }
}

/// Filler byte of generated pong payloads (ASCII `'0'`).
pub const PONG_FILLER: u8 = b'0';

impl Init {
    pub fn create(global_features: VarBytes, local_features: VarBytes) -> Self {
        Self {
            global_features,
            local_features,
        }
    }
}

impl Ping {
    /// `num_pong_bytes` and the payload length are independent.
    pub fn create(num_pong_bytes: u16, payload: impl Into<Bytes>) -> Result<Self> {
        Ok(Self {
            num_pong_bytes,
            ping_bytes: VarBytes::new(payload)?,
        })
    }
}

impl Pong {
    /// Pong answering `ping`: exactly `num_pong_bytes` filler bytes.
    pub fn create_from_ping(ping: &Ping) -> Self {
        Self {
            pong_bytes: VarBytes::filled(PONG_FILLER, ping.num_pong_bytes),
        }
    }

    pub fn num_bytes(&self) -> usize {
        self.pong_bytes.len()
    }
}

impl ChannelUpdate {
    /// Which end of the channel sent the update (0 = node_id_1).
    pub fn direction(&self) -> u8 {
        self.channel_flags & 0x01
    }

    pub fn is_disabled(&self) -> bool {
        self.channel_flags & 0x02 != 0
    }
}

impl QueryShortChannelIds {
    pub fn create(chain_hash: ChainHash, ids: &[ShortChannelId]) -> Result<Self> {
        Ok(Self {
            chain_hash,
            encoded_short_channel_ids: EncodedShortChannelIds::uncompressed(ids)?,
        })
    }
}

impl ReplyShortChannelIds {
    pub fn create(chain_hash: ChainHash, full_information: bool) -> Self {
        Self {
            chain_hash,
            full_information: u8::from(full_information),
        }
    }
}

impl QueryChannelRange {
    pub fn create(chain_hash: ChainHash, first_block_num: u32, number_of_blocks: u32) -> Self {
        Self {
            chain_hash,
            first_block_num,
            number_of_blocks,
        }
    }

    /// First block past the queried range.
    pub fn end_block(&self) -> u64 {
        u64::from(self.first_block_num) + u64::from(self.number_of_blocks)
    }

    pub fn contains_block(&self, height: u32) -> bool {
        height >= self.first_block_num && u64::from(height) < self.end_block()
    }
}

impl ReplyChannelRange {
    pub fn create(
        chain_hash: ChainHash,
        first_block_num: u32,
        number_of_blocks: u32,
        sync_complete: bool,
        ids: &[ShortChannelId],
    ) -> Result<Self> {
        Ok(Self {
            chain_hash,
            first_block_num,
            number_of_blocks,
            sync_complete: u8::from(sync_complete),
            encoded_short_channel_ids: EncodedShortChannelIds::uncompressed(ids)?,
        })
    }
}

impl GossipTimestampFilter {
    pub fn create(chain_hash: ChainHash, first_timestamp: u32, timestamp_range: u32) -> Self {
        Self {
            chain_hash,
            first_timestamp,
            timestamp_range,
        }
    }

    /// `first_timestamp <= ts < first_timestamp + timestamp_range`.
    pub fn matches(&self, timestamp: u32) -> bool {
        let end = u64::from(self.first_timestamp) + u64::from(self.timestamp_range);
        timestamp >= self.first_timestamp && u64::from(timestamp) < end
    }
}

/// One address descriptor of a `node_announcement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetAddress {
    Ipv4 { addr: Ipv4Addr, port: u16 },
    Ipv6 { addr: Ipv6Addr, port: u16 },
    /// Deprecated onion v2 service (10-byte id).
    TorV2 { id: [u8; 10], port: u16 },
    /// Onion v3 service (35-byte id).
    TorV3 { id: [u8; 35], port: u16 },
    Dns { hostname: String, port: u16 },
}

impl NodeAnnouncement {
    /// Parse the address descriptors. Parsing stops at the first unknown
    /// descriptor type, whose length cannot be known.
    pub fn addresses(&self) -> Result<Vec<NetAddress>> {
        let mut buf = self.addresses.as_bytes().clone();
        let mut out = Vec::new();
        while buf.has_remaining() {
            let addr = match buf.get_u8() {
                1 => {
                    let [a, b, c, d] = take::<4>(&mut buf)?;
                    NetAddress::Ipv4 {
                        addr: Ipv4Addr::new(a, b, c, d),
                        port: take_port(&mut buf)?,
                    }
                }
                2 => NetAddress::Ipv6 {
                    addr: Ipv6Addr::from(take::<16>(&mut buf)?),
                    port: take_port(&mut buf)?,
                },
                3 => NetAddress::TorV2 {
                    id: take::<10>(&mut buf)?,
                    port: take_port(&mut buf)?,
                },
                4 => NetAddress::TorV3 {
                    id: take::<35>(&mut buf)?,
                    port: take_port(&mut buf)?,
                },
                5 => {
                    let [len] = take::<1>(&mut buf)?;
                    let len = usize::from(len);
                    if buf.remaining() < len {
                        return Err(bad_address("hostname", len, buf.remaining()));
                    }
                    let host = buf.copy_to_bytes(len);
                    NetAddress::Dns {
                        hostname: String::from_utf8_lossy(&host).into_owned(),
                        port: take_port(&mut buf)?,
                    }
                }
                other => {
                    tracing::debug!(descriptor = other, "unknown address descriptor");
                    break;
                }
            };
            out.push(addr);
        }
        Ok(out)
    }
}

fn bad_address(what: &str, needed: usize, available: usize) -> GossipWireError {
    GossipWireError::Malformed(format!(
        "node_announcement address {what}: need {needed} bytes, have {available}"
    ))
}

fn take<const N: usize>(buf: &mut Bytes) -> Result<[u8; N]> {
    if buf.remaining() < N {
        return Err(bad_address("descriptor", N, buf.remaining()));
    }
    let mut out = [0u8; N];
    buf.copy_to_slice(&mut out);
    Ok(out)
}

fn take_port(buf: &mut Bytes) -> Result<u16> {
    take::<2>(buf).map(u16::from_be_bytes)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn filter_window_is_half_open() {
        let f = GossipTimestampFilter::create(ChainHash::BITCOIN, 100, 10);
        assert!(f.matches(100));
        assert!(f.matches(109));
        assert!(!f.matches(110));
        assert!(!f.matches(99));

        let all = GossipTimestampFilter::create(ChainHash::BITCOIN, 0, u32::MAX);
        assert!(all.matches(u32::MAX - 1));
    }

    #[test]
    fn channel_range_bounds() {
        let q = QueryChannelRange::create(ChainHash::BITCOIN, u32::MAX - 1, 10);
        assert_eq!(q.end_block(), u64::from(u32::MAX) + 9);
        assert!(q.contains_block(u32::MAX));
        assert!(!q.contains_block(5));
    }

    #[test]
    fn node_addresses_parse() {
        let mut raw = vec![1u8, 127, 0, 0, 1, 0x26, 0x07];
        raw.extend_from_slice(&[5, 4]);
        raw.extend_from_slice(b"a.io");
        raw.extend_from_slice(&[0x23, 0x28]);
        raw.extend_from_slice(&[0x7f, 0xff]);
        let ann = NodeAnnouncement {
            signature: Signature([0; 64]),
            features: VarBytes::empty(),
            timestamp: 1,
            node_id: Point([2; 33]),
            rgb_color: RgbColor([1, 2, 3]),
            alias: Alias([0; 32]),
            addresses: VarBytes::new(raw).unwrap(),
        };
        assert_eq!(
            ann.addresses().unwrap(),
            vec![
                NetAddress::Ipv4 {
                    addr: Ipv4Addr::LOCALHOST,
                    port: 9735
                },
                NetAddress::Dns {
                    hostname: "a.io".into(),
                    port: 9000
                },
            ]
        );
    }

    #[test]
    fn truncated_address_is_malformed() {
        let ann = NodeAnnouncement {
            signature: Signature([0; 64]),
            features: VarBytes::empty(),
            timestamp: 1,
            node_id: Point([2; 33]),
            rgb_color: RgbColor([0; 3]),
            alias: Alias([0; 32]),
            addresses: VarBytes::new(vec![1u8, 10, 0]).unwrap(),
        };
        assert_eq!(ann.addresses().unwrap_err().code().as_str(), "MALFORMED");
    }

    #[test]
    fn update_flags() {
        let u = ChannelUpdate {
            signature: Signature([0; 64]),
            chain_hash: ChainHash::BITCOIN,
            short_channel_id: ShortChannelId(1),
            timestamp: 0,
            message_flags: 1,
            channel_flags: 0b11,
            cltv_expiry_delta: 144,
            htlc_minimum_msat: 1000,
            fee_base_msat: 1000,
            fee_proportional_millionths: 1,
            htlc_maximum_msat: 1_000_000,
        };
        assert_eq!(u.direction(), 1);
        assert!(u.is_disabled());
    }
}
