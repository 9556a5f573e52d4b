//! Variant schema tables.
//!
//! Every table is written out in full, discriminator first, in wire order.
//! There is no composition at runtime: reading a table is reading the wire
//! layout.

use crate::protocol::element::ElementKind;
use crate::protocol::field::FieldId;

/// One field of a variant: its name and its codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaEntry {
    pub field: FieldId,
    pub kind: ElementKind,
}

/// Ordered field list of one variant.
pub type VariantSchema = &'static [SchemaEntry];

const fn entry(field: FieldId, kind: ElementKind) -> SchemaEntry {
    SchemaEntry { field, kind }
}

/// Shared first entry of every schema.
pub const DISCRIMINATOR: SchemaEntry = entry(FieldId::Type, ElementKind::MessageType);

/// Schema used for messages whose type id is not catalogued.
pub const UNKNOWN: VariantSchema = &[DISCRIMINATOR];

pub const INIT: VariantSchema = &[
    DISCRIMINATOR,
    entry(FieldId::GlobalFeatures, ElementKind::VarBytes),
    entry(FieldId::LocalFeatures, ElementKind::VarBytes),
];

pub const PING: VariantSchema = &[
    DISCRIMINATOR,
    entry(FieldId::NumPongBytes, ElementKind::U16),
    entry(FieldId::PingBytes, ElementKind::VarBytes),
];

pub const PONG: VariantSchema = &[
    DISCRIMINATOR,
    entry(FieldId::PongBytes, ElementKind::VarBytes),
];

pub const CHANNEL_ANNOUNCEMENT: VariantSchema = &[
    DISCRIMINATOR,
    entry(FieldId::NodeSignature1, ElementKind::Signature),
    entry(FieldId::NodeSignature2, ElementKind::Signature),
    entry(FieldId::BitcoinSignature1, ElementKind::Signature),
    entry(FieldId::BitcoinSignature2, ElementKind::Signature),
    entry(FieldId::ChannelFeatures, ElementKind::VarBytes),
    entry(FieldId::ChainHash, ElementKind::ChainHash),
    entry(FieldId::ShortChannelId, ElementKind::ShortChannelId),
    entry(FieldId::NodeId1, ElementKind::Point),
    entry(FieldId::NodeId2, ElementKind::Point),
    entry(FieldId::BitcoinKey1, ElementKind::Point),
    entry(FieldId::BitcoinKey2, ElementKind::Point),
];

pub const NODE_ANNOUNCEMENT: VariantSchema = &[
    DISCRIMINATOR,
    entry(FieldId::Signature, ElementKind::Signature),
    entry(FieldId::Features, ElementKind::VarBytes),
    entry(FieldId::Timestamp, ElementKind::U32),
    entry(FieldId::NodeId, ElementKind::Point),
    entry(FieldId::RgbColor, ElementKind::RgbColor),
    entry(FieldId::Alias, ElementKind::Alias),
    entry(FieldId::Addresses, ElementKind::VarBytes),
];

pub const CHANNEL_UPDATE: VariantSchema = &[
    DISCRIMINATOR,
    entry(FieldId::Signature, ElementKind::Signature),
    entry(FieldId::ChainHash, ElementKind::ChainHash),
    entry(FieldId::ShortChannelId, ElementKind::ShortChannelId),
    entry(FieldId::Timestamp, ElementKind::U32),
    entry(FieldId::MessageFlags, ElementKind::U8),
    entry(FieldId::ChannelFlags, ElementKind::U8),
    entry(FieldId::CltvExpiryDelta, ElementKind::U16),
    entry(FieldId::HtlcMinimumMsat, ElementKind::U64),
    entry(FieldId::FeeBaseMsat, ElementKind::U32),
    entry(FieldId::FeeProportionalMillionths, ElementKind::U32),
    entry(FieldId::HtlcMaximumMsat, ElementKind::U64),
];

pub const QUERY_SHORT_CHANNEL_IDS: VariantSchema = &[
    DISCRIMINATOR,
    entry(FieldId::ChainHash, ElementKind::ChainHash),
    entry(FieldId::EncodedShortChannelIds, ElementKind::EncodedShortChannelIds),
];

pub const REPLY_SHORT_CHANNEL_IDS: VariantSchema = &[
    DISCRIMINATOR,
    entry(FieldId::ChainHash, ElementKind::ChainHash),
    entry(FieldId::FullInformation, ElementKind::U8),
];

pub const QUERY_CHANNEL_RANGE: VariantSchema = &[
    DISCRIMINATOR,
    entry(FieldId::ChainHash, ElementKind::ChainHash),
    entry(FieldId::FirstBlockNum, ElementKind::U32),
    entry(FieldId::NumberOfBlocks, ElementKind::U32),
];

pub const REPLY_CHANNEL_RANGE: VariantSchema = &[
    DISCRIMINATOR,
    entry(FieldId::ChainHash, ElementKind::ChainHash),
    entry(FieldId::FirstBlockNum, ElementKind::U32),
    entry(FieldId::NumberOfBlocks, ElementKind::U32),
    entry(FieldId::SyncComplete, ElementKind::U8),
    entry(FieldId::EncodedShortChannelIds, ElementKind::EncodedShortChannelIds),
];

pub const GOSSIP_TIMESTAMP_FILTER: VariantSchema = &[
    DISCRIMINATOR,
    entry(FieldId::ChainHash, ElementKind::ChainHash),
    entry(FieldId::FirstTimestamp, ElementKind::U32),
    entry(FieldId::TimestampRange, ElementKind::U32),
];
