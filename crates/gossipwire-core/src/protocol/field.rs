//! Field registry: every named field that can appear in a catalogued message.
//!
//! Names follow the BOLT #1 / #7 message definitions.

use std::fmt;

/// Identifier of a message field. Stable tag, not a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldId {
    /// Discriminator, always the first field.
    Type,
    GlobalFeatures,
    LocalFeatures,
    NumPongBytes,
    PingBytes,
    PongBytes,
    Signature,
    NodeSignature1,
    NodeSignature2,
    BitcoinSignature1,
    BitcoinSignature2,
    ChannelFeatures,
    Features,
    ChainHash,
    ShortChannelId,
    NodeId,
    NodeId1,
    NodeId2,
    BitcoinKey1,
    BitcoinKey2,
    RgbColor,
    Alias,
    Addresses,
    Timestamp,
    MessageFlags,
    ChannelFlags,
    CltvExpiryDelta,
    HtlcMinimumMsat,
    FeeBaseMsat,
    FeeProportionalMillionths,
    HtlcMaximumMsat,
    FirstTimestamp,
    TimestampRange,
    EncodedShortChannelIds,
    FullInformation,
    FirstBlockNum,
    NumberOfBlocks,
    SyncComplete,
    /// Synthetic field holding bytes past the end of the schema.
    Remainder,
}

impl FieldId {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldId::Type => "type",
            FieldId::GlobalFeatures => "global_features",
            FieldId::LocalFeatures => "local_features",
            FieldId::NumPongBytes => "num_pong_bytes",
            FieldId::PingBytes => "ping_bytes",
            FieldId::PongBytes => "pong_bytes",
            FieldId::Signature => "signature",
            FieldId::NodeSignature1 => "node_signature_1",
            FieldId::NodeSignature2 => "node_signature_2",
            FieldId::BitcoinSignature1 => "bitcoin_signature_1",
            FieldId::BitcoinSignature2 => "bitcoin_signature_2",
            FieldId::ChannelFeatures => "channel_features",
            FieldId::Features => "features",
            FieldId::ChainHash => "chain_hash",
            FieldId::ShortChannelId => "short_channel_id",
            FieldId::NodeId => "node_id",
            FieldId::NodeId1 => "node_id_1",
            FieldId::NodeId2 => "node_id_2",
            FieldId::BitcoinKey1 => "bitcoin_key_1",
            FieldId::BitcoinKey2 => "bitcoin_key_2",
            FieldId::RgbColor => "rgb_color",
            FieldId::Alias => "alias",
            FieldId::Addresses => "addresses",
            FieldId::Timestamp => "timestamp",
            FieldId::MessageFlags => "message_flags",
            FieldId::ChannelFlags => "channel_flags",
            FieldId::CltvExpiryDelta => "cltv_expiry_delta",
            FieldId::HtlcMinimumMsat => "htlc_minimum_msat",
            FieldId::FeeBaseMsat => "fee_base_msat",
            FieldId::FeeProportionalMillionths => "fee_proportional_millionths",
            FieldId::HtlcMaximumMsat => "htlc_maximum_msat",
            FieldId::FirstTimestamp => "first_timestamp",
            FieldId::TimestampRange => "timestamp_range",
            FieldId::EncodedShortChannelIds => "encoded_short_channel_ids",
            FieldId::FullInformation => "full_information",
            FieldId::FirstBlockNum => "first_block_num",
            FieldId::NumberOfBlocks => "number_of_blocks",
            FieldId::SyncComplete => "sync_complete",
            FieldId::Remainder => "remainder",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
