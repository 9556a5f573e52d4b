use serde::Deserialize;

use gossipwire_core::error::{GossipWireError, Result};
use gossipwire_core::protocol::types::ChainHash;

/// BOLT #1: pings asking for 65532 bytes or more get no pong.
pub const MAX_PONG_BYTES: u16 = 65_531;

/// Largest id list one reply_channel_range can carry uncompressed.
pub const MAX_REPLY_IDS: usize = 8_000;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    pub version: u32,

    #[serde(default)]
    pub node: NodeSection,

    #[serde(default)]
    pub gossip: GossipSection,
}

impl NodeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(GossipWireError::UnsupportedVersion);
        }

        self.node.validate()?;
        self.gossip.validate()?;

        Ok(())
    }
}

/// What to do with frames whose type id is not catalogued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownMessages {
    /// Decode as a generic message (discriminator + remainder).
    Preserve,
    /// Refuse at decode time.
    Reject,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSection {
    /// Hex chain hash this node gossips about.
    #[serde(default = "default_chain")]
    pub chain: String,

    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,

    #[serde(default = "default_unknown_messages")]
    pub unknown_messages: UnknownMessages,
}

impl Default for NodeSection {
    fn default() -> Self {
        Self {
            chain: default_chain(),
            max_message_bytes: default_max_message_bytes(),
            unknown_messages: default_unknown_messages(),
        }
    }
}

impl NodeSection {
    pub fn validate(&self) -> Result<()> {
        self.chain_hash()?;
        if !(2..=65_535).contains(&self.max_message_bytes) {
            return Err(GossipWireError::Config(
                "node.max_message_bytes must be between 2 and 65535".into(),
            ));
        }
        Ok(())
    }

    pub fn chain_hash(&self) -> Result<ChainHash> {
        self.chain
            .parse()
            .map_err(|e| GossipWireError::Config(format!("node.chain: {e}")))
    }
}

fn default_chain() -> String {
    ChainHash::BITCOIN.to_string()
}
fn default_max_message_bytes() -> usize {
    65_535
}
fn default_unknown_messages() -> UnknownMessages {
    UnknownMessages::Preserve
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GossipSection {
    #[serde(default = "default_answer_pings")]
    pub answer_pings: bool,

    #[serde(default = "default_max_pong_bytes")]
    pub max_pong_bytes: u16,

    /// Short channel ids per reply_channel_range.
    #[serde(default = "default_max_reply_ids")]
    pub max_reply_ids: usize,
}

impl Default for GossipSection {
    fn default() -> Self {
        Self {
            answer_pings: default_answer_pings(),
            max_pong_bytes: default_max_pong_bytes(),
            max_reply_ids: default_max_reply_ids(),
        }
    }
}

impl GossipSection {
    pub fn validate(&self) -> Result<()> {
        if self.max_pong_bytes > MAX_PONG_BYTES {
            return Err(GossipWireError::Config(format!(
                "gossip.max_pong_bytes must be at most {MAX_PONG_BYTES}"
            )));
        }
        if !(1..=MAX_REPLY_IDS).contains(&self.max_reply_ids) {
            return Err(GossipWireError::Config(format!(
                "gossip.max_reply_ids must be between 1 and {MAX_REPLY_IDS}"
            )));
        }
        Ok(())
    }
}

fn default_answer_pings() -> bool {
    true
}
fn default_max_pong_bytes() -> u16 {
    MAX_PONG_BYTES
}
fn default_max_reply_ids() -> usize {
    MAX_REPLY_IDS
}
