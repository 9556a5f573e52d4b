//! Node config loader (strict parsing).

pub mod schema;

use std::fs;

use gossipwire_core::error::{GossipWireError, Result};

pub use schema::{GossipSection, NodeConfig, NodeSection, UnknownMessages};

pub fn load_from_file(path: &str) -> Result<NodeConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| GossipWireError::Config(format!("read {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<NodeConfig> {
    let cfg: NodeConfig = serde_yaml::from_str(s)
        .map_err(|e| GossipWireError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
