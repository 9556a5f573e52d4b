//! Per-peer session state, the peer registry and the shared gossip store.

pub mod peer;
pub mod registry;
pub mod store;

pub use peer::PeerSession;
pub use registry::PeerRegistry;
pub use store::{GossipStore, StoreOutcome, Stored};
