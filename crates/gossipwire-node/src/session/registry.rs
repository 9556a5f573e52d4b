//! Live peer sessions, used to relay fresh gossip.

use dashmap::DashMap;

use crate::session::PeerSession;

#[derive(Default)]
pub struct PeerRegistry {
    peers: DashMap<String, PeerSession>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session previously registered under the same id.
    pub fn insert(&self, peer: PeerSession) -> Option<PeerSession> {
        self.peers.insert(peer.peer_id().to_string(), peer)
    }

    pub fn remove(&self, peer_id: &str) -> Option<PeerSession> {
        self.peers.remove(peer_id).map(|(_, p)| p)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Every session except `peer_id`.
    pub fn others(&self, peer_id: &str) -> Vec<PeerSession> {
        self.peers
            .iter()
            .filter(|r| r.key() != peer_id)
            .map(|r| r.value().clone())
            .collect()
    }
}
