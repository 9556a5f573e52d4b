//! Shared node state: config, store, dispatcher with built-in services.

use std::sync::Arc;

use tokio::sync::mpsc;

use gossipwire_core::error::Result;
use gossipwire_core::protocol::types::ChainHash;
use gossipwire_core::{Message, Variant};

use crate::config::NodeConfig;
use crate::dispatch::Dispatcher;
use crate::obs::NodeMetrics;
use crate::services::{GossipService, InitService, PingService};
use crate::session::{GossipStore, PeerRegistry, PeerSession};
use crate::transport::codec::DecodeLimits;

/// Outbound queue depth of each peer session.
pub const PEER_QUEUE_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct AppState {
    cfg: Arc<NodeConfig>,
    chain: ChainHash,
    limits: DecodeLimits,
    store: Arc<GossipStore>,
    peers: Arc<PeerRegistry>,
    dispatcher: Arc<Dispatcher>,
    metrics: Arc<NodeMetrics>,
}

impl AppState {
    pub fn new(cfg: NodeConfig) -> Result<Self> {
        cfg.validate()?;
        let chain = cfg.node.chain_hash()?;

        let peers = Arc::new(PeerRegistry::new());
        let dispatcher = Dispatcher::new();
        dispatcher.register(Arc::new(InitService::new()));
        dispatcher.register(Arc::new(PingService::from_config(&cfg.gossip)));
        dispatcher.register(Arc::new(GossipService::new(
            chain,
            cfg.gossip.max_reply_ids,
            Arc::clone(&peers),
        )));

        let registered = dispatcher.registered();
        for v in Variant::ALL {
            if !registered.contains(&v) {
                tracing::warn!(variant = %v, "no service registered for variant");
            }
        }

        Ok(Self {
            limits: DecodeLimits::from_config(&cfg.node),
            cfg: Arc::new(cfg),
            chain,
            store: Arc::new(GossipStore::new()),
            peers,
            dispatcher: Arc::new(dispatcher),
            metrics: Arc::new(NodeMetrics::default()),
        })
    }

    pub fn cfg(&self) -> &NodeConfig {
        &self.cfg
    }

    pub fn chain(&self) -> ChainHash {
        self.chain
    }

    pub fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    pub fn store(&self) -> Arc<GossipStore> {
        Arc::clone(&self.store)
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    pub fn metrics(&self) -> Arc<NodeMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn peers(&self) -> Arc<PeerRegistry> {
        Arc::clone(&self.peers)
    }

    /// Open and register a session sharing this node's store and metrics.
    /// A session already open under the same id is replaced.
    pub fn open_peer(&self, peer_id: impl Into<String>) -> (PeerSession, mpsc::Receiver<Message>) {
        let (peer, rx) = PeerSession::new(
            peer_id,
            self.store(),
            self.metrics(),
            PEER_QUEUE_CAPACITY,
        );
        if self.peers.insert(peer.clone()).is_some() {
            tracing::warn!(peer = peer.peer_id(), "replaced open session");
        }
        (peer, rx)
    }

    /// Unregister a session; its queue closes once the last handle drops.
    pub fn close_peer(&self, peer_id: &str) {
        self.peers.remove(peer_id);
    }
}
