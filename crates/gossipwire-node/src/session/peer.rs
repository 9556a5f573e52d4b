//! One remote peer: outbound queue plus what it told us about itself.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};

use gossipwire_core::error::{GossipWireError, Result};
use gossipwire_core::protocol::typed::{GossipTimestampFilter, Init};
use gossipwire_core::Message;

use crate::obs::NodeMetrics;
use crate::session::GossipStore;

#[derive(Clone)]
pub struct PeerSession {
    inner: Arc<PeerInner>,
}

struct PeerInner {
    peer_id: String,
    outbound: mpsc::Sender<Message>,
    store: Arc<GossipStore>,
    metrics: Arc<NodeMetrics>,
    remote_init: RwLock<Option<Init>>,
    filter: RwLock<Option<GossipTimestampFilter>>,
    pongs_received: AtomicU64,
}

impl PeerSession {
    /// Create a session and the receiving end of its outbound queue.
    pub fn new(
        peer_id: impl Into<String>,
        store: Arc<GossipStore>,
        metrics: Arc<NodeMetrics>,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let inner = PeerInner {
            peer_id: peer_id.into(),
            outbound: tx,
            store,
            metrics,
            remote_init: RwLock::new(None),
            filter: RwLock::new(None),
            pongs_received: AtomicU64::new(0),
        };
        (Self { inner: Arc::new(inner) }, rx)
    }

    pub fn peer_id(&self) -> &str {
        &self.inner.peer_id
    }

    pub fn store(&self) -> &GossipStore {
        &self.inner.store
    }

    /// Queue a message for the peer. Waits while the queue is full.
    pub async fn send(&self, msg: impl Into<Message>) -> Result<()> {
        let msg: Message = msg.into();
        let name = msg.type_name();
        self.inner
            .outbound
            .send(msg)
            .await
            .map_err(|_| {
                GossipWireError::Internal(format!("outbound queue closed: {}", self.inner.peer_id))
            })?;
        self.inner.metrics.messages_out.inc(&[("type", name)]);
        Ok(())
    }

    /// Queue without waiting; a full queue drops the message.
    pub fn try_send(&self, msg: impl Into<Message>) -> Result<()> {
        let msg: Message = msg.into();
        let name = msg.type_name();
        match self.inner.outbound.try_send(msg) {
            Ok(()) => {
                self.inner.metrics.messages_out.inc(&[("type", name)]);
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(GossipWireError::Internal(format!(
                "outbound queue full: {}",
                self.inner.peer_id
            ))),
            Err(TrySendError::Closed(_)) => Err(GossipWireError::Internal(format!(
                "outbound queue closed: {}",
                self.inner.peer_id
            ))),
        }
    }

    pub async fn set_remote_init(&self, init: Init) {
        *self.inner.remote_init.write().await = Some(init);
    }

    pub async fn remote_init(&self) -> Option<Init> {
        self.inner.remote_init.read().await.clone()
    }

    pub async fn set_timestamp_filter(&self, filter: GossipTimestampFilter) {
        *self.inner.filter.write().await = Some(filter);
    }

    pub async fn timestamp_filter(&self) -> Option<GossipTimestampFilter> {
        self.inner.filter.read().await.clone()
    }

    pub fn record_pong(&self) -> u64 {
        self.inner.pongs_received.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn pongs_received(&self) -> u64 {
        self.inner.pongs_received.load(Ordering::Relaxed)
    }
}
