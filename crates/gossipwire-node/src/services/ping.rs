use async_trait::async_trait;

use gossipwire_core::error::Result;
use gossipwire_core::protocol::typed::{Ping, Pong};
use gossipwire_core::{Message, Variant};

use crate::config::GossipSection;
use crate::dispatch::MessageService;
use crate::session::PeerSession;

/// Answers pings and counts pongs.
pub struct PingService {
    answer: bool,
    max_pong_bytes: u16,
}

impl PingService {
    pub fn new(answer: bool, max_pong_bytes: u16) -> Self {
        Self {
            answer,
            max_pong_bytes,
        }
    }

    pub fn from_config(gossip: &GossipSection) -> Self {
        Self::new(gossip.answer_pings, gossip.max_pong_bytes)
    }
}

#[async_trait]
impl MessageService for PingService {
    fn name(&self) -> &'static str {
        "ping"
    }

    fn variants(&self) -> &'static [Variant] {
        &[Variant::Ping, Variant::Pong]
    }

    async fn handle(&self, peer: PeerSession, msg: Message) -> Result<()> {
        if msg.variant() == Some(Variant::Pong) {
            let pong = msg.to_typed::<Pong>()?;
            let n = peer.record_pong();
            tracing::debug!(peer = peer.peer_id(), bytes = pong.num_bytes(), total = n, "pong");
            return Ok(());
        }

        let ping = msg.to_typed::<Ping>()?;
        if !self.answer || ping.num_pong_bytes > self.max_pong_bytes {
            tracing::debug!(
                peer = peer.peer_id(),
                num_pong_bytes = ping.num_pong_bytes,
                "ping left unanswered"
            );
            return Ok(());
        }
        peer.send(Pong::create_from_ping(&ping)).await
    }
}
