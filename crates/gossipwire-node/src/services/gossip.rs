//! Gossip exchange: stores announcements and updates, answers range and id
//! queries, and honours the peer's timestamp filter.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use gossipwire_core::error::Result;
use gossipwire_core::protocol::typed::{
    ChannelAnnouncement, ChannelUpdate, GossipTimestampFilter, NodeAnnouncement,
    QueryChannelRange, QueryShortChannelIds, ReplyChannelRange, ReplyShortChannelIds,
};
use gossipwire_core::protocol::types::{ChainHash, Point, ShortChannelId};
use gossipwire_core::{Message, Variant};

use crate::dispatch::MessageService;
use crate::session::{PeerRegistry, PeerSession, StoreOutcome, Stored};

pub struct GossipService {
    chain: ChainHash,
    max_reply_ids: usize,
    peers: Arc<PeerRegistry>,
}

impl GossipService {
    pub fn new(chain: ChainHash, max_reply_ids: usize, peers: Arc<PeerRegistry>) -> Self {
        Self {
            chain,
            max_reply_ids: max_reply_ids.max(1),
            peers,
        }
    }

    /// Forward fresh gossip to every other peer whose timestamp filter
    /// matches. Peers without a filter get nothing.
    async fn relay(&self, from: &PeerSession, timestamp: u32, messages: &[Message]) {
        for peer in self.peers.others(from.peer_id()) {
            let Some(filter) = peer.timestamp_filter().await else { continue };
            if !filter.matches(timestamp) {
                continue;
            }
            for m in messages {
                if let Err(e) = peer.try_send(m.clone()) {
                    tracing::debug!(peer = peer.peer_id(), error = %e, "relay dropped");
                    break;
                }
            }
        }
    }

    async fn on_query_channel_range(&self, peer: &PeerSession, q: QueryChannelRange) -> Result<()> {
        if q.chain_hash != self.chain {
            let reply = ReplyChannelRange::create(
                q.chain_hash,
                q.first_block_num,
                q.number_of_blocks,
                false,
                &[],
            )?;
            return peer.send(reply).await;
        }

        let ids = peer.store().scids_in_blocks(q.first_block_num, q.end_block());
        let replies = channel_range_replies(&q, &ids, self.max_reply_ids)?;
        tracing::debug!(
            peer = peer.peer_id(),
            ids = ids.len(),
            replies = replies.len(),
            "answering query_channel_range"
        );
        for r in replies {
            peer.send(r).await?;
        }
        Ok(())
    }

    async fn on_query_short_channel_ids(
        &self,
        peer: &PeerSession,
        q: QueryShortChannelIds,
    ) -> Result<()> {
        if q.chain_hash != self.chain {
            return peer.send(ReplyShortChannelIds::create(q.chain_hash, false)).await;
        }

        let ids = q.encoded_short_channel_ids.short_channel_ids()?;
        let store = peer.store();
        let mut sent_nodes: HashSet<Point> = HashSet::new();
        for scid in ids {
            let Some(ann) = store.channel(scid) else { continue };
            for m in store.channel_messages(scid) {
                peer.send(m).await?;
            }
            for node_id in [ann.node_id_1, ann.node_id_2] {
                if !sent_nodes.insert(node_id) {
                    continue;
                }
                if let Some(node) = store.node_message(&node_id) {
                    peer.send(node).await?;
                }
            }
        }
        peer.send(ReplyShortChannelIds::create(self.chain, true)).await
    }

    async fn on_timestamp_filter(&self, peer: &PeerSession, f: GossipTimestampFilter) -> Result<()> {
        if f.chain_hash != self.chain {
            tracing::debug!(peer = peer.peer_id(), chain = %f.chain_hash, "filter for another chain");
            return Ok(());
        }
        let backlog = peer.store().gossip_matching(&f);
        peer.set_timestamp_filter(f).await;
        for m in backlog {
            peer.send(m).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl MessageService for GossipService {
    fn name(&self) -> &'static str {
        "gossip"
    }

    fn variants(&self) -> &'static [Variant] {
        &[
            Variant::ChannelAnnouncement,
            Variant::NodeAnnouncement,
            Variant::ChannelUpdate,
            Variant::QueryShortChannelIds,
            Variant::ReplyShortChannelIds,
            Variant::QueryChannelRange,
            Variant::ReplyChannelRange,
            Variant::GossipTimestampFilter,
        ]
    }

    async fn handle(&self, peer: PeerSession, msg: Message) -> Result<()> {
        match msg.variant() {
            Some(Variant::ChannelAnnouncement) => {
                let ann = Stored::<ChannelAnnouncement>::from_message(msg)?;
                if ann.view.chain_hash != self.chain {
                    return Ok(());
                }
                let scid = ann.view.short_channel_id;
                let outcome = peer.store().insert_channel(ann);
                tracing::debug!(%scid, ?outcome, "channel_announcement");
            }
            Some(Variant::ChannelUpdate) => {
                let upd = Stored::<ChannelUpdate>::from_message(msg)?;
                if upd.view.chain_hash != self.chain {
                    return Ok(());
                }
                let scid = upd.view.short_channel_id;
                let timestamp = upd.view.timestamp;
                let store = peer.store();
                let first_update = store.updates(scid).is_empty();
                let forward = upd.message.clone();
                match store.insert_update(upd) {
                    StoreOutcome::Accepted => {
                        // A channel is first relayed together with its first update.
                        let mut out = Vec::with_capacity(2);
                        if first_update {
                            out.extend(store.announcement_message(scid));
                        }
                        out.push(forward);
                        self.relay(&peer, timestamp, &out).await;
                    }
                    StoreOutcome::UnknownChannel => {
                        tracing::debug!(%scid, "update for unannounced channel");
                    }
                    StoreOutcome::Stale => {}
                }
            }
            Some(Variant::NodeAnnouncement) => {
                let node = Stored::<NodeAnnouncement>::from_message(msg)?;
                let addresses = node.view.addresses()?;
                tracing::debug!(
                    node_id = %node.view.node_id,
                    alias = %node.view.alias.to_string_lossy(),
                    addresses = addresses.len(),
                    "node_announcement"
                );
                let timestamp = node.view.timestamp;
                let forward = node.message.clone();
                if peer.store().insert_node(node) == StoreOutcome::Accepted {
                    self.relay(&peer, timestamp, &[forward]).await;
                }
            }
            Some(Variant::QueryChannelRange) => {
                self.on_query_channel_range(&peer, msg.to_typed()?).await?;
            }
            Some(Variant::QueryShortChannelIds) => {
                self.on_query_short_channel_ids(&peer, msg.to_typed()?).await?;
            }
            Some(Variant::GossipTimestampFilter) => {
                self.on_timestamp_filter(&peer, msg.to_typed()?).await?;
            }
            Some(Variant::ReplyChannelRange) => {
                let r = msg.to_typed::<ReplyChannelRange>()?;
                match r.encoded_short_channel_ids.short_channel_ids() {
                    Ok(ids) => tracing::debug!(
                        peer = peer.peer_id(),
                        first = r.first_block_num,
                        blocks = r.number_of_blocks,
                        ids = ids.len(),
                        "reply_channel_range"
                    ),
                    Err(e) => tracing::debug!(peer = peer.peer_id(), error = %e, "reply_channel_range ids not expanded"),
                }
            }
            Some(Variant::ReplyShortChannelIds) => {
                let end = msg.to_typed::<ReplyShortChannelIds>()?;
                tracing::debug!(peer = peer.peer_id(), full = end.full_information, "reply_short_channel_ids");
            }
            other => {
                tracing::debug!(?other, "not a gossip message");
            }
        }
        Ok(())
    }
}

/// Split the ids of a range query into `reply_channel_range` messages.
///
/// Replies cover the queried range back to back and every reply's block
/// range contains its own ids. A block's ids stay in one reply unless that
/// block alone holds more than `max_ids` ids; the replies sharing such a
/// block all include it in their range.
pub fn channel_range_replies(
    q: &QueryChannelRange,
    ids: &[ShortChannelId],
    max_ids: usize,
) -> Result<Vec<ReplyChannelRange>> {
    let max_ids = max_ids.max(1);
    let mut chunks: Vec<&[ShortChannelId]> = Vec::new();
    let mut start = 0;
    while start < ids.len() {
        let mut cut = (start + max_ids).min(ids.len());
        if cut < ids.len() {
            let mut c = cut;
            while c > start && ids[c].block_height() == ids[c - 1].block_height() {
                c -= 1;
            }
            if c > start {
                cut = c;
            }
        }
        chunks.push(&ids[start..cut]);
        start = cut;
    }

    if chunks.is_empty() {
        return Ok(vec![ReplyChannelRange::create(
            q.chain_hash,
            q.first_block_num,
            q.number_of_blocks,
            true,
            &[],
        )?]);
    }

    let q_end = q.end_block();
    let mut start = u64::from(q.first_block_num);
    let mut out = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let (end, next_start) = match (chunk.last(), chunks.get(i + 1).and_then(|n| n.first())) {
            (Some(last), Some(next)) if last.block_height() == next.block_height() => {
                // Split block: both replies cover it.
                let b = u64::from(last.block_height());
                (b + 1, b)
            }
            (_, Some(next)) => {
                let b = u64::from(next.block_height());
                (b, b)
            }
            (_, None) => (q_end, q_end),
        };
        let first = u32::try_from(start).unwrap_or(u32::MAX);
        let blocks = u32::try_from(end.saturating_sub(start).max(1)).unwrap_or(u32::MAX);
        out.push(ReplyChannelRange::create(q.chain_hash, first, blocks, true, chunk)?);
        start = next_start;
    }
    Ok(out)
}
