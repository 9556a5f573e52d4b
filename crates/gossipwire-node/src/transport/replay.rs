//! Replay driver: one hex-encoded frame per input line, replies written as
//! hex lines.
//!
//! Blank lines and lines starting with `#` are skipped. Frames the codec or
//! a service rejects are logged and counted, and processing continues. An
//! unknown even message type ends the replay the way it would end a peer
//! connection.

use std::time::Instant;

use bytes::Bytes;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::Instrument;

use gossipwire_core::error::{ErrorCode, GossipWireError, Result};
use gossipwire_core::Message;

use crate::app_state::AppState;
use crate::dispatch::Dispatched;
use crate::session::PeerSession;
use crate::transport::codec;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub frames: u64,
    pub handled: u64,
    pub ignored: u64,
    pub rejected: u64,
    pub replies: u64,
    /// Set when the peer would have been disconnected.
    pub failed: bool,
}

/// Replay `input` as frames from `peer_id`; returns the stats and `output`
/// once every reply has been written.
pub async fn run<R, W>(state: &AppState, peer_id: &str, input: R, output: W) -> Result<(ReplayStats, W)>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let span = tracing::info_span!("replay", peer = peer_id);
    replay(state, peer_id, input, output).instrument(span).await
}

async fn replay<R, W>(state: &AppState, peer_id: &str, input: R, output: W) -> Result<(ReplayStats, W)>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (peer, rx) = state.open_peer(peer_id);
    let writer = tokio::spawn(write_replies(rx, output));

    let mut stats = ReplayStats::default();
    let outcome = read_frames(state, &peer, input, &mut stats).await;

    // Dropping the last sender lets the writer drain and finish.
    state.close_peer(peer_id);
    drop(peer);
    let (replies, output) = writer
        .await
        .map_err(|e| GossipWireError::Internal(format!("writer task: {e}")))??;
    stats.replies = replies;
    outcome?;

    tracing::info!(?stats, "replay finished");
    Ok((stats, output))
}

async fn read_frames<R>(
    state: &AppState,
    peer: &PeerSession,
    input: R,
    stats: &mut ReplayStats,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let dispatcher = state.dispatcher();
    let metrics = state.metrics();
    let mut lines = input.lines();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| GossipWireError::Internal(format!("read input: {e}")))?
    {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        stats.frames += 1;

        let inbound = match hex::decode(line)
            .map_err(|e| GossipWireError::Malformed(format!("bad hex frame: {e}")))
            .and_then(|raw| codec::decode(Bytes::from(raw), state.limits()))
        {
            Ok(i) => i,
            Err(e) => {
                if e.is_internal() {
                    return Err(e);
                }
                metrics.decode_errors.inc(&[("code", e.code().as_str())]);
                tracing::warn!(frame = stats.frames, error = %e, "frame rejected");
                stats.rejected += 1;
                continue;
            }
        };

        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string(&inbound.message).unwrap_or_default();
            tracing::trace!(frame = stats.frames, message = %json, "decoded");
        }

        let name = inbound.message.type_name();
        metrics.messages_in.inc(&[("type", name)]);
        metrics.inbound_bytes.add(&[("type", name)], inbound.bytes_len as u64);

        let started = Instant::now();
        let res = dispatcher.dispatch(peer.clone(), inbound.message).await;
        metrics
            .dispatch_duration
            .observe(&[("type", name)], started.elapsed());

        match res {
            Ok(Dispatched::Handled) => stats.handled += 1,
            Ok(Dispatched::Ignored) => {
                metrics.ignored.inc(&[("type", name)]);
                stats.ignored += 1;
            }
            Err(e) if e.code() == ErrorCode::UnknownDiscriminator => {
                metrics.service_errors.inc(&[("code", e.code().as_str())]);
                tracing::warn!(error = %e, "unknown even message, dropping peer");
                stats.rejected += 1;
                stats.failed = true;
                break;
            }
            Err(e) => {
                if e.is_internal() {
                    return Err(e);
                }
                metrics.service_errors.inc(&[("code", e.code().as_str())]);
                tracing::warn!(frame = stats.frames, error = %e, "service rejected message");
                stats.rejected += 1;
            }
        }
    }
    Ok(())
}

async fn write_replies<W>(mut rx: mpsc::Receiver<Message>, mut output: W) -> Result<(u64, W)>
where
    W: AsyncWrite + Unpin,
{
    let mut n = 0u64;
    while let Some(msg) = rx.recv().await {
        let mut line = hex::encode(codec::encode(&msg));
        line.push('\n');
        output
            .write_all(line.as_bytes())
            .await
            .map_err(|e| GossipWireError::Internal(format!("write reply: {e}")))?;
        n += 1;
    }
    output
        .flush()
        .await
        .map_err(|e| GossipWireError::Internal(format!("flush replies: {e}")))?;
    Ok((n, output))
}
