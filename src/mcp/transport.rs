//! Pipe transport: one session over a duplex byte stream.
//!
//! [`serve_stdio`] wires a session to stdin/stdout for clients that spawn
//! the server as a subprocess. [`serve_pipe`] is the same loop over any
//! reader/writer pair.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, Instrument};

use super::codec::FrameCodec;
use super::handler::AppState;
use crate::Result;

/// Serve one session over stdio until stdin reaches end-of-stream or the
/// cancellation token fires.
///
/// # Errors
///
/// Returns `AppError::Io` or `AppError::Transport` on an unrecoverable
/// stream fault.
pub async fn serve_stdio(state: Arc<AppState>, ct: CancellationToken) -> Result<()> {
    info!("starting stdio MCP transport");
    serve_pipe(state, tokio::io::stdin(), tokio::io::stdout(), ct).await?;
    info!("stdio MCP transport shut down");
    Ok(())
}

/// Serve one session over `reader`/`writer`, one newline-delimited frame at
/// a time.
///
/// # Errors
///
/// Returns `AppError::Io` or `AppError::Transport` on an unrecoverable
/// stream fault.
pub async fn serve_pipe<R, W>(
    state: Arc<AppState>,
    reader: R,
    writer: W,
    ct: CancellationToken,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut session = state.new_session();
    let span = info_span!("session", session_id = %session.id(), transport = "stdio");

    let inbound = FramedRead::new(reader, FrameCodec::new())
        .map(|item| item.and_then(std::convert::identity));
    let outbound = FramedWrite::new(writer, FrameCodec::new());

    session.run(inbound, outbound, ct).instrument(span).await
}
