//! stdio Transport
//!
//! One JSON-RPC message per line on the reader, one reply per line on the
//! writer. Requests run concurrently; a single writer task owns the output so
//! replies never interleave. Replies may arrive out of order and are matched
//! by id.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use super::{McpState, TransportError};
use crate::types::error::ErrorData;
use crate::types::jsonrpc::{JsonRpcMessage, JsonRpcReply, RequestId};
use crate::Handler;

const REPLY_BUFFER: usize = 64;

/// Serve MCP over the process's stdin and stdout until stdin closes.
pub async fn serve_stdio<H: Handler>(state: Arc<McpState<H>>) -> Result<(), TransportError> {
    serve(state, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Serve MCP over any reader/writer pair until the reader reaches EOF.
///
/// Returns once every in-flight request has been answered.
pub async fn serve<H, R, W>(
    state: Arc<McpState<H>>,
    reader: R,
    writer: W,
) -> Result<(), TransportError>
where
    H: Handler,
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<JsonRpcReply>(REPLY_BUFFER);
    let writer_task = tokio::spawn(write_replies(writer, rx));

    let mut lines = BufReader::new(reader).lines();
    let read_result = loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break Ok(()),
            Err(e) => break Err(TransportError::Read(e)),
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let message = match parse_line(line) {
            Ok(Some(message)) => message,
            Ok(None) => continue,
            Err(reply) => {
                if tx.send(reply).await.is_err() {
                    break Ok(());
                }
                continue;
            }
        };

        let state = Arc::clone(&state);
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Some(reply) = crate::protocol::respond(&state, &message).await {
                // The writer only goes away after a write failure, which it reports.
                let _ = tx.send(reply).await;
            }
        });
    };

    // The writer drains until the last in-flight request drops its sender.
    drop(tx);
    let write_result = match writer_task.await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "stdio writer task panicked");
            Ok(())
        }
    };

    read_result.and(write_result)
}

/// Parse one input line.
///
/// `Ok(None)` means the line was a JSON-RPC response from the client, which a
/// tools-only server has no use for. `Err` carries the error reply to send.
fn parse_line(line: &str) -> Result<Option<JsonRpcMessage>, JsonRpcReply> {
    let value: serde_json::Value = serde_json::from_str(line).map_err(|e| {
        tracing::warn!(error = %e, "Unparseable line on stdio");
        JsonRpcReply::error(None, ErrorData::parse_error(format!("Parse error: {}", e)))
    })?;

    if value.get("method").is_none() && (value.get("result").is_some() || value.get("error").is_some()) {
        tracing::debug!("Ignoring client response on stdio");
        return Ok(None);
    }

    let request_id = value
        .get("id")
        .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());

    serde_json::from_value(value).map(Some).map_err(|e| {
        JsonRpcReply::error(
            request_id,
            ErrorData::invalid_request(format!("Invalid JSON-RPC: {}", e)),
        )
    })
}

async fn write_replies<W>(mut writer: W, mut rx: mpsc::Receiver<JsonRpcReply>) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(reply) = rx.recv().await {
        let mut line = serde_json::to_vec(&reply)?;
        line.push(b'\n');
        writer.write_all(&line).await.map_err(TransportError::Write)?;
        writer.flush().await.map_err(TransportError::Write)?;
    }
    Ok(())
}
