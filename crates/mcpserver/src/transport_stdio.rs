//! Newline-delimited JSON-RPC over a reader/writer pair.
//!
//! Each inbound line is one JSON-RPC message; each response is written as a
//! single line. Notifications produce no output. The session ends cleanly
//! when the reader reaches EOF.

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::server::Server;
use crate::types::{new_error_response, JsonRpcRequest, McpError, ERR_CODE_PARSE};

/// Serve the process's stdin/stdout until stdin closes.
///
/// Anything the host writes to stdout other than protocol frames corrupts
/// the stream, so logging must be routed to stderr.
pub async fn serve_stdio(server: &Server) -> Result<(), McpError> {
    serve_io(server, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Serve an arbitrary async reader/writer pair.
pub async fn serve_io<R, W>(server: &Server, reader: R, mut writer: W) -> Result<(), McpError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut handled: u64 = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        // A frame that is not UTF-8 is a parse error for that frame only.
        let resp = match std::str::from_utf8(&buf) {
            Ok(text) => {
                let line = text.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<JsonRpcRequest>(line) {
                    Ok(req) => server.handle(req).await,
                    Err(e) => {
                        tracing::warn!(error = %e, "unparsable stdio frame");
                        new_error_response(Some(Value::Null), ERR_CODE_PARSE, format!("Parse error: {}", e))
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "stdio frame is not valid UTF-8");
                new_error_response(Some(Value::Null), ERR_CODE_PARSE, format!("Parse error: {}", e))
            }
        };
        handled += 1;

        if resp.is_notification() {
            continue;
        }

        let mut frame = serde_json::to_vec(&resp)?;
        frame.push(b'\n');
        writer.write_all(&frame).await?;
        writer.flush().await?;
    }

    tracing::info!(messages = handled, "stdio input closed");
    Ok(())
}
