//! Stdin/stdout JSON bridge for similarity lookups.
//!
//! Reads newline-delimited JSON [`SimilarityRequest`] messages from stdin
//! and answers each with one [`SimilarityResult`] JSON line on stdout, in
//! order. A line that is not a valid request is answered with
//! `{"error": "..."}` and the bridge keeps going.
//!
//! Stdout is exclusively reserved for the JSON protocol; all diagnostic
//! output (tracing, logs) must be routed to stderr.

use serde::Serialize;
use smlt_client::{EndpointResolver, SimilarityRequest, SimilarityService};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

use crate::error::{AppError, Result};

/// Response line for input that could not be parsed as a request.
#[derive(Debug, Serialize)]
struct ErrorLine {
    error: String,
}

/// Run the bridge on the process's stdin/stdout until stdin closes.
pub async fn run_stdio_bridge<R: EndpointResolver>(service: &SimilarityService<R>) -> Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = BufWriter::new(tokio::io::stdout());
    serve(service, reader, writer).await
}

/// Answer every request line from `reader` on `writer`.
///
/// Returns when `reader` reaches EOF. Requests are handled one at a time,
/// so responses are in request order.
///
/// # Errors
///
/// Returns [`AppError::Protocol`] if reading input or writing output fails.
pub async fn serve<R, I, O>(service: &SimilarityService<R>, mut reader: I, mut writer: O) -> Result<()>
where
    R: EndpointResolver,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| AppError::Protocol(format!("failed to read request: {e}")))?;

        // EOF
        if bytes_read == 0 {
            tracing::info!("input closed (EOF); shutting down stdio bridge");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let json = match serde_json::from_str::<SimilarityRequest>(trimmed) {
            Ok(request) => {
                let result = service.find_similar(&request).await;
                serde_json::to_string(&result)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse similarity request");
                serde_json::to_string(&ErrorLine {
                    error: format!("invalid request: {e}"),
                })
            }
        }
        .map_err(|e| AppError::Protocol(format!("failed to serialize response: {e}")))?;

        write_line(&mut writer, &json).await?;
    }

    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, json: &str) -> Result<()> {
    writer
        .write_all(json.as_bytes())
        .await
        .map_err(|e| AppError::Protocol(format!("failed to write response: {e}")))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| AppError::Protocol(format!("failed to write response: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| AppError::Protocol(format!("failed to flush response: {e}")))
}
