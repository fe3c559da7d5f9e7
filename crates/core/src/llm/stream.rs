//! Server-sent-event decoding for streamed chat completions.

use anyhow::Result;
use bytes::Bytes;
use futures_util::stream::{Stream, StreamExt};
use serde::Deserialize;

#[derive(Deserialize)]
struct ChunkEnvelope {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    delta: ChunkDelta,
}

#[derive(Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Turns an SSE body into a stream of content deltas.
pub fn content_deltas<S, E>(body: S) -> impl Stream<Item = Result<String>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    sse_lines(body).filter_map(|line| async move {
        match line {
            Ok(line) => parse_sse_line(&line),
            Err(e) => Some(Err(e)),
        }
    })
}

/// Returns:
/// - `Some(Ok(text))` for a content delta
/// - `Some(Err(_))` for a data line that is not a valid chunk
/// - `None` for blank lines, comments, `[DONE]` and role-only chunks
pub fn parse_sse_line(line: &str) -> Option<Result<String>> {
    let line = line.trim();
    let data = line.strip_prefix("data:")?.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<ChunkEnvelope>(data) {
        Ok(chunk) => {
            let content = chunk
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.delta.content)
                .unwrap_or_default();
            if content.is_empty() {
                None
            } else {
                Some(Ok(content))
            }
        }
        Err(e) => Some(Err(anyhow::anyhow!("failed to parse stream chunk: {e}"))),
    }
}

fn sse_lines<S, E>(body: S) -> impl Stream<Item = Result<String>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    // Bytes are buffered until a full line is available so multi-byte
    // characters split across network chunks decode correctly.
    futures_util::stream::unfold(
        (Box::pin(body), Vec::<u8>::new(), false),
        |(mut body, mut buf, mut finished)| async move {
            loop {
                if let Some(pos) = buf.iter().position(|b| *b == b'\n') {
                    let rest = buf.split_off(pos + 1);
                    let line = String::from_utf8_lossy(&buf).trim_end().to_string();
                    buf = rest;
                    if line.is_empty() {
                        continue;
                    }
                    return Some((Ok(line), (body, buf, finished)));
                }

                if finished {
                    if buf.iter().all(u8::is_ascii_whitespace) {
                        return None;
                    }
                    let line = String::from_utf8_lossy(&std::mem::take(&mut buf))
                        .trim_end()
                        .to_string();
                    return Some((Ok(line), (body, buf, finished)));
                }

                match body.next().await {
                    Some(Ok(bytes)) => buf.extend_from_slice(&bytes),
                    Some(Err(e)) => {
                        finished = true;
                        buf.clear();
                        return Some((
                            Err(anyhow::anyhow!("stream read error: {e}")),
                            (body, buf, finished),
                        ));
                    }
                    None => finished = true,
                }
            }
        },
    )
}
