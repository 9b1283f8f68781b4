//! Streaming frame decoders (Bytes -> text frames)
//!
//! Decoders only deal with *framing*. Whether a frame is valid JSON, and what it
//! means, is decided later by the session state so that a bad frame can be dropped
//! with a diagnostic instead of tearing down the stream.

use crate::pipeline::{FrameDecoder, PipelineError, StreamFormat};
use crate::{BoxStream, PipeResult};
use bytes::{BufMut, Bytes, BytesMut};
use futures::{stream, StreamExt};

/// Minimal SSE decoder:
/// - frames are separated by a blank line
/// - `data:` lines are joined with `\n`
/// - comments (`:`) and `event:` / `id:` / `retry:` fields are skipped
/// - bare lines without a field name are taken as data
#[derive(Debug, Default, Clone, Copy)]
pub struct SseDecoder;

impl SseDecoder {
    pub fn new() -> Self {
        Self
    }

    pub(crate) fn parse_frame(frame: &str) -> Option<String> {
        let mut data: Vec<&str> = Vec::new();
        for line in frame.split('\n') {
            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            if let Some(rest) = line.strip_prefix("data:") {
                data.push(rest.strip_prefix(' ').unwrap_or(rest));
                continue;
            }
            if ["event:", "id:", "retry:"].iter().any(|f| line.starts_with(f)) {
                continue;
            }
            data.push(line);
        }

        let payload = data.join("\n");
        if payload.trim().is_empty() {
            None
        } else {
            Some(payload)
        }
    }
}

#[async_trait::async_trait]
impl FrameDecoder for SseDecoder {
    async fn decode_frames(
        &self,
        input: BoxStream<'static, Bytes>,
    ) -> PipeResult<BoxStream<'static, String>> {
        Ok(split_frames(
            input,
            b"\n\n",
            Tail::Discard,
            SseDecoder::parse_frame,
        ))
    }
}

/// NDJSON / JSONL decoder (one frame per line).
#[derive(Debug, Default, Clone, Copy)]
pub struct NdjsonDecoder;

#[async_trait::async_trait]
impl FrameDecoder for NdjsonDecoder {
    async fn decode_frames(
        &self,
        input: BoxStream<'static, Bytes>,
    ) -> PipeResult<BoxStream<'static, String>> {
        Ok(split_frames(input, b"\n", Tail::Flush, |line| {
            let line = line.trim();
            if line.is_empty() {
                None
            } else {
                Some(line.to_string())
            }
        }))
    }
}

/// What to do with bytes left over when the input ends without a final delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tail {
    /// Parse them as one last frame.
    Flush,
    /// Drop them; the frame was never terminated.
    Discard,
}

struct SplitState {
    input: BoxStream<'static, Bytes>,
    buf: BytesMut,
    /// Bytes before this offset are known not to start a delimiter.
    scanned: usize,
    finished: bool,
}

/// Incrementally buffer bytes and emit complete frames split by `delimiter`.
///
/// Bytes are kept raw until a whole frame is available so multi-byte characters split
/// across chunks decode correctly. Carriage returns are dropped on the way in, which
/// folds CRLF line endings into LF. Each search resumes where the previous one stopped,
/// so a large frame arriving in small chunks is scanned once. After a transport error
/// the stream ends.
fn split_frames(
    input: BoxStream<'static, Bytes>,
    delimiter: &'static [u8],
    tail: Tail,
    parse: fn(&str) -> Option<String>,
) -> BoxStream<'static, String> {
    let state = SplitState {
        input,
        buf: BytesMut::new(),
        scanned: 0,
        finished: false,
    };
    let stream = stream::unfold(state, move |mut st| async move {
        loop {
            if let Some(pos) = find(&st.buf[st.scanned..], delimiter) {
                let idx = st.scanned + pos;
                let frame = st.buf.split_to(idx + delimiter.len());
                st.scanned = 0;
                let text = String::from_utf8_lossy(&frame[..idx]);
                if let Some(payload) = parse(&text) {
                    return Some((Ok(payload), st));
                }
                continue;
            }
            st.scanned = st.buf.len().saturating_sub(delimiter.len() - 1);

            if st.finished {
                if st.buf.is_empty() {
                    return None;
                }
                let rest = st.buf.split();
                st.scanned = 0;
                if tail == Tail::Discard {
                    tracing::debug!(
                        bytes = rest.len(),
                        "dropping unterminated frame at end of stream"
                    );
                    return None;
                }
                let text = String::from_utf8_lossy(&rest);
                return parse(&text).map(|payload| (Ok(payload), st));
            }

            match st.input.next().await {
                Some(Ok(bytes)) => {
                    st.buf.reserve(bytes.len());
                    for b in bytes.iter().copied().filter(|b| *b != b'\r') {
                        st.buf.put_u8(b);
                    }
                }
                Some(Err(e)) => {
                    st.buf.clear();
                    st.scanned = 0;
                    st.finished = true;
                    return Some((Err(e), st));
                }
                None => st.finished = true,
            }
        }
    });

    Box::pin(stream)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

pub fn create_decoder(format: StreamFormat) -> Result<Box<dyn FrameDecoder>, PipelineError> {
    match format {
        StreamFormat::Sse => Ok(Box::new(SseDecoder::new())),
        StreamFormat::Ndjson => Ok(Box::new(NdjsonDecoder)),
    }
}
