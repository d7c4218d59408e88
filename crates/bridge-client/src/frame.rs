use bridge_core::ProtocolEvent;

/// Incremental frame decoder for the event stream.
///
/// The transport delivers raw bytes split at arbitrary boundaries,
/// including mid-character. Frames are blank-line-delimited blocks whose
/// `data:` line carries one JSON `{step, data}` object. Bytes are buffered
/// raw and decoded only once a complete frame is available, so a multibyte
/// character split across reads survives intact and the decoded sequence
/// is identical regardless of how the transport chunks the bytes.
#[derive(Default)]
pub struct FrameBuffer {
    buffer: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of raw bytes and drain every complete frame.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<ProtocolEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = find_delimiter(&self.buffer) {
            let block: Vec<u8> = self.buffer.drain(..pos + 2).collect();
            if let Some(event) = decode_frame(&String::from_utf8_lossy(&block[..pos])) {
                events.push(event);
            }
        }
        events
    }

    /// Flush the trailing fragment at end of stream. A non-empty remainder
    /// is decoded as a final frame.
    pub fn finish(&mut self) -> Option<ProtocolEvent> {
        let remaining = std::mem::take(&mut self.buffer);
        let remaining = String::from_utf8_lossy(&remaining);
        if remaining.trim().is_empty() {
            return None;
        }
        decode_frame(&remaining)
    }
}

fn find_delimiter(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

/// Decode one delimiter-terminated block into an event.
///
/// Locates the first `data:`-prefixed line and parses its remainder as
/// JSON. Blocks without one, or whose JSON fails to parse or carries an
/// unrecognized step, yield `None`: the protocol tolerates keepalive and
/// noise lines, so malformed frames are dropped silently rather than
/// failing the stream.
pub fn decode_frame(block: &str) -> Option<ProtocolEvent> {
    let payload = block.lines().find_map(|line| {
        line.strip_prefix("data:").map(str::trim_start)
    })?;
    serde_json::from_str::<ProtocolEvent>(payload).ok()
}
