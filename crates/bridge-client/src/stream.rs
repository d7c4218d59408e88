use std::pin::Pin;
use std::time::Duration;

use futures::{Future, Stream};

use bridge_core::{ProtocolEvent, TransportError};

use crate::frame::FrameBuffer;

pub(crate) const STREAM_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Lazily-produced, ordered event sequence for one session.
///
/// Wraps the response byte stream and the incremental [`FrameBuffer`].
/// Production is single-threaded and cooperative: each `poll_next` either
/// drains an already-decoded event or suspends on the next network read.
/// An idle timeout guards against a silently stalled transport; it resets
/// whenever data arrives.
pub struct SessionStream {
    inner: Pin<Box<dyn Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send>>,
    frames: FrameBuffer,
    pending: Vec<ProtocolEvent>,
    done: bool,
    idle_deadline: Pin<Box<tokio::time::Sleep>>,
    idle_duration: Duration,
}

impl SessionStream {
    pub fn new(
        byte_stream: impl Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
    ) -> Self {
        Self::with_idle_timeout(byte_stream, STREAM_IDLE_TIMEOUT)
    }

    pub fn with_idle_timeout(
        byte_stream: impl Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            inner: Box::pin(byte_stream),
            frames: FrameBuffer::new(),
            pending: Vec::new(),
            done: false,
            idle_deadline: Box::pin(tokio::time::sleep(idle_timeout)),
            idle_duration: idle_timeout,
        }
    }
}

impl Stream for SessionStream {
    type Item = Result<ProtocolEvent, TransportError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        // Drain already-decoded events before touching the transport.
        if !self.pending.is_empty() {
            return std::task::Poll::Ready(Some(Ok(self.pending.remove(0))));
        }
        if self.done {
            return std::task::Poll::Ready(None);
        }

        loop {
            match self.inner.as_mut().poll_next(cx) {
                std::task::Poll::Ready(Some(Ok(bytes))) => {
                    let new_deadline = tokio::time::Instant::now() + self.idle_duration;
                    self.idle_deadline.as_mut().reset(new_deadline);

                    let decoded = self.frames.push(&bytes);
                    self.pending.extend(decoded);

                    if !self.pending.is_empty() {
                        return std::task::Poll::Ready(Some(Ok(self.pending.remove(0))));
                    }
                }
                std::task::Poll::Ready(Some(Err(e))) => {
                    self.done = true;
                    return std::task::Poll::Ready(Some(Err(TransportError::Interrupted(
                        e.to_string(),
                    ))));
                }
                std::task::Poll::Ready(None) => {
                    // End of stream: a non-empty remainder is a final frame.
                    self.done = true;
                    if let Some(event) = self.frames.finish() {
                        return std::task::Poll::Ready(Some(Ok(event)));
                    }
                    return std::task::Poll::Ready(None);
                }
                std::task::Poll::Pending => {
                    if self.idle_deadline.as_mut().poll(cx).is_ready() {
                        self.done = true;
                        return std::task::Poll::Ready(Some(Err(TransportError::Interrupted(
                            format!("idle timeout after {}s", self.idle_duration.as_secs()),
                        ))));
                    }
                    return std::task::Poll::Pending;
                }
            }
        }
    }
}
