//! Server-Sent Events decoding for streamed model responses.
//!
//! Turns a byte stream into assembled events: `data:` lines are joined with
//! `\n` until a blank line (or end of input) closes the event. Comment lines
//! and every other field (`event`, `id`, `retry`) are ignored. Bytes are
//! buffered until a full line is available, so multi-byte UTF-8 sequences
//! split across network chunks decode correctly.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;

/// One decoded SSE event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseEvent {
    pub data: String,
}

#[derive(Debug, PartialEq, Eq)]
enum Field<'a> {
    Data(&'a str),
    Blank,
    Ignored,
}

fn parse_field(line: &str) -> Field<'_> {
    if line.is_empty() {
        return Field::Blank;
    }
    if line.starts_with(':') {
        return Field::Ignored;
    }

    let (name, value) = match line.split_once(':') {
        Some((name, value)) => (name, value.strip_prefix(' ').unwrap_or(value)),
        None => (line, ""),
    };

    match name {
        "data" => Field::Data(value),
        _ => Field::Ignored,
    }
}

#[derive(Default)]
struct Pending {
    data: Vec<String>,
}

impl Pending {
    fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn take(&mut self) -> SseEvent {
        let pending = std::mem::take(self);
        SseEvent {
            data: pending.data.join("\n"),
        }
    }
}

/// Stream adapter yielding [`SseEvent`]s from a byte stream.
pub struct SseEventStream<S> {
    inner: S,
    buffer: Vec<u8>,
    pending: Pending,
    finished: bool,
}

impl<S> SseEventStream<S> {
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            pending: Pending::default(),
            finished: false,
        }
    }

    /// Consume buffered lines; returns an event once one is complete.
    fn drain_lines(&mut self) -> Option<SseEvent> {
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if let Some(event) = self.apply_line(&String::from_utf8_lossy(&line)) {
                return Some(event);
            }
        }
        None
    }

    fn apply_line(&mut self, line: &str) -> Option<SseEvent> {
        match parse_field(line) {
            Field::Data(data) => self.pending.data.push(data.to_string()),
            Field::Blank if !self.pending.is_empty() => return Some(self.pending.take()),
            Field::Blank | Field::Ignored => {}
        }
        None
    }
}

impl<S, E> Stream for SseEventStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    type Item = Result<SseEvent, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(event) = self.drain_lines() {
                return Poll::Ready(Some(Ok(event)));
            }
            if self.finished {
                return Poll::Ready(None);
            }

            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => self.buffer.extend_from_slice(&bytes),
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Some(Err(e))),
                Poll::Ready(None) => {
                    self.finished = true;
                    // A final line without a trailing newline still counts.
                    if !self.buffer.is_empty() {
                        let rest = std::mem::take(&mut self.buffer);
                        if let Some(event) = self.apply_line(&String::from_utf8_lossy(&rest)) {
                            return Poll::Ready(Some(Ok(event)));
                        }
                    }
                    if !self.pending.is_empty() {
                        return Poll::Ready(Some(Ok(self.pending.take())));
                    }
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
