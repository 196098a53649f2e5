//! Reply streaming with durable recording of the model turn.
//!
//! `ReplyStream` forwards generated text to the HTTP body while accumulating
//! it. When generation ends (normally or with a failure) the accumulated text
//! is appended to the session log before the stream reports its end. If the
//! client disconnects first, the stream is dropped and the append is handed
//! to the background task registry instead.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use tracing::{debug, info, warn};

use super::record::Message;
use crate::background::BackgroundTasks;
use crate::llm::{GenerationStream, Role};
use crate::store::SessionStore;

type PersistFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

enum State {
    Streaming,
    Persisting(PersistFuture),
    Finished,
}

/// Text body of a conversational reply.
pub struct ReplyStream {
    inner: GenerationStream,
    store: Arc<dyn SessionStore>,
    session_id: String,
    background: BackgroundTasks,
    accumulated: String,
    state: State,
}

impl ReplyStream {
    pub(crate) fn new(
        inner: GenerationStream,
        store: Arc<dyn SessionStore>,
        session_id: String,
        background: BackgroundTasks,
    ) -> Self {
        Self {
            inner,
            store,
            session_id,
            background,
            accumulated: String::new(),
            state: State::Streaming,
        }
    }

    /// Take the accumulated text and build the future that records it.
    fn take_persist(&mut self) -> Option<PersistFuture> {
        let text = std::mem::take(&mut self.accumulated);
        if text.is_empty() {
            return None;
        }

        let store = self.store.clone();
        let session_id = self.session_id.clone();
        Some(Box::pin(async move {
            debug!(session_id = %session_id, len = text.len(), "Recording model turn");
            let message = Message::new(Role::Model, text);
            if let Err(e) = store.append_message(&session_id, &message).await {
                warn!(session_id = %session_id, error = %e, "Failed to record model turn");
            }
        }))
    }
}

impl Stream for ReplyStream {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            match &mut this.state {
                State::Streaming => match Pin::new(&mut this.inner).poll_next(cx) {
                    Poll::Ready(Some(Ok(text))) => {
                        this.accumulated.push_str(&text);
                        return Poll::Ready(Some(Ok(Bytes::from(text))));
                    }
                    Poll::Ready(Some(Err(failure))) => {
                        warn!(
                            session_id = %this.session_id,
                            error = %failure.error,
                            partial_len = failure.partial.len(),
                            "Reply stream ended early"
                        );
                        this.accumulated = failure.partial;
                        this.state = next_state(this.take_persist());
                    }
                    Poll::Ready(None) => {
                        this.state = next_state(this.take_persist());
                    }
                    Poll::Pending => return Poll::Pending,
                },
                State::Persisting(persist) => match persist.as_mut().poll(cx) {
                    Poll::Ready(()) => this.state = State::Finished,
                    Poll::Pending => return Poll::Pending,
                },
                State::Finished => return Poll::Ready(None),
            }
        }
    }
}

fn next_state(persist: Option<PersistFuture>) -> State {
    match persist {
        Some(persist) => State::Persisting(persist),
        None => State::Finished,
    }
}

impl Drop for ReplyStream {
    fn drop(&mut self) {
        let pending = match std::mem::replace(&mut self.state, State::Finished) {
            State::Streaming => {
                info!(
                    session_id = %self.session_id,
                    accumulated_len = self.accumulated.len(),
                    "Reply stream dropped before completion"
                );
                self.take_persist()
            }
            State::Persisting(persist) => Some(persist),
            State::Finished => None,
        };

        if let Some(persist) = pending {
            self.background.spawn("record-model-turn", persist);
        }
    }
}
