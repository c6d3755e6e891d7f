//! LLM Gateway port
//!
//! Defines the interface for invoking capability units on an LLM provider.

use async_trait::async_trait;
use rethink_domain::{CapabilityUnit, ConversationEntry, InputList, ResponseEvent, StreamEvent};
use thiserror::Error;
use tokio::sync::{mpsc, watch};

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Malformed stream: {0}")]
    MalformedStream(String),

    #[error("Tool '{0}' is not exposed by this unit")]
    UnknownTool(String),

    #[error("Timeout")]
    Timeout,

    #[error("Transport closed")]
    TransportClosed,

    #[error("Other error: {0}")]
    Other(String),
}

/// Item carried on a stream channel
pub type StreamItem = Result<StreamEvent, GatewayError>;

/// Handle for receiving one invocation's streaming events.
///
/// Wraps an `mpsc::Receiver` of events plus an optional `watch` channel on
/// which the provider publishes the structured conversation history. A
/// provider that cannot produce structured history leaves it unset and
/// [`to_input_list`](Self::to_input_list) returns `None`.
///
/// Dropping the handle abandons the stream; the producer sees its sends fail.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamItem>,
    history: Option<watch::Receiver<Option<InputList>>>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamItem>) -> Self {
        Self {
            receiver,
            history: None,
        }
    }

    /// Attach the channel on which the provider publishes history.
    pub fn with_history(mut self, history: watch::Receiver<Option<InputList>>) -> Self {
        self.history = Some(history);
        self
    }

    /// Await the next event. `None` once the producer is gone.
    pub async fn next_event(&mut self) -> Option<StreamItem> {
        self.receiver.recv().await
    }

    /// Latest structured history published for this invocation.
    pub fn to_input_list(&self) -> Option<InputList> {
        self.history
            .as_ref()
            .and_then(|history| history.borrow().clone())
    }

    /// Consume the stream and collect the visible text into a single string.
    ///
    /// Stops at the first content-part-done marker; the marker itself adds
    /// nothing to the text. Useful when only the final output is needed
    /// (e.g., the default [`LlmGateway::invoke`]).
    pub async fn collect_text(mut self) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(item) = self.receiver.recv().await {
            match item? {
                StreamEvent::RawResponse(ResponseEvent::TextDelta(chunk)) => {
                    full_text.push_str(&chunk)
                }
                StreamEvent::RawResponse(ResponseEvent::ContentPartDone) => break,
                _ => {}
            }
        }
        Ok(full_text)
    }
}

/// Gateway for invoking capability units
///
/// This port defines how the application layer talks to an LLM provider.
/// Implementations (adapters) live in the infrastructure layer. Executing the
/// tool calls a unit's model decides to make is the adapter's job; the
/// application layer only observes them as [`StreamEvent::Other`].
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Invoke `unit` with a conversation and stream the response.
    async fn invoke_streamed(
        &self,
        unit: &CapabilityUnit,
        input: &InputList,
    ) -> Result<StreamHandle, GatewayError>;

    /// Invoke `unit` with plain text and wait for its final output.
    ///
    /// Default implementation streams a single-entry conversation and collects
    /// the text, so adapters only need to provide [`invoke_streamed`](Self::invoke_streamed).
    async fn invoke(&self, unit: &CapabilityUnit, input: &str) -> Result<String, GatewayError> {
        let input = InputList::from_entries(vec![ConversationEntry::user(input)]);
        self.invoke_streamed(unit, &input)
            .await?
            .collect_text()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collect_text_stops_at_content_part_done() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(Ok(StreamEvent::text_delta("a"))).await.unwrap();
        tx.send(Ok(StreamEvent::text_delta("b"))).await.unwrap();
        tx.send(Ok(StreamEvent::content_part_done())).await.unwrap();
        tx.send(Ok(StreamEvent::text_delta("c"))).await.unwrap();
        drop(tx);

        let text = StreamHandle::new(rx).collect_text().await.unwrap();
        assert_eq!(text, "ab");
    }

    #[tokio::test]
    async fn collect_text_propagates_errors() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(Ok(StreamEvent::text_delta("a"))).await.unwrap();
        tx.send(Err(GatewayError::TransportClosed)).await.unwrap();
        drop(tx);

        let err = StreamHandle::new(rx).collect_text().await.unwrap_err();
        assert_eq!(err, GatewayError::TransportClosed);
    }

    #[tokio::test]
    async fn history_is_optional() {
        let (_tx, rx) = mpsc::channel::<StreamItem>(1);
        assert!(StreamHandle::new(rx).to_input_list().is_none());

        let (_tx, rx) = mpsc::channel::<StreamItem>(1);
        let (history_tx, history_rx) = watch::channel(None);
        let handle = StreamHandle::new(rx).with_history(history_rx);
        assert!(handle.to_input_list().is_none());

        let list = InputList::from_entries(vec![ConversationEntry::user("hi")]);
        history_tx.send(Some(list.clone())).unwrap();
        assert_eq!(handle.to_input_list(), Some(list));
    }
}
