//! Event stream consumer
//!
//! Drains one round's [`StreamHandle`], accumulating visible text and
//! detecting the round's completion marker.

use crate::ports::llm_gateway::{GatewayError, StreamHandle};
use crate::ports::progress::ProgressNotifier;
use rethink_domain::{ResponseEvent, StreamEvent};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// What a round's stream produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumeOutcome {
    /// Accumulated text, with a trailing newline if the marker was seen
    pub text: String,
    /// A content-part-done marker ended the round
    pub completed: bool,
    /// Consumption stopped because the run was cancelled
    pub cancelled: bool,
}

/// Consumes the event stream of a single round
///
/// Rules, per event in arrival order:
/// 1. Only raw model-response events can contribute text.
/// 2. A text delta is appended and `on_delta(round, text_so_far)` fires.
/// 3. Content-part-done fires `on_delta(round, text + "\n")` once more and
///    ends the round; whatever is left in the stream is abandoned.
/// 4. A stream that just ends completes the round with the text so far.
pub struct EventStreamConsumer<'a> {
    round: usize,
    progress: &'a dyn ProgressNotifier,
    cancellation_token: Option<&'a CancellationToken>,
}

impl<'a> EventStreamConsumer<'a> {
    pub fn new(round: usize, progress: &'a dyn ProgressNotifier) -> Self {
        Self {
            round,
            progress,
            cancellation_token: None,
        }
    }

    pub fn with_cancellation(mut self, token: Option<&'a CancellationToken>) -> Self {
        self.cancellation_token = token;
        self
    }

    pub async fn consume(&self, stream: &mut StreamHandle) -> Result<ConsumeOutcome, GatewayError> {
        let mut text = String::new();

        loop {
            let item = if let Some(token) = self.cancellation_token {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!(round = self.round, "Round cancelled mid-stream");
                        return Ok(ConsumeOutcome {
                            text,
                            completed: false,
                            cancelled: true,
                        });
                    }
                    item = stream.next_event() => item,
                }
            } else {
                stream.next_event().await
            };

            let event = match item {
                Some(item) => item?,
                None => {
                    debug!(round = self.round, "Stream ended without completion marker");
                    return Ok(ConsumeOutcome {
                        text,
                        completed: false,
                        cancelled: false,
                    });
                }
            };

            match event {
                StreamEvent::RawResponse(ResponseEvent::TextDelta(delta)) => {
                    text.push_str(&delta);
                    self.progress.on_delta(self.round, &text);
                }
                StreamEvent::RawResponse(ResponseEvent::ContentPartDone) => {
                    text.push('\n');
                    self.progress.on_delta(self.round, &text);
                    return Ok(ConsumeOutcome {
                        text,
                        completed: true,
                        cancelled: false,
                    });
                }
                StreamEvent::RawResponse(ResponseEvent::Other(kind)) => {
                    trace!(round = self.round, kind = %kind, "Skipping raw event");
                }
                StreamEvent::Other(item) => {
                    trace!(round = self.round, "Passing through run item");
                    self.progress.on_tool_event(self.round, &item);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::StreamItem;
    use crate::ports::progress::NoProgress;
    use rethink_domain::RunItemEvent;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    fn handle(items: Vec<StreamItem>) -> StreamHandle {
        let (tx, rx) = mpsc::channel(items.len().max(1));
        for item in items {
            tx.try_send(item).unwrap();
        }
        StreamHandle::new(rx)
    }

    #[derive(Default)]
    struct Recorder {
        deltas: Mutex<Vec<(usize, String)>>,
        tool_events: Mutex<usize>,
    }

    impl ProgressNotifier for Recorder {
        fn on_delta(&self, round: usize, text: &str) {
            self.deltas.lock().unwrap().push((round, text.to_string()));
        }

        fn on_tool_event(&self, _round: usize, _event: &RunItemEvent) {
            *self.tool_events.lock().unwrap() += 1;
        }
    }

    #[tokio::test]
    async fn early_exit_on_content_part_done() {
        let mut stream = handle(vec![
            Ok(StreamEvent::text_delta("a")),
            Ok(StreamEvent::text_delta("b")),
            Ok(StreamEvent::content_part_done()),
            Ok(StreamEvent::text_delta("c")),
        ]);
        let recorder = Recorder::default();

        let outcome = EventStreamConsumer::new(1, &recorder)
            .consume(&mut stream)
            .await
            .unwrap();

        assert_eq!(outcome.text, "ab\n");
        assert!(outcome.completed);
        assert!(!outcome.cancelled);
        assert_eq!(
            *recorder.deltas.lock().unwrap(),
            vec![
                (1, "a".to_string()),
                (1, "ab".to_string()),
                (1, "ab\n".to_string())
            ]
        );

        // The trailing delta is still queued, untouched.
        assert_eq!(
            stream.next_event().await.unwrap().unwrap(),
            StreamEvent::text_delta("c")
        );
    }

    #[tokio::test]
    async fn stream_end_without_marker_completes_round() {
        let mut stream = handle(vec![
            Ok(StreamEvent::text_delta("On ")),
            Ok(StreamEvent::text_delta("balance")),
        ]);

        let outcome = EventStreamConsumer::new(3, &NoProgress)
            .consume(&mut stream)
            .await
            .unwrap();

        assert_eq!(outcome.text, "On balance");
        assert!(!outcome.completed);
    }

    #[tokio::test]
    async fn non_raw_events_contribute_no_text() {
        let mut stream = handle(vec![
            Ok(StreamEvent::Other(RunItemEvent::ToolCalled {
                call_id: "call_1".to_string(),
                name: "rethink".to_string(),
                arguments: "{\"input\":\"x\"}".to_string(),
            })),
            Ok(StreamEvent::RawResponse(ResponseEvent::Other(
                "response.created".to_string(),
            ))),
            Ok(StreamEvent::Other(RunItemEvent::ToolOutput {
                call_id: "call_1".to_string(),
                output: "hidden".to_string(),
            })),
            Ok(StreamEvent::text_delta("visible")),
            Ok(StreamEvent::content_part_done()),
        ]);
        let recorder = Recorder::default();

        let outcome = EventStreamConsumer::new(2, &recorder)
            .consume(&mut stream)
            .await
            .unwrap();

        assert_eq!(outcome.text, "visible\n");
        assert_eq!(*recorder.tool_events.lock().unwrap(), 2);
        assert!(recorder.deltas.lock().unwrap().iter().all(|(r, _)| *r == 2));
    }

    #[tokio::test]
    async fn errors_propagate() {
        let mut stream = handle(vec![
            Ok(StreamEvent::text_delta("partial")),
            Err(GatewayError::ConnectionError("reset by peer".to_string())),
            Ok(StreamEvent::content_part_done()),
        ]);

        let err = EventStreamConsumer::new(1, &NoProgress)
            .consume(&mut stream)
            .await
            .unwrap_err();

        assert_eq!(err, GatewayError::ConnectionError("reset by peer".to_string()));
    }

    #[tokio::test]
    async fn deltas_never_shrink() {
        let mut stream = handle(vec![
            Ok(StreamEvent::text_delta("x")),
            Ok(StreamEvent::text_delta("")),
            Ok(StreamEvent::text_delta("yz")),
            Ok(StreamEvent::content_part_done()),
        ]);
        let recorder = Recorder::default();

        EventStreamConsumer::new(1, &recorder)
            .consume(&mut stream)
            .await
            .unwrap();

        let lengths: Vec<usize> = recorder
            .deltas
            .lock()
            .unwrap()
            .iter()
            .map(|(_, t)| t.len())
            .collect();
        assert!(lengths.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn cancellation_returns_partial_text() {
        let (tx, rx) = mpsc::channel(4);
        let mut stream = StreamHandle::new(rx);
        tx.send(Ok(StreamEvent::text_delta("part"))).await.unwrap();

        let token = CancellationToken::new();
        let recorder = Recorder::default();
        let consumer = EventStreamConsumer::new(2, &recorder).with_cancellation(Some(&token));

        let cancel = async {
            // Let the first delta through, then cancel while waiting.
            while recorder.deltas.lock().unwrap().is_empty() {
                tokio::task::yield_now().await;
            }
            token.cancel();
        };

        let (outcome, _) = tokio::join!(consumer.consume(&mut stream), cancel);
        let outcome = outcome.unwrap();

        assert!(outcome.cancelled);
        assert!(!outcome.completed);
        assert_eq!(outcome.text, "part");
        drop(tx);
    }
}
