//! Run Rethink use case
//!
//! Drives the bounded refinement loop: each round invokes the supervising
//! unit, drains its stream, records the round and threads state into the
//! next round. The last round's text is the final answer.

use crate::config::ExecutionParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::llm_gateway::{GatewayError, LlmGateway, StreamHandle};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::consume_stream::EventStreamConsumer;
use rethink_domain::{
    CapabilityUnit, DomainError, InputList, IterationBudget, RethinkResult, RethinkRun,
    RethinkTeam, RoundResult, RoundStateThreader, TeamModels, UserMessage,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can occur during a rethink run
#[derive(Error, Debug)]
pub enum RunRethinkError {
    #[error("Message is empty")]
    EmptyInput,

    #[error("Configuration error: {0}")]
    Configuration(DomainError),

    #[error("Invocation failed: {0}")]
    Invocation(#[from] GatewayError),
}

impl From<DomainError> for RunRethinkError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::EmptyMessage => RunRethinkError::EmptyInput,
            other => RunRethinkError::Configuration(other),
        }
    }
}

impl RunRethinkError {
    /// Whether the user can fix this by changing their input.
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, RunRethinkError::EmptyInput)
    }
}

/// Input for the RunRethink use case
#[derive(Debug, Clone)]
pub struct RunRethinkInput {
    /// The user's message, validated when the run starts
    pub message: String,
    /// Models backing the standard team
    pub models: TeamModels,
    /// Round loop control
    pub params: ExecutionParams,
    /// Replaces the standard team's supervisor when set
    pub supervisor: Option<CapabilityUnit>,
}

impl RunRethinkInput {
    pub fn new(message: impl Into<String>, models: TeamModels) -> Self {
        Self {
            message: message.into(),
            models,
            params: ExecutionParams::default(),
            supervisor: None,
        }
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.params.iterations = iterations;
        self
    }

    pub fn with_supervisor(mut self, supervisor: CapabilityUnit) -> Self {
        self.supervisor = Some(supervisor);
        self
    }
}

/// Use case for running an iterative rethink
pub struct RunRethinkUseCase<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    cancellation_token: Option<CancellationToken>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl<G: LlmGateway + 'static> RunRethinkUseCase<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            cancellation_token: None,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Set a cancellation token; cancelling it ends the run with the
    /// in-flight round's partial text as the answer.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation_token
            .as_ref()
            .is_some_and(|t| t.is_cancelled())
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RunRethinkInput) -> Result<RethinkResult, RunRethinkError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunRethinkInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<RethinkResult, RunRethinkError> {
        // Empty input is rejected before anything else, whatever the budget.
        let message = UserMessage::try_new(input.message)?;
        let budget = IterationBudget::new(input.params.iterations)?;
        let supervisor = match input.supervisor {
            Some(unit) => unit,
            None => RethinkTeam::build(&input.models, budget)?.into_supervisor(),
        };
        let threader = RoundStateThreader::new(input.params.threading);

        info!(
            supervisor = supervisor.name(),
            model = %supervisor.model(),
            rounds = budget.get(),
            "Starting rethink run"
        );
        self.conversation_logger.log(ConversationEvent::run_started(
            &message,
            supervisor.name(),
            budget.get(),
        ));

        let mut current_input = InputList::from_message(&message);
        let mut run = RethinkRun::new(message, budget);

        loop {
            if self.is_cancelled() {
                info!(round = run.round(), "Run cancelled before round start");
                run.cancel(None);
                break;
            }

            let round = run.round();
            run.start_round();
            progress.on_round_start(round, budget.get());
            self.conversation_logger
                .log(ConversationEvent::round_started(round, current_input.len()));
            debug!(round, entries = current_input.len(), "Invoking supervisor");

            let Some(mut handle) = self
                .start_stream(&supervisor, &current_input)
                .await
                .map_err(|e| self.fail(round, e))?
            else {
                info!(round, "Run cancelled while waiting for the stream");
                run.cancel(None);
                break;
            };

            run.begin_streaming();
            let outcome = EventStreamConsumer::new(round, progress)
                .with_cancellation(self.cancellation_token.as_ref())
                .consume(&mut handle)
                .await
                .map_err(|e| self.fail(round, e))?;

            if outcome.cancelled {
                info!(round, chars = outcome.text.len(), "Run cancelled mid-stream");
                let partial = RoundResult::new(round, outcome.text, false);
                progress.on_round_complete(round, &partial);
                run.cancel(Some(partial));
                break;
            }

            let history = handle.to_input_list();
            if history.is_none() {
                debug!(
                    round,
                    fallback = threader.fallback().as_str(),
                    "No structured history from provider"
                );
            }
            let result = RoundResult::new(round, outcome.text, outcome.completed).with_history(history);
            current_input = threader.next_input(current_input, &result);

            info!(round, chars = result.text.len(), "Round complete");
            progress.on_round_complete(round, &result);
            self.conversation_logger
                .log(ConversationEvent::round_completed(&result));
            run.complete_round(result);

            if !run.has_next_round() {
                run.finish();
                break;
            }
        }

        let result = RethinkResult {
            message: run.message().content().to_string(),
            budget: budget.get(),
            rounds: run.rounds().to_vec(),
            final_answer: run.final_answer().to_string(),
            cancelled: run.is_cancelled(),
        };

        self.conversation_logger.log(ConversationEvent::run_finished(
            &result.final_answer,
            result.rounds_completed(),
            result.cancelled,
        ));
        info!(
            rounds = result.rounds_completed(),
            cancelled = result.cancelled,
            "Rethink run finished"
        );

        Ok(result)
    }

    /// Open the round's stream. `Ok(None)` when cancelled while waiting.
    async fn start_stream(
        &self,
        supervisor: &CapabilityUnit,
        input: &InputList,
    ) -> Result<Option<StreamHandle>, GatewayError> {
        let invocation = self.gateway.invoke_streamed(supervisor, input);
        match &self.cancellation_token {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Ok(None),
                handle = invocation => handle.map(Some),
            },
            None => invocation.await.map(Some),
        }
    }

    fn fail(&self, round: usize, error: GatewayError) -> RunRethinkError {
        warn!(round, error = %error, "Round failed, aborting run");
        self.conversation_logger
            .log(ConversationEvent::run_failed(round, &error.to_string()));
        RunRethinkError::Invocation(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::StreamItem;
    use async_trait::async_trait;
    use rethink_domain::{ConversationEntry, Model, StreamEvent, ThreadingFallback};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::{mpsc, watch};

    /// One scripted round: events to emit, an optional structured history,
    /// and whether to keep the stream open after the events.
    struct Script {
        events: Vec<StreamItem>,
        history: Option<InputList>,
        hold_open: bool,
    }

    impl Script {
        fn deltas(deltas: &[&str]) -> Self {
            let mut events: Vec<StreamItem> = deltas
                .iter()
                .map(|d| Ok(StreamEvent::text_delta(*d)))
                .collect();
            events.push(Ok(StreamEvent::content_part_done()));
            Self {
                events,
                history: None,
                hold_open: false,
            }
        }

        fn with_history(mut self, history: InputList) -> Self {
            self.history = Some(history);
            self
        }
    }

    /// Replays one script per `invoke_streamed` call and records every input.
    struct ScriptedGateway {
        scripts: Mutex<VecDeque<Script>>,
        calls: Mutex<Vec<(String, InputList)>>,
        open_senders: Mutex<Vec<mpsc::Sender<StreamItem>>>,
    }

    impl ScriptedGateway {
        fn new(scripts: Vec<Script>) -> Self {
            Self {
                scripts: Mutex::new(scripts.into()),
                calls: Mutex::new(Vec::new()),
                open_senders: Mutex::new(Vec::new()),
            }
        }

        fn repeating(rounds: usize, text: &str) -> Self {
            Self::new((0..rounds).map(|_| Script::deltas(&[text])).collect())
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn input_of(&self, call: usize) -> InputList {
            self.calls.lock().unwrap()[call].1.clone()
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        async fn invoke_streamed(
            &self,
            unit: &CapabilityUnit,
            input: &InputList,
        ) -> Result<StreamHandle, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push((unit.name().to_string(), input.clone()));

            let script = self
                .scripts
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| GatewayError::Other("no script left".to_string()))?;

            let (tx, rx) = mpsc::channel(script.events.len() + 1);
            for event in script.events {
                tx.try_send(event).unwrap();
            }

            let mut handle = StreamHandle::new(rx);
            if let Some(history) = script.history {
                let (_history_tx, history_rx) = watch::channel(Some(history));
                handle = handle.with_history(history_rx);
            }
            if script.hold_open {
                self.open_senders.lock().unwrap().push(tx);
            }
            Ok(handle)
        }
    }

    #[derive(Default)]
    struct DeltaLog {
        deltas: Mutex<Vec<(usize, String)>>,
        round_starts: Mutex<Vec<(usize, usize)>>,
    }

    impl ProgressNotifier for DeltaLog {
        fn on_delta(&self, round: usize, text: &str) {
            self.deltas.lock().unwrap().push((round, text.to_string()));
        }

        fn on_round_start(&self, round: usize, total: usize) {
            self.round_starts.lock().unwrap().push((round, total));
        }
    }

    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<&'static str>>,
    }

    impl ConversationLogger for RecordingLogger {
        fn log(&self, event: ConversationEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }
    }

    fn input(message: &str, iterations: usize) -> RunRethinkInput {
        RunRethinkInput::new(message, TeamModels::default()).with_iterations(iterations)
    }

    #[tokio::test]
    async fn test_runs_exactly_n_rounds() {
        for n in 1..=4 {
            let gateway = Arc::new(ScriptedGateway::repeating(n + 2, "x"));
            let progress = DeltaLog::default();
            let use_case = RunRethinkUseCase::new(Arc::clone(&gateway));

            let result = use_case
                .execute_with_progress(input("question", n), &progress)
                .await
                .unwrap();

            assert_eq!(gateway.call_count(), n);
            assert_eq!(result.rounds_completed(), n);
            assert!(!result.cancelled);

            let rounds: Vec<usize> = progress.deltas.lock().unwrap().iter().map(|(r, _)| *r).collect();
            let expected: Vec<usize> = (1..=n).flat_map(|k| [k, k]).collect();
            assert_eq!(rounds, expected);
            assert_eq!(
                *progress.round_starts.lock().unwrap(),
                (1..=n).map(|k| (k, n)).collect::<Vec<_>>()
            );
        }
    }

    #[tokio::test]
    async fn test_delta_lengths_non_decreasing_per_round() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Script::deltas(&["Remote ", "", "work ", "has ", "tradeoffs."]),
            Script::deltas(&["On ", "balance"]),
        ]));
        let progress = DeltaLog::default();

        RunRethinkUseCase::new(gateway)
            .execute_with_progress(input("q", 2), &progress)
            .await
            .unwrap();

        let deltas = progress.deltas.lock().unwrap();
        for round in 1..=2 {
            let lengths: Vec<usize> = deltas
                .iter()
                .filter(|(r, _)| *r == round)
                .map(|(_, t)| t.len())
                .collect();
            assert!(!lengths.is_empty());
            assert!(lengths.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[tokio::test]
    async fn test_empty_input_rejected_before_any_round() {
        for message in ["", "   ", "\n\t "] {
            for n in [0, 1, 5] {
                let gateway = Arc::new(ScriptedGateway::repeating(5, "x"));
                let err = RunRethinkUseCase::new(Arc::clone(&gateway))
                    .execute(input(message, n))
                    .await
                    .unwrap_err();

                assert!(matches!(err, RunRethinkError::EmptyInput));
                assert!(err.is_user_correctable());
                assert_eq!(gateway.call_count(), 0);
            }
        }
    }

    #[tokio::test]
    async fn test_round_text_stops_at_content_part_done() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Script {
            events: vec![
                Ok(StreamEvent::text_delta("a")),
                Ok(StreamEvent::text_delta("b")),
                Ok(StreamEvent::content_part_done()),
                Ok(StreamEvent::text_delta("c")),
            ],
            history: None,
            hold_open: false,
        }]));

        let result = RunRethinkUseCase::new(gateway)
            .execute(input("q", 1))
            .await
            .unwrap();

        assert_eq!(result.final_answer, "ab\n");
        assert!(result.rounds[0].completed);
    }

    #[tokio::test]
    async fn test_structured_history_seeds_next_round() {
        let history = InputList::from_entries(vec![
            ConversationEntry::user("Is remote work good?"),
            ConversationEntry::tool_call("call_1", "rethink", "{\"input\":\"remote work\"}"),
            ConversationEntry::tool_output("call_1", "It depends on the team."),
            ConversationEntry::assistant("Remote work has tradeoffs."),
        ]);
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Script::deltas(&["Remote work has tradeoffs."]).with_history(history.clone()),
            Script::deltas(&["On balance, it depends."]),
        ]));

        RunRethinkUseCase::new(Arc::clone(&gateway))
            .execute(input("Is remote work good?", 2))
            .await
            .unwrap();

        assert_eq!(
            gateway.input_of(0),
            InputList::from_entries(vec![ConversationEntry::user("Is remote work good?")])
        );
        assert_eq!(gateway.input_of(1), history);
    }

    #[tokio::test]
    async fn test_prior_input_reused_without_history() {
        let gateway = Arc::new(ScriptedGateway::repeating(3, "text"));

        RunRethinkUseCase::new(Arc::clone(&gateway))
            .execute(input("original", 3))
            .await
            .unwrap();

        let first = gateway.input_of(0);
        assert_eq!(gateway.input_of(1), first);
        assert_eq!(gateway.input_of(2), first);
    }

    #[tokio::test]
    async fn test_append_text_threading() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Script::deltas(&["first draft"]),
            Script::deltas(&["second draft"]),
        ]));
        let params = ExecutionParams::default()
            .with_iterations(2)
            .with_threading(ThreadingFallback::AppendText);

        RunRethinkUseCase::new(Arc::clone(&gateway))
            .execute(RunRethinkInput::new("original", TeamModels::default()).with_params(params))
            .await
            .unwrap();

        assert_eq!(
            gateway.input_of(1),
            InputList::from_entries(vec![
                ConversationEntry::user("original"),
                ConversationEntry::assistant("first draft"),
            ])
        );
    }

    #[tokio::test]
    async fn test_remote_work_scenario() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Script::deltas(&["Remote ", "work ", "has ", "tradeoffs."]),
            Script::deltas(&["On ", "balance, ", "it ", "depends."]),
        ]));
        let logger = Arc::new(RecordingLogger::default());

        let result = RunRethinkUseCase::new(Arc::clone(&gateway))
            .with_conversation_logger(logger.clone())
            .execute(input("Is remote work good?", 2))
            .await
            .unwrap();

        assert_eq!(result.final_answer, "On balance, it depends.\n");
        assert_eq!(result.rounds[0].text, "Remote work has tradeoffs.\n");
        assert_eq!(result.message, "Is remote work good?");
        assert_eq!(result.budget, 2);

        let calls = gateway.calls.lock().unwrap();
        assert!(calls.iter().all(|(unit, _)| unit == "Orchestrator"));
        drop(calls);

        assert_eq!(
            *logger.events.lock().unwrap(),
            vec![
                "run_started",
                "round_started",
                "round_completed",
                "round_started",
                "round_completed",
                "run_finished",
            ]
        );
    }

    #[tokio::test]
    async fn test_transport_fault_aborts_run() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Script {
                events: vec![
                    Ok(StreamEvent::text_delta("Remote ")),
                    Err(GatewayError::ConnectionError("connection reset".to_string())),
                ],
                history: None,
                hold_open: false,
            },
            Script::deltas(&["never"]),
        ]));
        let logger = Arc::new(RecordingLogger::default());

        let err = RunRethinkUseCase::new(Arc::clone(&gateway))
            .with_conversation_logger(logger.clone())
            .execute(input("Is remote work good?", 2))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RunRethinkError::Invocation(GatewayError::ConnectionError(_))
        ));
        assert_eq!(gateway.call_count(), 1);
        assert_eq!(logger.events.lock().unwrap().last(), Some(&"run_failed"));
    }

    #[tokio::test]
    async fn test_invocation_error_before_stream() {
        let gateway = Arc::new(ScriptedGateway::new(vec![]));

        let err = RunRethinkUseCase::new(gateway)
            .execute(input("q", 3))
            .await
            .unwrap_err();

        assert!(matches!(err, RunRethinkError::Invocation(_)));
    }

    #[tokio::test]
    async fn test_cancellation_during_round_two() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Script::deltas(&["Round one."]),
            Script {
                events: vec![Ok(StreamEvent::text_delta("Round two, par"))],
                history: None,
                hold_open: true,
            },
            Script::deltas(&["Round three."]),
        ]));
        let token = CancellationToken::new();

        let cancel_token = token.clone();
        let progress = move |round: usize, _text: &str| {
            if round == 2 {
                cancel_token.cancel();
            }
        };

        let result = RunRethinkUseCase::new(Arc::clone(&gateway))
            .with_cancellation(token)
            .execute_with_progress(input("q", 5), &progress)
            .await
            .unwrap();

        assert!(result.cancelled);
        assert_eq!(result.final_answer, "Round two, par");
        assert_eq!(result.rounds_completed(), 2);
        assert!(!result.rounds[1].completed);
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_round() {
        let gateway = Arc::new(ScriptedGateway::repeating(2, "x"));
        let token = CancellationToken::new();
        token.cancel();

        let result = RunRethinkUseCase::new(Arc::clone(&gateway))
            .with_cancellation(token)
            .execute(input("q", 2))
            .await
            .unwrap();

        assert!(result.cancelled);
        assert_eq!(result.final_answer, "");
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_zero_iterations_is_configuration_error() {
        let gateway = Arc::new(ScriptedGateway::repeating(1, "x"));

        let err = RunRethinkUseCase::new(gateway)
            .execute(input("q", 0))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RunRethinkError::Configuration(DomainError::InvalidIterationBudget)
        ));
    }

    #[test]
    fn test_duplicate_tool_names_fail_at_construction() {
        let delegate = Arc::new(
            CapabilityUnit::new("Rethinking Subagent", "Rethink it.", Model::default()).unwrap(),
        );
        let err = CapabilityUnit::new("Orchestrator", "Coordinate.", Model::default())
            .unwrap()
            .with_tools(vec![
                delegate.as_tool("rethink", "first").unwrap(),
                delegate.as_tool("rethink", "second").unwrap(),
            ])
            .unwrap_err();

        let err = RunRethinkError::from(err);
        assert!(matches!(
            err,
            RunRethinkError::Configuration(DomainError::DuplicateToolName { .. })
        ));
        assert!(!err.is_user_correctable());
    }

    #[tokio::test]
    async fn test_custom_supervisor_is_invoked() {
        let gateway = Arc::new(ScriptedGateway::repeating(1, "done"));
        let supervisor =
            CapabilityUnit::new("Solo", "Answer directly.", Model::Gpt4oMini).unwrap();

        RunRethinkUseCase::new(Arc::clone(&gateway))
            .execute(input("q", 1).with_supervisor(supervisor))
            .await
            .unwrap();

        assert_eq!(gateway.calls.lock().unwrap()[0].0, "Solo");
    }
}
