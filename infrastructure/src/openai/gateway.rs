//! OpenAI-compatible LLM Gateway implementation
//!
//! Each `invoke_streamed` call spawns a task that runs the unit's tool loop:
//! stream a completion, execute any delegate tool calls it requests, feed the
//! outputs back and repeat until the model answers without calling tools.

use super::error::{OpenAiError, Result};
use super::protocol::ChatRequest;
use super::sse::{AssistantTurn, SseDecoder, SseFrame, TurnAccumulator, parse_chunk};
use async_trait::async_trait;
use futures::StreamExt;
use rethink_application::ports::llm_gateway::{GatewayError, LlmGateway, StreamHandle, StreamItem};
use rethink_domain::{
    CapabilityUnit, ConversationEntry, InputList, ResponseEvent, RunItemEvent, StreamEvent,
    ToolAdapter,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

const STREAM_BUFFER: usize = 64;

/// Connection settings for a Chat Completions endpoint.
///
/// Created once per process from the loaded configuration and read-only
/// afterwards.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL, e.g. `https://api.openai.com/v1`
    pub api_base: String,
    pub api_key: String,
    /// Connect timeout, the wait for response headers, and the longest the
    /// stream may stay silent
    pub timeout: Duration,
    /// Upper bound on tool-call turns within one invocation
    pub max_tool_turns: usize,
}

impl ProviderConfig {
    pub const DEFAULT_API_BASE: &'static str = "https://api.openai.com/v1";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
    pub const DEFAULT_MAX_TOOL_TURNS: usize = 8;

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_base: Self::DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
            timeout: Self::DEFAULT_TIMEOUT,
            max_tool_turns: Self::DEFAULT_MAX_TOOL_TURNS,
        }
    }

    /// Read the API key from `env_var`.
    pub fn from_env(env_var: &str) -> Result<Self> {
        let key = std::env::var(env_var)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| OpenAiError::MissingApiKey(env_var.to_string()))?;
        Ok(Self::new(key))
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_tool_turns(mut self, max_tool_turns: usize) -> Self {
        self.max_tool_turns = max_tool_turns;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

/// LLM Gateway over an OpenAI-compatible Chat Completions API
#[derive(Clone)]
pub struct OpenAiGateway {
    client: reqwest::Client,
    config: Arc<ProviderConfig>,
}

impl OpenAiGateway {
    pub fn new(config: ProviderConfig) -> std::result::Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        info!(api_base = %config.api_base, "OpenAiGateway initialized");

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Run `unit` over `history` until it answers without tool calls.
    ///
    /// Returns `Ok(())` early if the receiver went away.
    async fn run_tool_loop(
        &self,
        unit: &CapabilityUnit,
        mut history: InputList,
        tx: &mpsc::Sender<StreamItem>,
        history_tx: &watch::Sender<Option<InputList>>,
    ) -> Result<()> {
        if !emit(tx, StreamEvent::Other(RunItemEvent::AgentUpdated {
            name: unit.name().to_string(),
        }))
        .await
        {
            return Ok(());
        }

        let mut tool_turns = 0;
        loop {
            debug!(unit = unit.name(), turn = tool_turns, "Requesting completion");
            let turn = tokio::select! {
                biased;
                _ = tx.closed() => return Ok(()),
                turn = self.stream_turn(unit, &history, tx) => turn?,
            };
            let Some(assistant) = turn else {
                return Ok(());
            };

            if !assistant.content.is_empty() {
                history.push(ConversationEntry::assistant(assistant.content.as_str()));
                if !emit(tx, StreamEvent::Other(RunItemEvent::MessageOutput(assistant.content))).await {
                    return Ok(());
                }
            }

            if assistant.tool_calls.is_empty() {
                history_tx.send_replace(Some(history));
                emit(tx, StreamEvent::content_part_done()).await;
                return Ok(());
            }

            if tool_turns == self.config.max_tool_turns {
                return Err(OpenAiError::ToolTurnsExceeded(self.config.max_tool_turns));
            }
            tool_turns += 1;

            for call in assistant.tool_calls {
                let name = call.function.name;
                let arguments = call.function.arguments;

                history.push(ConversationEntry::tool_call(
                    call.id.as_str(),
                    name.as_str(),
                    arguments.as_str(),
                ));
                if !emit(tx, StreamEvent::Other(RunItemEvent::ToolCalled {
                    call_id: call.id.clone(),
                    name: name.clone(),
                    arguments: arguments.clone(),
                }))
                .await
                {
                    return Ok(());
                }

                let tool = unit
                    .find_tool(&name)
                    .ok_or_else(|| OpenAiError::UnknownTool(name.clone()))?;
                let output = tokio::select! {
                    biased;
                    _ = tx.closed() => {
                        debug!(tool = %name, "Stream abandoned, dropping delegate call");
                        return Ok(());
                    }
                    output = self.run_delegate(tool, &arguments) => output?,
                };

                history.push(ConversationEntry::tool_output(call.id.as_str(), output.as_str()));
                if !emit(tx, StreamEvent::Other(RunItemEvent::ToolOutput {
                    call_id: call.id,
                    output,
                }))
                .await
                {
                    return Ok(());
                }
            }
        }
    }

    async fn run_delegate(&self, tool: &ToolAdapter, arguments: &str) -> Result<String> {
        let input = ToolAdapter::input_from_arguments(arguments);
        info!(tool = tool.name(), unit = tool.unit().name(), "Running delegate");

        self.invoke(tool.unit(), &input)
            .await
            .map_err(|source| OpenAiError::Delegate {
                tool: tool.name().to_string(),
                source,
            })
    }

    /// Stream one completion, forwarding text deltas as they arrive.
    ///
    /// `Ok(None)` means the receiver was dropped mid-turn.
    async fn stream_turn(
        &self,
        unit: &CapabilityUnit,
        history: &InputList,
        tx: &mpsc::Sender<StreamItem>,
    ) -> Result<Option<AssistantTurn>> {
        let request = ChatRequest::for_unit(unit, history);
        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send();
        let response = match tokio::time::timeout(self.config.timeout, response).await {
            Err(_) => return Err(OpenAiError::Idle(self.config.timeout.as_secs())),
            Ok(response) => response?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), model = %unit.model(), "Completion request rejected");
            return Err(OpenAiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let mut body = response.bytes_stream();
        let mut decoder = SseDecoder::new();
        let mut accumulator = TurnAccumulator::new();
        let idle = self.config.timeout;

        'stream: loop {
            let bytes = match tokio::time::timeout(idle, body.next()).await {
                Err(_) => return Err(OpenAiError::Idle(idle.as_secs())),
                Ok(None) => break,
                Ok(Some(bytes)) => bytes?,
            };

            for frame in decoder.push(&bytes) {
                match frame {
                    SseFrame::Done => break 'stream,
                    SseFrame::Data(data) => {
                        for delta in accumulator.apply(parse_chunk(&data)?) {
                            if !emit(tx, StreamEvent::text_delta(delta)).await {
                                return Ok(None);
                            }
                        }
                    }
                }
            }
        }

        if let Some(SseFrame::Data(data)) = decoder.finish() {
            for delta in accumulator.apply(parse_chunk(&data)?) {
                if !emit(tx, StreamEvent::text_delta(delta)).await {
                    return Ok(None);
                }
            }
        }

        let turn = accumulator.finish();
        if let Some(reason) = &turn.finish_reason {
            emit(
                tx,
                StreamEvent::RawResponse(ResponseEvent::Other(format!("finish_reason:{}", reason))),
            )
            .await;
        }
        Ok(Some(turn))
    }
}

/// Send an event; `false` once the receiver is gone.
async fn emit(tx: &mpsc::Sender<StreamItem>, event: StreamEvent) -> bool {
    tx.send(Ok(event)).await.is_ok()
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn invoke_streamed(
        &self,
        unit: &CapabilityUnit,
        input: &InputList,
    ) -> std::result::Result<StreamHandle, GatewayError> {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let (history_tx, history_rx) = watch::channel(None);

        let gateway = self.clone();
        let unit = unit.clone();
        let input = input.clone();

        tokio::spawn(async move {
            if let Err(e) = gateway.run_tool_loop(&unit, input, &tx, &history_tx).await {
                warn!(unit = unit.name(), error = %e, "Invocation failed");
                let _ = tx.send(Err(e.into())).await;
            }
        });

        Ok(StreamHandle::new(rx).with_history(history_rx))
    }
}
