//! OpenAI-compatible Chat Completions adapter
//!
//! Implements [`LlmGateway`](rethink_application::LlmGateway) over HTTP with
//! server-sent event streaming. Delegate tools exposed by a unit are executed
//! inside the adapter by invoking the delegate unit on the same endpoint.

pub mod error;
pub mod gateway;
pub mod protocol;
pub mod sse;
