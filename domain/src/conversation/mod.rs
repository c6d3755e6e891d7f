//! Conversation domain.
//!
//! - [`entities::ConversationEntry`] — one chronological entry (message, tool call, tool output)
//! - [`input_list::InputList`] — the ordered history threaded between rounds
//! - [`stream::StreamEvent`] — incremental events produced while a round streams

pub mod entities;
pub mod input_list;
pub mod stream;
