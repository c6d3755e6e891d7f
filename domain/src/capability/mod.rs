//! Capability domain module
//!
//! A [`CapabilityUnit`](unit::CapabilityUnit) is a named, instructed model
//! target. A supervising unit can be given other units as
//! [`ToolAdapter`](tool::ToolAdapter)s, which the model may call while it
//! reasons:
//!
//! ```text
//! ┌──────────────────────────┐
//! │ Orchestrator (supervisor)│
//! │  tools:                  │      ┌─────────────────────┐
//! │   rethink  ──────────────┼─────▶│ Rethinking Subagent │
//! │   finalize ──────────────┼──┐   └─────────────────────┘
//! └──────────────────────────┘  │   ┌─────────────────────┐
//!                               └──▶│ Final Answer Agent  │
//!                                   └─────────────────────┘
//! ```
//!
//! [`RethinkTeam`](team::RethinkTeam) builds this standard roster.

pub mod team;
pub mod tool;
pub mod unit;
