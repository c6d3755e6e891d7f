//! The standard rethink roster.

use super::unit::CapabilityUnit;
use crate::core::error::DomainError;
use crate::core::model::Model;
use crate::orchestration::value_objects::IterationBudget;
use crate::prompt::RethinkPrompts;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const RETHINK_TOOL: &str = "rethink";
pub const FINALIZE_TOOL: &str = "finalize";

/// Which model backs each role of the team.
///
/// # Example
///
/// ```
/// use rethink_domain::capability::team::TeamModels;
/// use rethink_domain::Model;
///
/// let models = TeamModels::uniform(Model::Gpt41).with_rethink(Model::Gpt4oMini);
/// assert_eq!(models.supervisor, Model::Gpt41);
/// assert_eq!(models.rethink, Model::Gpt4oMini);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TeamModels {
    pub supervisor: Model,
    pub rethink: Model,
    pub finalize: Model,
}

impl TeamModels {
    /// Same model for every role.
    pub fn uniform(model: Model) -> Self {
        Self {
            supervisor: model.clone(),
            rethink: model.clone(),
            finalize: model,
        }
    }

    pub fn with_supervisor(mut self, model: Model) -> Self {
        self.supervisor = model;
        self
    }

    pub fn with_rethink(mut self, model: Model) -> Self {
        self.rethink = model;
        self
    }

    pub fn with_finalize(mut self, model: Model) -> Self {
        self.finalize = model;
        self
    }
}

/// Supervisor plus its two delegates
#[derive(Debug, Clone)]
pub struct RethinkTeam {
    supervisor: CapabilityUnit,
    rethinker: Arc<CapabilityUnit>,
    finalizer: Arc<CapabilityUnit>,
}

impl RethinkTeam {
    pub fn build(models: &TeamModels, budget: IterationBudget) -> Result<Self, DomainError> {
        let rethinker = Arc::new(CapabilityUnit::new(
            "Rethinking Subagent",
            RethinkPrompts::rethink_instructions(),
            models.rethink.clone(),
        )?);

        let finalizer = Arc::new(CapabilityUnit::new(
            "Final Answer Agent",
            RethinkPrompts::finalize_instructions(),
            models.finalize.clone(),
        )?);

        let supervisor = CapabilityUnit::new(
            "Orchestrator",
            RethinkPrompts::supervisor_instructions(budget.get()),
            models.supervisor.clone(),
        )?
        .with_tools(vec![
            rethinker.as_tool(RETHINK_TOOL, "iterative rethinking subagent")?,
            finalizer.as_tool(
                FINALIZE_TOOL,
                "after the rethink iterations produces a final answer",
            )?,
        ])?;

        Ok(Self {
            supervisor,
            rethinker,
            finalizer,
        })
    }

    pub fn supervisor(&self) -> &CapabilityUnit {
        &self.supervisor
    }

    pub fn rethinker(&self) -> &Arc<CapabilityUnit> {
        &self.rethinker
    }

    pub fn finalizer(&self) -> &Arc<CapabilityUnit> {
        &self.finalizer
    }

    pub fn into_supervisor(self) -> CapabilityUnit {
        self.supervisor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_wiring() {
        let models = TeamModels::uniform(Model::Gpt4o).with_finalize(Model::Gpt41);
        let team = RethinkTeam::build(&models, IterationBudget::default()).unwrap();

        let supervisor = team.supervisor();
        assert_eq!(supervisor.name(), "Orchestrator");
        assert_eq!(supervisor.tools().len(), 2);
        assert_eq!(supervisor.tools()[0].name(), RETHINK_TOOL);
        assert_eq!(supervisor.tools()[1].name(), FINALIZE_TOOL);
        assert_eq!(
            supervisor.find_tool(FINALIZE_TOOL).unwrap().unit().model(),
            &Model::Gpt41
        );
        assert!(!team.rethinker().has_tools());
    }

    #[test]
    fn test_supervisor_instructions_mention_budget() {
        let team =
            RethinkTeam::build(&TeamModels::default(), IterationBudget::new(3).unwrap()).unwrap();
        assert!(team.supervisor().instructions().contains("3 iterations"));
    }
}
