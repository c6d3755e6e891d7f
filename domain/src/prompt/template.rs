//! Instruction texts for the rethink team

/// Templates for each role's instructions
pub struct RethinkPrompts;

impl RethinkPrompts {
    /// Instructions for the delegate that reworks a message
    pub fn rethink_instructions() -> &'static str {
        r#"Your job is to take a message and rethink it. You will be given a message and you will need to provide a nuanced, rethought perspective."#
    }

    /// Instructions for the delegate that condenses the rounds
    pub fn finalize_instructions() -> &'static str {
        r#"Aggregate and summarize these iterative critiques into one concise and refined final answer."#
    }

    /// Instructions for the supervising unit
    pub fn supervisor_instructions(iterations: usize) -> String {
        format!(
            r#"Your job is to take a message and rethink it. You will be given a message and you will need to provide a nuanced, rethought perspective.
You will have {} iterations to provide a refined answer.
Use the `rethink` tool to obtain a rethought perspective, building on what earlier iterations produced.
At the end you will need to aggregate and summarize these iterative critiques into one concise and refined final answer, using the `finalize` tool."#,
            iterations
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supervisor_instructions() {
        let text = RethinkPrompts::supervisor_instructions(5);
        assert!(text.contains("5 iterations"));
        assert!(text.contains("`rethink`"));
        assert!(text.contains("`finalize`"));
    }
}
