use gambit_engine::context::now_rfc3339;

/// A chosen action with the agent's confidence and stated reasoning.
/// Produced once per AI turn; immutable after construction.
#[derive(Debug, Clone)]
pub struct Decision<A> {
    pub action: A,
    /// Always within `[0.0, 1.0]`.
    pub confidence: f64,
    pub reasoning: String,
    pub agent_id: String,
    pub model: String,
    /// RFC3339 timestamp of when the decision was made.
    pub ts: String,
}

impl<A> Decision<A> {
    pub fn new(
        action: A,
        confidence: f64,
        reasoning: impl Into<String>,
        agent_id: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            action,
            confidence: confidence.clamp(0.0, 1.0),
            reasoning: reasoning.into(),
            agent_id: agent_id.into(),
            model: model.into(),
            ts: now_rfc3339(),
        }
    }
}
