//! Bounded regeneration policy.
//!
//! When a generated output matches stored negative feedback (or reproduces
//! a just-rejected output), the orchestrator regenerates with perturbed
//! sampling parameters. The attempt budget and the escalation ladder are
//! data handed to the engine, not control flow inside it.

use riformula_llm::SamplingParams;

/// Maximum automatic regenerations and the parameters each attempt uses.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Automatic regenerations allowed per request.
    pub max_retries: u32,
    /// Parameters for retry attempt N; the last step repeats if attempts
    /// outnumber steps.
    escalation: Vec<SamplingParams>,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, escalation: Vec<SamplingParams>) -> Self {
        Self {
            max_retries,
            escalation,
        }
    }

    /// One retry, with the observed escalation ladder: a first re-roll at
    /// temperature 0.8 and a harder one at 0.9 with matching penalties.
    pub fn default_policy() -> Self {
        let base = SamplingParams::base();
        Self::new(
            1,
            vec![
                SamplingParams {
                    temperature: 0.8,
                    frequency_penalty: 0.4,
                    presence_penalty: 0.4,
                    ..base
                },
                SamplingParams {
                    temperature: 0.9,
                    frequency_penalty: 0.5,
                    presence_penalty: 0.5,
                    ..base
                },
            ],
        )
    }

    /// Disable automatic regeneration entirely.
    pub fn disabled() -> Self {
        Self::new(0, Vec::new())
    }

    /// Sampling parameters for retry `attempt` (zero-based).
    pub fn params_for_attempt(&self, attempt: u32) -> SamplingParams {
        self.escalation
            .get(attempt as usize)
            .or_else(|| self.escalation.last())
            .copied()
            .unwrap_or_else(SamplingParams::regeneration)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::default_policy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_allows_one_retry() {
        let policy = RetryPolicy::default_policy();
        assert_eq!(policy.max_retries, 1);
    }

    #[test]
    fn test_escalation_ladder_values() {
        let policy = RetryPolicy::default_policy();

        let first = policy.params_for_attempt(0);
        assert_eq!(first.temperature, 0.8);
        assert_eq!(first.frequency_penalty, 0.4);

        let second = policy.params_for_attempt(1);
        assert_eq!(second.temperature, 0.9);
        assert_eq!(second.presence_penalty, 0.5);
    }

    #[test]
    fn test_ladder_saturates_at_last_step() {
        let policy = RetryPolicy::default_policy();
        assert_eq!(policy.params_for_attempt(7), policy.params_for_attempt(1));
    }

    #[test]
    fn test_empty_ladder_falls_back_to_regeneration_params() {
        let policy = RetryPolicy::disabled();
        let params = policy.params_for_attempt(0);
        assert_eq!(params, SamplingParams::regeneration());
    }
}
