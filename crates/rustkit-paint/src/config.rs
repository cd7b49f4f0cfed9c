//! Resolver configuration.

/// What to do when a template chain loops back on itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePolicy {
    /// Keep the attributes merged before the loop was detected.
    #[default]
    UsePartial,
    /// Treat the whole reference as unresolvable and use the fallback.
    Fallback,
}

/// Paint resolution configuration.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Maximum number of template links followed from one paint server.
    pub max_template_chain: usize,
    /// Handling of cyclic template links.
    pub cycle_policy: CyclePolicy,
    /// Collect the errors behind each degraded paint in `PaintOutcome`.
    pub report_degradations: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_template_chain: 256,
            cycle_policy: CyclePolicy::UsePartial,
            report_degradations: true,
        }
    }
}

impl ResolverConfig {
    /// Create a strict configuration: cyclic or overlong template chains fall back.
    pub fn strict() -> Self {
        Self {
            max_template_chain: 32,
            cycle_policy: CyclePolicy::Fallback,
            ..Default::default()
        }
    }

    /// Create a configuration for hot render paths that skips error collection.
    pub fn quiet() -> Self {
        Self {
            report_degradations: false,
            ..Default::default()
        }
    }

    /// Set the template chain limit.
    pub fn with_max_template_chain(mut self, limit: usize) -> Self {
        self.max_template_chain = limit;
        self
    }

    /// Set the cycle policy.
    pub fn with_cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.cycle_policy = policy;
        self
    }
}
