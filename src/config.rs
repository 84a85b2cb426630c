// What the controller does with a protocol violation after logging it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationPolicy {
    Panic,
    // reject the operation, leave state unchanged, return the error
    Reject,
}

impl Default for ViolationPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Panic
        } else {
            Self::Reject
        }
    }
}

const PARALLEL_DIFF_THRESHOLD: usize = 8;

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub violation_policy: ViolationPolicy,
    // edited sections per batch from which sections are diffed on rayon
    pub parallel_diff_threshold: usize,
    pub sections_descending: bool,
}

impl ControllerConfig {
    pub fn new() -> Self {
        Self {
            violation_policy: ViolationPolicy::default(),
            parallel_diff_threshold: PARALLEL_DIFF_THRESHOLD,
            sections_descending: false,
        }
    }

    pub fn with_violation_policy(mut self, policy: ViolationPolicy) -> Self {
        self.violation_policy = policy;
        self
    }

    pub fn with_parallel_diff_threshold(mut self, threshold: usize) -> Self {
        self.parallel_diff_threshold = threshold.max(1);
        self
    }

    pub fn with_sections_descending(mut self, descending: bool) -> Self {
        self.sections_descending = descending;
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ControllerConfig::new()
            .with_violation_policy(ViolationPolicy::Reject)
            .with_parallel_diff_threshold(0)
            .with_sections_descending(true);

        assert_eq!(config.violation_policy, ViolationPolicy::Reject);
        assert_eq!(config.parallel_diff_threshold, 1);
        assert!(config.sections_descending);
    }

    #[test]
    fn test_default_threshold() {
        assert_eq!(ControllerConfig::default().parallel_diff_threshold, PARALLEL_DIFF_THRESHOLD);
    }
}
