//! Inclusion policy: allocations above 10% are reported as selected

use coolplan_common::INCLUSION_THRESHOLD;

/// Reporting filter applied to the raw best allocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InclusionPolicy {
    threshold: f64,
}

impl Default for InclusionPolicy {
    fn default() -> Self {
        Self::new(INCLUSION_THRESHOLD)
    }
}

impl InclusionPolicy {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn should_include(&self, allocation: f64) -> bool {
        allocation > self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_exclusive() {
        let policy = InclusionPolicy::default();
        assert!(!policy.should_include(0.1));
        assert!(!policy.should_include(0.05));
        assert!(policy.should_include(0.1000001));
        assert!(policy.should_include(1.0));
    }
}
