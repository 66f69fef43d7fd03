use crate::config::RankingConfig;

/// Next stored value of an engagement counter after one user contact.
///
/// Reaching `threshold` wraps the counter to 0 instead of letting it grow,
/// so long-lived popular listings periodically lose their head start.
pub fn on_engagement(current: u32, threshold: u32) -> u32 {
    let next = current.saturating_add(1);
    if next >= threshold {
        0
    } else {
        next
    }
}

/// The increment rule bound to a configured threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngagementPolicy {
    pub threshold: u32,
}

impl EngagementPolicy {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    pub fn from_config(config: &RankingConfig) -> Self {
        Self::new(config.engagement_reset_threshold)
    }

    pub fn next(&self, current: u32) -> u32 {
        on_engagement(current, self.threshold)
    }

    /// Whether the next engagement wraps the counter
    pub fn resets_after(&self, current: u32) -> bool {
        current.saturating_add(1) >= self.threshold
    }
}
