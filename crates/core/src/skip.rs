//! Non-fatal skip signalling.
//!
//! A skip is a deliberate "did not publish" outcome, distinct from an error.
//! Skips from multiple recipes are batched in a [`SkipSet`] and reported
//! together only after every recipe has been attempted, so generated formula
//! files stay around for inspection even when publication is skipped.

use std::collections::BTreeSet;

/// Collects skip reasons across recipes.
#[derive(Debug, Default, Clone)]
pub struct SkipSet {
    reasons: BTreeSet<String>,
}

impl SkipSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers one skip reason.
    pub fn remember(&mut self, reason: impl Into<String>) {
        self.reasons.insert(reason.into());
    }

    /// Returns true when no skips were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    /// Returns the combined human-readable notice, if any skip was recorded.
    ///
    /// Reasons are sorted and deduplicated.
    #[must_use]
    pub fn notice(&self) -> Option<String> {
        if self.reasons.is_empty() {
            return None;
        }
        let combined: Vec<&str> = self.reasons.iter().map(String::as_str).collect();
        Some(format!("publishing skipped: {}", combined.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_has_no_notice() {
        let skips = SkipSet::new();
        assert!(skips.is_empty());
        assert!(skips.notice().is_none());
    }

    #[test]
    fn test_notice_combines_sorted_reasons() {
        let mut skips = SkipSet::new();
        skips.remember("prerelease detected with 'auto' upload");
        skips.remember("brew.skip_upload is set");
        let notice = skips.notice().unwrap_or_default();
        assert!(notice.starts_with("publishing skipped: "));
        // BTreeSet ordering puts the quoted reason after the bare one
        assert!(notice.contains("brew.skip_upload is set; prerelease detected"));
    }

    #[test]
    fn test_duplicate_reasons_collapse() {
        let mut skips = SkipSet::new();
        skips.remember("same reason");
        skips.remember("same reason");
        assert_eq!(skips.notice().unwrap_or_default().matches("same reason").count(), 1);
    }
}
