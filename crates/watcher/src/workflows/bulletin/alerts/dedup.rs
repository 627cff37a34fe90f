use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use super::AlertType;
use crate::workflows::bulletin::domain::ActId;

/// Dedup key for one rule on one act.
pub fn alert_key(act_id: &ActId, alert_type: AlertType) -> String {
    format!("{act_id}-{}", alert_type.as_str())
}

/// Process-lifetime record of `(act, rule)` pairs that already produced an
/// alert. Nothing is persisted; restarts start empty.
#[derive(Debug, Default)]
pub struct AlertDeduplicationCache {
    seen: Mutex<HashSet<String>>,
}

impl AlertDeduplicationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self, key: &str) -> bool {
        self.entries().contains(key)
    }

    /// Marks `key`, returning `false` when it was already present. Check and
    /// insert happen under one lock, so concurrent callers cannot both win.
    pub fn mark(&self, key: impl Into<String>) -> bool {
        self.entries().insert(key.into())
    }

    pub fn reset(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        // The set stays consistent even if a holder panicked mid-call.
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
