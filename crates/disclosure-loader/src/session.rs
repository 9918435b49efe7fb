//! Per-conversation load state
//!
//! A session owns the cache of loaded guide and reference bodies. It is
//! passed explicitly into every loader call and dropped at the end of the
//! conversation. Nothing is ever evicted.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// How much of a guide is in context; only ever increases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadLevel {
    /// Only the Level 1 summary (always true)
    #[default]
    SummaryOnly,
    /// Level 2 body loaded
    GuideLoaded,
    /// At least one Level 3 reference loaded
    ReferenceLoaded,
}

#[derive(Debug)]
struct GuideState {
    body: Arc<str>,
    level: LoadLevel,
    references: Vec<(String, Arc<str>)>,
}

/// Load cache for one conversation
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    guides: HashMap<String, GuideState>,
    load_order: Vec<String>,
    failures: HashMap<String, String>,
    fetches: usize,
}

impl Session {
    /// Start a new session
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            guides: HashMap::new(),
            load_order: Vec::new(),
            failures: HashMap::new(),
            fetches: 0,
        }
    }

    /// Session id, used in log spans
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current load level of a guide
    #[must_use]
    pub fn level(&self, guide: &str) -> LoadLevel {
        self.guides
            .get(guide)
            .map_or(LoadLevel::SummaryOnly, |state| state.level)
    }

    /// Whether the guide body is loaded
    #[must_use]
    pub fn is_guide_loaded(&self, guide: &str) -> bool {
        self.guides.contains_key(guide)
    }

    /// Whether the reference body is loaded
    #[must_use]
    pub fn is_reference_loaded(&self, guide: &str, reference: &str) -> bool {
        self.cached_reference(guide, reference).is_some()
    }

    /// Loaded guide ids, oldest first
    pub fn loaded_guides(&self) -> impl Iterator<Item = &str> {
        self.load_order.iter().map(String::as_str)
    }

    /// Most recently loaded guide
    #[must_use]
    pub fn latest_guide(&self) -> Option<&str> {
        self.load_order.last().map(String::as_str)
    }

    /// Loaded reference ids of a guide, oldest first
    pub fn loaded_references(&self, guide: &str) -> Vec<&str> {
        self.guides
            .get(guide)
            .map(|state| state.references.iter().map(|(id, _)| id.as_str()).collect())
            .unwrap_or_default()
    }

    /// Number of store fetches performed in this session
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    /// Targets (`guide` or `guide/reference`) whose content could not be fetched
    pub fn failed_targets(&self) -> impl Iterator<Item = &str> {
        self.failures.keys().map(String::as_str)
    }

    /// Failure message recorded for a target; it is not fetched again
    pub(crate) fn failure(&self, target: &str) -> Option<&str> {
        self.failures.get(target).map(String::as_str)
    }

    pub(crate) fn record_failure(&mut self, target: &str, reason: String) {
        self.failures.entry(target.to_string()).or_insert(reason);
    }

    pub(crate) fn cached_guide(&self, guide: &str) -> Option<Arc<str>> {
        self.guides.get(guide).map(|state| Arc::clone(&state.body))
    }

    pub(crate) fn cached_reference(&self, guide: &str, reference: &str) -> Option<Arc<str>> {
        self.guides.get(guide).and_then(|state| {
            state
                .references
                .iter()
                .find(|(id, _)| id == reference)
                .map(|(_, body)| Arc::clone(body))
        })
    }

    pub(crate) fn record_fetch(&mut self) {
        self.fetches += 1;
    }

    pub(crate) fn store_guide(&mut self, guide: &str, body: Arc<str>) {
        if self.guides.contains_key(guide) {
            return;
        }
        self.guides.insert(
            guide.to_string(),
            GuideState {
                body,
                level: LoadLevel::GuideLoaded,
                references: Vec::new(),
            },
        );
        self.load_order.push(guide.to_string());
    }

    /// Callers must have stored the owning guide first
    pub(crate) fn store_reference(&mut self, guide: &str, reference: &str, body: Arc<str>) {
        if let Some(state) = self.guides.get_mut(guide) {
            if !state.references.iter().any(|(id, _)| id == reference) {
                state.references.push((reference.to_string(), body));
            }
            state.level = state.level.max(LoadLevel::ReferenceLoaded);
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
