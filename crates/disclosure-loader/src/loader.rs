//! The context loader
//!
//! Decides which guide and reference bodies enter the model's context:
//! - Level 1: catalog summaries, always resident
//! - Level 2: a guide body, once its trigger matched
//! - Level 3: a reference body, once its guide is loaded and a sub-topic matched

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn};

use crate::catalog::Catalog;
use crate::error::{LoadError, Result};
use crate::fallback::FallbackStrategy;
use crate::guide::{strip_frontmatter, Guide, Reference};
use crate::session::{LoadLevel, Session};
use crate::store::ContentStore;

/// Loader over a catalog and a content store
///
/// Holds no per-conversation state; pass a [`Session`] into each call.
#[derive(Debug)]
pub struct Loader<S> {
    catalog: Catalog,
    store: S,
}

/// A piece of text newly disclosed to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Blob {
    /// Owning guide id
    pub guide: String,
    /// Reference id for Level 3 text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Level the text belongs to
    pub level: LoadLevel,
    /// Body text
    pub text: String,
}

/// Non-fatal problem met while serving a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadWarning {
    /// Guide involved
    pub guide: String,
    /// Reference involved, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Human-readable message
    pub message: String,
}

/// Outcome of one request pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct Disclosure {
    /// Guide selected by the topic trigger
    pub matched_guide: Option<String>,
    /// Reference selected by the sub-topic trigger
    pub matched_reference: Option<String>,
    /// Text loaded for the first time in this session, in load order
    pub blobs: Vec<Blob>,
    /// Missing-content problems; the request still completed
    pub warnings: Vec<LoadWarning>,
    /// Advisory fallback plan of the matched guide
    pub fallbacks: Vec<FallbackStrategy>,
}

impl Disclosure {
    /// Whether nothing beyond the Level 1 summaries was added
    #[must_use]
    pub fn is_summary_only(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl<S: ContentStore> Loader<S> {
    /// Create a loader
    pub fn new(catalog: Catalog, store: S) -> Self {
        Self { catalog, store }
    }

    /// Registered guides
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Backing content store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Level 1 summaries of every guide
    pub fn summaries(&self) -> String {
        self.catalog.summary_prompt()
    }

    /// Best-matching guide for a topic signal; first registered wins on ties
    pub fn evaluate_trigger(&self, signal: &str) -> Option<&Guide> {
        self.catalog.evaluate(signal)
    }

    /// Level 2 body of a guide, fetched at most once per session
    pub fn load_guide(&self, session: &mut Session, guide_id: &str) -> Result<Arc<str>> {
        self.ensure_guide(session, guide_id).map(|(body, _)| body)
    }

    /// Reference of a loaded guide that the sub-topic signal mentions
    ///
    /// Returns `None` while the guide is not loaded in `session`.
    pub fn evaluate_sub_trigger(
        &self,
        session: &Session,
        guide_id: &str,
        signal: &str,
    ) -> Option<&Reference> {
        self.matching_references(session, guide_id, signal)
            .into_iter()
            .next()
    }

    /// Every reference of a loaded guide that the signal mentions, in declaration order
    pub fn matching_references(
        &self,
        session: &Session,
        guide_id: &str,
        signal: &str,
    ) -> Vec<&Reference> {
        if !session.is_guide_loaded(guide_id) {
            return Vec::new();
        }
        self.catalog
            .get(guide_id)
            .map(|guide| {
                guide
                    .references()
                    .iter()
                    .filter(|r| r.matches(signal))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Level 3 body of a reference; its guide must already be loaded
    pub fn load_reference(
        &self,
        session: &mut Session,
        guide_id: &str,
        reference_id: &str,
    ) -> Result<Arc<str>> {
        self.ensure_reference(session, guide_id, reference_id)
            .map(|(body, _)| body)
    }

    /// Serve one request: trigger, load the guide, then at most one reference
    ///
    /// When no guide matches, the sub-topic is checked against the most
    /// recently loaded guide. Failures become warnings; this never errors.
    pub fn handle_request(&self, session: &mut Session, signal: &str) -> Disclosure {
        let span = info_span!("request", session = %session.id());
        let _enter = span.enter();

        let mut disclosure = Disclosure::default();

        let active = match self.evaluate_trigger(signal) {
            Some(guide) => {
                disclosure.matched_guide = Some(guide.id().to_string());
                disclosure.fallbacks = guide.fallbacks().to_vec();
                match self.ensure_guide(session, guide.id()) {
                    Ok((body, fresh)) => {
                        if fresh {
                            disclosure.blobs.push(Blob {
                                guide: guide.id().to_string(),
                                reference: None,
                                level: LoadLevel::GuideLoaded,
                                text: body.to_string(),
                            });
                        }
                        Some(guide.id().to_string())
                    }
                    Err(e) => {
                        warn!("Falling back to summaries: {}", e);
                        disclosure.warnings.push(LoadWarning {
                            guide: guide.id().to_string(),
                            reference: None,
                            message: e.to_string(),
                        });
                        None
                    }
                }
            }
            None => {
                debug!("No guide matched the topic signal");
                session.latest_guide().map(str::to_string)
            }
        };

        let Some(guide_id) = active else {
            return disclosure;
        };

        let Some(reference_id) = self
            .evaluate_sub_trigger(session, &guide_id, signal)
            .map(|r| r.id().to_string())
        else {
            return disclosure;
        };

        disclosure.matched_reference = Some(reference_id.clone());
        match self.ensure_reference(session, &guide_id, &reference_id) {
            Ok((body, fresh)) => {
                if fresh {
                    disclosure.blobs.push(Blob {
                        guide: guide_id,
                        reference: Some(reference_id),
                        level: LoadLevel::ReferenceLoaded,
                        text: body.to_string(),
                    });
                }
            }
            Err(e) => {
                warn!("Reference unavailable: {}", e);
                disclosure.warnings.push(LoadWarning {
                    guide: guide_id,
                    reference: Some(reference_id),
                    message: e.to_string(),
                });
            }
        }

        disclosure
    }

    /// Returns the body and whether it was fetched by this call
    fn ensure_guide(&self, session: &mut Session, guide_id: &str) -> Result<(Arc<str>, bool)> {
        if let Some(body) = session.cached_guide(guide_id) {
            debug!("Guide '{}' served from session cache", guide_id);
            return Ok((body, false));
        }

        let guide = self
            .catalog
            .get(guide_id)
            .ok_or_else(|| LoadError::GuideNotFound {
                guide: guide_id.into(),
            })?;

        if let Some(reason) = session.failure(guide_id) {
            debug!("Guide '{}' failed earlier in this session", guide_id);
            return Err(LoadError::NotRetried {
                target: guide_id.into(),
                reason: reason.into(),
            });
        }

        session.record_fetch();
        let raw = match self.store.fetch(guide.content_key()) {
            Ok(raw) => raw,
            Err(source) => {
                session.record_failure(guide_id, source.to_string());
                return Err(LoadError::ContentUnavailable {
                    target: guide_id.into(),
                    source,
                });
            }
        };

        let body: Arc<str> = Arc::from(strip_frontmatter(&raw));
        session.store_guide(guide_id, Arc::clone(&body));
        info!("Loaded guide '{}' ({} bytes)", guide_id, body.len());
        Ok((body, true))
    }

    fn ensure_reference(
        &self,
        session: &mut Session,
        guide_id: &str,
        reference_id: &str,
    ) -> Result<(Arc<str>, bool)> {
        let guide = self
            .catalog
            .get(guide_id)
            .ok_or_else(|| LoadError::GuideNotFound {
                guide: guide_id.into(),
            })?;

        let reference = guide
            .reference(reference_id)
            .ok_or_else(|| LoadError::ReferenceNotFound {
                guide: guide_id.into(),
                reference: reference_id.into(),
            })?;

        if !session.is_guide_loaded(guide_id) {
            return Err(LoadError::GuideNotLoaded {
                guide: guide_id.into(),
                reference: reference_id.into(),
            });
        }

        if let Some(body) = session.cached_reference(guide_id, reference_id) {
            debug!(
                "Reference '{}/{}' served from session cache",
                guide_id, reference_id
            );
            return Ok((body, false));
        }

        let target = format!("{guide_id}/{reference_id}");
        if let Some(reason) = session.failure(&target) {
            debug!("Reference '{}' failed earlier in this session", target);
            return Err(LoadError::NotRetried {
                target,
                reason: reason.into(),
            });
        }

        session.record_fetch();
        let body: Arc<str> = match self.store.fetch(reference.content_key()) {
            Ok(raw) => Arc::from(raw),
            Err(source) => {
                session.record_failure(&target, source.to_string());
                return Err(LoadError::ContentUnavailable { target, source });
            }
        };

        session.store_reference(guide_id, reference_id, Arc::clone(&body));
        info!(
            "Loaded reference '{}/{}' ({} bytes)",
            guide_id,
            reference_id,
            body.len()
        );
        Ok((body, true))
    }
}
