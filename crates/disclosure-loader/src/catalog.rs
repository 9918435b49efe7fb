//! Guide catalog and discovery
//!
//! The catalog keeps every guide's Level 1 metadata resident together with
//! the trigger table. Registration order is the tie-break order.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::guide::Guide;
use crate::store::FsStore;
use crate::trigger::{explicit_invocations, TriggerTable};

/// Ordered set of registered guides
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    guides: Vec<Guide>,
    index: HashMap<String, usize>,
    triggers: TriggerTable<usize>,
}

impl Catalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a guide; returns `false` when the id is already taken
    pub fn register(&mut self, guide: Guide) -> bool {
        if self.index.contains_key(guide.id()) {
            warn!("Guide '{}' already registered, keeping the first", guide.id());
            return false;
        }

        let slot = self.guides.len();
        self.index.insert(guide.id().to_string(), slot);
        self.triggers.register(slot, guide.trigger_keywords());
        self.guides.push(guide);
        true
    }

    /// Builder form of [`Catalog::register`]
    #[must_use]
    pub fn with_guide(mut self, guide: Guide) -> Self {
        self.register(guide);
        self
    }

    /// Get a guide by id
    pub fn get(&self, id: &str) -> Option<&Guide> {
        self.index.get(id).map(|&slot| &self.guides[slot])
    }

    /// Guide selected by the topic signal
    ///
    /// An explicit `/id` or `@id` invocation wins, the earliest in the signal
    /// first. Otherwise the first-registered guide whose keywords occur in
    /// the signal is returned.
    pub fn evaluate(&self, signal: &str) -> Option<&Guide> {
        if let Some(guide) = explicit_invocations(signal)
            .iter()
            .find_map(|name| self.get(name))
        {
            return Some(guide);
        }

        self.triggers
            .first_match(signal)
            .map(|&slot| &self.guides[slot])
    }

    /// Every guide whose keywords occur in the signal, in registration order
    pub fn evaluate_all(&self, signal: &str) -> Vec<&Guide> {
        self.triggers
            .matches(signal)
            .map(|&slot| &self.guides[slot])
            .collect()
    }

    /// Guides in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Guide> {
        self.guides.iter()
    }

    /// Guide ids in registration order
    pub fn guide_ids(&self) -> impl Iterator<Item = &str> {
        self.guides.iter().map(Guide::id)
    }

    /// Number of guides
    #[must_use]
    pub fn len(&self) -> usize {
        self.guides.len()
    }

    /// Whether no guide is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guides.is_empty()
    }

    /// Level 1 block for the model's working context
    /// Format:
    /// Available guides (use /{guide-name} to activate):
    /// - guide-name: What the guide covers and when to use it
    pub fn summary_prompt(&self) -> String {
        if self.guides.is_empty() {
            return String::new();
        }

        let mut prompt = String::from("Available guides (use /{guide-name} to activate):\n");

        let mut sorted: Vec<_> = self.guides.iter().collect();
        sorted.sort_by_key(|g| g.id());

        for guide in sorted {
            prompt.push_str(&guide.to_summary());
            prompt.push('\n');
        }

        prompt
    }
}

/// Scans guide directories and builds a [`Catalog`]
#[derive(Debug, Clone, Default)]
pub struct GuideDiscovery {
    directories: Vec<PathBuf>,
}

impl GuideDiscovery {
    /// Create a discovery with no directories
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a guides directory to scan
    #[must_use]
    pub fn add_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directories.push(dir.into());
        self
    }

    /// Add personal guides directory: ~/.disclosure/guides/
    #[must_use]
    pub fn with_personal_guides(self) -> Self {
        if let Some(home) = dirs::home_dir() {
            self.add_directory(home.join(".disclosure").join("guides"))
        } else {
            warn!("Could not find home directory for personal guides");
            self
        }
    }

    /// Add project guides directory: ./.disclosure/guides/
    #[must_use]
    pub fn with_project_guides(self) -> Self {
        self.add_directory(PathBuf::from(".disclosure/guides"))
    }

    /// Directories in scan order
    #[must_use]
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Filesystem store serving exactly the scanned directories
    #[must_use]
    pub fn store(&self) -> FsStore {
        FsStore::new(self.directories.iter().cloned())
    }

    /// Scan every directory and register the guides found (Level 1 only)
    ///
    /// Directories are scanned in the order added, guide folders within a
    /// directory in name order. Malformed guides are skipped.
    pub fn discover(&self) -> Result<Catalog> {
        info!(
            "Starting guide discovery in {} directories",
            self.directories.len()
        );

        let mut catalog = Catalog::new();

        for dir in &self.directories {
            if !dir.exists() {
                debug!("Guides directory does not exist: {:?}", dir);
                continue;
            }

            if !dir.is_dir() {
                warn!("Guides path is not a directory: {:?}", dir);
                continue;
            }

            scan_directory(dir, &mut catalog)?;
        }

        info!("Discovered {} guides", catalog.len());
        Ok(catalog)
    }
}

/// Scan a single directory for guide folders
fn scan_directory(dir: &Path, catalog: &mut Catalog) -> Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read directory {dir:?}"))?;

    let mut folders = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            folders.push(path);
        }
    }
    folders.sort();

    for path in folders {
        match Guide::from_dir(&path) {
            Ok(guide) => {
                debug!("Discovered guide: {} at {:?}", guide.id(), path);
                catalog.register(guide);
            }
            Err(e) => {
                debug!("Skipping {:?}: {:#}", path, e);
            }
        }
    }

    Ok(())
}
