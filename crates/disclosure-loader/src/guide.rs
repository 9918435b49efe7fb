//! Guide and reference definitions, and parsing of guide directories
//!
//! Each guide on disk is a folder containing GUIDE.md with YAML frontmatter.
//! Only the frontmatter is kept at discovery time; the body is fetched
//! through a content store when the guide is triggered.

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Component, Path};
use tracing::warn;

use crate::fallback::FallbackStrategy;
use crate::trigger::{contains_any, normalize, normalize_keywords};

/// Expected filename for guide definitions
pub const GUIDE_FILENAME: &str = "GUIDE.md";
/// Maximum recommended id length
const MAX_ID_LENGTH: usize = 64;
/// Maximum recommended summary length
const MAX_DESCRIPTION_LENGTH: usize = 1024;

/// Frontmatter of a GUIDE.md file
#[derive(Debug, Clone, Deserialize)]
pub struct GuideFrontmatter {
    /// Guide id (lowercase letters, numbers, hyphens)
    pub name: String,
    /// Level 1 summary: what the guide covers and when to use it
    pub description: String,
    /// Topic keywords
    #[serde(default)]
    pub triggers: Vec<String>,
    /// Bundled reference documents
    #[serde(default)]
    pub references: Vec<ReferenceEntry>,
    /// Advisory fallback plan, in order
    #[serde(default)]
    pub fallbacks: Vec<FallbackStrategy>,
}

/// A reference as declared in guide frontmatter
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceEntry {
    /// Reference id, unique within the guide
    pub name: String,
    /// Path relative to the guide directory
    pub path: String,
    /// Sub-topic keywords
    #[serde(default)]
    pub triggers: Vec<String>,
}

/// A sub-document owned by exactly one guide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    id: String,
    content_key: String,
    triggers: Vec<String>,
}

impl Reference {
    /// Create a reference; with no triggers its id (hyphens as spaces) is the keyword
    pub fn new<I, S>(id: impl Into<String>, content_key: impl Into<String>, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let id = id.into();
        let mut triggers = normalize_keywords(triggers);
        if triggers.is_empty() {
            triggers = normalize_keywords([id.replace('-', " ")]);
        }
        Self {
            id,
            content_key: content_key.into(),
            triggers,
        }
    }

    /// Reference id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Storage key of the reference body
    pub fn content_key(&self) -> &str {
        &self.content_key
    }

    /// Normalized sub-topic keywords
    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    /// Whether the sub-topic signal mentions this reference
    pub fn matches(&self, signal: &str) -> bool {
        contains_any(&self.triggers, &normalize(signal))
    }
}

/// A named unit of reference text, gated behind a topic trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guide {
    id: String,
    description: String,
    content_key: String,
    triggers: Vec<String>,
    references: Vec<Reference>,
    fallbacks: Vec<FallbackStrategy>,
}

impl Guide {
    /// Create a guide with no triggers, references or fallbacks
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        content_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            content_key: content_key.into(),
            triggers: Vec::new(),
            references: Vec::new(),
            fallbacks: Vec::new(),
        }
    }

    /// Set the topic keywords
    #[must_use]
    pub fn with_triggers<I, S>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.triggers = normalize_keywords(triggers);
        self
    }

    /// Append a reference; a second reference with the same id is ignored
    #[must_use]
    pub fn with_reference(mut self, reference: Reference) -> Self {
        if self.reference(reference.id()).is_some() {
            warn!(
                "Guide '{}' declares reference '{}' twice, keeping the first",
                self.id,
                reference.id()
            );
        } else {
            self.references.push(reference);
        }
        self
    }

    /// Append a fallback strategy
    #[must_use]
    pub fn with_fallback(mut self, strategy: FallbackStrategy) -> Self {
        self.fallbacks.push(strategy);
        self
    }

    /// Load guide metadata from a directory containing GUIDE.md
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let guide_file = dir.join(GUIDE_FILENAME);

        if !guide_file.exists() {
            return Err(anyhow!("{} not found in {:?}", GUIDE_FILENAME, dir));
        }

        let content = fs::read_to_string(&guide_file)
            .with_context(|| format!("Failed to read {guide_file:?}"))?;

        let frontmatter = parse_frontmatter(&content)
            .with_context(|| format!("Failed to parse guide from {guide_file:?}"))?;

        validate_id("Guide", &frontmatter.name)?;
        if frontmatter.description.trim().is_empty() {
            return Err(anyhow!("Guide '{}' description cannot be empty", frontmatter.name));
        }
        if frontmatter.description.len() > MAX_DESCRIPTION_LENGTH {
            warn!(
                "Guide '{}' description exceeds {} characters (was {}), may be truncated",
                frontmatter.name,
                MAX_DESCRIPTION_LENGTH,
                frontmatter.description.len()
            );
        }

        let mut guide = Self::new(
            frontmatter.name,
            frontmatter.description.trim(),
            path_key(&guide_file),
        )
        .with_triggers(frontmatter.triggers);

        for entry in frontmatter.references {
            validate_id("Reference", &entry.name)?;
            let relative = Path::new(&entry.path);
            if !is_contained(relative) {
                return Err(anyhow!(
                    "Reference '{}' path {:?} must stay inside the guide directory",
                    entry.name,
                    entry.path
                ));
            }
            guide = guide.with_reference(Reference::new(
                entry.name,
                path_key(&dir.join(relative)),
                entry.triggers,
            ));
        }

        guide.fallbacks = frontmatter.fallbacks;
        Ok(guide)
    }

    /// Guide id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Level 1 summary text
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Storage key of the Level 2 body
    pub fn content_key(&self) -> &str {
        &self.content_key
    }

    /// Declared topic keywords (normalized)
    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    /// Keywords registered in the trigger table, including `/id` and `@id`
    pub fn trigger_keywords(&self) -> Vec<String> {
        let mut keywords = self.triggers.clone();
        keywords.push(format!("/{}", self.id));
        keywords.push(format!("@{}", self.id));
        normalize_keywords(keywords)
    }

    /// Owned references in declaration order
    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// Look up an owned reference
    pub fn reference(&self, id: &str) -> Option<&Reference> {
        self.references.iter().find(|r| r.id == id)
    }

    /// Advisory fallback plan in order
    pub fn fallbacks(&self) -> &[FallbackStrategy] {
        &self.fallbacks
    }

    /// Summary line: "- {id}: {description}"
    pub fn to_summary(&self) -> String {
        format!("- {}: {}", self.id, self.description)
    }
}

/// Strip YAML frontmatter, returning the body; text without frontmatter is returned as-is
pub fn strip_frontmatter(content: &str) -> &str {
    match split_frontmatter(content) {
        Ok(Some((_, body))) => body,
        _ => content,
    }
}

fn split_frontmatter(content: &str) -> Result<Option<(&str, &str)>> {
    let frontmatter_re = Regex::new(r"^---\s*\n([\s\S]*?)\n---[ \t]*(?:\r?\n|$)([\s\S]*)$")
        .map_err(|e| anyhow!("Failed to compile regex: {}", e))?;

    let Some(captures) = frontmatter_re.captures(content) else {
        return Ok(None);
    };

    let yaml = captures.get(1).map_or("", |m| m.as_str());
    let body = captures.get(2).map_or("", |m| m.as_str());
    Ok(Some((yaml, body)))
}

/// Parse the YAML frontmatter of a GUIDE.md file
pub fn parse_frontmatter(content: &str) -> Result<GuideFrontmatter> {
    let (yaml, _) =
        split_frontmatter(content)?.ok_or_else(|| anyhow!("No valid YAML frontmatter found"))?;

    serde_yaml::from_str(yaml).with_context(|| "Failed to parse YAML frontmatter")
}

/// Validate a guide or reference id
fn validate_id(kind: &str, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(anyhow!("{} name cannot be empty", kind));
    }

    if id.len() > MAX_ID_LENGTH {
        warn!(
            "{} name '{}' exceeds {} characters (was {})",
            kind,
            id,
            MAX_ID_LENGTH,
            id.len()
        );
    }

    let id_re = Regex::new(r"^[a-z0-9-]+$")
        .map_err(|e| anyhow!("Failed to compile name validation regex: {}", e))?;

    if !id_re.is_match(id) {
        return Err(anyhow!(
            "{} name '{}' must contain only lowercase letters, numbers, and hyphens",
            kind,
            id
        ));
    }

    Ok(())
}

/// Relative, and never climbs out through `..`
fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const VUE_GUIDE: &str = r"---
name: vue
description: Vue 3 guidance. Use for components, composables and reactivity.
triggers: [Vue, composable, reactivity]
references:
  - name: vueuse-guidelines
    path: references/vueuse-guidelines.md
    triggers: [vueuse]
  - name: vue-patterns
    path: references/vue-patterns.md
fallbacks:
  - name: vue-docs
    kind: docs-endpoint
    url: https://vuejs.org/guide/
---

# Vue

Prefer the Composition API.
";

    #[test]
    fn test_parse_frontmatter() {
        let fm = parse_frontmatter(VUE_GUIDE).unwrap();
        assert_eq!(fm.name, "vue");
        assert_eq!(fm.triggers, vec!["Vue", "composable", "reactivity"]);
        assert_eq!(fm.references.len(), 2);
        assert!(fm.references[1].triggers.is_empty());
        assert_eq!(fm.fallbacks.len(), 1);
    }

    #[test]
    fn test_missing_frontmatter() {
        assert!(parse_frontmatter("# Just a heading\n").is_err());
    }

    #[test]
    fn test_frontmatter_without_body_or_trailing_newline() {
        let content = "---\nname: bare\ndescription: Only metadata\n---";
        let fm = parse_frontmatter(content).unwrap();
        assert_eq!(fm.name, "bare");
        assert_eq!(strip_frontmatter(content), "");

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(GUIDE_FILENAME), content).unwrap();
        assert_eq!(Guide::from_dir(dir.path()).unwrap().id(), "bare");
    }

    #[test]
    fn test_strip_frontmatter() {
        let body = strip_frontmatter(VUE_GUIDE);
        assert!(body.contains("# Vue"));
        assert!(!body.contains("name: vue"));
        assert_eq!(strip_frontmatter("plain text"), "plain text");
    }

    #[test]
    fn test_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(GUIDE_FILENAME), VUE_GUIDE).unwrap();

        let guide = Guide::from_dir(dir.path()).unwrap();
        assert_eq!(guide.id(), "vue");
        assert_eq!(guide.triggers(), ["vue", "composable", "reactivity"]);
        assert!(guide.content_key().ends_with(GUIDE_FILENAME));

        let ids: Vec<_> = guide.references().iter().map(Reference::id).collect();
        assert_eq!(ids, ["vueuse-guidelines", "vue-patterns"]);
        let patterns = guide.reference("vue-patterns").unwrap();
        assert_eq!(patterns.triggers(), ["vue patterns"]);
        assert!(Path::new(patterns.content_key()).starts_with(dir.path()));
        assert_eq!(guide.fallbacks()[0].name, "vue-docs");
    }

    #[test]
    fn test_from_dir_rejects_escaping_reference() {
        let dir = tempfile::tempdir().unwrap();
        let content = "---\nname: bad\ndescription: Bad guide\nreferences:\n  - name: secrets\n    path: ../../etc/passwd\n---\nbody\n";
        fs::write(dir.path().join(GUIDE_FILENAME), content).unwrap();
        assert!(Guide::from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_from_dir_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Guide::from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("Guide", "frontend-design").is_ok());
        assert!(validate_id("Guide", "Frontend_Design").is_err());
        assert!(validate_id("Guide", "").is_err());
    }

    #[test]
    fn test_trigger_keywords_include_explicit_invocation() {
        let guide = Guide::new("nextjs", "Next.js guidance", "nextjs").with_triggers(["App Router"]);
        assert_eq!(guide.trigger_keywords(), ["app router", "/nextjs", "@nextjs"]);
    }

    #[test]
    fn test_duplicate_reference_ignored() {
        let guide = Guide::new("vue", "Vue", "vue")
            .with_reference(Reference::new("a", "first", ["x"]))
            .with_reference(Reference::new("a", "second", ["y"]));
        assert_eq!(guide.references().len(), 1);
        assert_eq!(guide.references()[0].content_key(), "first");
    }

    #[test]
    fn test_reference_matches() {
        let reference = Reference::new("vueuse-guidelines", "k", ["VueUse"]);
        assert!(reference.matches("what's the VueUse pattern"));
        assert!(!reference.matches("plain vue question"));
    }
}
