//! Advisory fallback strategies carried by guides
//!
//! A guide may name places to look when its own text is not enough. These
//! are policy data handed back to the invoker in order; the loader never
//! acts on them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One named fallback strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackStrategy {
    /// Strategy name, unique within a guide
    pub name: String,
    /// What kind of source to consult
    #[serde(flatten)]
    pub kind: FallbackKind,
}

/// Source consulted by a fallback strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FallbackKind {
    /// Always-fresh documentation endpoint
    DocsEndpoint {
        /// Endpoint URL
        url: String,
    },
    /// General web search
    WebSearch {
        /// Suggested query prefix
        #[serde(default, skip_serializing_if = "Option::is_none")]
        query_hint: Option<String>,
    },
    /// Fetch a specific page, or any page the invoker picks
    WebFetch {
        /// Page URL
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

impl FallbackStrategy {
    /// Create a docs endpoint strategy
    pub fn docs_endpoint(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FallbackKind::DocsEndpoint { url: url.into() },
        }
    }

    /// Create a web search strategy
    pub fn web_search(name: impl Into<String>, query_hint: Option<String>) -> Self {
        Self {
            name: name.into(),
            kind: FallbackKind::WebSearch { query_hint },
        }
    }

    /// Create a web fetch strategy
    pub fn web_fetch(name: impl Into<String>, url: Option<String>) -> Self {
        Self {
            name: name.into(),
            kind: FallbackKind::WebFetch { url },
        }
    }
}

impl fmt::Display for FallbackStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FallbackKind::DocsEndpoint { url } => write!(f, "{} (docs endpoint: {url})", self.name),
            FallbackKind::WebSearch {
                query_hint: Some(hint),
            } => write!(f, "{} (web search: \"{hint}\")", self.name),
            FallbackKind::WebSearch { query_hint: None } => write!(f, "{} (web search)", self.name),
            FallbackKind::WebFetch { url: Some(url) } => write!(f, "{} (web fetch: {url})", self.name),
            FallbackKind::WebFetch { url: None } => write!(f, "{} (web fetch)", self.name),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_plan_keeps_order() {
        let yaml = r"
- name: nextjs-docs
  kind: docs-endpoint
  url: https://nextjs.org/docs
- name: search
  kind: web-search
  query_hint: next.js
- name: fetch
  kind: web-fetch
";
        let plan: Vec<FallbackStrategy> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            plan,
            vec![
                FallbackStrategy::docs_endpoint("nextjs-docs", "https://nextjs.org/docs"),
                FallbackStrategy::web_search("search", Some("next.js".into())),
                FallbackStrategy::web_fetch("fetch", None),
            ]
        );
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let yaml = "name: x\nkind: carrier-pigeon\n";
        assert!(serde_yaml::from_str::<FallbackStrategy>(yaml).is_err());
    }

    #[test]
    fn test_display() {
        let strategy = FallbackStrategy::docs_endpoint("vue-docs", "https://vuejs.org");
        assert_eq!(strategy.to_string(), "vue-docs (docs endpoint: https://vuejs.org)");
        assert_eq!(
            FallbackStrategy::web_search("search", None).to_string(),
            "search (web search)"
        );
    }
}
