//! End-to-end loader scenarios against the bundled guides

#![allow(clippy::unwrap_used, clippy::expect_used)]

use disclosure_loader::prelude::*;
use disclosure_loader::{FallbackKind, StoreError};
use std::cell::Cell;
use std::path::PathBuf;

fn guides_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("guides")
}

/// Wraps the filesystem store and counts fetches
struct Counting {
    inner: FsStore,
    calls: Cell<usize>,
}

impl ContentStore for Counting {
    fn fetch(&self, key: &str) -> Result<String, StoreError> {
        self.calls.set(self.calls.get() + 1);
        self.inner.fetch(key)
    }
}

fn loader() -> Loader<Counting> {
    let discovery = GuideDiscovery::new().add_directory(guides_dir());
    let catalog = discovery.discover().expect("bundled guides should parse");
    Loader::new(
        catalog,
        Counting {
            inner: discovery.store(),
            calls: Cell::new(0),
        },
    )
}

#[test]
fn bundled_guides_are_discovered_in_name_order() {
    let loader = loader();
    let ids: Vec<_> = loader.catalog().guide_ids().collect();
    assert_eq!(ids, ["frontend-design", "nextjs", "vue"]);

    let summaries = loader.summaries();
    assert!(summaries.contains("- vue: Vue 3 guidance"));
    assert!(summaries.contains("- nextjs: Next.js App Router guidance"));
}

#[test]
fn reactivity_question_loads_vue_guide_only() {
    let loader = loader();
    let mut session = Session::new();

    let guide = loader
        .evaluate_trigger("I need to fix a reactivity bug in my composable")
        .expect("vue guide should match");
    assert_eq!(guide.id(), "vue");

    let body = loader.load_guide(&mut session, guide.id()).unwrap();
    assert!(body.contains("# Vue 3"));
    assert!(!body.contains("triggers:"));
    assert_eq!(session.level("vue"), LoadLevel::GuideLoaded);
    assert!(session.loaded_references("vue").is_empty());
}

#[test]
fn vueuse_followup_loads_one_reference() {
    let loader = loader();
    let mut session = Session::new();
    loader.handle_request(&mut session, "I need to fix a reactivity bug in my composable");

    let signal = "what's the VueUse pattern for this composable";
    let reference = loader
        .evaluate_sub_trigger(&session, "vue", signal)
        .expect("vueuse reference should match");
    assert_eq!(reference.id(), "vueuse-guidelines");

    let disclosure = loader.handle_request(&mut session, signal);
    assert_eq!(disclosure.matched_reference.as_deref(), Some("vueuse-guidelines"));
    assert_eq!(disclosure.blobs.len(), 1);
    assert!(disclosure.blobs[0].text.contains("# VueUse guidelines"));

    assert!(session.is_reference_loaded("vue", "vueuse-guidelines"));
    assert!(!session.is_reference_loaded("vue", "vue-patterns"));
    assert_eq!(session.level("vue"), LoadLevel::ReferenceLoaded);
}

#[test]
fn unrelated_request_stays_summary_only() {
    let loader = loader();
    let mut session = Session::new();

    assert!(loader
        .evaluate_trigger("write a Python data pipeline")
        .is_none());
    let disclosure = loader.handle_request(&mut session, "write a Python data pipeline");
    assert!(disclosure.is_summary_only());
    assert!(disclosure.warnings.is_empty());
    assert_eq!(loader.store().calls.get(), 0);
    assert_eq!(session.loaded_guides().count(), 0);
}

#[test]
fn repeated_load_hits_the_cache() {
    let loader = loader();
    let mut session = Session::new();

    let first = loader.load_guide(&mut session, "vue").unwrap();
    let second = loader.load_guide(&mut session, "vue").unwrap();
    assert_eq!(first, second);
    assert_eq!(loader.store().calls.get(), 1);
}

#[test]
fn nonexistent_guide_is_not_found() {
    let loader = loader();
    let mut session = Session::new();

    let err = loader
        .load_guide(&mut session, "nonexistent-guide")
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(session.level("nonexistent-guide"), LoadLevel::SummaryOnly);

    // The session keeps working afterwards
    let disclosure = loader.handle_request(&mut session, "a next.js server action");
    assert_eq!(disclosure.matched_guide.as_deref(), Some("nextjs"));
    assert_eq!(disclosure.blobs.len(), 1);
}

#[test]
fn reference_before_guide_is_refused() {
    let loader = loader();
    let mut session = Session::new();

    let err = loader
        .load_reference(&mut session, "nextjs", "caching")
        .unwrap_err();
    assert!(matches!(err, LoadError::GuideNotLoaded { .. }));
    assert_eq!(loader.store().calls.get(), 0);
}

#[test]
fn explicit_invocation_matches_guide() {
    let loader = loader();
    let guide = loader
        .evaluate_trigger("/frontend-design give this page some character")
        .unwrap();
    assert_eq!(guide.id(), "frontend-design");
}

#[test]
fn matched_guide_carries_fallback_plan() {
    let loader = loader();
    let mut session = Session::new();
    let disclosure = loader.handle_request(&mut session, "app router layout question");

    let names: Vec<_> = disclosure.fallbacks.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["nextjs-docs", "search"]);
    assert!(matches!(
        disclosure.fallbacks[0].kind,
        FallbackKind::DocsEndpoint { .. }
    ));
    // "layout" also selects the routing reference in the same pass
    assert_eq!(disclosure.matched_reference.as_deref(), Some("routing"));
    assert_eq!(disclosure.blobs.len(), 2);
}

#[test]
fn disclosure_serializes_to_json() {
    let loader = loader();
    let mut session = Session::new();
    let disclosure = loader.handle_request(&mut session, "pick a color palette");

    let json = serde_json::to_value(&disclosure).unwrap();
    assert_eq!(json["matched_guide"], "frontend-design");
    assert_eq!(json["blobs"][0]["level"], "guide-loaded");
    assert!(json["blobs"][0].get("reference").is_none());
}
