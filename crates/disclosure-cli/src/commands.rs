use anyhow::Result;
use disclosure_loader::{Disclosure, FsStore, GuideDiscovery, Loader, Reference, Session};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use crate::config::Config;
use crate::output::{print_block, print_json};

/// Discover guides from the command-line directories, then configured ones
pub fn build_loader(config: &Config, extra: &[PathBuf], only: bool) -> Result<Loader<FsStore>> {
    let mut discovery = GuideDiscovery::new();
    for dir in extra {
        discovery = discovery.add_directory(dir);
    }

    if !only {
        for dir in &config.guides.directories {
            discovery = discovery.add_directory(dir);
        }
        if config.guides.project {
            discovery = discovery.with_project_guides();
        }
        if config.guides.personal {
            discovery = discovery.with_personal_guides();
        }
    }

    let catalog = discovery.discover()?;
    Ok(Loader::new(catalog, discovery.store()))
}

#[derive(Serialize)]
struct GuideSummary<'a> {
    id: &'a str,
    description: &'a str,
    triggers: &'a [String],
    references: Vec<&'a str>,
}

pub fn list(loader: &Loader<FsStore>, json: bool) -> Result<()> {
    if json {
        let guides: Vec<_> = loader
            .catalog()
            .iter()
            .map(|guide| GuideSummary {
                id: guide.id(),
                description: guide.description(),
                triggers: guide.triggers(),
                references: guide.references().iter().map(Reference::id).collect(),
            })
            .collect();
        return print_json(&guides);
    }

    let summaries = loader.summaries();
    if summaries.is_empty() {
        println!("No guides available");
    } else {
        print!("{summaries}");
    }
    Ok(())
}

#[derive(Serialize)]
struct RequestReport<'a> {
    signal: &'a str,
    #[serde(flatten)]
    disclosure: Disclosure,
}

pub fn ask(loader: &Loader<FsStore>, signals: &[String], json: bool) -> Result<()> {
    let mut session = Session::new();
    info!("Session {} started", session.id());

    let mut reports = Vec::with_capacity(signals.len());
    for signal in signals {
        let disclosure = loader.handle_request(&mut session, signal);
        if json {
            reports.push(RequestReport {
                signal: signal.as_str(),
                disclosure,
            });
        } else {
            print_disclosure(signal, &disclosure);
        }
    }

    if json {
        print_json(&reports)?;
    }
    Ok(())
}

fn print_disclosure(signal: &str, disclosure: &Disclosure) {
    println!("> {signal}");

    for warning in &disclosure.warnings {
        eprintln!("warning: {}", warning.message);
    }

    if disclosure.is_summary_only() {
        println!("(summary only)");
        println!();
    }

    for blob in &disclosure.blobs {
        let title = match &blob.reference {
            Some(reference) => format!("reference {}/{}", blob.guide, reference),
            None => format!("guide {}", blob.guide),
        };
        print_block(&title, &blob.text);
    }

    if !disclosure.fallbacks.is_empty() {
        let plan: Vec<String> = disclosure.fallbacks.iter().map(ToString::to_string).collect();
        println!("fallbacks: {}", plan.join(" -> "));
        println!();
    }
}

#[derive(Serialize)]
struct Shown<'a> {
    guide: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<&'a str>,
    text: &'a str,
}

pub fn show(
    loader: &Loader<FsStore>,
    guide: &str,
    reference: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut session = Session::new();
    let guide_text = loader.load_guide(&mut session, guide)?;

    let reference_text = match reference {
        Some(id) => Some(loader.load_reference(&mut session, guide, id)?),
        None => None,
    };

    let (title, text) = match (reference, &reference_text) {
        (Some(id), Some(body)) => (format!("reference {guide}/{id}"), &**body),
        _ => (format!("guide {guide}"), &*guide_text),
    };

    if json {
        return print_json(&Shown {
            guide,
            reference,
            text,
        });
    }

    print_block(&title, text);
    Ok(())
}
