//! Anchored section merge for long-form documents
//!
//! Long-form Markdown documents are split into named regions delimited by
//! `<!-- tpl:section:NAME -->` / `<!-- /tpl:section:NAME -->` anchors. The
//! template owns every region it declares; user-authored regions absent
//! from the template are carried forward verbatim, in their original order.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static SECTION_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--\s*tpl:section:([A-Za-z0-9_.-]+)\s*-->").unwrap());

/// A named anchored region, markers included.
#[derive(Debug)]
struct Region<'a> {
    name: &'a str,
    text: &'a str,
}

/// Merge two anchored documents.
pub fn merge_sections(new: &str, old: &str) -> String {
    let template_names: HashSet<&str> = regions(new).map(|r| r.name).collect();

    let carried: Vec<&str> = regions(old)
        .filter(|region| !template_names.contains(region.name))
        .map(|region| region.text)
        .collect();

    if carried.is_empty() {
        return new.to_string();
    }

    let mut merged = new.trim_end_matches('\n').to_string();
    for text in carried {
        if !merged.is_empty() {
            merged.push_str("\n\n");
        }
        merged.push_str(text.trim_end_matches('\n'));
    }
    merged.push('\n');
    merged
}

/// Iterate the anchored regions of a document, in order.
///
/// A start anchor without a matching end anchor is malformed; the region is
/// skipped rather than carried to end-of-file.
fn regions(source: &str) -> impl Iterator<Item = Region<'_>> {
    SECTION_START.captures_iter(source).filter_map(|cap| {
        let whole = cap.get(0)?;
        let name = cap.get(1)?.as_str();
        let end_marker = format!("<!-- /tpl:section:{name} -->");
        let rest = &source[whole.end()..];
        let end_rel = rest.find(&end_marker)?;
        let end = whole.end() + end_rel + end_marker.len();
        Some(Region {
            name,
            text: &source[whole.start()..end],
        })
    })
}
