use std::path::Path;

use crate::error::Error;
use crate::model::{Document, Media, Paragraph, Run, SectionId};

const DEFAULT_ROLE: &str = "section";
/// Deepest element nesting accepted below <book>.
const MAX_NESTING: usize = 64;

pub fn parse(path: &Path) -> Result<Document, Error> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
        ),
        _ => Error::Io(e),
    })?;
    parse_bytes(&bytes)
}

pub fn parse_bytes(bytes: &[u8]) -> Result<Document, Error> {
    let xml = std::str::from_utf8(bytes)
        .map_err(|e| Error::InvalidBook(format!("not UTF-8 text: {e}")))?;
    parse_str(xml)
}

pub fn parse_str(xml: &str) -> Result<Document, Error> {
    let tree = roxmltree::Document::parse(xml)?;
    let root = tree.root_element();
    if root.tag_name().name() != "book" {
        return Err(Error::InvalidBook(format!(
            "root element must be <book>, found <{}>",
            root.tag_name().name()
        )));
    }

    if let Some(node) = root
        .descendants()
        .find(|n| n.is_element() && nesting(*n) > MAX_NESTING)
    {
        return Err(Error::InvalidBook(format!(
            "elements nested deeper than {MAX_NESTING} levels (at <{}>)",
            node.tag_name().name()
        )));
    }

    let mut doc = Document::new(root.attribute("title").unwrap_or_default().trim());
    doc.author = root
        .attribute("author")
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(String::from);
    for attr in root.attributes() {
        doc.attributes
            .insert(attr.name().to_string(), attr.value().to_string());
    }
    if let Some(media) = doc.attr("media").map(Media::parse) {
        doc.media = media;
    }
    if let Some(toc) = doc.attr("toc").map(parse_flag) {
        doc.toc = toc;
    }
    if let Some(levels) = doc.attr("toclevels") {
        let parsed = levels.trim().parse().map_err(|_| {
            Error::InvalidBook(format!("toclevels must be a small integer, got '{levels}'"))
        })?;
        doc.toc_levels = parsed;
    }

    let mut counter = 0usize;
    for child in root.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "section" => parse_section(child, None, &mut doc, &mut counter),
            other => log::debug!("ignoring <{other}> at book level"),
        }
    }

    log::info!(
        "Parsed book '{}': {} sections, media={:?}",
        doc.title,
        doc.walk().len(),
        doc.media
    );
    Ok(doc)
}

/// Element depth below the <book> root (the root itself is 0).
fn nesting(node: roxmltree::Node) -> usize {
    node.ancestors().filter(|n| n.is_element()).count() - 1
}

fn parse_flag(val: &str) -> bool {
    !matches!(val.trim(), "false" | "0" | "no" | "")
}

fn parse_section(
    node: roxmltree::Node,
    parent: Option<SectionId>,
    doc: &mut Document,
    counter: &mut usize,
) {
    *counter += 1;
    let id = node
        .attribute("id")
        .map(String::from)
        .unwrap_or_else(|| format!("_section_{counter}"));
    let role = node
        .attribute("role")
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_ROLE);
    let title = node
        .children()
        .find(|n| n.has_tag_name("title"))
        .map(inline_runs)
        .unwrap_or_default();

    let handle = doc.add_section(parent, id, role, title);

    let section = doc.section_mut(handle);
    if let Some(options) = node.attribute("options") {
        section.options.extend(
            options
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|o| !o.is_empty())
                .map(String::from),
        );
    }
    if node.attribute("nonfacing").is_some_and(parse_flag) {
        section.options.insert("nonfacing".to_string());
    }

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "title" => {}
            "para" | "p" => {
                let runs = inline_runs(child);
                if !runs.is_empty() {
                    doc.section_mut(handle).paragraphs.push(Paragraph { runs });
                }
            }
            "section" => parse_section(child, Some(handle), doc, counter),
            other => log::debug!("ignoring <{other}> in section"),
        }
    }
}

/// Inline text of an element as formatted runs, whitespace collapsed.
fn inline_runs(node: roxmltree::Node) -> Vec<Run> {
    let mut runs = Vec::new();
    collect_runs(node, false, false, &mut runs);
    normalize_whitespace(runs)
}

fn collect_runs(node: roxmltree::Node, bold: bool, italic: bool, out: &mut Vec<Run>) {
    for child in node.children() {
        if child.is_text() {
            if let Some(text) = child.text() {
                out.push(Run {
                    text: text.to_string(),
                    bold,
                    italic,
                });
            }
            continue;
        }
        if !child.is_element() {
            continue;
        }
        let (b, i) = match child.tag_name().name() {
            "strong" | "b" => (true, italic),
            "em" | "i" => (bold, true),
            _ => (bold, italic),
        };
        collect_runs(child, b, i, out);
    }
}

fn normalize_whitespace(runs: Vec<Run>) -> Vec<Run> {
    let mut out: Vec<Run> = Vec::with_capacity(runs.len());
    let mut prev_ws = true; // drops leading whitespace of the first run
    for mut run in runs {
        let mut collapsed = String::with_capacity(run.text.len());
        for ch in run.text.chars() {
            if ch.is_whitespace() {
                if !prev_ws {
                    collapsed.push(' ');
                }
                prev_ws = true;
            } else {
                collapsed.push(ch);
                prev_ws = false;
            }
        }
        if collapsed.is_empty() {
            continue;
        }
        run.text = collapsed;
        out.push(run);
    }
    if let Some(last) = out.last_mut() {
        let trimmed = last.text.trim_end().len();
        last.text.truncate(trimmed);
        if last.text.is_empty() {
            out.pop();
        }
    }
    out
}
