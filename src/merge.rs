//! Inlining of minified CSS and JavaScript into an HTML document.
//!
//! The document is parsed with [html5ever](https://docs.rs/html5ever) into an
//! `RcDom`, mutated in place, and serialized back. Parsing is tolerant: any
//! input a browser would render produces a tree.
//!
//! ## What changes
//!
//! - every `<link rel="stylesheet">` is removed
//! - every `<script src="...">` is removed
//! - a `<style>` holding the CSS becomes the last child of `<head>`
//! - a `<script>` holding the JS becomes the last child of `<body>`
//!
//! Everything else is re-serialized as the parser understood it, so attribute
//! quoting and tag case may differ from the source. The tree builder parks a
//! `<template>`'s markup in a separate content fragment that the serializer
//! never visits; those fragments are moved back under their element right
//! after parsing, so template markup is kept and searched like any other.
//!
//! ## Missing `<head>` / `<body>`
//!
//! The HTML5 tree builder always synthesizes `<head>` and `<body>`, which would
//! make a bare fragment look like a complete page. Before touching the tree,
//! the source is run through `lol_html`'s streaming tokenizer to see which of
//! the two elements it actually declares. A missing one is an error; neither
//! is ever invented.

use html5ever::serialize::{SerializeOpts, serialize};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElementFlags, NodeOrText, TreeSink};
use html5ever::{LocalName, ParseOpts, QualName, local_name, ns, parse_document};
use lol_html::errors::RewritingError;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use std::cell::Cell;
use std::string::FromUtf8Error;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("the HTML file has no <head> element")]
    MissingHead,
    #[error("the HTML file has no <body> element")]
    MissingBody,
    #[error("HTML tokenizer failed: {0}")]
    Scan(#[from] RewritingError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialized document is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

impl MergeError {
    /// Whether the error is about the document's shape rather than a failure
    /// of the tooling.
    pub fn is_structural(&self) -> bool {
        matches!(self, MergeError::MissingHead | MergeError::MissingBody)
    }
}

/// Which of the two injection targets the source declares with a real tag.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeclaredSections {
    pub head: bool,
    pub body: bool,
}

/// Scan `source` for `<head>` and `<body>` start tags.
///
/// Tag-like text inside comments, `<script>`, `<style>` and other raw-text
/// elements does not count.
pub fn declared_sections(source: &str) -> Result<DeclaredSections, MergeError> {
    let head = Cell::new(false);
    let body = Cell::new(false);

    rewrite_str(
        source,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("head", |_el| {
                    head.set(true);
                    Ok(())
                }),
                element!("body", |_el| {
                    body.set(true);
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )?;

    Ok(DeclaredSections {
        head: head.get(),
        body: body.get(),
    })
}

/// Inline `css` and `js` into `source` and return the serialized document.
pub fn merge_document(source: &str, css: &str, js: &str) -> Result<String, MergeError> {
    let declared = declared_sections(source)?;

    let dom = parse_document(RcDom::default(), ParseOpts::default())
        .one(StrTendril::from_slice(source));
    inline_template_contents(&dom, &dom.document);

    let head = find_element(&dom.document, &local_name!("head"))
        .filter(|_| declared.head)
        .ok_or(MergeError::MissingHead)?;

    let stylesheets = collect_elements(&dom.document, &is_stylesheet_link);
    if !stylesheets.is_empty() {
        info!(count = stylesheets.len(), "removing external stylesheet links");
    }
    for link in &stylesheets {
        dom.remove_from_parent(link);
    }
    append_text_element(&dom, &head, local_name!("style"), css);

    let body = find_element(&dom.document, &local_name!("body"))
        .filter(|_| declared.body)
        .ok_or(MergeError::MissingBody)?;

    let scripts = collect_elements(&dom.document, &is_external_script);
    if !scripts.is_empty() {
        info!(count = scripts.len(), "removing external script references");
    }
    for script in &scripts {
        dom.remove_from_parent(script);
    }
    append_text_element(&dom, &body, local_name!("script"), js);

    let html = serialize_document(&dom)?;
    debug!(bytes = html.len(), "merged document serialized");
    Ok(html)
}

fn serialize_document(dom: &RcDom) -> Result<String, MergeError> {
    let document: SerializableHandle = dom.document.clone().into();
    let mut bytes = Vec::new();
    serialize(&mut bytes, &document, SerializeOpts::default())?;
    Ok(String::from_utf8(bytes)?)
}

/// Move each `<template>`'s content fragment under the element itself.
fn inline_template_contents(dom: &RcDom, node: &Handle) {
    if let NodeData::Element {
        template_contents, ..
    } = &node.data
    {
        let fragment = template_contents.borrow_mut().take();
        if let Some(fragment) = fragment {
            dom.reparent_children(&fragment, node);
        }
    }
    let children: Vec<Handle> = node.children.borrow().clone();
    for child in &children {
        inline_template_contents(dom, child);
    }
}

/// Create `<tag>text</tag>` and append it as the last child of `parent`.
fn append_text_element(dom: &RcDom, parent: &Handle, tag: LocalName, text: &str) {
    let name = QualName::new(None, ns!(html), tag);
    let element = dom.create_element(name, Vec::new(), ElementFlags::default());
    if !text.is_empty() {
        dom.append(&element, NodeOrText::AppendText(StrTendril::from_slice(text)));
    }
    dom.append(parent, NodeOrText::AppendNode(element));
}

fn element_name(node: &Handle) -> Option<&LocalName> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&name.local),
        _ => None,
    }
}

fn attribute(node: &Handle, attr: &LocalName) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &a.name.local == attr)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

/// `<link>` whose `rel` token list contains `stylesheet`.
fn is_stylesheet_link(node: &Handle) -> bool {
    element_name(node) == Some(&local_name!("link"))
        && attribute(node, &local_name!("rel")).is_some_and(|rel| {
            rel.split_ascii_whitespace()
                .any(|token| token.eq_ignore_ascii_case("stylesheet"))
        })
}

/// `<script>` that loads its code from a `src` URL.
fn is_external_script(node: &Handle) -> bool {
    element_name(node) == Some(&local_name!("script"))
        && attribute(node, &local_name!("src")).is_some()
}

/// Depth-first search for the first element named `tag`.
fn find_element(node: &Handle, tag: &LocalName) -> Option<Handle> {
    if element_name(node) == Some(tag) {
        return Some(node.clone());
    }
    node.children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, tag))
}

fn collect_elements(node: &Handle, matches: &impl Fn(&Handle) -> bool) -> Vec<Handle> {
    let mut found = Vec::new();
    collect_recursive(node, matches, &mut found);
    found
}

fn collect_recursive(node: &Handle, matches: &impl Fn(&Handle) -> bool, found: &mut Vec<Handle>) {
    if matches(node) {
        found.push(node.clone());
        return;
    }
    for child in node.children.borrow().iter() {
        collect_recursive(child, matches, found);
    }
}
