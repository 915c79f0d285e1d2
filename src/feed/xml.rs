// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A small, forgiving element tree over `quick-xml`.
//!
//! Feeds in the wild mix namespaces, CDATA and stray HTML entities. The tree
//! keeps qualified names as written (`itunes:image`) and stores text already
//! entity-decoded, so lookups behave like DOM `textContent`.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::FeedError;

/// A node in the document tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with its attributes and children
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Qualified name as written in the document
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without its namespace prefix
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First direct child with the given qualified name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// First direct child with the given local name, whatever its prefix
    pub fn child_local(&self, local: &str) -> Option<&Element> {
        self.elements().find(|e| e.local_name() == local)
    }

    /// All direct children with the given qualified name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |e| e.name == name)
    }

    /// First descendant with the given qualified name, depth first
    pub fn find(&self, name: &str) -> Option<&Element> {
        for child in self.elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants with the given qualified name, in document order
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in self.elements() {
            if child.name == name {
                found.push(child);
            }
            child.collect_named(name, found);
        }
    }

    /// Concatenated text of this element and all its descendants
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.push_text(&mut text);
        text
    }

    fn push_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.push_text(out),
            }
        }
    }

    /// Trimmed text of the first direct child named `name`, if non-empty
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).and_then(non_empty_text)
    }

    /// Like [`Element::child_text`] but matching on local name
    pub fn child_text_local(&self, local: &str) -> Option<String> {
        self.elements()
            .filter(|e| e.local_name() == local)
            .find_map(non_empty_text)
    }
}

fn non_empty_text(element: &Element) -> Option<String> {
    let text = element.text_content();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn start_element(start: &BytesStart<'_>) -> Result<Element, FeedError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| FeedError::malformed(format!("bad attribute in <{name}>: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        attributes.push((key, html_escape::decode_html_entities(&raw).into_owned()));
    }

    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

fn push_text(stack: &mut [Element], text: String) {
    if text.is_empty() {
        return;
    }
    if let Some(parent) = stack.last_mut() {
        match parent.children.last_mut() {
            Some(Node::Text(existing)) => existing.push_str(&text),
            _ => parent.children.push(Node::Text(text)),
        }
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<(), FeedError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(FeedError::malformed("multiple root elements")),
    }
    Ok(())
}

/// Parse a whole document into its root element
///
/// Any reader error, unbalanced element or missing root is reported as a
/// malformed document.
pub fn parse_document(xml: &str) -> Result<Element, FeedError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            FeedError::malformed(format!("{e} at position {}", reader.buffer_position()))
        })?;

        match event {
            Event::Start(start) => stack.push(start_element(&start)?),
            Event::Empty(start) => {
                let element = start_element(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| FeedError::malformed("unexpected closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let raw = String::from_utf8_lossy(&text);
                push_text(&mut stack, html_escape::decode_html_entities(&raw).into_owned());
            }
            Event::CData(data) => {
                push_text(&mut stack, String::from_utf8_lossy(&data).into_owned());
            }
            Event::GeneralRef(reference) => {
                let name = String::from_utf8_lossy(&reference);
                let entity = format!("&{name};");
                push_text(&mut stack, html_escape::decode_html_entities(&entity).into_owned());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(FeedError::malformed(format!("unclosed element <{}>", open.name)));
    }

    root.ok_or_else(|| FeedError::malformed("document has no root element"))
}
