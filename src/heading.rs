//! Outline construction from a flat, document-ordered heading sequence.
//!
//! Headings are scanned in visual order, each carrying a nesting level taken from its `h1`..`h6`
//! tag. [`Outline::build`] turns that sequence into a forest of [`HeadingNode`]s using a stack of
//! currently open ancestors, and keeps the flat sequence around for scroll tracking.

use crate::error::TocError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Nesting level of a heading, always within `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub const MIN: HeadingLevel = HeadingLevel(1);
    pub const MAX: HeadingLevel = HeadingLevel(6);

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Parse a heading tag name such as `H2` or `h5`.
    pub fn from_tag(tag: &str) -> Result<HeadingLevel, TocError> {
        let mut chars = tag.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some('h' | 'H'), Some(digit), None) => digit
                .to_digit(10)
                .ok_or_else(|| TocError::InvalidLevel(tag.to_string()))
                .and_then(|level| HeadingLevel::try_from(level as u8)),
            _ => Err(TocError::InvalidLevel(tag.to_string())),
        }
    }
}

impl TryFrom<u8> for HeadingLevel {
    type Error = TocError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        if (1..=6).contains(&level) {
            Ok(HeadingLevel(level))
        } else {
            Err(TocError::InvalidLevel(level.to_string()))
        }
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> u8 {
        level.0
    }
}

impl From<pulldown_cmark::HeadingLevel> for HeadingLevel {
    fn from(level: pulldown_cmark::HeadingLevel) -> Self {
        use pulldown_cmark::HeadingLevel as Md;
        HeadingLevel(match level {
            Md::H1 => 1,
            Md::H2 => 2,
            Md::H3 => 3,
            Md::H4 => 4,
            Md::H5 => 5,
            Md::H6 => 6,
        })
    }
}

impl Display for HeadingLevel {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A heading element found while scanning a document.
///
/// Implemented by plain records, DOM elements and markdown heading events. `set_id` is called
/// exactly once per heading during [`Outline::build`], with either the existing id or a
/// generated one.
pub trait HeadingSource {
    fn level(&self) -> HeadingLevel;
    /// Visible label; surrounding whitespace is trimmed by the builder.
    fn text(&self) -> String;
    fn id(&self) -> Option<String>;
    fn set_id(&mut self, id: &str);
}

/// Plain-data heading, as produced by the extractors or deserialized from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingRecord {
    pub level: HeadingLevel,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl HeadingRecord {
    pub fn new(level: u8, text: &str) -> Result<HeadingRecord, TocError> {
        Ok(HeadingRecord {
            level: HeadingLevel::try_from(level)?,
            text: text.to_string(),
            id: None,
        })
    }

    pub fn with_id(mut self, id: &str) -> HeadingRecord {
        self.id = Some(id.to_string());
        self
    }
}

impl HeadingSource for HeadingRecord {
    fn level(&self) -> HeadingLevel {
        self.level
    }

    fn text(&self) -> String {
        self.text.clone()
    }

    fn id(&self) -> Option<String> {
        self.id.clone()
    }

    fn set_id(&mut self, id: &str) {
        self.id = Some(id.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingNode {
    pub id: String,
    pub text: String,
    pub level: HeadingLevel,
    pub children: Vec<HeadingNode>,
}

impl HeadingNode {
    fn new(id: String, text: String, level: HeadingLevel) -> HeadingNode {
        HeadingNode {
            id,
            text,
            level,
            children: Vec::new(),
        }
    }

    /// Pre-order traversal of this node and its descendants.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

/// Pre-order iterator over a heading forest.
pub struct Walk<'a> {
    stack: Vec<&'a HeadingNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a HeadingNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Flat, document-ordered view of one heading, used for scroll tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub id: String,
    pub level: HeadingLevel,
}

/// Heading forest plus the flat sequence it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    roots: Vec<HeadingNode>,
    entries: Vec<OutlineEntry>,
}

impl Outline {
    /// Build the outline, assigning ids to the sources as a side effect.
    ///
    /// Returns `None` for an empty heading sequence; the caller hides any outline UI.
    pub fn build<H: HeadingSource>(headings: &mut [H]) -> Option<Outline> {
        if headings.is_empty() {
            tracing::debug!("No headings found, no outline to build");
            return None;
        }

        let mut roots: Vec<HeadingNode> = Vec::new();
        let mut entries = Vec::with_capacity(headings.len());
        // Open ancestors, from the outermost root down to the last heading seen. A node is
        // attached to its parent (or to the roots) when it is closed.
        let mut open: Vec<HeadingNode> = Vec::new();

        for (index, heading) in headings.iter_mut().enumerate() {
            let id = heading
                .id()
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("heading-{index}"));
            heading.set_id(&id);
            let level = heading.level();

            while open.last().is_some_and(|top| top.level >= level) {
                close_top(&mut open, &mut roots);
            }

            entries.push(OutlineEntry {
                id: id.clone(),
                level,
            });
            open.push(HeadingNode::new(id, heading.text().trim().to_string(), level));
        }
        while !open.is_empty() {
            close_top(&mut open, &mut roots);
        }

        tracing::debug!(
            "Built outline with {} root(s) from {} heading(s)",
            roots.len(),
            entries.len()
        );
        Some(Outline { roots, entries })
    }

    pub fn roots(&self) -> &[HeadingNode] {
        &self.roots
    }

    /// Headings in document order.
    pub fn entries(&self) -> &[OutlineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Pre-order traversal of the whole forest.
    pub fn walk(&self) -> impl Iterator<Item = &HeadingNode> {
        self.roots.iter().flat_map(HeadingNode::walk)
    }
}

fn close_top(open: &mut Vec<HeadingNode>, roots: &mut Vec<HeadingNode>) {
    if let Some(node) = open.pop() {
        match open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }
}
