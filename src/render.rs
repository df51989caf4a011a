//! Outline markup and the targets it is rendered into.

use crate::heading::HeadingNode;
use std::collections::BTreeSet;
use std::fmt::Write;

pub const ITEM_CLASS: &str = "toc-item";
pub const LINK_CLASS: &str = "toc-link";
pub const SUBLIST_CLASS: &str = "toc-sublist";
pub const ACTIVE_CLASS: &str = "active";

/// A container the outline is rendered into, such as the desktop sidebar list or the mobile
/// drawer list.
///
/// Targets only ever see heading ids; they never hold structural links into the outline.
pub trait OutlineTarget {
    /// Replace the container's entries with `markup`.
    fn replace_entries(&mut self, markup: &str);
    /// Add or remove the active marker on the entry linking to `id`.
    ///
    /// Returns `false` when no entry links to `id`.
    fn set_active(&mut self, id: &str, active: bool) -> bool;
    /// Show or hide the surrounding outline UI.
    fn set_visible(&mut self, visible: bool);
}

impl<T: OutlineTarget + ?Sized> OutlineTarget for Box<T> {
    fn replace_entries(&mut self, markup: &str) {
        (**self).replace_entries(markup)
    }

    fn set_active(&mut self, id: &str, active: bool) -> bool {
        (**self).set_active(id, active)
    }

    fn set_visible(&mut self, visible: bool) {
        (**self).set_visible(visible)
    }
}

/// Render the forest into `target`, replacing whatever it held before.
pub fn render<T: OutlineTarget + ?Sized>(roots: &[HeadingNode], target: &mut T) {
    target.replace_entries(&to_markup(roots));
}

/// Nested `<li>` markup mirroring the forest, one `<ul>` per level of tree depth.
pub fn to_markup(roots: &[HeadingNode]) -> String {
    let mut out = String::new();
    write_items(roots, &mut out);
    out
}

fn write_items(nodes: &[HeadingNode], out: &mut String) {
    for node in nodes {
        let id = escape_html(&node.id);
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            r##"<li class="{ITEM_CLASS}"><a href="#{id}" class="{LINK_CLASS} toc-level-{level}" data-target="{id}" data-level="{level}">{text}</a>"##,
            level = node.level,
            text = escape_html(&node.text),
        );
        if !node.children.is_empty() {
            let _ = write!(out, r#"<ul class="{SUBLIST_CLASS}">"#);
            write_items(&node.children, out);
            out.push_str("</ul>");
        }
        out.push_str("</li>");
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// In-memory target for headless use and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryTarget {
    markup: String,
    active: BTreeSet<String>,
    visible: bool,
    /// Number of marker changes applied, for asserting on redundant DOM writes.
    pub marker_writes: usize,
}

impl MemoryTarget {
    pub fn new() -> Self {
        MemoryTarget {
            visible: true,
            ..Default::default()
        }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn active(&self) -> impl Iterator<Item = &str> {
        self.active.iter().map(String::as_str)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Number of rendered entries.
    pub fn entry_count(&self) -> usize {
        self.markup
            .matches(&format!(r#"<li class="{ITEM_CLASS}">"#))
            .count()
    }

    fn has_entry(&self, id: &str) -> bool {
        self.markup
            .contains(&format!(r#"data-target="{}""#, escape_html(id)))
    }
}

impl OutlineTarget for MemoryTarget {
    fn replace_entries(&mut self, markup: &str) {
        self.markup = markup.to_string();
        self.active.retain(|id| {
            markup.contains(&format!(r#"data-target="{}""#, escape_html(id)))
        });
    }

    fn set_active(&mut self, id: &str, active: bool) -> bool {
        if !self.has_entry(id) {
            return false;
        }
        self.marker_writes += 1;
        if active {
            self.active.insert(id.to_string());
        } else {
            self.active.remove(id);
        }
        true
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}
