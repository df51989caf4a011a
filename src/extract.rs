//! Heading extraction from post sources ahead of time.
//!
//! Both extractors produce [`HeadingSource`]s whose ids are written back when the outline is
//! built, so the article can be emitted with every heading carrying the id its outline entry
//! links to.

use pulldown_cmark::{CowStr, Event as MdEvent, Options, Parser as MdParser, Tag as MdTag, TagEnd};
use regex::Regex;
use std::{ops::Range, path::Path, str::FromStr};

use crate::{
    config::Selectors,
    error::TocError,
    heading::{HeadingLevel, HeadingSource, Outline},
    render::escape_html,
};

pub fn sky_md_options() -> Options {
    let mut md_options = Options::empty();
    // Enabled explicitly rather than through Options::all() so output stays reproducible across
    // pulldown-cmark upgrades.
    md_options.insert(Options::ENABLE_FOOTNOTES);
    md_options.insert(Options::ENABLE_GFM);
    md_options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    md_options.insert(Options::ENABLE_STRIKETHROUGH);
    md_options.insert(Options::ENABLE_TABLES);
    md_options.insert(Options::ENABLE_TASKLISTS);
    md_options
}

/// A heading inside a markdown post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownHeading {
    /// Index of the heading's start event.
    event: usize,
    level: HeadingLevel,
    text: String,
    id: Option<String>,
}

impl HeadingSource for MarkdownHeading {
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

#[derive(Debug, Clone)]
pub struct MarkdownPost {
    events: Vec<MdEvent<'static>>,
    headings: Vec<MarkdownHeading>,
}

impl MarkdownPost {
    pub fn parse(content: &str) -> MarkdownPost {
        let mut events = Vec::new();
        let mut headings = Vec::new();
        let mut current: Option<MarkdownHeading> = None;

        for event in MdParser::new_ext(content, sky_md_options()) {
            match &event {
                MdEvent::Start(MdTag::Heading { level, id, .. }) => {
                    current = Some(MarkdownHeading {
                        event: events.len(),
                        level: (*level).into(),
                        text: String::new(),
                        id: id.as_ref().map(|id| id.to_string()),
                    });
                }
                MdEvent::Text(text) | MdEvent::Code(text) => {
                    if let Some(heading) = current.as_mut() {
                        heading.text.push_str(text);
                    }
                }
                MdEvent::SoftBreak | MdEvent::HardBreak => {
                    if let Some(heading) = current.as_mut() {
                        heading.text.push(' ');
                    }
                }
                MdEvent::End(TagEnd::Heading(_)) => {
                    if let Some(heading) = current.take() {
                        headings.push(heading);
                    }
                }
                _ => {}
            }
            events.push(event.into_static());
        }

        tracing::debug!("Found {} markdown heading(s)", headings.len());
        MarkdownPost { events, headings }
    }

    pub fn headings(&self) -> &[MarkdownHeading] {
        &self.headings
    }

    pub fn headings_mut(&mut self) -> &mut [MarkdownHeading] {
        &mut self.headings
    }

    /// Article HTML with each heading carrying its current id.
    pub fn to_html(&self) -> String {
        let mut events = self.events.clone();
        for heading in &self.headings {
            let Some(assigned) = heading.id.as_deref() else {
                continue;
            };
            if let Some(MdEvent::Start(MdTag::Heading { id, .. })) = events.get_mut(heading.event) {
                *id = Some(CowStr::from(assigned.to_string()));
            }
        }
        let mut output = String::new();
        pulldown_cmark::html::push_html(&mut output, events.into_iter());
        output
    }
}

/// A heading element inside an HTML post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlHeading {
    /// Byte range of the opening tag's name, e.g. `h2` in `<h2 class="x">`.
    tag_name: Range<usize>,
    /// Byte range of an existing `id` attribute, including its value.
    id_attr: Option<Range<usize>>,
    level: HeadingLevel,
    text: String,
    original_id: Option<String>,
    id: Option<String>,
}

impl HeadingSource for HtmlHeading {
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

/// Compiled patterns for scanning heading elements out of rendered HTML.
#[derive(Debug, Clone)]
pub struct HtmlScanner {
    open_tag: Regex,
    close_tags: Vec<Regex>,
    id_attr: Regex,
    any_tag: Regex,
    content_open: Option<Regex>,
}

impl HtmlScanner {
    /// Scanner for headings inside the element carrying `content_class`, or anywhere in the
    /// document when `None`.
    pub fn new(content_class: Option<&str>) -> Result<HtmlScanner, TocError> {
        let close_tags = (1..=6)
            .map(|level| Regex::new(&format!(r"(?i)</h{level}\s*>")))
            .collect::<Result<Vec<_>, _>>()?;
        let content_open = content_class
            .map(|class| {
                Regex::new(&format!(
                    r#"(?i)<([a-z][a-z0-9-]*)\s[^>]*\bclass\s*=\s*["'](?:[^"']*\s)?{}(?:\s[^"']*)?["'][^>]*>"#,
                    regex::escape(class)
                ))
            })
            .transpose()?;
        Ok(HtmlScanner {
            open_tag: Regex::new(r"(?i)<(h[1-6])(\s[^>]*)?>")?,
            close_tags,
            id_attr: Regex::new(r#"(?i)(?:^|\s)(id\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))"#)?,
            any_tag: Regex::new(r"<[^>]*>")?,
            content_open,
        })
    }

    pub fn from_selectors(selectors: &Selectors) -> Result<HtmlScanner, TocError> {
        let class = selectors.content_class();
        if class.is_none() {
            tracing::warn!(
                "Content selector '{}' is not a plain class selector, scanning the whole document",
                selectors.content
            );
        }
        HtmlScanner::new(class)
    }

    /// Byte range of the content element's inner HTML.
    fn content_range(&self, html: &str) -> Result<Option<Range<usize>>, TocError> {
        let Some(content_open) = &self.content_open else {
            return Ok(Some(0..html.len()));
        };
        let Some(captures) = content_open.captures(html) else {
            return Ok(None);
        };
        let (Some(whole), Some(tag)) = (captures.get(0), captures.get(1)) else {
            return Ok(None);
        };
        let nested = Regex::new(&format!(r"(?i)<(/?){}\b[^>]*>", regex::escape(tag.as_str())))?;
        let mut depth = 1usize;
        for found in nested.captures_iter(&html[whole.end()..]) {
            let (Some(m), Some(slash)) = (found.get(0), found.get(1)) else {
                continue;
            };
            if slash.as_str().is_empty() {
                if !m.as_str().ends_with("/>") {
                    depth += 1;
                }
            } else {
                depth -= 1;
                if depth == 0 {
                    return Ok(Some(whole.end()..whole.end() + m.start()));
                }
            }
        }
        tracing::warn!("Content element is never closed, scanning to end of document");
        Ok(Some(whole.end()..html.len()))
    }

    pub fn scan(&self, html: &str) -> Result<Vec<HtmlHeading>, TocError> {
        let Some(range) = self.content_range(html)? else {
            tracing::debug!("No content element found, no headings scanned");
            return Ok(Vec::new());
        };

        let mut headings = Vec::new();
        let mut cursor = range.start;
        while let Some(open) = self.open_tag.captures_at(html, cursor) {
            let (Some(whole), Some(name)) = (open.get(0), open.get(1)) else {
                break;
            };
            if whole.start() >= range.end {
                break;
            }
            let level = HeadingLevel::from_tag(name.as_str())?;
            let close_tag = &self.close_tags[usize::from(level.get()) - 1];
            let Some(close) = close_tag.find_at(html, whole.end()) else {
                tracing::warn!("Unclosed <{}> at byte {}, skipping", name.as_str(), whole.start());
                cursor = whole.end();
                continue;
            };

            let (id_attr, original_id) = open
                .get(2)
                .and_then(|attrs| {
                    let id = self.id_attr.captures(attrs.as_str())?;
                    let attr = id.get(1)?;
                    let value = id.get(2).or(id.get(3)).or(id.get(4))?;
                    Some((
                        Some(attrs.start() + attr.start()..attrs.start() + attr.end()),
                        Some(decode_entities(value.as_str())),
                    ))
                })
                .unwrap_or((None, None));

            let inner = &html[whole.end()..close.start()];
            headings.push(HtmlHeading {
                tag_name: name.range(),
                id_attr,
                level,
                text: decode_entities(&self.any_tag.replace_all(inner, "")),
                id: original_id.clone(),
                original_id,
            });
            cursor = close.end();
        }

        tracing::debug!("Found {} html heading(s)", headings.len());
        Ok(headings)
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

#[derive(Debug, Clone)]
pub struct HtmlPost {
    html: String,
    headings: Vec<HtmlHeading>,
}

impl HtmlPost {
    pub fn parse(html: &str, scanner: &HtmlScanner) -> Result<HtmlPost, TocError> {
        Ok(HtmlPost {
            headings: scanner.scan(html)?,
            html: html.to_string(),
        })
    }

    pub fn headings(&self) -> &[HtmlHeading] {
        &self.headings
    }

    pub fn headings_mut(&mut self) -> &mut [HtmlHeading] {
        &mut self.headings
    }

    /// The source HTML, with ids added or replaced on headings whose id changed.
    pub fn to_html(&self) -> String {
        let mut output = String::with_capacity(self.html.len());
        let mut cursor = 0;
        for heading in &self.headings {
            let Some(id) = heading.id.as_deref() else {
                continue;
            };
            if heading.original_id.as_deref() == Some(id) {
                continue;
            }
            let attr = format!(r#"id="{}""#, escape_html(id));
            match &heading.id_attr {
                Some(range) => {
                    output.push_str(&self.html[cursor..range.start]);
                    output.push_str(&attr);
                    cursor = range.end;
                }
                None => {
                    output.push_str(&self.html[cursor..heading.tag_name.end]);
                    output.push(' ');
                    output.push_str(&attr);
                    cursor = heading.tag_name.end;
                }
            }
        }
        output.push_str(&self.html[cursor..]);
        output
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFormat {
    Markdown,
    Html,
}

impl PostFormat {
    pub fn from_path<P: AsRef<Path>>(path: P) -> PostFormat {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown") => {
                PostFormat::Markdown
            }
            _ => PostFormat::Html,
        }
    }
}

impl FromStr for PostFormat {
    type Err = TocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(PostFormat::Markdown),
            "html" | "htm" => Ok(PostFormat::Html),
            other => Err(TocError::Config(format!("Unknown post format '{other}'"))),
        }
    }
}

/// A post in either source format.
#[derive(Debug, Clone)]
pub enum Post {
    Markdown(MarkdownPost),
    Html(HtmlPost),
}

impl Post {
    pub fn parse(content: &str, format: PostFormat, selectors: &Selectors) -> Result<Post, TocError> {
        Ok(match format {
            PostFormat::Markdown => Post::Markdown(MarkdownPost::parse(content)),
            PostFormat::Html => {
                Post::Html(HtmlPost::parse(content, &HtmlScanner::from_selectors(selectors)?)?)
            }
        })
    }

    /// Build the outline, writing the assigned ids back into the post.
    pub fn build_outline(&mut self) -> Option<Outline> {
        match self {
            Post::Markdown(post) => Outline::build(post.headings_mut()),
            Post::Html(post) => Outline::build(post.headings_mut()),
        }
    }

    pub fn to_html(&self) -> String {
        match self {
            Post::Markdown(post) => post.to_html(),
            Post::Html(post) => post.to_html(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::helpers::init_logging;

    #[test]
    fn markdown_headings_in_order_with_custom_ids() {
        let md = "# Title\n\nIntro.\n\n## Setup {#setup}\n\n### The `cargo` tool\n\n```\n# not a heading\n```\n\n## Usage\n";
        let mut post = MarkdownPost::parse(md);
        let texts: Vec<_> = post
            .headings()
            .iter()
            .map(|h| h.text().trim().to_string())
            .collect();
        assert_eq!(texts, vec!["Title", "Setup", "The cargo tool", "Usage"]);

        let outline = Outline::build(post.headings_mut()).unwrap();
        let ids: Vec<_> = outline.entries().iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec!["heading-0", "setup", "heading-2", "heading-3"]);

        let html = post.to_html();
        assert!(html.contains(r#"<h1 id="heading-0">Title</h1>"#));
        assert!(html.contains(r#"<h2 id="setup">Setup</h2>"#));
        assert!(html.contains(r#"<h3 id="heading-2">The <code>cargo</code> tool</h3>"#));
    }

    #[test]
    fn html_scan_respects_content_container() {
        let html = r#"<header><h1>Site</h1></header>
<div class="main post-content"><h2 id="a">First</h2><div><p>x</p></div><H3 class="x">Sub &amp; <em>more</em></H3></div>
<footer><h2>Footer</h2></footer>"#;
        let scanner = HtmlScanner::new(Some("post-content")).unwrap();
        let mut post = HtmlPost::parse(html, &scanner).unwrap();

        let texts: Vec<_> = post.headings().iter().map(|h| h.text()).collect();
        assert_eq!(texts, vec!["First", "Sub & more"]);

        Outline::build(post.headings_mut()).unwrap();
        let rewritten = post.to_html();
        assert!(rewritten.contains(r#"<h2 id="a">First</h2>"#));
        assert!(rewritten.contains(r#"<H3 id="heading-1" class="x">"#));
        assert!(rewritten.contains("<h1>Site</h1>"));
        assert!(rewritten.contains("<h2>Footer</h2>"));
    }

    #[test]
    fn html_without_content_container_has_no_headings() {
        init_logging();
        let scanner = HtmlScanner::new(Some("post-content")).unwrap();
        let headings = scanner.scan("<h1>Lonely</h1>").unwrap();
        assert!(headings.is_empty());
    }

    #[test]
    fn empty_id_attribute_is_replaced() {
        let scanner = HtmlScanner::new(None).unwrap();
        let mut post = HtmlPost::parse(r#"<h2 id="" data-id="keep">Two</h2>"#, &scanner).unwrap();
        Outline::build(post.headings_mut()).unwrap();
        assert_eq!(
            post.to_html(),
            r#"<h2 id="heading-0" data-id="keep">Two</h2>"#
        );
    }

    #[test]
    fn data_id_is_not_mistaken_for_id() {
        let scanner = HtmlScanner::new(None).unwrap();
        let headings = scanner.scan(r#"<h2 data-id="nope">Two</h2>"#).unwrap();
        assert_eq!(headings[0].id(), None);
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(PostFormat::from_path("post.md"), PostFormat::Markdown);
        assert_eq!(PostFormat::from_path("post.MARKDOWN"), PostFormat::Markdown);
        assert_eq!(PostFormat::from_path("post.html"), PostFormat::Html);
        assert_eq!(PostFormat::from_path("post"), PostFormat::Html);
    }
}
